//! Ticket types and the per-piece ticket ledger.
//!
//! The ticket set is closed, so the ledger is a fixed array indexed by
//! [`TicketType`] rather than a map. A zero count and an absent count are
//! the same thing.

use crate::board::Transit;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use tracing::instrument;

/// Consumable movement rights.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
pub enum TicketType {
    /// Short-hop ticket.
    Taxi,
    /// Mid-hop ticket.
    Bus,
    /// Long-hop ticket.
    Underground,
    /// Wildcard, valid on any transit.
    Black,
    /// Extends the evader's turn to two sub-moves.
    Double,
}

impl TicketType {
    const COUNT: usize = 5;

    fn index(self) -> usize {
        match self {
            TicketType::Taxi => 0,
            TicketType::Bus => 1,
            TicketType::Underground => 2,
            TicketType::Black => 3,
            TicketType::Double => 4,
        }
    }

    /// Returns true if this ticket may be spent traversing `transit`.
    pub fn rides(self, transit: Transit) -> bool {
        matches!(
            (self, transit),
            (TicketType::Black, _)
                | (TicketType::Taxi, Transit::Taxi)
                | (TicketType::Bus, Transit::Bus)
                | (TicketType::Underground, Transit::Underground)
        )
    }
}

/// Remaining count of one ticket type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Option<u32>", into = "Option<u32>")]
pub enum Allowance {
    /// Never runs out.
    Unlimited,
    /// Finite remaining count.
    Limited(u32),
}

impl Allowance {
    /// Returns true if at least one ticket remains.
    pub fn available(self) -> bool {
        match self {
            Allowance::Unlimited => true,
            Allowance::Limited(n) => n > 0,
        }
    }
}

impl From<Option<u32>> for Allowance {
    fn from(value: Option<u32>) -> Self {
        value.map_or(Allowance::Unlimited, Allowance::Limited)
    }
}

impl From<Allowance> for Option<u32> {
    fn from(value: Allowance) -> Self {
        match value {
            Allowance::Unlimited => None,
            Allowance::Limited(n) => Some(n),
        }
    }
}

/// Starting black tickets for the evader.
pub const EVADER_BLACK_TICKETS: u32 = 5;
/// Starting double-move tickets for the evader.
pub const EVADER_DOUBLE_TICKETS: u32 = 2;
/// Starting taxi tickets for a pursuer.
pub const PURSUER_TAXI_TICKETS: u32 = 11;
/// Starting bus tickets for a pursuer.
pub const PURSUER_BUS_TICKETS: u32 = 8;
/// Starting underground tickets for a pursuer.
pub const PURSUER_UNDERGROUND_TICKETS: u32 = 4;

/// Per-piece ticket counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TicketLedger {
    counts: [Allowance; TicketType::COUNT],
}

impl TicketLedger {
    /// Creates a ledger with explicit counts for every ticket type.
    pub fn new(
        taxi: Allowance,
        bus: Allowance,
        underground: Allowance,
        black: Allowance,
        double: Allowance,
    ) -> Self {
        Self {
            counts: [taxi, bus, underground, black, double],
        }
    }

    /// Starting allocation for the evader.
    pub fn evader() -> Self {
        Self::new(
            Allowance::Unlimited,
            Allowance::Unlimited,
            Allowance::Unlimited,
            Allowance::Limited(EVADER_BLACK_TICKETS),
            Allowance::Limited(EVADER_DOUBLE_TICKETS),
        )
    }

    /// Starting allocation for a pursuer.
    pub fn pursuer() -> Self {
        Self::new(
            Allowance::Limited(PURSUER_TAXI_TICKETS),
            Allowance::Limited(PURSUER_BUS_TICKETS),
            Allowance::Limited(PURSUER_UNDERGROUND_TICKETS),
            Allowance::Limited(0),
            Allowance::Limited(0),
        )
    }

    /// A ledger holding no tickets at all.
    pub fn empty() -> Self {
        Self {
            counts: [Allowance::Limited(0); TicketType::COUNT],
        }
    }

    /// Returns the ledger with `ticket` set to `allowance`.
    pub fn with(mut self, ticket: TicketType, allowance: Allowance) -> Self {
        self.counts[ticket.index()] = allowance;
        self
    }

    /// Remaining allowance for a ticket type.
    pub fn count(&self, ticket: TicketType) -> Allowance {
        self.counts[ticket.index()]
    }

    /// Returns true iff at least one ticket of this type remains.
    pub fn has(&self, ticket: TicketType) -> bool {
        self.count(ticket).available()
    }

    /// Spends one ticket.
    ///
    /// # Panics
    ///
    /// Panics if the ticket is exhausted. Callers must check [`Self::has`]
    /// first; spending a ticket that isn't there is a logic error.
    #[instrument(skip(self))]
    pub fn consume(&mut self, ticket: TicketType) {
        let slot = &mut self.counts[ticket.index()];
        match slot {
            Allowance::Unlimited => {}
            Allowance::Limited(n) => {
                assert!(*n > 0, "consumed exhausted {} ticket", ticket);
                *n -= 1;
            }
        }
    }

    /// Ordered `(type, count)` pairs for serialization.
    pub fn entries(&self) -> Vec<(TicketType, Allowance)> {
        TicketType::iter().map(|t| (t, self.count(t))).collect()
    }
}

impl Default for TicketLedger {
    fn default() -> Self {
        Self::empty()
    }
}
