//! One task per match: the only writer of that match's state.

use crate::roster::Roster;
use derive_more::Display;
use strictly_pursuit::{Match, Move, ParticipantId, Side};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument, warn};

/// Identifier of a running match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("match-{}", _0)]
pub struct MatchId(pub u64);

/// Commands a match actor accepts.
#[derive(Debug, Clone)]
pub enum MatchCommand {
    /// A participant declared a move.
    Move {
        /// Who sent it.
        participant: ParticipantId,
        /// The move.
        mv: Move,
    },
    /// A participant disconnected. Its pieces stay on the board, inert.
    Leave {
        /// Who left.
        participant: ParticipantId,
    },
}

/// Cheap, cloneable address of a running match.
#[derive(Debug, Clone)]
pub struct MatchHandle {
    id: MatchId,
    commands: mpsc::UnboundedSender<MatchCommand>,
}

impl MatchHandle {
    /// Match this handle addresses.
    pub fn id(&self) -> MatchId {
        self.id
    }

    /// Forwards a move. Returns false if the match has ended.
    pub fn submit(&self, participant: ParticipantId, mv: Move) -> bool {
        self.send(MatchCommand::Move { participant, mv })
    }

    /// Reports a participant gone. Returns false if the match has ended.
    pub fn leave(&self, participant: ParticipantId) -> bool {
        self.send(MatchCommand::Leave { participant })
    }

    fn send(&self, command: MatchCommand) -> bool {
        if self.commands.send(command).is_err() {
            debug!(match_id = %self.id, "Match already finished, command dropped");
            return false;
        }
        true
    }
}

/// Owns a [`Match`] and its [`Roster`], processing commands one at a time.
#[derive(Debug)]
pub struct MatchActor {
    id: MatchId,
    game: Match,
    roster: Roster,
    commands: mpsc::UnboundedReceiver<MatchCommand>,
}

impl MatchActor {
    /// Creates an actor and the handle that feeds it.
    ///
    /// Nothing runs until [`Self::spawn`] or [`Self::run`] is called, so
    /// the handle can be handed out first.
    pub fn new(id: MatchId, game: Match, roster: Roster) -> (Self, MatchHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let actor = Self {
            id,
            game,
            roster,
            commands: rx,
        };
        (actor, MatchHandle { id, commands: tx })
    }

    /// Runs the actor on its own task.
    pub fn spawn(self) -> JoinHandle<Option<Side>> {
        tokio::spawn(self.run())
    }

    /// Announces the match, then processes commands until a winner is
    /// decided, every participant has left, or every handle is dropped.
    ///
    /// Returns the winner, if any.
    #[instrument(skip(self), fields(match_id = %self.id))]
    pub async fn run(mut self) -> Option<Side> {
        self.roster.announce_start(&self.game);
        info!(seats = self.roster.len(), "Match running");

        while let Some(command) = self.commands.recv().await {
            match command {
                MatchCommand::Move { participant, mv } => self.handle_move(participant, mv),
                MatchCommand::Leave { participant } => {
                    self.roster.remove(participant);
                    if self.roster.is_empty() {
                        warn!("Every participant left, abandoning match");
                        break;
                    }
                }
            }
            if self.game.is_over() {
                break;
            }
        }

        info!(winner = ?self.game.winner(), "Match finished");
        self.game.winner()
    }

    #[instrument(skip(self, mv), fields(match_id = %self.id, mv = %mv))]
    fn handle_move(&mut self, participant: ParticipantId, mv: Move) {
        if !self.roster.contains(participant) {
            debug!(%participant, "Move from unseated participant dropped");
            return;
        }
        match self.game.submit(participant, mv) {
            Ok(dispatches) => {
                self.roster.deliver(&dispatches);
            }
            Err(rejection) => {
                debug!(%participant, %rejection, "Move dropped");
            }
        }
    }
}
