//! Station graph and starting-position pools.
//!
//! The board is immutable once built. Matches share it behind an `Arc`
//! and only ever read from it.

use derive_getters::Getters;
use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, instrument};

/// Station number on the board (always positive).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct StationId(pub u32);

/// Category of a connection, governing which tickets may traverse it.
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
pub enum Transit {
    /// Short hop.
    Taxi,
    /// Mid hop.
    Bus,
    /// Long hop.
    Underground,
    /// Water hop, only reachable with a black ticket.
    Ferry,
}

/// A station with display coordinates.
///
/// Coordinates are carried for clients and never consulted by the rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Station {
    /// Station number.
    number: StationId,
    /// Horizontal display coordinate.
    x: i32,
    /// Vertical display coordinate.
    y: i32,
}

impl Station {
    /// Creates a station.
    pub fn new(number: u32, x: i32, y: i32) -> Self {
        Self {
            number: StationId(number),
            x,
            y,
        }
    }
}

/// An undirected link between two stations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct Connection {
    /// One end.
    station1: StationId,
    /// The other end.
    station2: StationId,
    /// Transit type of the link.
    transit: Transit,
}

impl Connection {
    /// Creates a connection.
    pub fn new(station1: u32, station2: u32, transit: Transit) -> Self {
        Self {
            station1: StationId(station1),
            station2: StationId(station2),
            transit,
        }
    }

    /// Returns true if this connection joins `a` and `b` in either direction.
    pub fn links(&self, a: StationId, b: StationId) -> bool {
        (self.station1 == a && self.station2 == b) || (self.station1 == b && self.station2 == a)
    }

    /// Returns the far end when `from` is one end of this connection.
    pub fn other_end(&self, from: StationId) -> Option<StationId> {
        if self.station1 == from {
            Some(self.station2)
        } else if self.station2 == from {
            Some(self.station1)
        } else {
            None
        }
    }
}

/// Stations each role may start from.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize, Deserialize)]
pub struct StartingPools {
    /// Candidate starts for the evader.
    evader: Vec<StationId>,
    /// Candidate starts for pursuers.
    pursuers: Vec<StationId>,
}

impl StartingPools {
    /// Creates starting pools from raw station numbers.
    pub fn new(evader: &[u32], pursuers: &[u32]) -> Self {
        Self {
            evader: evader.iter().copied().map(StationId).collect(),
            pursuers: pursuers.iter().copied().map(StationId).collect(),
        }
    }
}

/// Serializable board description, as found in configuration files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDefinition {
    /// All stations.
    pub stations: Vec<Station>,
    /// All connections.
    pub connections: Vec<Connection>,
    /// Starting pools per role.
    pub starting_positions: StartingPools,
}

/// Validated, immutable station graph.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct Board {
    /// Stations in definition order.
    stations: Vec<Station>,
    /// Connections in definition order.
    connections: Vec<Connection>,
    /// Starting pools per role.
    starting_positions: StartingPools,
}

impl Board {
    /// Validates a definition and builds a board from it.
    #[instrument(skip(definition), fields(
        stations = definition.stations.len(),
        connections = definition.connections.len()
    ))]
    pub fn from_definition(definition: BoardDefinition) -> Result<Self, BoardError> {
        let mut seen = HashSet::new();
        for station in &definition.stations {
            if station.number.0 == 0 {
                return Err(BoardError::new("Station numbers must be positive"));
            }
            if !seen.insert(station.number) {
                return Err(BoardError::new(format!(
                    "Duplicate station {}",
                    station.number
                )));
            }
        }

        for connection in &definition.connections {
            for end in [connection.station1, connection.station2] {
                if !seen.contains(&end) {
                    return Err(BoardError::new(format!(
                        "Connection references unknown station {}",
                        end
                    )));
                }
            }
            if connection.station1 == connection.station2 {
                return Err(BoardError::new(format!(
                    "Connection loops back to station {}",
                    connection.station1
                )));
            }
        }

        let pools = &definition.starting_positions;
        for (role, pool) in [("evader", &pools.evader), ("pursuer", &pools.pursuers)] {
            if pool.is_empty() {
                return Err(BoardError::new(format!("Empty {} starting pool", role)));
            }
            if let Some(unknown) = pool.iter().find(|s| !seen.contains(s)) {
                return Err(BoardError::new(format!(
                    "{} starting pool references unknown station {}",
                    role, unknown
                )));
            }
        }

        debug!("Board definition validated");
        Ok(Self {
            stations: definition.stations,
            connections: definition.connections,
            starting_positions: definition.starting_positions,
        })
    }

    /// The seven-station board the game ships with.
    pub fn classic() -> Self {
        use Transit::*;
        Self {
            stations: vec![
                Station::new(1, 0, 0),
                Station::new(2, 1, 0),
                Station::new(3, 2, 0),
                Station::new(4, 3, 1),
                Station::new(5, 1, 2),
                Station::new(6, 2, 2),
                Station::new(7, 3, 2),
            ],
            connections: vec![
                Connection::new(1, 2, Taxi),
                Connection::new(2, 3, Taxi),
                Connection::new(3, 4, Taxi),
                Connection::new(4, 7, Taxi),
                Connection::new(7, 6, Taxi),
                Connection::new(6, 5, Taxi),
                Connection::new(5, 1, Taxi),
                Connection::new(1, 6, Bus),
                Connection::new(6, 4, Bus),
                Connection::new(4, 3, Bus),
                Connection::new(3, 1, Bus),
                Connection::new(1, 4, Underground),
            ],
            starting_positions: StartingPools::new(&[1, 7], &[3, 4, 5]),
        }
    }

    /// Returns the definition this board was built from.
    pub fn to_definition(&self) -> BoardDefinition {
        BoardDefinition {
            stations: self.stations.clone(),
            connections: self.connections.clone(),
            starting_positions: self.starting_positions.clone(),
        }
    }

    /// Looks up a station by number.
    pub fn station(&self, id: StationId) -> Option<&Station> {
        self.stations.iter().find(|s| s.number == id)
    }

    /// Returns true if the station exists.
    pub fn contains(&self, id: StationId) -> bool {
        self.station(id).is_some()
    }

    /// All connections directly joining `a` and `b`.
    ///
    /// Parallel links of different transit types are all returned.
    pub fn connections_between(&self, a: StationId, b: StationId) -> Vec<&Connection> {
        self.connections.iter().filter(|c| c.links(a, b)).collect()
    }

    /// Stations reachable from `station` by any single connection.
    pub fn neighbors_of(&self, station: StationId) -> BTreeSet<StationId> {
        self.connections
            .iter()
            .filter_map(|c| c.other_end(station))
            .collect()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::classic()
    }
}

/// Board validation error with location tracking.
#[derive(Debug, Clone, Display, Error)]
#[display("Board error: {} at {}:{}", message, file, line)]
pub struct BoardError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl BoardError {
    /// Creates a new board error with caller location tracking.
    #[track_caller]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parallel_connections_are_all_returned() {
        let board = Board::classic();
        let links = board.connections_between(StationId(4), StationId(3));
        let transits: Vec<_> = links.iter().map(|c| *c.transit()).collect();
        assert_eq!(transits, vec![Transit::Taxi, Transit::Bus]);
    }

    #[test]
    fn test_connections_are_undirected() {
        let board = Board::classic();
        assert_eq!(board.connections_between(StationId(2), StationId(1)).len(), 1);
        assert_eq!(board.connections_between(StationId(1), StationId(2)).len(), 1);
    }

    #[test]
    fn test_neighbors_of_hub() {
        let board = Board::classic();
        let neighbors: Vec<u32> = board
            .neighbors_of(StationId(1))
            .into_iter()
            .map(|s| s.0)
            .collect();
        assert_eq!(neighbors, vec![2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_unknown_station_is_empty() {
        let board = Board::classic();
        assert!(board.neighbors_of(StationId(99)).is_empty());
        assert!(board.connections_between(StationId(99), StationId(1)).is_empty());
        assert!(!board.contains(StationId(99)));
    }

    #[test]
    fn test_definition_round_trips_through_validation() {
        let board = Board::classic();
        let rebuilt = Board::from_definition(board.to_definition()).expect("classic is valid");
        assert_eq!(rebuilt, board);
    }

    #[test]
    fn test_rejects_dangling_connection() {
        let mut definition = Board::classic().to_definition();
        definition.connections.push(Connection::new(7, 8, Transit::Ferry));
        let err = Board::from_definition(definition).unwrap_err();
        assert!(err.message.contains("unknown station 8"));
    }

    #[test]
    fn test_rejects_duplicate_station() {
        let mut definition = Board::classic().to_definition();
        definition.stations.push(Station::new(3, 9, 9));
        assert!(Board::from_definition(definition).is_err());
    }

    #[test]
    fn test_rejects_empty_pool() {
        let mut definition = Board::classic().to_definition();
        definition.starting_positions = StartingPools::new(&[1], &[]);
        let err = Board::from_definition(definition).unwrap_err();
        assert!(err.message.contains("pursuer"));
    }
}
