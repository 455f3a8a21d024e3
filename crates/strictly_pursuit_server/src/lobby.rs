//! Matchmaking: connected participants, the waiting queue, and match starts.

use crate::actor::{MatchActor, MatchHandle, MatchId};
use crate::participant::{Outbound, ParticipantHandle};
use crate::protocol::ServerMessage;
use crate::roster::Roster;
use rand_chacha::ChaCha8Rng;
use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use strictly_pursuit::{MatchSetup, ParticipantId, Side};
use tokio::sync::{Mutex, mpsc};
use tracing::{debug, error, info, instrument, warn};

/// A connected participant as the lobby tracks it.
#[derive(Debug)]
struct Member {
    handle: ParticipantHandle,
    playing: Option<MatchHandle>,
}

#[derive(Debug)]
struct LobbyState {
    members: BTreeMap<ParticipantId, Member>,
    searching: VecDeque<ParticipantId>,
    next_participant: u64,
    next_match: u64,
    rng: ChaCha8Rng,
}

#[derive(Debug)]
struct LobbyInner {
    setup: MatchSetup,
    match_size: usize,
    state: Mutex<LobbyState>,
}

/// Shared matchmaking queue.
///
/// Cloning is cheap; every clone addresses the same lobby.
#[derive(Debug, Clone)]
pub struct Lobby {
    inner: Arc<LobbyInner>,
}

impl Lobby {
    /// Creates a lobby dealing matches of `match_size` participants.
    #[instrument(skip(setup, rng))]
    pub fn new(setup: MatchSetup, match_size: usize, rng: ChaCha8Rng) -> Self {
        info!("Creating lobby");
        Self {
            inner: Arc::new(LobbyInner {
                setup,
                match_size,
                state: Mutex::new(LobbyState {
                    members: BTreeMap::new(),
                    searching: VecDeque::new(),
                    next_participant: 1,
                    next_match: 1,
                    rng,
                }),
            }),
        }
    }

    /// Participants per match.
    pub fn match_size(&self) -> usize {
        self.inner.match_size
    }

    /// Registers a new connection and returns its identity.
    #[instrument(skip(self, outbox))]
    pub async fn connect(&self, outbox: mpsc::UnboundedSender<Outbound>) -> ParticipantId {
        let mut state = self.inner.state.lock().await;
        let id = ParticipantId(state.next_participant);
        state.next_participant += 1;
        state.members.insert(
            id,
            Member {
                handle: ParticipantHandle::new(id, String::new(), outbox),
                playing: None,
            },
        );
        info!(participant = %id, "Participant connected");
        broadcast_snapshot(&state);
        id
    }

    /// Queues a participant under `name`.
    ///
    /// Joining twice is a no-op, as is joining while seated in a match.
    #[instrument(skip(self))]
    pub async fn join(&self, participant: ParticipantId, name: String) {
        let mut state = self.inner.state.lock().await;
        let Some(member) = state.members.get_mut(&participant) else {
            warn!("Join from unknown participant ignored");
            return;
        };
        if member.playing.is_some() {
            debug!("Already playing, join ignored");
            return;
        }
        member.handle.rename(name);
        if !state.searching.contains(&participant) {
            state.searching.push_back(participant);
            info!(searching = state.searching.len(), "Participant queued");
        }
        broadcast_snapshot(&state);
        self.start_matches(&mut state);
    }

    /// Removes a participant from the queue. Idempotent.
    #[instrument(skip(self))]
    pub async fn leave(&self, participant: ParticipantId) {
        let mut state = self.inner.state.lock().await;
        let before = state.searching.len();
        state.searching.retain(|p| *p != participant);
        if state.searching.len() < before {
            info!("Participant left queue");
            broadcast_snapshot(&state);
        }
    }

    /// Forgets a connection. A piece it controlled stays on the board,
    /// inert. Idempotent.
    #[instrument(skip(self))]
    pub async fn disconnect(&self, participant: ParticipantId) {
        let mut state = self.inner.state.lock().await;
        state.searching.retain(|p| *p != participant);
        let Some(member) = state.members.remove(&participant) else {
            return;
        };
        if let Some(handle) = member.playing {
            handle.leave(participant);
        }
        info!("Participant disconnected");
        broadcast_snapshot(&state);
    }

    /// Current lobby listing.
    pub async fn snapshot(&self) -> ServerMessage {
        snapshot_of(&*self.inner.state.lock().await)
    }

    /// Returns participants whose match ended to the unmatched pool.
    #[instrument(skip(self))]
    pub async fn match_finished(&self, match_id: MatchId, winner: Option<Side>) {
        let mut state = self.inner.state.lock().await;
        let mut released = 0;
        for member in state.members.values_mut() {
            if member.playing.as_ref().map(MatchHandle::id) == Some(match_id) {
                member.playing = None;
                released += 1;
            }
        }
        info!(released, "Match participants returned to lobby");
        broadcast_snapshot(&state);
    }

    /// Deals matches while enough participants are waiting.
    fn start_matches(&self, state: &mut LobbyState) {
        let size = self.inner.match_size;
        while state.searching.len() >= size {
            let participants: Vec<ParticipantId> = state.searching.drain(..size).collect();
            let game = match self.inner.setup.deal(&participants, &mut state.rng) {
                Ok(game) => game,
                Err(e) => {
                    error!(error = %e, "Failed to deal match");
                    for p in participants.into_iter().rev() {
                        state.searching.push_front(p);
                    }
                    return;
                }
            };

            let id = MatchId(state.next_match);
            state.next_match += 1;
            let seats: Vec<ParticipantHandle> = participants
                .iter()
                .filter_map(|p| state.members.get(p).map(|m| m.handle.clone()))
                .collect();
            let (actor, handle) = MatchActor::new(id, game, Roster::new(seats));

            for p in &participants {
                if let Some(member) = state.members.get_mut(p) {
                    member.handle.assign(handle.clone());
                    member.playing = Some(handle.clone());
                }
            }

            let task = actor.spawn();
            let lobby = self.clone();
            tokio::spawn(async move {
                let winner = match task.await {
                    Ok(winner) => winner,
                    Err(e) => {
                        error!(match_id = %id, error = %e, "Match task failed");
                        None
                    }
                };
                lobby.match_finished(id, winner).await;
            });

            info!(match_id = %id, "Match started");
            broadcast_snapshot(state);
        }
    }
}

fn snapshot_of(state: &LobbyState) -> ServerMessage {
    let name = |id: &ParticipantId| {
        state
            .members
            .get(id)
            .map(|m| m.handle.name().clone())
    };
    let playing = state
        .members
        .iter()
        .filter(|(_, m)| m.playing.is_some())
        .filter_map(|(id, _)| name(id))
        .collect();
    let searching = state.searching.iter().filter_map(name).collect();
    ServerMessage::LobbySnapshot { playing, searching }
}

fn broadcast_snapshot(state: &LobbyState) {
    let snapshot = snapshot_of(state);
    for member in state.members.values() {
        member.handle.send(snapshot.clone());
    }
}
