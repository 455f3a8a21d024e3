//! Connected participants and their outbound queues.

use crate::actor::MatchHandle;
use crate::protocol::ServerMessage;
use derive_getters::Getters;
use derive_new::new;
use strictly_pursuit::ParticipantId;
use tokio::sync::mpsc;
use tracing::debug;

/// Something queued for a participant's connection task.
#[derive(Debug, Clone)]
pub enum Outbound {
    /// A message to write to the socket.
    Message(ServerMessage),
    /// The participant was seated in a match; route moves here.
    Assigned(MatchHandle),
}

/// Address of one connected participant.
///
/// Sends never block. A send to a closed connection is logged and
/// otherwise ignored.
#[derive(Debug, Clone, Getters, new)]
pub struct ParticipantHandle {
    /// Participant identity.
    id: ParticipantId,
    /// Lobby display name.
    name: String,
    /// Queue drained by the connection task.
    #[getter(skip)]
    outbox: mpsc::UnboundedSender<Outbound>,
}

impl ParticipantHandle {
    /// Queues a message. Returns false if the connection is gone.
    pub fn send(&self, message: ServerMessage) -> bool {
        self.push(Outbound::Message(message))
    }

    /// Tells the connection which match its moves go to.
    pub fn assign(&self, handle: MatchHandle) -> bool {
        self.push(Outbound::Assigned(handle))
    }

    /// Changes the display name.
    pub fn rename(&mut self, name: String) {
        self.name = name;
    }

    fn push(&self, item: Outbound) -> bool {
        match self.outbox.send(item) {
            Ok(()) => true,
            Err(_) => {
                debug!(participant = %self.id, "Outbox closed, message dropped");
                false
            }
        }
    }
}
