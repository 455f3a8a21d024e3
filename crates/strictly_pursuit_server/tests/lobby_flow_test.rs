//! End-to-end: queue, match start, moves, game over, and back to the lobby.

use std::sync::Arc;
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use strictly_pursuit::{
    Board, MatchRules, MatchSetup, Move, ParticipantId, PieceId, Side, Sighting, StartingPools,
    StationId, TicketType,
};
use strictly_pursuit_server::{Lobby, MatchHandle, MatchId, Outbound, ServerMessage};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Evader always starts on 1, pursuers on 3 and 5.
fn fixed_setup() -> MatchSetup {
    let mut definition = Board::classic().to_definition();
    definition.starting_positions = StartingPools::new(&[1], &[3, 5]);
    let board = Board::from_definition(definition).expect("valid board");
    MatchSetup::new(Arc::new(board), MatchRules::default())
}

struct Client {
    id: ParticipantId,
    rx: mpsc::UnboundedReceiver<Outbound>,
    handle: Option<MatchHandle>,
}

impl Client {
    async fn connect(lobby: &Lobby) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = lobby.connect(tx).await;
        Self {
            id,
            rx,
            handle: None,
        }
    }

    /// Next non-lobby message, recording match assignments on the way.
    async fn next_game_message(&mut self) -> ServerMessage {
        loop {
            let item = timeout(Duration::from_secs(2), self.rx.recv())
                .await
                .expect("timed out waiting for message")
                .expect("outbox open");
            match item {
                Outbound::Assigned(handle) => self.handle = Some(handle),
                Outbound::Message(ServerMessage::LobbySnapshot { .. }) => {}
                Outbound::Message(message) => return message,
            }
        }
    }
}

async fn wait_until_nobody_plays(lobby: &Lobby) {
    timeout(Duration::from_secs(2), async {
        loop {
            if let ServerMessage::LobbySnapshot { playing, .. } = lobby.snapshot().await {
                if playing.is_empty() {
                    return;
                }
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("match never finished");
}

#[tokio::test]
async fn test_match_from_queue_to_game_over() {
    let lobby = Lobby::new(fixed_setup(), 3, ChaCha8Rng::seed_from_u64(4));
    let mut clients = vec![
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
    ];
    for (i, client) in clients.iter().enumerate() {
        lobby.join(client.id, format!("player{}", i)).await;
    }

    let mut evader = None;
    for (i, client) in clients.iter_mut().enumerate() {
        let ServerMessage::MatchStarted {
            pieces,
            owned_piece_ids,
            is_evader_turn,
            ..
        } = client.next_game_message().await
        else {
            panic!("expected match-started");
        };
        assert!(is_evader_turn);
        assert_eq!(pieces.len(), 3);
        assert_eq!(client.handle.as_ref().map(MatchHandle::id), Some(MatchId(1)));
        if owned_piece_ids.contains(&PieceId::EVADER) {
            assert_eq!(*pieces[0].station(), Sighting::Visible(StationId(1)));
            evader = Some(i);
        } else {
            assert_eq!(*pieces[0].station(), Sighting::Hidden);
        }
    }
    let evader = evader.expect("someone plays the evader");

    // Step onto the pursuer at 3.
    let handle = clients[evader].handle.clone().expect("assigned");
    assert!(handle.submit(
        clients[evader].id,
        Move::new(PieceId::EVADER, StationId(3), TicketType::Bus)
    ));

    for (i, client) in clients.iter_mut().enumerate() {
        let ServerMessage::MoveApplied { destination, .. } = client.next_game_message().await
        else {
            panic!("expected move-applied");
        };
        if i == evader {
            assert_eq!(destination, Sighting::Visible(StationId(3)));
        } else {
            assert_eq!(destination, Sighting::Hidden);
        }
        assert_eq!(
            client.next_game_message().await,
            ServerMessage::TicketUsed {
                ticket: TicketType::Bus
            }
        );
        assert_eq!(
            client.next_game_message().await,
            ServerMessage::TurnSwitched {
                whose_turn_now: Side::Pursuers
            }
        );
        assert_eq!(
            client.next_game_message().await,
            ServerMessage::GameOver {
                winner: Side::Pursuers
            }
        );
    }

    wait_until_nobody_plays(&lobby).await;

    // Everyone can queue again.
    for client in &clients {
        lobby.join(client.id, "again".into()).await;
    }
    for client in clients.iter_mut() {
        assert!(matches!(
            client.next_game_message().await,
            ServerMessage::MatchStarted { .. }
        ));
        assert_eq!(client.handle.as_ref().map(MatchHandle::id), Some(MatchId(2)));
    }
}

#[tokio::test]
async fn test_illegal_move_produces_no_events() {
    let lobby = Lobby::new(fixed_setup(), 3, ChaCha8Rng::seed_from_u64(8));
    let mut clients = vec![
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
    ];
    for client in &clients {
        lobby.join(client.id, "p".into()).await;
    }
    for client in clients.iter_mut() {
        client.next_game_message().await;
    }

    let handle = clients[0].handle.clone().expect("assigned");
    // Station 7 is not next to 1, and pursuers may not move first.
    handle.submit(
        clients[0].id,
        Move::new(PieceId::EVADER, StationId(7), TicketType::Taxi),
    );
    handle.submit(
        clients[0].id,
        Move::new(PieceId(2), StationId(4), TicketType::Taxi),
    );

    tokio::time::sleep(Duration::from_millis(50)).await;
    for client in clients.iter_mut() {
        while let Ok(item) = client.rx.try_recv() {
            assert!(
                matches!(item, Outbound::Message(ServerMessage::LobbySnapshot { .. })),
                "unexpected {:?}",
                item
            );
        }
    }
}

#[tokio::test]
async fn test_disconnect_mid_match_leaves_piece_inert() {
    let lobby = Lobby::new(fixed_setup(), 3, ChaCha8Rng::seed_from_u64(2));
    let mut clients = vec![
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
        Client::connect(&lobby).await,
    ];
    for client in &clients {
        lobby.join(client.id, "p".into()).await;
    }
    for client in clients.iter_mut() {
        client.next_game_message().await;
    }

    let gone = clients.pop().expect("client");
    lobby.disconnect(gone.id).await;

    let ServerMessage::LobbySnapshot { playing, .. } = lobby.snapshot().await else {
        panic!("expected snapshot");
    };
    assert_eq!(playing.len(), 2);
}
