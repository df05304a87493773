use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use doubt::{
    config::GameConfig,
    room::{RoomRegistry, RoomService},
    websockets::{ConnectionSession, WebsocketReceiveHandler},
};

use super::mocks::MockConnectionManager;

// ============================================================================
// Test Setup Infrastructure
// ============================================================================

/// One simulated socket: its session plus the frames written straight to it
pub struct TestClient {
    pub session: ConnectionSession,
    pub direct: mpsc::UnboundedReceiver<String>,
}

impl TestClient {
    pub fn new() -> Self {
        let (sender, direct) = mpsc::unbounded_channel();
        Self {
            session: ConnectionSession::new(sender),
            direct,
        }
    }
}

pub struct TestSetup {
    pub registry: Arc<RoomRegistry>,
    pub mock_conn_manager: Arc<MockConnectionManager>,
    pub room_service: RoomService,
    pub input_handler: WebsocketReceiveHandler,
    pub clients: Mutex<HashMap<String, TestClient>>,
    pub players: Vec<String>,
    pub room_id: String,
}

pub struct TestSetupBuilder {
    players: Vec<String>,
    config: GameConfig,
}

impl TestSetupBuilder {
    pub fn new() -> Self {
        Self {
            players: vec![],
            config: GameConfig::default(),
        }
    }

    /// The first player creates the room, the rest join it in order
    pub fn with_players(mut self, players: Vec<&str>) -> Self {
        self.players = players.into_iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_two_players(self) -> Self {
        self.with_players(vec!["alice", "bob"])
    }

    pub fn with_three_players(self) -> Self {
        self.with_players(vec!["alice", "bob", "carol"])
    }

    pub fn with_max_players(mut self, max_players: usize) -> Self {
        self.config.max_players = max_players;
        self
    }

    pub async fn build(self) -> TestSetup {
        let registry = Arc::new(RoomRegistry::new());
        let mock_conn_manager = Arc::new(MockConnectionManager::new());
        let room_service =
            RoomService::new(registry.clone(), mock_conn_manager.clone(), self.config);
        let input_handler =
            WebsocketReceiveHandler::new(room_service.clone(), mock_conn_manager.clone());

        let mut setup = TestSetup {
            registry,
            mock_conn_manager,
            room_service,
            input_handler,
            clients: Mutex::new(HashMap::new()),
            players: self.players.clone(),
            room_id: String::new(),
        };

        if let Some((creator, others)) = self.players.split_first() {
            setup.send_create_room(creator).await;
            setup.room_id = setup
                .bound_room(creator)
                .await
                .expect("creator should be seated after createRoom");
            for player in others {
                let room_id = setup.room_id.clone();
                setup.send_join_room(player, &room_id).await;
            }
        }

        setup.clear_messages().await;
        setup
    }
}

/// "alice" -> "Alice"
pub fn display_name(player_id: &str) -> String {
    let mut chars = player_id.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
