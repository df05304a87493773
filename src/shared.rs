use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::GameConfig;
use crate::room::{RoomRegistry, RoomService};
use crate::websockets::{websocket_handler, ConnectionManager, InMemoryConnectionManager};

/// Shared application state containing all dependencies
#[derive(Clone)]
pub struct AppState {
    pub room_service: RoomService,
    pub connection_manager: Arc<dyn ConnectionManager>,
    pub config: GameConfig,
}

impl AppState {
    pub fn new(
        registry: Arc<RoomRegistry>,
        connection_manager: Arc<dyn ConnectionManager>,
        config: GameConfig,
    ) -> Self {
        Self {
            room_service: RoomService::new(registry, connection_manager.clone(), config),
            connection_manager,
            config,
        }
    }

    /// Fresh in-memory state, as used by the server binary
    pub fn in_memory(config: GameConfig) -> Self {
        Self::new(
            Arc::new(RoomRegistry::new()),
            Arc::new(InMemoryConnectionManager::new()),
            config,
        )
    }
}

pub fn build_router(app_state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "OK" }))
        .route("/ws", get(websocket_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}
