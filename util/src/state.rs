//! Application state shared across Axum route handlers and background tasks.

use crate::ws::WebSocketManager;
use sea_orm::DatabaseConnection;

/// Central application state: the database connection plus the WebSocket
/// manager used for topic-based fan-out. Cheap to clone; handlers receive it
/// via Axum's `State<AppState>` extractor.
#[derive(Clone)]
pub struct AppState {
    db: DatabaseConnection,
    ws: WebSocketManager,
}

impl AppState {
    pub fn new(db: DatabaseConnection, ws: WebSocketManager) -> Self {
        Self { db, ws }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    pub fn ws(&self) -> &WebSocketManager {
        &self.ws
    }

    /// Owned copy of the connection, for spawned tasks.
    pub fn db_clone(&self) -> DatabaseConnection {
        self.db.clone()
    }

    /// Owned copy of the WebSocket manager, for spawned tasks.
    pub fn ws_clone(&self) -> WebSocketManager {
        self.ws.clone()
    }
}
