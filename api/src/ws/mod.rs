//! WebSocket endpoints.
//!
//! One topic family for now: per-session attendance streams that dashboards
//! subscribe to for live roster updates.

pub mod attendance;

use axum::{Router, middleware::from_fn, routing::get};
use util::state::AppState;

use crate::auth::guards::allow_authenticated;

pub fn ws_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/attendance/sessions/{session_id}",
            get(attendance::attendance_ws),
        )
        .route_layer(from_fn(allow_authenticated))
}
