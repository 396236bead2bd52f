mod emit;
mod payload;
mod topics;

pub use emit::{emit_attendance_marked, emit_session_deleted, emit_session_updated};
pub use payload::{AttendanceMarkedPayload, SessionDeletedPayload, SessionUpdatedPayload};
pub use topics::session_topic;

use axum::{
    extract::{Path, State, WebSocketUpgrade},
    response::IntoResponse,
};
use uuid::Uuid;

use util::state::AppState;
use util::ws::serve::{WsServerOptions, serve_topic};

/// GET /ws/attendance/sessions/{session_id}
///
/// Upgrades to a subscribe-only stream of attendance events for one session.
pub async fn attendance_ws(
    ws: WebSocketUpgrade,
    Path(session_id): Path<Uuid>,
    State(state): State<AppState>,
) -> impl IntoResponse {
    let topic = session_topic(session_id);
    let manager = state.ws_clone();
    ws.on_upgrade(move |socket| serve_topic(socket, manager, topic, WsServerOptions::default()))
}
