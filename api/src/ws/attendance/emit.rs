use util::ws::{WebSocketManager, emit};

use super::payload::{AttendanceMarkedPayload, SessionDeletedPayload, SessionUpdatedPayload};
use super::topics::session_topic;

pub async fn emit_attendance_marked(ws: &WebSocketManager, payload: AttendanceMarkedPayload) {
    let topic = session_topic(payload.session_id);
    emit(ws, &topic, "attendance_marked", &payload).await;
}

pub async fn emit_session_updated(ws: &WebSocketManager, payload: SessionUpdatedPayload) {
    let topic = session_topic(payload.session_id);
    emit(ws, &topic, "session_updated", &payload).await;
}

pub async fn emit_session_deleted(ws: &WebSocketManager, payload: SessionDeletedPayload) {
    let topic = session_topic(payload.session_id);
    emit(ws, &topic, "session_deleted", &payload).await;
}
