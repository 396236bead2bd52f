use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use util::state::AppState;

use crate::auth::guards::allow_trainer;

pub mod common;
mod delete;
mod get;
mod post;
mod put;

pub use delete::delete_session;
pub use get::{export_records, get_session, list_enrollments, list_records, list_sessions};
pub use post::{create_session, enroll, issue_token, scan};
pub use put::{edit_session, override_record};

/// Session routes. All require authentication (applied by the parent);
/// mutating a session or issuing tokens additionally requires trainer or
/// admin role.
pub fn sessions_routes() -> Router<AppState> {
    let trainer_only = Router::new()
        .route("/", post(create_session))
        .route("/{session_id}", put(edit_session))
        .route("/{session_id}", delete(delete_session))
        .route("/{session_id}/token", post(issue_token))
        .route("/{session_id}/records/{user_id}", put(override_record))
        .route_layer(from_fn(allow_trainer));

    Router::new()
        .route("/", get(list_sessions))
        .route("/{session_id}", get(get_session))
        .route("/{session_id}/scan", post(scan))
        .route("/{session_id}/enrollments", post(enroll))
        .route("/{session_id}/enrollments", get(list_enrollments))
        .route("/{session_id}/records", get(list_records))
        .route("/{session_id}/records/export", get(export_records))
        .merge(trainer_only)
}
