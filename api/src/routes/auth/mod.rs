use axum::{Router, routing::post};
use util::state::AppState;

pub mod post;

pub use post::{login, register};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
