use axum::{Router, routing::post};
use util::state::AppState;

mod post;

pub use post::{bootstrap_admin, sweep_sessions};

/// Operational endpoints: the manual sweep trigger (also hit by schedulers)
/// and the idempotent first-admin bootstrap.
pub fn system_routes() -> Router<AppState> {
    Router::new()
        .route("/sweep", post(sweep_sessions))
        .route("/bootstrap-admin", post(bootstrap_admin))
}
