//! HTTP route entry point for `/api/...`.
//!
//! Route groups:
//! - `/health` → health check (public)
//! - `/auth` → register + login (public)
//! - `/users` → user management (admin-only)
//! - `/categories` → training categories (authenticated; admin for writes)
//! - `/sessions` → session CRUD, tokens, scans, enrollments, exports
//! - `/system` → sweep trigger and admin bootstrap

use axum::{Router, middleware::from_fn};
use util::state::AppState;

use crate::auth::guards::{allow_admin, allow_authenticated};
use crate::routes::{
    auth::auth_routes, categories::categories_routes, health::health_routes,
    sessions::sessions_routes, system::system_routes, users::users_routes,
};

pub mod auth;
pub mod categories;
pub mod health;
pub mod sessions;
pub mod system;
pub mod users;

/// Builds the complete application router for all HTTP endpoints.
pub fn routes(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest("/users", users_routes().route_layer(from_fn(allow_admin)))
        .nest(
            "/categories",
            categories_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest(
            "/sessions",
            sessions_routes().route_layer(from_fn(allow_authenticated)),
        )
        .nest("/system", system_routes())
        .with_state(app_state)
}
