use axum::{
    Router,
    routing::{delete, get, post, put},
};
use util::state::AppState;

mod delete;
mod get;
mod post;
mod put;

pub use delete::delete_user;
pub use get::list_users;
pub use post::create_user;
pub use put::edit_user;

/// Admin-only user management (`allow_admin` is applied by the parent).
pub fn users_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users))
        .route("/", post(create_user))
        .route("/{user_id}", put(edit_user))
        .route("/{user_id}", delete(delete_user))
}
