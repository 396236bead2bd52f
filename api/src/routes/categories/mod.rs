use axum::{
    Router,
    middleware::from_fn,
    routing::{delete, get, post, put},
};
use util::state::AppState;

use crate::auth::guards::allow_admin;

mod delete;
mod get;
mod post;
mod put;

pub use delete::delete_category;
pub use get::list_categories;
pub use post::create_category;
pub use put::edit_category;

/// Category management. Reads are open to any authenticated user, writes are
/// admin-only.
pub fn categories_routes() -> Router<AppState> {
    let writes = Router::new()
        .route("/", post(create_category))
        .route("/{category_id}", put(edit_category))
        .route("/{category_id}", delete(delete_category))
        .route_layer(from_fn(allow_admin));

    Router::new().route("/", get(list_categories)).merge(writes)
}
