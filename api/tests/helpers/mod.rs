use axum::Router;
use chrono::{NaiveTime, Utc};
use sea_orm::DatabaseConnection;

use api::auth::generate_jwt;
use api::routes::routes;
use db::models::user::{Model as User, Role};
use db::models::{category, training_session};
use db::test_utils::setup_test_db;
use util::config::AppConfig;
use util::{state::AppState, ws::WebSocketManager};

/// Builds the full router over a fresh in-memory database.
pub async fn make_test_app() -> (Router, AppState) {
    AppConfig::set_jwt_secret("test-secret");
    AppConfig::set_jwt_duration_minutes(60);
    AppConfig::set_frontend_url("https://app.test");
    AppConfig::set_attendance_token_ttl_seconds(300);
    AppConfig::set_attendance_grace_minutes(5);

    let db = setup_test_db().await;
    let state = AppState::new(db, WebSocketManager::new());
    let app = Router::new().nest("/api", routes(state.clone()));
    (app.with_state(state.clone()), state)
}

pub async fn seed_user(db: &DatabaseConnection, name: &str, role: Role) -> (User, String) {
    let email = format!("{name}@test.com");
    let user = User::create(db, name, &email, "password123", role)
        .await
        .expect("seed user");
    let (token, _) = generate_jwt(user.id, user.role);
    (user, token)
}

/// Category + session owned by `trainer_id`, spanning the whole of today so
/// it is sweep-proof for the duration of a test.
pub async fn seed_session_today(
    db: &DatabaseConnection,
    trainer_id: i64,
    category_name: &str,
) -> training_session::Model {
    let cat = category::Model::create(db, category_name, None)
        .await
        .expect("seed category");
    training_session::Model::create(
        db,
        cat.id,
        trainer_id,
        "Forklift refresher",
        None,
        Utc::now().date_naive(),
        NaiveTime::from_hms_opt(0, 0, 0).unwrap(),
        NaiveTime::from_hms_opt(23, 59, 59).unwrap(),
    )
    .await
    .expect("seed session")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
