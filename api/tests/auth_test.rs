mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use db::models::user::Role;
use helpers::{bearer, make_test_app, seed_user};

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn register_then_login() {
    let (app, _state) = make_test_app().await;

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "newbie",
                "email": "newbie@test.com",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["user"]["role"], "trainee");
    assert!(body["data"]["token"].as_str().is_some());

    // Same email again conflicts.
    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/register",
            json!({
                "username": "newbie2",
                "email": "newbie@test.com",
                "password": "password123"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let resp = app
        .clone()
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "newbie@test.com", "password": "password123" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let token = body_json(resp).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    // The issued token opens an authenticated route.
    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/categories")
                .header(header::AUTHORIZATION, bearer(&token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_fails() {
    let (app, state) = make_test_app().await;
    seed_user(state.db(), "victim", Role::Trainee).await;

    let resp = app
        .oneshot(post_json(
            "/api/auth/login",
            json!({ "email": "victim@test.com", "password": "not-the-password" }),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn user_management_is_admin_only() {
    let (app, state) = make_test_app().await;
    let (_trainer, trainer_token) = seed_user(state.db(), "mgmt-trainer", Role::Trainer).await;
    let (_admin, admin_token) = seed_user(state.db(), "mgmt-admin", Role::Admin).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users")
                .header(header::AUTHORIZATION, bearer(&trainer_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users?role=admin")
                .header(header::AUTHORIZATION, bearer(&admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["users"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["users"][0]["username"], "mgmt-admin");
}

#[tokio::test]
async fn user_list_honours_sort_param() {
    let (app, state) = make_test_app().await;
    let (_admin, admin_token) = seed_user(state.db(), "aaa-admin", Role::Admin).await;
    seed_user(state.db(), "zed", Role::Trainee).await;
    seed_user(state.db(), "mike", Role::Trainee).await;

    let resp = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/users?sort=-username")
                .header(header::AUTHORIZATION, bearer(&admin_token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let names: Vec<&str> = body["data"]["users"]
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["zed", "mike", "aaa-admin"]);
}
