mod helpers;

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use db::models::user::Role;
use helpers::{bearer, make_test_app, seed_session_today, seed_user};

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, bearer(token));
    match body {
        Some(v) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(v.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

#[tokio::test]
async fn trainees_cannot_create_sessions() {
    let (app, state) = make_test_app().await;
    let (_trainee, token) = seed_user(state.db(), "just-a-trainee", Role::Trainee).await;

    let resp = app
        .oneshot(request(
            "POST",
            "/api/sessions",
            &token,
            Some(json!({
                "category_id": 1,
                "title": "Nope",
                "scheduled_date": "2026-09-01",
                "start_time": "09:00:00",
                "end_time": "10:00:00"
            })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn create_and_list_sessions_with_counts() {
    let (app, state) = make_test_app().await;
    let (trainer, trainer_token) = seed_user(state.db(), "list-trainer", Role::Trainer).await;
    let (trainee, trainee_token) = seed_user(state.db(), "list-trainee", Role::Trainee).await;
    let session = seed_session_today(state.db(), trainer.id, "Listing").await;

    // Self-enroll so the listing has something to count.
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/sessions/{}/enrollments", session.id),
            &trainee_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["user_id"], trainee.id);
    assert_eq!(body["data"]["assigned_by"], trainee.id);

    let resp = app
        .clone()
        .oneshot(request("GET", "/api/sessions?status=scheduled", &trainer_token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    let sessions = body["data"]["sessions"].as_array().unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(sessions[0]["enrolled"], 1);
    assert_eq!(sessions[0]["present"], 0);
}

#[tokio::test]
async fn duplicate_enrollment_conflicts() {
    let (app, state) = make_test_app().await;
    let (trainer, _) = seed_user(state.db(), "dup-trainer", Role::Trainer).await;
    let (_trainee, trainee_token) = seed_user(state.db(), "dup-trainee", Role::Trainee).await;
    let session = seed_session_today(state.db(), trainer.id, "Dup").await;

    let uri = format!("/api/sessions/{}/enrollments", session.id);
    let resp = app
        .clone()
        .oneshot(request("POST", &uri, &trainee_token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app
        .clone()
        .oneshot(request("POST", &uri, &trainee_token, None))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn only_admins_enroll_other_users() {
    let (app, state) = make_test_app().await;
    let (trainer, _) = seed_user(state.db(), "assign-trainer", Role::Trainer).await;
    let (victim, _) = seed_user(state.db(), "assign-victim", Role::Trainee).await;
    let (_other, other_token) = seed_user(state.db(), "assign-other", Role::Trainee).await;
    let (_admin, admin_token) = seed_user(state.db(), "assign-admin", Role::Admin).await;
    let session = seed_session_today(state.db(), trainer.id, "Assign").await;

    let uri = format!("/api/sessions/{}/enrollments", session.id);
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            &other_token,
            Some(json!({ "user_id": victim.id })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &uri,
            &admin_token,
            Some(json!({ "user_id": victim.id })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["user_id"], victim.id);
    assert_ne!(body["data"]["assigned_by"], victim.id);
}

#[tokio::test]
async fn illegal_status_transitions_are_rejected() {
    let (app, state) = make_test_app().await;
    let (trainer, trainer_token) = seed_user(state.db(), "transition-trainer", Role::Trainer).await;
    let session = seed_session_today(state.db(), trainer.id, "Transitions").await;
    let uri = format!("/api/sessions/{}", session.id);

    // scheduled → completed skips active.
    let resp = app
        .clone()
        .oneshot(request("PUT", &uri, &trainer_token, Some(json!({ "status": "completed" }))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // scheduled → cancelled is allowed, and is terminal.
    let resp = app
        .clone()
        .oneshot(request("PUT", &uri, &trainer_token, Some(json!({ "status": "cancelled" }))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(request("PUT", &uri, &trainer_token, Some(json!({ "status": "active" }))))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn trainers_can_override_a_record() {
    let (app, state) = make_test_app().await;
    let (trainer, trainer_token) = seed_user(state.db(), "ovr-trainer", Role::Trainer).await;
    let (trainee, trainee_token) = seed_user(state.db(), "ovr-trainee", Role::Trainee).await;
    let session = seed_session_today(state.db(), trainer.id, "Override").await;

    // Activate, issue, scan to produce a record.
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/sessions/{}", session.id),
            &trainer_token,
            Some(json!({ "status": "active" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/sessions/{}/token", session.id),
            &trainer_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    let code = body_json(resp).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();
    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/sessions/{}/scan", session.id),
            &trainee_token,
            Some(json!({ "token": code })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let uri = format!("/api/sessions/{}/records/{}", session.id, trainee.id);

    // Trainees cannot override.
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            &trainee_token,
            Some(json!({ "status": "absent", "classification": "partial" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &uri,
            &trainer_token,
            Some(json!({ "status": "absent", "classification": "partial" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_json(resp).await;
    assert_eq!(body["data"]["status"], "absent");
    assert_eq!(body["data"]["classification"], "partial");
}

#[tokio::test]
async fn export_returns_csv_attachment() {
    let (app, state) = make_test_app().await;
    let (trainer, trainer_token) = seed_user(state.db(), "csv-trainer", Role::Trainer).await;
    let (_trainee, trainee_token) = seed_user(state.db(), "csv-trainee", Role::Trainee).await;
    let session = seed_session_today(state.db(), trainer.id, "Csv").await;

    // Activate, issue, scan so the export has a row.
    let resp = app
        .clone()
        .oneshot(request(
            "PUT",
            &format!("/api/sessions/{}", session.id),
            &trainer_token,
            Some(json!({ "status": "active" })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/sessions/{}/token", session.id),
            &trainer_token,
            Some(json!({})),
        ))
        .await
        .unwrap();
    let code = body_json(resp).await["data"]["token"]
        .as_str()
        .unwrap()
        .to_string();

    let resp = app
        .clone()
        .oneshot(request(
            "POST",
            &format!("/api/sessions/{}/scan", session.id),
            &trainee_token,
            Some(json!({ "token": code })),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .clone()
        .oneshot(request(
            "GET",
            &format!("/api/sessions/{}/records/export", session.id),
            &trainer_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(header::CONTENT_TYPE).unwrap(),
        "text/csv"
    );
    let disposition = resp
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"attendance-"));

    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let csv = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(csv.contains("name,email,status,join_time"));
    assert!(csv.contains("csv-trainee"));
}
