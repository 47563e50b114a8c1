#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Attendance endpoints behind the guard, over one sqlite database shared
//! with the org resolver.

use std::sync::Arc;

use attendance::AttendanceModule;
use attendance::config::AttendanceConfig;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use campus_auth::{Guard, StaticAuthConfig, StaticIdentity, StaticIdentityProvider};
use org_resolver::OrgResolverModule;
use org_resolver::config::OrgResolverConfig;
use sea_orm::Database;
use serde_json::{Value, json};
use tower::ServiceExt as _;

fn identity(token: &str, id: &str, metadata: Value) -> StaticIdentity {
    StaticIdentity {
        token: token.to_owned(),
        id: id.to_owned(),
        email: format!("{id}@school.test"),
        metadata,
    }
}

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    OrgResolverModule::migrate(&db).await.unwrap();
    AttendanceModule::migrate(&db).await.unwrap();

    let provider = Arc::new(StaticIdentityProvider::from_config(&StaticAuthConfig {
        identities: vec![
            identity(
                "tok-t1",
                "teacher-1",
                json!({ "org_id": "org-1", "roles": ["teacher"] }),
            ),
            identity(
                "tok-t2",
                "teacher-2",
                json!({ "org_id": "org-2", "roles": ["teacher"] }),
            ),
            identity("tok-orphan", "parent-9", json!({ "roles": ["parent"] })),
        ],
    }));

    let resolver =
        OrgResolverModule::new(OrgResolverConfig::default(), db.clone(), provider.clone());
    let attendance = AttendanceModule::new(AttendanceConfig::default(), db);
    let guard = Guard::new(provider, resolver.client());
    attendance.router(&guard)
}

async fn send(
    app: &Router,
    token: Option<&str>,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let body = body.map_or_else(Body::empty, |v| Body::from(v.to_string()));
    let response = app.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

async fn get(app: &Router, token: &str, uri: &str) -> (StatusCode, Value) {
    send(app, Some(token), Method::GET, uri, None).await
}

async fn post(app: &Router, token: &str, uri: &str, body: Value) -> (StatusCode, Value) {
    send(app, Some(token), Method::POST, uri, Some(body)).await
}

async fn put(app: &Router, token: &str, body: Value) -> (StatusCode, Value) {
    send(app, Some(token), Method::PUT, "/attendance", Some(body)).await
}

async fn delete(app: &Router, token: &str, id: &str) -> (StatusCode, Value) {
    let uri = format!("/attendance?id={id}");
    send(app, Some(token), Method::DELETE, &uri, None).await
}

fn mark(student: &str, status: &str) -> Value {
    json!({ "student_id": student, "date": "2024-01-10", "status": status })
}

#[tokio::test]
async fn saving_twice_for_same_student_and_day_keeps_one_row() {
    let app = app().await;

    let (status, body) = post(&app, "tok-t1", "/attendance", mark("S1", "present")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["attendance"]["org_id"], "org-1");
    assert_eq!(body["attendance"]["recorded_by"], "teacher-1");
    let first_id = body["attendance"]["id"].clone();

    let (status, body) = post(&app, "tok-t1", "/attendance", mark("S1", "absent")).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["attendance"]["id"], first_id);

    let (status, body) = get(&app, "tok-t1", "/attendance?studentId=S1&date=2024-01-10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["attendance"][0]["status"], "absent");
    assert_eq!(body["attendance"][0]["date"], "2024-01-10");
}

#[tokio::test]
async fn batch_saves_every_record() {
    let app = app().await;

    let (status, body) = post(
        &app,
        "tok-t1",
        "/attendance/batch",
        json!({ "records": [mark("S1", "present"), mark("S2", "absent")] }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["count"], 2);

    let (_, body) = get(&app, "tok-t1", "/attendance?date=2024-01-10").await;
    assert_eq!(body["total"], 2);
}

#[tokio::test]
async fn malformed_input_is_a_bad_request() {
    let app = app().await;

    let (status, body) = post(
        &app,
        "tok-t1",
        "/attendance/batch",
        json!({ "records": [] }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);

    let mut bad_date = mark("S1", "present");
    bad_date["date"] = json!("10/01/2024");
    let (status, _) = post(&app, "tok-t1", "/attendance", bad_date).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&app, "tok-t1", "/attendance", mark("S1", "late")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        "tok-t1",
        "/attendance",
        json!({ "date": "2024-01-10" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = delete(&app, "tok-t1", "not-a-uuid").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn body_org_other_than_callers_is_forbidden() {
    let app = app().await;
    let mut record = mark("S1", "present");
    record["org_id"] = json!("org-2");

    let (status, _) = post(&app, "tok-t1", "/attendance", record).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn another_orgs_record_cannot_be_overwritten() {
    let app = app().await;
    post(&app, "tok-t1", "/attendance", mark("S1", "present")).await;

    let (status, _) = post(&app, "tok-t2", "/attendance", mark("S1", "absent")).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = get(&app, "tok-t1", "/attendance?studentId=S1").await;
    assert_eq!(body["attendance"][0]["status"], "present");

    let (_, body) = get(&app, "tok-t2", "/attendance").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn update_and_delete_are_confined_to_the_callers_org() {
    let app = app().await;
    let (_, body) = post(&app, "tok-t1", "/attendance", mark("S1", "present")).await;
    let id = body["attendance"]["id"].as_str().unwrap().to_owned();

    let patch = json!({ "id": id, "status": "absent", "notes": "fever" });
    let (status, _) = put(&app, "tok-t2", patch.clone()).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = delete(&app, "tok-t2", &id).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = put(&app, "tok-t1", patch).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attendance"]["status"], "absent");
    assert_eq!(body["attendance"]["notes"], "fever");

    let (status, _) = delete(&app, "tok-t1", &id).await;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = get(&app, "tok-t1", "/attendance").await;
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn guard_rejects_before_handlers_run() {
    let app = app().await;

    let (status, _) = send(&app, None, Method::GET, "/attendance", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = post(&app, "tok-orphan", "/attendance", mark("S1", "present")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("Organization ID is required"));

    let (_, body) = get(&app, "tok-t1", "/attendance").await;
    assert_eq!(body["total"], 0);
}
