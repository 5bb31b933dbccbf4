// SPDX-License-Identifier: Apache-2.0
// Copyright 2024-2026 CAB Ingénierie / Christophe ABOULICAM
//! End-to-end requests through the full router with in-memory backends.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use casevault_authz::{ClearanceLevel, Role};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use tower::ServiceExt;

use casevault_gateway::auth::{basic_header, hash_password, TokenService};
use casevault_gateway::handlers::HealthState;
use casevault_gateway::metrics::Metrics;
use casevault_gateway::objects::{MemoryObjectStore, ObjectStore};
use casevault_gateway::store::{MemoryStore, NewUser, Store, UserStore, UserUpdate};
use casevault_gateway::users::{seed_default_admin, DEFAULT_ADMIN_PASSWORD};
use casevault_gateway::{build_router, AppState};
use common::{BUCKET, JPEG_BYTES, TEXT_BYTES};

const PASSWORD: &str = "correct-horse";
const BOUNDARY: &str = "casevault-test-boundary";

struct App {
    router: Router,
    store: Arc<dyn Store>,
}

async fn app() -> App {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let objects = Arc::new(MemoryObjectStore::new());
    objects.ensure_bucket(BUCKET).await.unwrap();
    seed_default_admin(&store).await.unwrap();

    let state = AppState::new(
        store.clone(),
        objects,
        BUCKET,
        TokenService::new("test-secret", 1),
        Metrics::new(),
        HealthState::new(Arc::new(AtomicBool::new(true))),
    );
    App {
        router: build_router(state),
        store,
    }
}

impl App {
    async fn user(&self, username: &str, role: Role, clearance: ClearanceLevel) -> i64 {
        self.store
            .create_user(NewUser {
                username: username.to_string(),
                email: format!("{}@districtcore.gov", username),
                full_name: username.to_string(),
                password_hash: hash_password(PASSWORD).unwrap(),
                role,
                clearance,
            })
            .await
            .unwrap()
            .id
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let value = serde_json::from_slice(&body).unwrap_or(Value::Null);
        (status, value)
    }
}

fn admin_auth() -> String {
    basic_header("admin", DEFAULT_ADMIN_PASSWORD)
}

fn auth(username: &str) -> String {
    basic_header(username, PASSWORD)
}

fn json_request(method: &str, uri: &str, auth: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, auth: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(auth) = auth {
        builder = builder.header(header::AUTHORIZATION, auth);
    }
    builder.body(Body::empty()).unwrap()
}

fn upload(auth: &str, case_id: i64, filename: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"caseId\"\r\n\r\n{case_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"remarks\"\r\n\r\nfront door\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/evidence/image")
        .header(header::AUTHORIZATION, auth)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn create_case(app: &App, level: &str) -> i64 {
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/cases",
            Some(&admin_auth()),
            json!({ "name": "Warehouse fire", "description": "See https://news.example/fire", "authorization_level": level }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_and_metrics_are_public() {
    let app = app().await;
    assert_eq!(app.send(get("/health/live", None)).await.0, StatusCode::OK);
    assert_eq!(app.send(get("/health/ready", None)).await.0, StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(get("/metrics", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_missing_credentials_rejected() {
    let app = app().await;
    let (status, body) = app.send(get("/api/cases", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthenticated");
    assert_eq!(body["message"], "authentication required");
}

#[tokio::test]
async fn test_inactive_user_indistinguishable_from_wrong_password() {
    let app = app().await;
    let id = app.user("kim", Role::Officer, ClearanceLevel::Low).await;
    app.store
        .update_user(
            id,
            UserUpdate {
                is_active: Some(false),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    app.user("lee", Role::Officer, ClearanceLevel::Low).await;

    let inactive = app
        .send(json_request(
            "POST",
            "/login",
            None,
            json!({ "username": "kim", "password": PASSWORD }),
        ))
        .await;
    let wrong_password = app
        .send(json_request(
            "POST",
            "/login",
            None,
            json!({ "username": "lee", "password": "not-the-password" }),
        ))
        .await;
    let unknown = app
        .send(json_request(
            "POST",
            "/login",
            None,
            json!({ "username": "nobody", "password": PASSWORD }),
        ))
        .await;

    assert_eq!(inactive.0, StatusCode::UNAUTHORIZED);
    assert_eq!(inactive, wrong_password);
    assert_eq!(inactive, unknown);
    assert_eq!(inactive.1["message"], "invalid credentials");

    // Basic auth on a protected route behaves the same way.
    let basic_inactive = app.send(get("/api/me", Some(&auth("kim")))).await;
    let basic_wrong = app
        .send(get("/api/me", Some(&basic_header("lee", "nope"))))
        .await;
    assert_eq!(basic_inactive, basic_wrong);
}

#[tokio::test]
async fn test_login_token_works_as_bearer() {
    let app = app().await;
    app.user("ines", Role::Investigator, ClearanceLevel::High).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/login",
            None,
            json!({ "username": "ines", "password": PASSWORD }),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("password_hash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, me) = app
        .send(get("/api/me", Some(&format!("Bearer {}", token))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "ines");
    assert_eq!(me["role"], "investigator");
    assert!(me["last_login"].is_string());
}

#[tokio::test]
async fn test_register_creates_low_citizen() {
    let app = app().await;
    let (status, body) = app
        .send(json_request(
            "POST",
            "/register",
            None,
            json!({ "username": "sam", "email": "sam@example.org", "password": "hunter22", "full_name": "Sam" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "citizen");
    assert_eq!(body["clearance"], "low");

    // Citizens cannot open cases.
    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/cases",
            Some(&basic_header("sam", "hunter22")),
            json!({ "name": "My case" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient permissions");
}

#[tokio::test]
async fn test_officer_cannot_create_case() {
    let app = app().await;
    app.user("olga", Role::Officer, ClearanceLevel::Critical).await;

    let (status, body) = app
        .send(json_request(
            "POST",
            "/api/cases",
            Some(&auth("olga")),
            json!({ "name": "Unauthorized" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");
}

#[tokio::test]
async fn test_case_above_clearance_is_forbidden() {
    let app = app().await;
    app.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case_id = create_case(&app, "high").await;

    let (status, body) = app
        .send(get(&format!("/api/cases/{}", case_id), Some(&auth("olga"))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient clearance");

    let (status, list) = app.send(get("/api/cases", Some(&auth("olga")))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_assignment_refused_over_http() {
    let app = app().await;
    let rookie = app.user("rook", Role::Officer, ClearanceLevel::Low).await;
    let case_id = create_case(&app, "high").await;

    let (status, _) = app
        .send(json_request(
            "POST",
            &format!("/api/cases/{}/assignees", case_id),
            Some(&admin_auth()),
            json!({ "user_id": rookie }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, assignees) = app
        .send(get(
            &format!("/api/cases/{}/assignees", case_id),
            Some(&admin_auth()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(assignees.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_image_upload_sniffs_content() {
    let app = app().await;
    app.user("olga", Role::Officer, ClearanceLevel::Low).await;
    let case_id = create_case(&app, "low").await;

    let (status, body) = app
        .send(upload(&auth("olga"), case_id, "remarks.txt", JPEG_BYTES))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["type"], "image");
    assert_eq!(body["remarks"], "front door");
    let id = body["id"].as_i64().unwrap();

    let response = app
        .router
        .clone()
        .oneshot(get(&format!("/api/evidence/{}/image", id), Some(&auth("olga"))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/jpeg");
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        JPEG_BYTES.len().to_string().as_str()
    );

    let (status, body) = app
        .send(upload(&auth("olga"), case_id, "photo.png", TEXT_BYTES))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_input");
}

#[tokio::test]
async fn test_hard_delete_is_admin_only_and_confirmed() {
    let app = app().await;
    app.user("ines", Role::Investigator, ClearanceLevel::Critical).await;
    let case_id = create_case(&app, "low").await;

    let (status, evidence) = app
        .send(json_request(
            "POST",
            "/api/evidence/text",
            Some(&auth("ines")),
            json!({ "case_id": case_id, "content": "Ledger page 4" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/evidence/{}/permanent", evidence["id"]);

    let confirmed = json!({ "confirmation": "CONFIRM_DELETE" });
    let (status, _) = app
        .send(json_request("DELETE", &uri, Some(&auth("ines")), confirmed.clone()))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(json_request(
            "DELETE",
            &uri,
            Some(&admin_auth()),
            json!({ "confirmation": "yes please" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .send(json_request("DELETE", &uri, Some(&admin_auth()), confirmed))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = app
        .send(get(
            &format!("/api/evidence/{}", evidence["id"]),
            Some(&admin_auth()),
        ))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_soft_delete_and_audit_over_http() {
    let app = app().await;
    app.user("ines", Role::Investigator, ClearanceLevel::Low).await;
    let case_id = create_case(&app, "low").await;

    let (_, evidence) = app
        .send(json_request(
            "POST",
            "/api/evidence/text",
            Some(&auth("ines")),
            json!({ "case_id": case_id, "content": "Witness note" }),
        ))
        .await;
    let id = evidence["id"].as_i64().unwrap();

    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/evidence/{}", id))
        .header(header::AUTHORIZATION, auth("ines"))
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(delete).await.0, StatusCode::OK);

    let (_, listed) = app
        .send(get(
            &format!("/api/cases/{}/evidence", case_id),
            Some(&auth("ines")),
        ))
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let (status, direct) = app
        .send(get(&format!("/api/evidence/{}", id), Some(&auth("ines"))))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(direct["is_deleted"], true);

    // Audit is admin only.
    let audit_uri = format!("/api/evidence/{}/audit", id);
    assert_eq!(
        app.send(get(&audit_uri, Some(&auth("ines")))).await.0,
        StatusCode::FORBIDDEN
    );
    let (status, entries) = app.send(get(&audit_uri, Some(&admin_auth()))).await;
    assert_eq!(status, StatusCode::OK);
    let actions: Vec<&str> = entries
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["action"].as_str().unwrap())
        .collect();
    assert_eq!(actions, vec!["delete", "create"]);
}

#[tokio::test]
async fn test_unassigned_officer_status_change_forbidden() {
    let app = app().await;
    app.user("olga", Role::Officer, ClearanceLevel::Critical).await;
    let case_id = create_case(&app, "low").await;

    let (status, _) = app
        .send(json_request(
            "PUT",
            &format!("/api/cases/{}/status", case_id),
            Some(&auth("olga")),
            json!({ "status": "ongoing" }),
        ))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, case) = app
        .send(get(&format!("/api/cases/{}", case_id), Some(&auth("olga"))))
        .await;
    assert_eq!(case["status"], "pending");
}

#[tokio::test]
async fn test_public_report_tracking() {
    let app = app().await;

    let (status, submitted) = app
        .send(json_request(
            "POST",
            "/api/public/reports",
            None,
            json!({ "title": "Stolen bike", "description": "Taken from the station rack" }),
        ))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(submitted["status"], "pending");
    let tracking = submitted["report_id"].as_str().unwrap().to_string();
    assert!(tracking.starts_with("RPT-"));

    let (status, body) = app
        .send(get(
            &format!("/api/public/reports/{}/status", tracking),
            None,
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "pending");

    let (status, _) = app
        .send(get("/api/public/reports/RPT-unknown/status", None))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_word_frequency_requires_critical_clearance() {
    let app = app().await;
    app.user("ines", Role::Investigator, ClearanceLevel::High).await;
    let case_id = create_case(&app, "low").await;

    app.send(json_request(
        "POST",
        "/api/evidence/text",
        Some(&admin_auth()),
        json!({ "case_id": case_id, "content": "Red van, red door, blue car" }),
    ))
    .await;

    let (status, body) = app
        .send(get("/api/analysis/word-frequency", Some(&auth("ines"))))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "insufficient clearance");

    let (status, body) = app
        .send(get(
            "/api/analysis/word-frequency?limit=1",
            Some(&admin_auth()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([{ "word": "red", "count": 2 }]));
}

#[tokio::test]
async fn test_case_links_include_description_and_text_evidence() {
    let app = app().await;
    let case_id = create_case(&app, "low").await;

    app.send(json_request(
        "POST",
        "/api/evidence/text",
        Some(&admin_auth()),
        json!({ "case_id": case_id, "content": "Posted at http://forum.example/t/9." }),
    ))
    .await;

    let (status, body) = app
        .send(get(
            &format!("/api/cases/{}/links", case_id),
            Some(&admin_auth()),
        ))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["links"],
        json!(["https://news.example/fire", "http://forum.example/t/9"])
    );
}
