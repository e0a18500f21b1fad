use axum::http::StatusCode;
use axum_test::{TestRequest, TestServer};
use serde_json::{Value, json};

use campus_registry::infra::memory::MemoryDocumentStore;
use campus_testing::auth::MockIdentity;

use crate::helpers::{insert, test_server, test_student};

fn with_identity(request: TestRequest, identity: &MockIdentity) -> TestRequest {
    identity
        .headers()
        .into_iter()
        .fold(request, |req, (name, value)| match name {
            Some(name) => req.add_header(name, value),
            None => req,
        })
}

async fn post_json(server: &TestServer, path: &str, body: Value) -> axum_test::TestResponse {
    server.post(path).json(&body).await
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_answer_health_probes() {
    let server = test_server(MemoryDocumentStore::new());
    server.get("/healthz").await.assert_status_ok();
    server.get("/readyz").await.assert_status_ok();
}

#[tokio::test]
async fn should_echo_request_id() {
    let server = test_server(MemoryDocumentStore::new());
    let response = server.get("/healthz").await;
    assert!(response.headers().contains_key("x-request-id"));
}

// ── Records ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_create_get_update_and_delete_course() {
    let server = test_server(MemoryDocumentStore::new());

    let created = post_json(
        &server,
        "/api/courses",
        json!({"course_id": 101, "course_code": "CS101", "course_name": "Intro"}),
    )
    .await;
    created.assert_status(StatusCode::CREATED);
    let body: Value = created.json();
    assert_eq!(body["id"], "101");
    assert_eq!(body["course_id"], "101");

    let fetched: Value = server.get("/api/courses/101").await.json();
    assert_eq!(fetched["course_name"], "Intro");

    let updated = server
        .put("/api/courses/101")
        .json(&json!({"course_name": "Introduction to Programming"}))
        .await;
    updated.assert_status_ok();
    let updated: Value = updated.json();
    assert_eq!(updated["course_name"], "Introduction to Programming");
    assert_eq!(updated["course_code"], "CS101");

    let deleted = server.delete("/api/courses/101").await;
    deleted.assert_status_ok();
    let deleted: Value = deleted.json();
    assert_eq!(deleted["message"], "Course with ID 101 deleted successfully.");

    let missing = server.get("/api/courses/101").await;
    missing.assert_status(StatusCode::NOT_FOUND);
    let missing: Value = missing.json();
    assert_eq!(missing["kind"], "NOT_FOUND");
}

#[tokio::test]
async fn should_bulk_insert_students() {
    let server = test_server(MemoryDocumentStore::new());

    let response = post_json(
        &server,
        "/api/students",
        json!({"students": [
            {"student_code": "S1", "name": "An"},
            {"student_id": "S2", "name": "Binh"}
        ]}),
    )
    .await;
    response.assert_status(StatusCode::CREATED);
    let created: Vec<Value> = response.json();
    assert_eq!(created.len(), 2);

    let listed: Vec<Value> = server.get("/api/students").await.json();
    let mut ids: Vec<_> = listed.iter().filter_map(|s| s["id"].as_str()).collect();
    ids.sort();
    assert_eq!(ids, ["S1", "S2"]);
}

#[tokio::test]
async fn should_reject_bulk_insert_with_missing_key() {
    let server = test_server(MemoryDocumentStore::new());

    let response = post_json(
        &server,
        "/api/courses",
        json!({"courses": [
            {"course_id": "C1", "course_name": "A"},
            {"course_name": "B"}
        ]}),
    )
    .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["kind"], "VALIDATION_ERROR");

    let listed: Vec<Value> = server.get("/api/courses").await.json();
    assert!(listed.is_empty());
}

#[tokio::test]
async fn should_reject_course_without_id() {
    let server = test_server(MemoryDocumentStore::new());
    let response = post_json(&server, "/api/courses", json!({"course_name": "A"})).await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert_eq!(body["message"], "course_id is required");
}

#[tokio::test]
async fn should_reject_key_change_on_update() {
    let server = test_server(MemoryDocumentStore::new());
    post_json(
        &server,
        "/api/courses",
        json!({"course_id": "C1", "course_name": "A"}),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let response = server
        .put("/api/courses/C1")
        .json(&json!({"course_id": "C2"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

// ── Enrollments ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_list_courses_of_student() {
    let server = test_server(MemoryDocumentStore::new());
    post_json(
        &server,
        "/api/courses",
        json!({"courses": [
            {"course_id": "C1", "course_name": "Algorithms"},
            {"course_id": "C2", "course_name": "Databases"}
        ]}),
    )
    .await
    .assert_status(StatusCode::CREATED);
    post_json(
        &server,
        "/api/enrollments",
        json!({"enrollments": [
            {"enrollment_id": "E1", "student_id": "S1", "course_id": "C1", "type": "core", "rating": 0},
            {"enrollment_id": "E2", "student_id": "S1", "course_id": "C2"}
        ]}),
    )
    .await
    .assert_status(StatusCode::CREATED);

    let response = server.get("/api/enrollments/student/S1").await;
    response.assert_status_ok();
    let courses: Vec<Value> = response.json();
    assert_eq!(courses.len(), 2);
    assert_eq!(courses[0]["id"], "C1");
    assert_eq!(courses[0]["type"], "core");
    assert_eq!(courses[0]["rating"], 0.0);
    assert_eq!(courses[1]["type"], "unknown");
    assert!(courses[1]["rating"].is_null());
}

// ── Profile ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_require_identity_headers_for_register() {
    let server = test_server(MemoryDocumentStore::new());
    let response = post_json(
        &server,
        "/api/auth/register",
        json!({"student_code": "S1", "displayName": "An"}),
    )
    .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn should_register_then_report_existing_profile() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let server = test_server(memory);
    let identity = MockIdentity::new("uid-1", "an@campus.test");
    let body = json!({"student_code": "S1", "displayName": "An"});

    let first = with_identity(server.post("/api/auth/register"), &identity)
        .json(&body)
        .await;
    first.assert_status(StatusCode::CREATED);
    let created: Value = first.json();
    assert_eq!(created["message"], "Profile created successfully");
    assert_eq!(created["uid"], "uid-1");
    assert_eq!(created["student_code"], "S1");
    assert_eq!(created["emailVerified"], true);

    let second = with_identity(server.post("/api/auth/register"), &identity)
        .json(&body)
        .await;
    second.assert_status_ok();
    let existing: Value = second.json();
    assert_eq!(existing["message"], "Profile already exists");
    assert_eq!(existing["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn should_reject_register_with_missing_fields() {
    let server = test_server(MemoryDocumentStore::new());
    let identity = MockIdentity::new("uid-1", "an@campus.test");

    let response = with_identity(server.post("/api/auth/register"), &identity)
        .json(&json!({"student_code": "S1"}))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn should_return_conflict_for_student_linked_elsewhere() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let server = test_server(memory);
    let body = json!({"student_code": "S1", "displayName": "An"});

    with_identity(
        server.post("/api/auth/register"),
        &MockIdentity::new("uid-1", "an@campus.test"),
    )
    .json(&body)
    .await
    .assert_status(StatusCode::CREATED);

    let response = with_identity(
        server.post("/api/auth/register"),
        &MockIdentity::new("uid-2", "binh@campus.test"),
    )
    .json(&body)
    .await;
    response.assert_status(StatusCode::CONFLICT);
    let error: Value = response.json();
    assert_eq!(error["kind"], "ALREADY_LINKED");
}

#[tokio::test]
async fn should_read_and_update_own_profile() {
    let memory = MemoryDocumentStore::new();
    insert(memory.clone(), test_student("S1")).await;
    let server = test_server(memory);
    let identity = MockIdentity::new("uid-1", "an@campus.test");

    with_identity(server.post("/api/auth/register"), &identity)
        .json(&json!({"student_code": "S1", "displayName": "An"}))
        .await
        .assert_status(StatusCode::CREATED);

    let me: Value = with_identity(server.get("/api/profile/me"), &identity)
        .await
        .json();
    assert_eq!(me["profile"]["name"], "Tran Thi B");
    assert_eq!(me["profile"]["major"], "Information Systems");

    let updated = with_identity(server.put("/api/profile/me"), &identity)
        .json(&json!({"displayName": "An Tran"}))
        .await;
    updated.assert_status_ok();
    let updated: Value = updated.json();
    assert_eq!(updated["profile"]["displayName"], "An Tran");
}

#[tokio::test]
async fn should_return_not_found_for_profile_without_registration() {
    let server = test_server(MemoryDocumentStore::new());
    let identity = MockIdentity::new("ghost", "ghost@campus.test");

    let response = with_identity(server.get("/api/profile/me"), &identity).await;
    response.assert_status(StatusCode::NOT_FOUND);
}
