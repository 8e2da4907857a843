use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use chrono::{Datelike, Duration, Utc};
use clave_core::db;
use clave_core::models::ScheduleConfig;
use clave_core::repository::SqliteRepository;
use clave_server::{create_router, AppState};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

async fn setup_test_app() -> (Router, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");
    let pool = db::establish_connection(db_path.to_str().unwrap())
        .await
        .unwrap();
    let repo = SqliteRepository::new(pool, ScheduleConfig::default());
    let app = create_router(AppState {
        repo: Arc::new(repo),
    });
    (app, temp_dir)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(value) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(value.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn seed_teacher(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/teachers",
        Some(json!({
            "name": "Ana Souza",
            "email": "ana@clave.example",
            "specialty": "Piano",
            "revenueSharePercentage": 60,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn seed_student(app: &Router) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/students",
        Some(json!({
            "name": "Bruno Lima",
            "email": "bruno@clave.example",
            "instrument": "Piano",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

async fn seed_lesson(
    app: &Router,
    teacher_id: i64,
    shift: &str,
    start_date: &str,
    weekdays: &[i64],
) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/lessons/configure",
        Some(json!({
            "instrument": "Piano",
            "shift": shift,
            "teacherId": teacher_id,
            "startDate": start_date,
            "weekdays": weekdays,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let (app, _temp_dir) = setup_test_app().await;

    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_login_endpoint() {
    let (app, _temp_dir) = setup_test_app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": "admin", "password": "clave-admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": "admin", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/auth/login",
        Some(json!({ "username": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_configure_lesson_creates_occurrences() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;

    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1, 3]).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences", lesson_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let occurrences = body["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 8);
    assert_eq!(occurrences[0]["date"], "2024-01-01");
    assert_eq!(occurrences[0]["status"], "scheduled");
    assert_eq!(occurrences[0]["lessonId"].as_i64().unwrap(), lesson_id);

    let (status, body) = send(&app, Method::GET, "/lessons", None).await;
    assert_eq!(status, StatusCode::OK);
    let lessons = body.as_array().unwrap();
    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0]["teacherName"], "Ana Souza");
    assert_eq!(lessons[0]["weekdays"], json!([1, 3]));
}

#[tokio::test]
async fn test_configure_lesson_error_statuses() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/lessons/configure",
        Some(json!({
            "instrument": "Piano",
            "shift": "morning",
            "teacherId": 999,
            "startDate": "2024-01-01",
            "weekdays": [1],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        "/lessons/configure",
        Some(json!({
            "instrument": "Piano",
            "shift": "dawn",
            "teacherId": teacher_id,
            "startDate": "2024-01-01",
            "weekdays": [1],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/lessons/configure",
        Some(json!({
            "instrument": "Piano",
            "shift": "morning",
            "teacherId": teacher_id,
            "startDate": "2024-01-01",
            "weekdays": [1, 7],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/lessons/configure",
        Some(json!({
            "shift": "morning",
            "teacherId": teacher_id,
            "startDate": "2024-01-01",
            "weekdays": [1],
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "instrument is required");
}

#[tokio::test]
async fn test_generate_occurrences_endpoint() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;
    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1, 3]).await;

    // Re-running the default window generates nothing new.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/lessons/{}/generate-occurrences", lesson_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["occurrences"].as_array().unwrap().len(), 0);

    // A wider window reports only the newly created dates.
    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/lessons/{}/generate-occurrences", lesson_id),
        Some(json!({ "weeks": 6 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let created = body["occurrences"].as_array().unwrap();
    assert_eq!(created.len(), 4);
    assert!(created.iter().all(|o| o["id"].is_i64() && o["date"].is_string()));

    let (status, _) = send(
        &app,
        Method::POST,
        "/lessons/999/generate-occurrences",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_occurrence_range_query() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;
    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1]).await;

    let (status, body) = send(
        &app,
        Method::GET,
        &format!(
            "/lessons/{}/occurrences?from=2024-01-08&to=2024-01-15",
            lesson_id
        ),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let occurrences = body["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[0]["date"], "2024-01-08");
    assert_eq!(occurrences[1]["date"], "2024-01-15");

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences?from=notadate", lesson_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_cancel_and_hold_endpoints() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;
    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1]).await;

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences", lesson_id),
        None,
    )
    .await;
    let first_id = body["occurrences"][0]["id"].as_i64().unwrap();
    let second_id = body["occurrences"][1]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/occurrences/{}/cancel", first_id),
        Some(json!({ "reason": "teacher is sick" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["message"].is_string());

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/occurrences/{}/hold", second_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences", lesson_id),
        None,
    )
    .await;
    let occurrences = body["occurrences"].as_array().unwrap();
    assert_eq!(occurrences[0]["status"], "cancelled");
    assert_eq!(occurrences[1]["status"], "held");

    let (status, _) = send(&app, Method::PUT, "/occurrences/999/cancel", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reschedule_endpoint() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;

    let start = Utc::now().date_naive();
    let weekday = start.weekday().num_days_from_sunday() as i64;
    let lesson_id =
        seed_lesson(&app, teacher_id, "morning", &start.to_string(), &[weekday]).await;

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences", lesson_id),
        None,
    )
    .await;
    let source_id = body["occurrences"][0]["id"].as_i64().unwrap();

    let new_date = (start + Duration::days(10)).to_string();
    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/occurrences/{}/reschedule", source_id),
        Some(json!({ "newDate": new_date, "reason": "travel" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let replacement_id = body["newOccurrenceId"].as_i64().unwrap();
    assert_ne!(replacement_id, source_id);

    let (_, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/occurrences", lesson_id),
        None,
    )
    .await;
    let occurrences = body["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 5);
    let source = occurrences
        .iter()
        .find(|o| o["id"].as_i64() == Some(source_id))
        .unwrap();
    assert_eq!(source["status"], "rescheduled");
    assert_eq!(source["rescheduledTo"], new_date);
    assert_eq!(source["rescheduleReason"], "travel");

    // Past and missing dates are rejected before anything is written.
    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/occurrences/{}/reschedule", source_id),
        Some(json!({ "newDate": start.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/occurrences/{}/reschedule", source_id),
        Some(json!({ "reason": "no date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "newDate is required");

    let future = (start + Duration::days(3)).to_string();
    let (status, _) = send(
        &app,
        Method::PUT,
        "/occurrences/999/reschedule",
        Some(json!({ "newDate": future })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_weekly_agenda_endpoint() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;

    seed_lesson(&app, teacher_id, "evening", "2024-01-01", &[1]).await;
    seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[3]).await;

    let (status, body) = send(&app, Method::GET, "/agenda/weekly?from=2024-01-10", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["weekStart"], "2024-01-08");
    assert_eq!(body["weekEnd"], "2024-01-14");

    let occurrences = body["occurrences"].as_array().unwrap();
    assert_eq!(occurrences.len(), 2);
    assert_eq!(occurrences[0]["date"], "2024-01-08");
    assert_eq!(occurrences[0]["shift"], "evening");
    assert_eq!(occurrences[1]["date"], "2024-01-10");
    assert_eq!(occurrences[1]["shift"], "morning");
    assert_eq!(occurrences[0]["teacherName"], "Ana Souza");
}

#[tokio::test]
async fn test_teacher_crud_endpoints() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/teachers",
        Some(json!({
            "name": "Dup",
            "email": "ana@clave.example",
            "revenueSharePercentage": 50,
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(&app, Method::GET, "/teachers", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/teachers/{}", teacher_id),
        Some(json!({ "name": "Ana Castro" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Ana Castro");
    assert_eq!(body["email"], "ana@clave.example");

    let (status, _) = send(&app, Method::GET, "/teachers/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/teachers/{}", teacher_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/teachers/{}", teacher_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_enrollment_endpoints() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;
    let student_id = seed_student(&app).await;
    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1]).await;

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/lessons/{}/enroll", lesson_id),
        Some(json!({ "studentId": student_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/lessons/{}/enroll", lesson_id),
        Some(json!({ "studentId": student_id })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/lessons/{}/students", lesson_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let students = body.as_array().unwrap();
    assert_eq!(students.len(), 1);
    assert_eq!(students[0]["name"], "Bruno Lima");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/lessons/{}/enroll/{}", lesson_id, student_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/lessons/{}/enroll/{}", lesson_id, student_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_payment_endpoints() {
    let (app, _temp_dir) = setup_test_app().await;
    let teacher_id = seed_teacher(&app).await;
    let student_id = seed_student(&app).await;
    let lesson_id = seed_lesson(&app, teacher_id, "morning", "2024-01-01", &[1]).await;

    send(
        &app,
        Method::POST,
        &format!("/lessons/{}/enroll", lesson_id),
        Some(json!({ "studentId": student_id })),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/payments",
        Some(json!({
            "studentId": student_id,
            "amount": 200.0,
            "dueDate": "2024-02-01",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let payment_id = body["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/payments/{}/process", payment_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "paid");
    assert_eq!(body["revenueShareAmount"], 120.0);

    let (status, body) = send(&app, Method::GET, "/payments?status=paid", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, _) = send(&app, Method::GET, "/payments?status=bogus", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, Method::GET, "/dashboard/summary", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["teachers"], 1);
    assert_eq!(body["students"], 1);
    assert_eq!(body["lessons"], 1);
    assert_eq!(body["pendingPayments"], 0);
}
