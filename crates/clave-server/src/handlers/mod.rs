use std::sync::Arc;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use chrono::NaiveDate;
use clave_core::repository::SqliteRepository;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;

pub mod agenda;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod lessons;
pub mod occurrences;
pub mod payments;
pub mod students;
pub mod teachers;

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<SqliteRepository>,
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/auth/login", post(auth::login))
        .route(
            "/teachers",
            post(teachers::add_teacher).get(teachers::list_teachers),
        )
        .route(
            "/teachers/:id",
            get(teachers::get_teacher)
                .put(teachers::update_teacher)
                .delete(teachers::delete_teacher),
        )
        .route(
            "/students",
            post(students::add_student).get(students::list_students),
        )
        .route(
            "/students/:id",
            get(students::get_student)
                .put(students::update_student)
                .delete(students::delete_student),
        )
        .route("/lessons", get(lessons::list_lessons))
        .route("/lessons/configure", post(lessons::configure_lesson))
        .route(
            "/lessons/:id",
            get(lessons::get_lesson).delete(lessons::delete_lesson),
        )
        .route(
            "/lessons/:id/generate-occurrences",
            post(occurrences::generate_occurrences),
        )
        .route(
            "/lessons/:id/occurrences",
            get(occurrences::list_occurrences),
        )
        .route("/lessons/:id/enroll", post(lessons::enroll_student))
        .route(
            "/lessons/:id/enroll/:student_id",
            delete(lessons::withdraw_student),
        )
        .route(
            "/lessons/:id/students",
            get(lessons::list_lesson_students),
        )
        .route(
            "/occurrences/:id/cancel",
            put(occurrences::cancel_occurrence),
        )
        .route("/occurrences/:id/hold", put(occurrences::hold_occurrence))
        .route(
            "/occurrences/:id/reschedule",
            put(occurrences::reschedule_occurrence),
        )
        .route("/agenda/weekly", get(agenda::weekly_agenda))
        .route(
            "/payments",
            post(payments::add_payment).get(payments::list_payments),
        )
        .route("/payments/:id", get(payments::get_payment))
        .route("/payments/:id/process", put(payments::process_payment))
        .route("/payments/:id/cancel", put(payments::cancel_payment))
        .route("/dashboard/summary", get(dashboard::summary))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Parses a `YYYY-MM-DD` date received from a client.
pub(crate) fn parse_date(value: &str, field: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(format!("{} is not a valid date (expected YYYY-MM-DD)", field))
    })
}

/// Deserializer that keeps the absent/null distinction for update payloads:
/// an absent field leaves the stored value alone, an explicit `null` clears
/// it.
pub(crate) fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    serde::Deserialize::deserialize(deserializer).map(Some)
}
