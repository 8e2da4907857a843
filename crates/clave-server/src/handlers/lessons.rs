use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use clave_core::error::CoreError;
use clave_core::models::{LessonQueryResult, NewLessonData, Student};
use clave_core::repository::LessonRepository;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{parse_date, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigureLessonRequest {
    pub instrument: Option<String>,
    pub shift: Option<String>,
    pub teacher_id: Option<i64>,
    pub start_date: Option<String>,
    pub weekdays: Option<Vec<i64>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrollStudentRequest {
    pub student_id: Option<i64>,
}

pub async fn configure_lesson(
    State(state): State<AppState>,
    Json(payload): Json<ConfigureLessonRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let instrument = payload
        .instrument
        .ok_or_else(|| ApiError::BadRequest("instrument is required".to_string()))?;
    let shift = payload
        .shift
        .ok_or_else(|| ApiError::BadRequest("shift is required".to_string()))?;
    let teacher_id = payload
        .teacher_id
        .ok_or_else(|| ApiError::BadRequest("teacherId is required".to_string()))?;
    let start_raw = payload
        .start_date
        .ok_or_else(|| ApiError::BadRequest("startDate is required".to_string()))?;
    let start_date = parse_date(&start_raw, "startDate")?;
    let weekdays = payload.weekdays.unwrap_or_default();

    let (lesson, occurrences) = state
        .repo
        .configure_lesson(NewLessonData {
            instrument,
            shift,
            teacher_id,
            start_date,
            weekdays,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "id": lesson.id,
            "message": format!(
                "Lesson configured with {} occurrences scheduled",
                occurrences.len()
            ),
        })),
    ))
}

pub async fn list_lessons(State(state): State<AppState>) -> Result<Json<Value>, ApiError> {
    let lessons = state.repo.find_lessons().await?;
    let body: Vec<Value> = lessons.iter().map(lesson_to_json).collect();
    Ok(Json(Value::Array(body)))
}

pub async fn get_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    let lesson = state
        .repo
        .find_lesson_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Lesson with id {} not found", id)))?;
    Ok(Json(lesson_to_json(&lesson)))
}

pub async fn delete_lesson(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.repo.delete_lesson(id).await?;
    Ok(Json(json!({ "message": "Lesson deleted successfully" })))
}

pub async fn enroll_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<EnrollStudentRequest>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let student_id = payload
        .student_id
        .ok_or_else(|| ApiError::BadRequest("studentId is required".to_string()))?;

    state.repo.enroll_student(id, student_id).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Student enrolled successfully" })),
    ))
}

pub async fn withdraw_student(
    State(state): State<AppState>,
    Path((id, student_id)): Path<(i64, i64)>,
) -> Result<Json<Value>, ApiError> {
    state.repo.withdraw_student(id, student_id).await?;
    Ok(Json(json!({ "message": "Student withdrawn successfully" })))
}

pub async fn list_lesson_students(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.repo.find_lesson_students(id).await?;
    Ok(Json(students))
}

/// Lessons carry their weekday pattern as a comma-joined aggregate in SQL;
/// the API exposes it as a proper array.
fn lesson_to_json(lesson: &LessonQueryResult) -> Value {
    json!({
        "id": lesson.id,
        "instrument": lesson.instrument,
        "shift": lesson.shift,
        "teacherId": lesson.teacher_id,
        "teacherName": lesson.teacher_name,
        "startDate": lesson.start_date,
        "createdAt": lesson.created_at,
        "weekdays": lesson.weekday_list(),
    })
}
