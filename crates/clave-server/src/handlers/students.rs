use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use clave_core::error::CoreError;
use clave_core::models::{NewStudentData, Student, UpdateStudentData};
use clave_core::repository::StudentRepository;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{double_option, parse_date, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub birth_date: Option<String>,
    pub instrument: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub birth_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub instrument: Option<Option<String>>,
}

pub async fn add_student(
    State(state): State<AppState>,
    Json(payload): Json<AddStudentRequest>,
) -> Result<(StatusCode, Json<Student>), ApiError> {
    let name = payload
        .name
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let email = payload
        .email
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;
    let birth_date = match payload.birth_date {
        Some(raw) => Some(parse_date(&raw, "birthDate")?),
        None => None,
    };

    let student = state
        .repo
        .add_student(NewStudentData {
            name,
            email,
            phone: payload.phone,
            birth_date,
            instrument: payload.instrument,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(student)))
}

pub async fn list_students(
    State(state): State<AppState>,
) -> Result<Json<Vec<Student>>, ApiError> {
    let students = state.repo.find_students().await?;
    Ok(Json(students))
}

pub async fn get_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Student>, ApiError> {
    let student = state
        .repo
        .find_student_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Student with id {} not found", id)))?;
    Ok(Json(student))
}

pub async fn update_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateStudentRequest>,
) -> Result<Json<Student>, ApiError> {
    let birth_date = match payload.birth_date {
        Some(Some(raw)) => Some(Some(parse_date(&raw, "birthDate")?)),
        Some(None) => Some(None),
        None => None,
    };

    let student = state
        .repo
        .update_student(
            id,
            UpdateStudentData {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                birth_date,
                instrument: payload.instrument,
            },
        )
        .await?;
    Ok(Json(student))
}

pub async fn delete_student(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.repo.delete_student(id).await?;
    Ok(Json(json!({ "message": "Student deleted successfully" })))
}
