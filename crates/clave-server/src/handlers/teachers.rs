use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use clave_core::error::CoreError;
use clave_core::models::{NewTeacherData, Teacher, UpdateTeacherData};
use clave_core::repository::TeacherRepository;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{double_option, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTeacherRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub specialty: Option<String>,
    pub max_students_per_slot: Option<i64>,
    pub revenue_share_percentage: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTeacherRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub phone: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub specialty: Option<Option<String>>,
    pub max_students_per_slot: Option<i64>,
    pub revenue_share_percentage: Option<i64>,
}

pub async fn add_teacher(
    State(state): State<AppState>,
    Json(payload): Json<AddTeacherRequest>,
) -> Result<(StatusCode, Json<Teacher>), ApiError> {
    let name = payload
        .name
        .ok_or_else(|| ApiError::BadRequest("name is required".to_string()))?;
    let email = payload
        .email
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;
    let revenue_share_percentage = payload
        .revenue_share_percentage
        .ok_or_else(|| ApiError::BadRequest("revenueSharePercentage is required".to_string()))?;

    let teacher = state
        .repo
        .add_teacher(NewTeacherData {
            name,
            email,
            phone: payload.phone,
            specialty: payload.specialty,
            max_students_per_slot: payload.max_students_per_slot,
            revenue_share_percentage,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(teacher)))
}

pub async fn list_teachers(
    State(state): State<AppState>,
) -> Result<Json<Vec<Teacher>>, ApiError> {
    let teachers = state.repo.find_teachers().await?;
    Ok(Json(teachers))
}

pub async fn get_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Teacher>, ApiError> {
    let teacher = state
        .repo
        .find_teacher_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Teacher with id {} not found", id)))?;
    Ok(Json(teacher))
}

pub async fn update_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTeacherRequest>,
) -> Result<Json<Teacher>, ApiError> {
    let teacher = state
        .repo
        .update_teacher(
            id,
            UpdateTeacherData {
                name: payload.name,
                email: payload.email,
                phone: payload.phone,
                specialty: payload.specialty,
                max_students_per_slot: payload.max_students_per_slot,
                revenue_share_percentage: payload.revenue_share_percentage,
            },
        )
        .await?;
    Ok(Json(teacher))
}

pub async fn delete_teacher(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.repo.delete_teacher(id).await?;
    Ok(Json(json!({ "message": "Teacher deleted successfully" })))
}
