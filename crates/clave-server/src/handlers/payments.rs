use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use clave_core::error::CoreError;
use clave_core::models::{NewPaymentData, Payment, PaymentFilter, PaymentStatus};
use clave_core::repository::PaymentRepository;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{parse_date, AppState};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddPaymentRequest {
    pub student_id: Option<i64>,
    pub amount: Option<f64>,
    pub due_date: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentListQuery {
    pub student_id: Option<i64>,
    pub status: Option<String>,
}

pub async fn add_payment(
    State(state): State<AppState>,
    Json(payload): Json<AddPaymentRequest>,
) -> Result<(StatusCode, Json<Payment>), ApiError> {
    let student_id = payload
        .student_id
        .ok_or_else(|| ApiError::BadRequest("studentId is required".to_string()))?;
    let amount = payload
        .amount
        .ok_or_else(|| ApiError::BadRequest("amount is required".to_string()))?;
    let due_raw = payload
        .due_date
        .ok_or_else(|| ApiError::BadRequest("dueDate is required".to_string()))?;
    let due_date = parse_date(&due_raw, "dueDate")?;

    let payment = state
        .repo
        .add_payment(NewPaymentData {
            student_id,
            amount,
            due_date,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(payment)))
}

pub async fn list_payments(
    State(state): State<AppState>,
    Query(query): Query<PaymentListQuery>,
) -> Result<Json<Vec<Payment>>, ApiError> {
    let status = match query.status {
        Some(raw) => Some(
            PaymentStatus::from_str(&raw)
                .map_err(|e| ApiError::BadRequest(e.to_string()))?,
        ),
        None => None,
    };

    let payments = state
        .repo
        .find_payments(PaymentFilter {
            student_id: query.student_id,
            status,
        })
        .await?;
    Ok(Json(payments))
}

pub async fn get_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state
        .repo
        .find_payment_by_id(id)
        .await?
        .ok_or_else(|| CoreError::NotFound(format!("Payment with id {} not found", id)))?;
    Ok(Json(payment))
}

pub async fn process_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state.repo.process_payment(id).await?;
    Ok(Json(payment))
}

pub async fn cancel_payment(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Payment>, ApiError> {
    let payment = state.repo.cancel_payment(id).await?;
    Ok(Json(payment))
}
