use axum::extract::{Path, Query, State};
use axum::Json;
use clave_core::models::OccurrenceQueryResult;
use clave_core::repository::OccurrenceRepository;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::handlers::{parse_date, AppState};

#[derive(Debug, Deserialize)]
pub struct GenerateOccurrencesRequest {
    pub weeks: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct OccurrenceRangeQuery {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CancelOccurrenceRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleOccurrenceRequest {
    pub new_date: Option<String>,
    pub reason: Option<String>,
}

pub async fn generate_occurrences(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<GenerateOccurrencesRequest>>,
) -> Result<Json<Value>, ApiError> {
    let weeks = payload.and_then(|Json(p)| p.weeks);
    let created = state.repo.generate_occurrences(id, weeks).await?;

    let occurrences: Vec<Value> = created
        .iter()
        .map(|o| json!({ "id": o.id, "date": o.date }))
        .collect();
    Ok(Json(json!({
        "message": format!("{} occurrences generated", occurrences.len()),
        "occurrences": occurrences,
    })))
}

pub async fn list_occurrences(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<OccurrenceRangeQuery>,
) -> Result<Json<Value>, ApiError> {
    let from = match query.from {
        Some(raw) => Some(parse_date(&raw, "from")?),
        None => None,
    };
    let to = match query.to {
        Some(raw) => Some(parse_date(&raw, "to")?),
        None => None,
    };

    let occurrences: Vec<OccurrenceQueryResult> =
        state.repo.find_occurrences(id, from, to).await?;
    Ok(Json(json!({ "occurrences": occurrences })))
}

pub async fn cancel_occurrence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Option<Json<CancelOccurrenceRequest>>,
) -> Result<Json<Value>, ApiError> {
    let reason = payload.and_then(|Json(p)| p.reason);
    state.repo.cancel_occurrence(id, reason).await?;
    Ok(Json(json!({ "message": "Occurrence cancelled successfully" })))
}

pub async fn hold_occurrence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<Value>, ApiError> {
    state.repo.hold_occurrence(id).await?;
    Ok(Json(json!({ "message": "Occurrence marked as held" })))
}

pub async fn reschedule_occurrence(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RescheduleOccurrenceRequest>,
) -> Result<Json<Value>, ApiError> {
    let raw = payload
        .new_date
        .ok_or_else(|| ApiError::BadRequest("newDate is required".to_string()))?;
    let new_date = parse_date(&raw, "newDate")?;

    let result = state
        .repo
        .reschedule_occurrence(id, new_date, payload.reason)
        .await?;

    Ok(Json(json!({
        "message": "Occurrence rescheduled successfully",
        "newOccurrenceId": result.replacement.id,
    })))
}
