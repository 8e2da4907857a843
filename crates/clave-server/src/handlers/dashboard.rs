use axum::extract::State;
use axum::Json;
use clave_core::models::DashboardSummary;
use clave_core::repository::DashboardRepository;

use crate::error::ApiError;
use crate::handlers::AppState;

pub async fn summary(State(state): State<AppState>) -> Result<Json<DashboardSummary>, ApiError> {
    let summary = state.repo.dashboard_summary().await?;
    Ok(Json(summary))
}
