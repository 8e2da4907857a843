use axum::extract::{Query, State};
use axum::Json;
use clave_core::models::WeeklyAgenda;
use clave_core::repository::OccurrenceRepository;
use serde::Deserialize;

use crate::error::ApiError;
use crate::handlers::{parse_date, AppState};

#[derive(Debug, Deserialize)]
pub struct AgendaQuery {
    /// Any date inside the wanted week; defaults to today.
    pub from: Option<String>,
}

pub async fn weekly_agenda(
    State(state): State<AppState>,
    Query(query): Query<AgendaQuery>,
) -> Result<Json<WeeklyAgenda>, ApiError> {
    let anchor = match query.from {
        Some(raw) => Some(parse_date(&raw, "from")?),
        None => None,
    };

    let agenda = state.repo.weekly_agenda(anchor).await?;
    Ok(Json(agenda))
}
