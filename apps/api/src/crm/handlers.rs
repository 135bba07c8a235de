use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::crm::{LeadStats, LeadUpdate, ListFilter, StoredLead};
use crate::errors::AppError;
use crate::qualification::models::Priority;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ListLeadsQuery {
    pub priority: Option<Priority>,
    pub limit: Option<usize>,
}

/// GET /leads
pub async fn handle_list_leads(
    State(state): State<AppState>,
    Query(params): Query<ListLeadsQuery>,
) -> Result<Json<Vec<StoredLead>>, AppError> {
    let filter = ListFilter::new(params.priority, params.limit);
    let leads = state.store.list_records(&filter).await?;
    Ok(Json(leads))
}

/// GET /leads/:id
pub async fn handle_get_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<StoredLead>, AppError> {
    state
        .store
        .get_record(&id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))
}

/// PATCH /leads/:id
///
/// Sets the follow-up status and/or assignee. Omitted fields are left as stored.
pub async fn handle_update_lead(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<LeadUpdate>,
) -> Result<Json<StoredLead>, AppError> {
    let update = update.normalized().map_err(AppError::UnprocessableEntity)?;

    state
        .store
        .update_record(&id, &update)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Lead {id} not found")))
}

/// GET /leads/stats
pub async fn handle_lead_stats(
    State(state): State<AppState>,
) -> Result<Json<LeadStats>, AppError> {
    Ok(Json(state.store.aggregate().await?))
}
