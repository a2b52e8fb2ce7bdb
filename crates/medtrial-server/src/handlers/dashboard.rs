use axum::{Json, extract::State, response::IntoResponse};
use medtrial_api::ApiError;
use medtrial_db::DashboardStorage;

use crate::state::AppState;

use super::server_error;

/// Entity totals for the dashboard, as one object.
pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = DashboardStorage::new(&state.pool)
        .stats()
        .await
        .map_err(|e| server_error("computing dashboard stats failed", e))?;
    Ok(Json(stats))
}

/// Five doctors with the most distinct roles.
pub async fn top_doctors(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doctors = DashboardStorage::new(&state.pool)
        .top_doctors()
        .await
        .map_err(|e| server_error("listing top doctors failed", e))?;
    Ok(Json(doctors))
}
