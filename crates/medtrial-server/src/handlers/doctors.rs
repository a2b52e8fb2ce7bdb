use axum::{Json, extract::State, response::IntoResponse};
use medtrial_api::ApiError;
use medtrial_db::DoctorStorage;

use crate::state::AppState;

use super::server_error;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doctors = DoctorStorage::new(&state.pool)
        .list()
        .await
        .map_err(|e| server_error("listing doctors failed", e))?;
    Ok(Json(doctors))
}

/// Share of doctors with more than ten years of experience, as a single
/// `{ProcentMediciPeste10Ani}` object.
pub async fn experience_percent(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let percent = DoctorStorage::new(&state.pool)
        .experience_over_ten_percent()
        .await
        .map_err(|e| server_error("computing doctor experience percent failed", e))?;
    Ok(Json(percent))
}
