use axum::{Json, extract::State, response::IntoResponse};
use medtrial_api::ApiError;
use medtrial_db::DrugStorage;

use crate::state::AppState;

use super::server_error;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let drugs = DrugStorage::new(&state.pool)
        .list()
        .await
        .map_err(|e| server_error("listing drugs failed", e))?;
    Ok(Json(drugs))
}

/// Drugs priced above the table-wide average price.
pub async fn priced_above_average(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let drugs = DrugStorage::new(&state.pool)
        .priced_above_average()
        .await
        .map_err(|e| server_error("listing above-average drugs failed", e))?;
    Ok(Json(drugs))
}
