use axum::{
    Json,
    extract::{Query, State},
    response::IntoResponse,
};
use medtrial_api::ApiError;
use medtrial_db::{ManufacturerStorage, SortDirection};
use serde::Deserialize;

use crate::state::AppState;

use super::server_error;

#[derive(Debug, Deserialize)]
pub struct ManufacturerQuery {
    #[serde(default)]
    pub nume: Option<String>,
    #[serde(default)]
    pub tara: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

/// Optional filters: name fragment, exact country, and an allow-listed
/// sort direction. An unrecognized sort value is a 400, not a statement
/// fragment.
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<ManufacturerQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort = match params.sort.as_deref().filter(|s| !s.is_empty()) {
        Some(raw) => Some(raw.parse::<SortDirection>().map_err(|_| {
            ApiError::bad_request("Parametrul 'sort' trebuie să fie 'asc' sau 'desc'.")
        })?),
        None => None,
    };

    let manufacturers = ManufacturerStorage::new(&state.pool)
        .search(
            params.nume.as_deref().filter(|n| !n.is_empty()),
            params.tara.as_deref().filter(|t| !t.is_empty()),
            sort,
        )
        .await
        .map_err(|e| server_error("searching manufacturers failed", e))?;
    Ok(Json(manufacturers))
}

/// Distinct manufacturer countries as a plain string array.
pub async fn countries(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let countries = ManufacturerStorage::new(&state.pool)
        .countries()
        .await
        .map_err(|e| server_error("listing manufacturer countries failed", e))?;
    Ok(Json(countries))
}

pub async fn with_drug_flag(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let manufacturers = ManufacturerStorage::new(&state.pool)
        .with_drug_flag()
        .await
        .map_err(|e| server_error("listing manufacturers with drug flag failed", e))?;
    Ok(Json(manufacturers))
}
