use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::ClinicStorage;
use medtrial_db::clinics::ClinicInput;

use crate::state::AppState;
use crate::validation::validate_clinic;

use super::{not_found_or_server_error, server_error};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let clinics = ClinicStorage::new(&state.pool)
        .list()
        .await
        .map_err(|e| server_error("listing clinics failed", e))?;
    Ok(Json(clinics))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<ClinicInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_clinic(&input)?;
    let clinic = ClinicStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating clinic failed", e))?;
    Ok((StatusCode::CREATED, Json(clinic)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<ClinicInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_clinic(&input)?;
    let clinic = ClinicStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error("updating clinic failed", "Cabinetul nu a fost găsit", e)
        })?;
    Ok(Json(clinic))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    ClinicStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error("deleting clinic failed", "Cabinetul nu a fost găsit", e)
        })?;
    Ok(Json(Message::new("Cabinet șters cu succes")))
}

/// Clinics whose capacity is above the table-wide average.
pub async fn above_average(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let clinics = ClinicStorage::new(&state.pool)
        .above_average_capacity()
        .await
        .map_err(|e| server_error("listing above-average clinics failed", e))?;
    Ok(Json(clinics))
}
