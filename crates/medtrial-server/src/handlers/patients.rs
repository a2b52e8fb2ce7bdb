use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::PatientStorage;
use medtrial_db::patients::PatientInput;
use serde::Deserialize;

use crate::state::AppState;
use crate::validation::validate_patient;

use super::{not_found_or_server_error, server_error};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let patients = PatientStorage::new(&state.pool)
        .list()
        .await
        .map_err(|e| server_error("listing patients failed", e))?;
    Ok(Json(patients))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<PatientInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_patient(&input)?;
    let patient = PatientStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating patient failed", e))?;
    Ok((StatusCode::CREATED, Json(patient)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<PatientInput>,
) -> Result<impl IntoResponse, ApiError> {
    validate_patient(&input)?;
    let patient = PatientStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error("updating patient failed", "Pacientul nu a fost găsit.", e)
        })?;
    Ok(Json(patient))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    PatientStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error("deleting patient failed", "Pacientul nu a fost găsit.", e)
        })?;
    Ok(Json(Message::new("Pacientul a fost șters cu succes.")))
}

#[derive(Debug, Deserialize)]
pub struct AddressQuery {
    #[serde(default)]
    pub address: Option<String>,
}

pub async fn filter_by_address(
    State(state): State<AppState>,
    Query(params): Query<AddressQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let address = params
        .address
        .as_deref()
        .filter(|a| !a.is_empty())
        .ok_or_else(|| ApiError::bad_request("Adresa este necesară pentru filtrare."))?;

    let patients = PatientStorage::new(&state.pool)
        .filter_by_address(address)
        .await
        .map_err(|e| server_error("filtering patients by address failed", e))?;

    if patients.is_empty() {
        return Err(ApiError::not_found(
            "Nu s-au găsit pacienți pentru adresa specificată.",
        ));
    }
    Ok(Json(patients))
}

pub async fn filter_by_sex(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = PatientStorage::new(&state.pool)
        .count_by_sex_with_results()
        .await
        .map_err(|e| server_error("counting patients by sex failed", e))?;
    Ok(Json(counts))
}
