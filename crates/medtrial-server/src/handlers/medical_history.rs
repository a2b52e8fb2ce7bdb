use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::MedicalHistoryStorage;
use medtrial_db::medical_history::MedicalHistoryInput;
use serde::Deserialize;

use crate::state::AppState;

use super::{not_found_or_server_error, server_error};

/// History entries joined with the patient display name.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let entries = MedicalHistoryStorage::new(&state.pool)
        .detailed()
        .await
        .map_err(|e| server_error("listing medical history failed", e))?;
    Ok(Json(entries))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<MedicalHistoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = MedicalHistoryStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating medical history entry failed", e))?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<MedicalHistoryInput>,
) -> Result<impl IntoResponse, ApiError> {
    let entry = MedicalHistoryStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error(
                "updating medical history entry failed",
                "Intrarea nu a fost găsită.",
                e,
            )
        })?;
    Ok(Json(entry))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    MedicalHistoryStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error(
                "deleting medical history entry failed",
                "Intrarea nu a fost găsită.",
                e,
            )
        })?;
    Ok(Json(Message::new("Intrarea a fost ștearsă cu succes.")))
}

#[derive(Debug, Deserialize)]
pub struct BloodTypeQuery {
    #[serde(rename = "GrupaSanguina", default)]
    pub grupa_sanguina: Option<String>,
}

/// History entries matching the exact blood type. An empty match set is
/// still a 200 with an empty array.
pub async fn filter(
    State(state): State<AppState>,
    Query(params): Query<BloodTypeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let grupa = params
        .grupa_sanguina
        .as_deref()
        .filter(|g| !g.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parametrul 'GrupaSanguina' este obligatoriu."))?;

    let entries = MedicalHistoryStorage::new(&state.pool)
        .filter_by_blood_type(grupa)
        .await
        .map_err(|e| server_error("filtering medical history by blood type failed", e))?;
    Ok(Json(entries))
}
