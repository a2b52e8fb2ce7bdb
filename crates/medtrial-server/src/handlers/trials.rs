use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::TrialStorage;
use medtrial_db::trials::TrialInput;
use serde::Deserialize;

use crate::state::AppState;

use super::{not_found_or_server_error, server_error};

/// Trials joined with drug and responsible-doctor display names.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let trials = TrialStorage::new(&state.pool)
        .detailed()
        .await
        .map_err(|e| server_error("listing trials failed", e))?;
    Ok(Json(trials))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TrialInput>,
) -> Result<impl IntoResponse, ApiError> {
    let trial = TrialStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating trial failed", e))?;
    Ok((StatusCode::CREATED, Json(trial)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<TrialInput>,
) -> Result<impl IntoResponse, ApiError> {
    let trial = TrialStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error("updating trial failed", "Testarea nu a fost găsită.", e)
        })?;
    Ok(Json(trial))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    TrialStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error("deleting trial failed", "Testarea nu a fost găsită.", e)
        })?;
    Ok(Json(Message::new("Testarea a fost ștearsă cu succes.")))
}

/// Trials without an end date, most recently started first.
pub async fn in_progress(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let trials = TrialStorage::new(&state.pool)
        .in_progress()
        .await
        .map_err(|e| server_error("listing in-progress trials failed", e))?;
    Ok(Json(trials))
}

/// Per-trial distinct patient counts, highest first.
pub async fn patient_counts(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let counts = TrialStorage::new(&state.pool)
        .patient_counts()
        .await
        .map_err(|e| server_error("counting trial patients failed", e))?;
    Ok(Json(counts))
}

#[derive(Debug, Deserialize)]
pub struct StartedBeforeQuery {
    #[serde(default)]
    pub data: Option<String>,
}

/// Trials that started strictly before the given date.
pub async fn started_before(
    State(state): State<AppState>,
    Query(params): Query<StartedBeforeQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let date = params
        .data
        .as_deref()
        .filter(|d| !d.is_empty())
        .ok_or_else(|| ApiError::bad_request("Parametrul 'data' este obligatoriu."))?;

    let trials = TrialStorage::new(&state.pool)
        .started_before(date)
        .await
        .map_err(|e| server_error("filtering trials by start date failed", e))?;
    Ok(Json(trials))
}
