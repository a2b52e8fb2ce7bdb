use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::TrialResultStorage;
use medtrial_db::trial_results::TrialResultInput;
use serde::Deserialize;

use crate::state::AppState;

use super::{not_found_or_server_error, server_error};

/// Results joined with patient and trial display names.
pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let results = TrialResultStorage::new(&state.pool)
        .detailed()
        .await
        .map_err(|e| server_error("listing trial results failed", e))?;
    Ok(Json(results))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<TrialResultInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = TrialResultStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating trial result failed", e))?;
    Ok((StatusCode::CREATED, Json(result)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<TrialResultInput>,
) -> Result<impl IntoResponse, ApiError> {
    let result = TrialResultStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error(
                "updating trial result failed",
                "Rezultatul nu a fost găsit.",
                e,
            )
        })?;
    Ok(Json(result))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    TrialResultStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error(
                "deleting trial result failed",
                "Rezultatul nu a fost găsit.",
                e,
            )
        })?;
    Ok(Json(Message::new("Rezultatul a fost șters cu succes.")))
}

#[derive(Debug, Deserialize)]
pub struct AdverseReactionQuery {
    #[serde(default)]
    pub search: Option<String>,
}

/// Results whose adverse-reaction text contains the search fragment.
/// An empty match set is reported as a 404.
pub async fn filter_by_adverse_reaction(
    State(state): State<AppState>,
    Query(params): Query<AdverseReactionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let search = params
        .search
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| ApiError::bad_request("Textul de căutare este obligatoriu."))?;

    let results = TrialResultStorage::new(&state.pool)
        .filter_by_adverse_reaction(search)
        .await
        .map_err(|e| server_error("filtering results by adverse reaction failed", e))?;

    if results.is_empty() {
        return Err(ApiError::not_found(
            "Nu există rezultate care conțin reacțiile adverse specificate.",
        ));
    }
    Ok(Json(results))
}

/// Per-trial result counts and adverse-reaction counts.
pub async fn statistics(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = TrialResultStorage::new(&state.pool)
        .statistics()
        .await
        .map_err(|e| server_error("computing trial statistics failed", e))?;
    Ok(Json(stats))
}
