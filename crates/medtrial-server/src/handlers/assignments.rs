//! Doctor-to-clinic assignment handlers, including the reporting views
//! over the assignment history (joined listing, longest activity spans,
//! multi-role doctors, currently active assignments).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use medtrial_api::{ApiError, Message};
use medtrial_db::AssignmentStorage;
use medtrial_db::assignments::AssignmentInput;

use crate::state::AppState;

use super::{not_found_or_server_error, server_error};

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let assignments = AssignmentStorage::new(&state.pool)
        .list()
        .await
        .map_err(|e| server_error("listing assignments failed", e))?;
    Ok(Json(assignments))
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<AssignmentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = AssignmentStorage::new(&state.pool)
        .create(&input)
        .await
        .map_err(|e| server_error("creating assignment failed", e))?;
    Ok((StatusCode::CREATED, Json(assignment)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(input): Json<AssignmentInput>,
) -> Result<impl IntoResponse, ApiError> {
    let assignment = AssignmentStorage::new(&state.pool)
        .update(id, &input)
        .await
        .map_err(|e| {
            not_found_or_server_error("updating assignment failed", "Intrarea nu a fost găsită", e)
        })?;
    Ok(Json(assignment))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    AssignmentStorage::new(&state.pool)
        .delete(id)
        .await
        .map_err(|e| {
            not_found_or_server_error("deleting assignment failed", "Intrarea nu a fost găsită", e)
        })?;
    Ok(Json(Message::new("Șters cu succes")))
}

/// Assignments joined with doctor and clinic display names.
pub async fn detailed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let assignments = AssignmentStorage::new(&state.pool)
        .detailed()
        .await
        .map_err(|e| server_error("listing detailed assignments failed", e))?;
    Ok(Json(assignments))
}

/// Assignments ordered by activity span in days, longest first.
pub async fn longest_activity(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let spans = AssignmentStorage::new(&state.pool)
        .longest_activity()
        .await
        .map_err(|e| server_error("computing activity spans failed", e))?;
    Ok(Json(spans))
}

/// Doctors that have held more than one distinct role across clinics.
pub async fn multiple_roles(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let doctors = AssignmentStorage::new(&state.pool)
        .multiple_roles()
        .await
        .map_err(|e| server_error("listing multi-role doctors failed", e))?;
    Ok(Json(doctors))
}

/// Assignments with no end date, i.e. doctors currently active.
pub async fn active(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let assignments = AssignmentStorage::new(&state.pool)
        .active()
        .await
        .map_err(|e| server_error("listing active assignments failed", e))?;
    Ok(Json(assignments))
}
