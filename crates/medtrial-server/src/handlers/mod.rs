//! HTTP handlers, one module per entity.
//!
//! Handlers validate, call into `medtrial_db` storage, and map storage
//! errors to API responses. Database error details are logged here and
//! never echoed to clients.

use axum::Json;
use medtrial_api::{ApiError, Message};
use medtrial_db::StorageError;

pub mod assignments;
pub mod clinics;
pub mod dashboard;
pub mod doctors;
pub mod drugs;
pub mod manufacturers;
pub mod medical_history;
pub mod patients;
pub mod trial_results;
pub mod trials;

pub async fn root() -> Json<Message> {
    Json(Message::new("medtrial server"))
}

pub async fn healthz() -> Json<Message> {
    Json(Message::new("ok"))
}

/// Maps a storage failure to a generic 500.
pub(crate) fn server_error(context: &str, err: StorageError) -> ApiError {
    tracing::error!(error = %err, "{context}");
    ApiError::internal("Eroare la server")
}

/// Maps a storage failure to a 404 with the given message when the row
/// was missing, otherwise to a generic 500.
pub(crate) fn not_found_or_server_error(
    context: &str,
    not_found_message: &str,
    err: StorageError,
) -> ApiError {
    if err.is_not_found() {
        ApiError::not_found(not_found_message)
    } else {
        server_error(context, err)
    }
}
