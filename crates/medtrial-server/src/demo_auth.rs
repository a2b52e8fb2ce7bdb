//! Demo login against the single configured admin account.
//!
//! There is no session or token state; the frontend only needs the
//! `{message, isAdmin}` confirmation. Credentials come from
//! [`AuthSettings`](crate::config::AuthSettings).

use axum::{Json, extract::State, response::IntoResponse};
use medtrial_api::{ApiError, LoginResponse, Message};
use serde::Deserialize;

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email_ok = body.email.as_deref() == Some(state.auth.admin_email.as_str());
    let password_ok = body.password.as_deref() == Some(state.auth.admin_password.as_str());

    if email_ok && password_ok {
        tracing::info!(email = %state.auth.admin_email, "admin login");
        Ok(Json(LoginResponse::admin()))
    } else {
        tracing::warn!("rejected login attempt");
        Err(ApiError::unauthorized("Invalid email or password"))
    }
}

pub async fn logout() -> Json<Message> {
    Json(Message::new("User logged out successfully"))
}
