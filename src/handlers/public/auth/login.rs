// handlers/public/auth/login.rs - POST /auth/login handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::api::{required, ApiJson};
use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: User,
    /// Seconds until the token expires
    pub expires_in: i64,
}

/// POST /auth/login - verify credentials and issue a session token
///
/// A wrong password and an unknown email produce the same 401 so the
/// response does not reveal which accounts exist.
pub async fn login(State(state): State<AppState>, ApiJson(body): ApiJson<LoginRequest>) -> ApiResult<LoginResponse> {
    let email = required(body.email.filter(|e| !e.trim().is_empty()), "email")?;
    let password = required(body.password.filter(|p| !p.is_empty()), "password")?;
    let email = email.trim();

    let user = match state.store.find_user_by_email(email).await? {
        Some(user) if state.credentials.verify(&password, &user.password) => user,
        _ => {
            tracing::warn!("Rejected login for '{}'", email);
            return Err(ApiError::unauthorized("Invalid email or password"));
        }
    };

    let token = state.sessions.issue(&user)?;
    tracing::info!("User {} ({}) logged in", user.email, user.role);

    Ok(ApiResponse::success(LoginResponse {
        token,
        user,
        expires_in: state.sessions.expires_in(),
    }))
}
