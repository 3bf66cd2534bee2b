use axum::{extract::State, Extension};

use crate::app::AppState;
use crate::database::models::User;
use crate::middleware::{ApiResponse, ApiResult, Session};

/// GET /api/users - all accounts, newest first (admin only)
pub async fn list(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Vec<User>> {
    session.require_admin()?;
    Ok(ApiResponse::success(state.store.list_users().await?))
}
