use axum::Extension;

use crate::middleware::{ApiResponse, Session};

/// GET /api/auth/whoami - the caller's session as reloaded from the store
pub async fn whoami(Extension(session): Extension<Session>) -> ApiResponse<Session> {
    ApiResponse::success(session)
}
