use axum::{
    extract::{Request, State},
    http::{HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use uuid::Uuid;

use crate::app::AppState;
use crate::database::models::User;
use crate::error::ApiError;
use crate::types::UserRole;

/// Authenticated caller, attached to every protected request.
///
/// Built from the stored user row rather than the token claims, so a role
/// change or deletion takes effect on the next request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub role: UserRole,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn require_admin(&self) -> Result<(), ApiError> {
        if self.is_admin() {
            Ok(())
        } else {
            Err(ApiError::forbidden("This action requires the admin role"))
        }
    }
}

impl From<User> for Session {
    fn from(user: User) -> Self {
        Self {
            user_id: user.id,
            email: user.email,
            name: user.name,
            role: user.role,
        }
    }
}

/// Verifies the bearer token, reloads its user and inserts a `Session`
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer(request.headers())?;
    let claims = state.sessions.verify(token)?;

    let user = state.store.find_user(claims.sub).await?.ok_or_else(|| {
        tracing::warn!("Session for unknown user {} rejected", claims.sub);
        ApiError::unauthorized("User no longer exists")
    })?;

    request.extensions_mut().insert(Session::from(user));
    Ok(next.run(request).await)
}

/// Lets viewers read; every other method needs an admin session.
/// Must run after `require_session`.
pub async fn require_admin_for_writes(request: Request, next: Next) -> Result<Response, ApiError> {
    if !matches!(*request.method(), Method::GET | Method::HEAD | Method::OPTIONS) {
        let session = request
            .extensions()
            .get::<Session>()
            .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
        if let Err(err) = session.require_admin() {
            tracing::warn!("{} {} denied for viewer {}", request.method(), request.uri().path(), session.email);
            return Err(err);
        }
    }
    Ok(next.run(request).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, ApiError> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let value = header
        .to_str()
        .map_err(|_| ApiError::unauthorized("Invalid Authorization header format"))?;

    match value.strip_prefix("Bearer ") {
        Some(token) if !token.trim().is_empty() => Ok(token.trim()),
        Some(_) => Err(ApiError::unauthorized("Empty JWT token")),
        None => Err(ApiError::unauthorized("Authorization header must use Bearer token format")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_is_required() {
        let mut headers = HeaderMap::new();
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Basic abc"));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer   "));
        assert!(extract_bearer(&headers).is_err());

        headers.insert("authorization", HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(extract_bearer(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn viewers_are_not_admins() {
        let session = Session {
            user_id: Uuid::nil(),
            email: "viewer@example.com".to_string(),
            name: "Viewer".to_string(),
            role: UserRole::Viewer,
        };
        assert!(session.require_admin().is_err());
    }
}
