//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use flame_core::domain::AuthSession;
use std::sync::Arc;
use tracing::debug;

use crate::web::state::AppState;

/// Extracts the session token from a bearer header, or else the `session` cookie.
/// An explicit header wins over a cookie the browser may still be holding.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let from_bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string);
    from_bearer.or_else(|| {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|cookies| {
                cookies
                    .split(';')
                    .find_map(|c| c.trim().strip_prefix("session="))
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
            })
    })
}

/// Resolves the caller's session if one is presented and still valid.
pub async fn current_session(state: &AppState, headers: &HeaderMap) -> Option<AuthSession> {
    let token = session_token(headers)?;
    match state.reading.validate_session(&token).await {
        Ok(session) => Some(session),
        Err(e) => {
            debug!("Rejected session token: {}", e);
            None
        }
    }
}

/// Middleware that validates the session and hands it to the handler.
///
/// If valid, inserts the `AuthSession` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let session = current_session(&state, req.headers())
        .await
        .ok_or(StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(session);
    Ok(next.run(req).await)
}
