//! services/api/src/web/auth.rs
//!
//! Sign-in and sign-out endpoints. Signing in opens a server-side session
//! whose token is returned both as a cookie and in the body.

use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::middleware::session_token;
use crate::web::rest::port_failure;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignInRequest {
    #[serde(default)]
    pub username: String,
    pub email: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub session_id: String,
    pub expires_at: DateTime<Utc>,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signin - Sign in, creating the reader on first visit
#[utoipa::path(
    post,
    path = "/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = AuthResponse),
        (status = 400, description = "Invalid email address")
    )
)]
pub async fn signin_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignInRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (user, session) = state
        .reading
        .sign_in(&req.username, &req.email)
        .await
        .map_err(port_failure)?;

    let max_age = (session.expires_at - Utc::now()).num_seconds().max(0);
    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        session.id, max_age
    );

    let response = AuthResponse {
        user_id: user.id,
        username: user.username,
        email: user.email,
        session_id: session.id,
        expires_at: session.expires_at,
    };

    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)], Json(response)))
}

/// POST /auth/signout - Invalidate the current session
#[utoipa::path(
    post,
    path = "/auth/signout",
    responses(
        (status = 200, description = "Signed out"),
        (status = 401, description = "No active session")
    )
)]
pub async fn signout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let token = session_token(&headers)
        .ok_or((StatusCode::UNAUTHORIZED, "No session found".to_string()))?;

    state.reading.sign_out(&token).await.map_err(port_failure)?;
    info!("Reader signed out");

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie.to_string())]))
}
