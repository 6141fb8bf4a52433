use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Extension, Json,
};
use tracing::{info, instrument};

use super::cookie::{cleared_session_cookie, session_cookie};
use super::types::{AuthSession, SignInRequest, SignUpRequest};
use crate::shared::{AppError, AppState};

/// HTTP handler for registering a user; the new user is signed in right away
///
/// POST /api/auth/sign-up
/// Rejected with 403 when the caller already holds a session
#[instrument(name = "sign_up", skip(state, headers, request))]
pub async fn sign_up(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SignUpRequest>,
) -> Result<Response, AppError> {
    state
        .auth_gate
        .require_no_auth(&headers)
        .await
        .into_result()?;

    let response = state.session_service.sign_up(request).await?;
    let cookie = session_cookie(&state.config, &response.token)?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, cookie)],
        Json(response),
    )
        .into_response())
}

/// HTTP handler for email/password sign-in
///
/// POST /api/auth/sign-in
/// Returns the JWT token and user, and sets the session cookie
#[instrument(name = "sign_in", skip(state, request))]
pub async fn sign_in(
    State(state): State<AppState>,
    Json(request): Json<SignInRequest>,
) -> Result<Response, AppError> {
    let response = state.session_service.sign_in(request).await?;
    let cookie = session_cookie(&state.config, &response.token)?;

    info!(user_id = %response.user.id, "Signed in");

    Ok(([(header::SET_COOKIE, cookie)], Json(response)).into_response())
}

/// HTTP handler for sign-out; runs behind `session_auth`
///
/// POST /api/auth/sign-out
#[instrument(name = "sign_out", skip(state, auth))]
pub async fn sign_out(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Response, AppError> {
    state.session_service.sign_out(&auth.session.id).await?;

    let cookie = cleared_session_cookie(&state.config)?;
    Ok(([(header::SET_COOKIE, cookie)], StatusCode::NO_CONTENT).into_response())
}

/// HTTP handler listing the caller's live sessions; runs behind `session_auth`
///
/// GET /api/auth/list-sessions
#[instrument(name = "list_sessions", skip(state, auth))]
pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthSession>,
) -> Result<Response, AppError> {
    let sessions = state.session_service.list_sessions(&auth.user.id).await?;
    Ok(Json(sessions).into_response())
}

/// HTTP handler returning the caller's session, or `null` when signed out
///
/// GET /api/auth/get-session
#[instrument(name = "get_session", skip(state, headers))]
pub async fn get_session(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Json<Option<AuthSession>> {
    Json(state.session_resolver.get_session(&headers).await)
}
