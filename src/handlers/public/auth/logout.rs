// handlers/public/auth/logout.rs - POST /auth/logout handler

use axum::{
    extract::State,
    http::{header, HeaderMap},
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::middleware::{clear_session_cookie, extract_session_token};
use crate::onboarding::HOME_PATH;

/// POST /auth/logout - revoke the session and clear the cookie
///
/// Always ends signed out locally, even when the identity provider cannot
/// be reached.
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Some(token) = extract_session_token(&headers, &state.config.auth.session_cookie) {
        if let Err(e) = state.identity.sign_out(&token).await {
            tracing::warn!("Identity provider sign-out failed: {}", e);
        }
    }

    let cookie = clear_session_cookie(&state.config.auth.session_cookie, state.config.security.require_https);
    ([(header::SET_COOKIE, cookie)], Redirect::to(HOME_PATH)).into_response()
}
