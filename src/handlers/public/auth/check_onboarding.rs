// handlers/public/auth/check_onboarding.rs - GET /auth/check-onboarding handler

use axum::{
    extract::State,
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::auth::current_session;
use crate::middleware::extract_session_token;
use crate::onboarding::{self, DASHBOARD_PATH, LOGIN_PATH, ONBOARDING_PATH};

/// GET /auth/check-onboarding - route a signed-in user to the right place
pub async fn check_onboarding(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = extract_session_token(&headers, &state.config.auth.session_cookie);

    let session = match current_session(state.identity.as_ref(), token.as_deref()).await {
        Ok(Some(session)) => session,
        Ok(None) => return Redirect::temporary(LOGIN_PATH).into_response(),
        Err(e) => {
            tracing::warn!("Rejected session token: {}", e);
            return Redirect::temporary(LOGIN_PATH).into_response();
        }
    };

    let target = match onboarding::is_completed(state.profiles.as_ref(), session.user_id).await {
        Ok(true) => DASHBOARD_PATH,
        Ok(false) => ONBOARDING_PATH,
        Err(e) => {
            tracing::error!("Onboarding state unavailable for {}: {}", session.user_id, e);
            LOGIN_PATH
        }
    };

    Redirect::temporary(target).into_response()
}
