// handlers/public/auth/callback.rs - GET /auth/callback handler

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use crate::app::AppState;
use crate::auth::SessionGrant;
use crate::error::ApiError;
use crate::middleware::session_cookie;
use crate::onboarding::{self, DASHBOARD_PATH, HOME_PATH, ONBOARDING_PATH};

pub const CALLBACK_FAILED_PATH: &str = "/login?error=auth_callback_failed";

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    #[serde(rename = "redirectedFrom")]
    pub redirected_from: Option<String>,
}

/// GET /auth/callback - finish an OAuth sign-in
///
/// Exchanges the authorization code for a session, creates the user's
/// profile on first sign-in, stores the token in the session cookie and
/// sends the user to onboarding or to where they were headed.
pub async fn callback(State(state): State<AppState>, Query(query): Query<CallbackQuery>) -> Response {
    let Some(code) = query.code.filter(|code| !code.is_empty()) else {
        return Redirect::temporary(HOME_PATH).into_response();
    };

    let (grant, completed) = match sign_in(&state, &code).await {
        Ok(result) => result,
        Err(e) => {
            tracing::warn!("Auth callback failed: {}", e);
            return Redirect::temporary(CALLBACK_FAILED_PATH).into_response();
        }
    };

    let target = if completed {
        query
            .redirected_from
            .as_deref()
            .filter(|path| is_local_path(path))
            .unwrap_or(DASHBOARD_PATH)
    } else {
        ONBOARDING_PATH
    };

    let auth = &state.config.auth;
    let max_age = if grant.expires_in > 0 { grant.expires_in } else { auth.session_ttl_secs };
    let cookie = session_cookie(
        &auth.session_cookie,
        &grant.access_token,
        max_age,
        state.config.security.require_https,
    );

    ([(header::SET_COOKIE, cookie)], Redirect::temporary(target)).into_response()
}

async fn sign_in(state: &AppState, code: &str) -> Result<(SessionGrant, bool), ApiError> {
    let grant = state.identity.exchange_code(code).await?;
    let session = &grant.session;

    state
        .profiles
        .ensure_profile(session.user_id, session.email.as_deref())
        .await?;
    let completed = onboarding::is_completed(state.profiles.as_ref(), session.user_id).await?;

    tracing::info!("User {} signed in", session.user_id);
    Ok((grant, completed))
}

/// Same-origin absolute path, rejecting protocol-relative `//host` forms
fn is_local_path(path: &str) -> bool {
    path.starts_with('/') && !path.starts_with("//") && !path.contains('\\')
}
