// handlers/public/pages.rs - landing, health and wizard entry

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::json;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::{extract_session_token, ApiResponse};
use crate::onboarding::{self, step_views, WizardEntry, DASHBOARD_PATH, LOGIN_PATH};

/// GET /home - public landing
pub async fn home() -> impl IntoResponse {
    ApiResponse::success(json!({
        "name": "CTF Connect",
        "description": "Find teammates and build teams for capture-the-flag competitions",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - profile store reachability
pub async fn health(State(state): State<AppState>) -> Response {
    match state.profiles.health_check().await {
        Ok(()) => Json(json!({
            "success": true,
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "status": "unhealthy",
                    "error": e.to_string(),
                })),
            )
                .into_response()
        }
    }
}

/// GET /onboarding - wizard entry guard
///
/// Users without a session go to login and users who already finished go to
/// the dashboard. Everyone else receives the step definitions and a fresh
/// wizard state to drive through `/api/onboarding/step`.
pub async fn onboarding_entry(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let token = extract_session_token(&headers, &state.config.auth.session_cookie);

    match onboarding::enter(state.identity.as_ref(), state.profiles.as_ref(), token.as_deref()).await {
        WizardEntry::RedirectLogin => Redirect::temporary(LOGIN_PATH).into_response(),
        WizardEntry::RedirectDashboard => Redirect::temporary(DASHBOARD_PATH).into_response(),
        WizardEntry::Start { session, wizard } => ApiResponse::success(json!({
            "user_id": session.user_id,
            "steps": step_views(),
            "state": wizard.state(),
        }))
        .into_response(),
    }
}

/// Fallback for unknown paths
pub async fn not_found(uri: Uri) -> ApiError {
    ApiError::not_found(format!("No route for {}", uri.path()))
}
