use axum::{extract::State, Extension, Json};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::database::Profile;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::onboarding::{is_completed, Wizard, WizardError, WizardState};

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub redirect: &'static str,
    pub profile: Profile,
}

/// POST /api/onboarding - finish onboarding from the last step
///
/// Writes the collected answers with the completion flag set. A user whose
/// profile is already complete gets 409 and the stored row is untouched. A
/// failed write returns 502 with the store's message; the client keeps its
/// state and may submit again.
pub async fn submit(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(wizard_state): Json<WizardState>,
) -> ApiResult<SubmitResponse> {
    match is_completed(state.profiles.as_ref(), session.user_id).await {
        Ok(false) => {}
        Ok(true) => return Err(WizardError::AlreadySubmitted.into()),
        Err(e) => {
            tracing::error!("Cannot determine onboarding state for {}: {}", session.user_id, e);
            return Err(ApiError::service_unavailable("Profile store unavailable"));
        }
    }

    let mut wizard = Wizard::resume(wizard_state)?;
    let submitted = wizard.submit(state.profiles.as_ref(), session.user_id).await?;

    Ok(ApiResponse::success(SubmitResponse {
        redirect: submitted.redirect,
        profile: submitted.profile,
    }))
}
