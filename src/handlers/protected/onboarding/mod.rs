// handlers/protected/onboarding/mod.rs - wizard API
//
// The wizard state lives on the client; every call resumes it, validates
// it and applies one transition.

mod submit;

use axum::Json;
use serde::{Deserialize, Serialize};

use crate::middleware::{ApiResponse, ApiResult};
use crate::onboarding::{step_views, Field, StepView, Wizard, WizardState};

pub use submit::submit;

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepAction {
    Next,
    Previous,
}

#[derive(Debug, Deserialize)]
pub struct StepRequest {
    pub state: WizardState,
    pub action: StepAction,
}

#[derive(Debug, Serialize)]
pub struct StepResponse {
    pub state: WizardState,
    pub moved: bool,
    /// Required fields still empty on the resulting step
    pub missing: Vec<Field>,
}

/// GET /api/onboarding/steps - step definitions with their option lists
pub async fn steps() -> ApiResponse<Vec<StepView>> {
    ApiResponse::success(step_views())
}

/// POST /api/onboarding/step - move the wizard forward or back
pub async fn step(Json(request): Json<StepRequest>) -> ApiResult<StepResponse> {
    let mut wizard = Wizard::resume(request.state)?;

    let moved = match request.action {
        StepAction::Next => wizard.next(),
        StepAction::Previous => wizard.previous(),
    };
    let missing = wizard.missing_fields(wizard.step());

    Ok(ApiResponse::success(StepResponse {
        state: wizard.into_state(),
        moved,
        missing,
    }))
}
