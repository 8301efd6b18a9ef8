pub mod steps;
pub mod wizard;

pub use steps::{step_views, Field, FieldKind, Step, StepView, STEPS};
pub use wizard::{enter, FieldValue, Phase, Submitted, Wizard, WizardEntry, WizardError, WizardState};

use uuid::Uuid;

use crate::database::{ProfileStore, StoreError};

pub const HOME_PATH: &str = "/home";
pub const LOGIN_PATH: &str = "/login";
pub const ONBOARDING_PATH: &str = "/onboarding";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// Whether `user_id` has finished onboarding.
///
/// This is the only place the completion flag is interpreted; a user with
/// no profile row has not completed onboarding.
pub async fn is_completed(store: &dyn ProfileStore, user_id: Uuid) -> Result<bool, StoreError> {
    Ok(store
        .get_profile(user_id)
        .await?
        .map(|profile| profile.onboarding_completed)
        .unwrap_or(false))
}
