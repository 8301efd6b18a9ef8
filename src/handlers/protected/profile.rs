// handlers/protected/profile.rs - GET/PATCH /api/profile

use axum::{extract::State, Extension, Json};

use crate::app::AppState;
use crate::auth::Session;
use crate::database::{Profile, ProfileEdit, ProfileUpdate};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/profile - the caller's profile
pub async fn profile_get(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Profile> {
    let profile = state
        .profiles
        .get_profile(session.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("Profile not found for user {}", session.user_id)))?;

    Ok(ApiResponse::success(profile))
}

/// PATCH /api/profile - update profile fields by key
///
/// Only the supplied fields change. The onboarding flag cannot be set here.
pub async fn profile_patch(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
    Json(edit): Json<ProfileEdit>,
) -> ApiResult<Profile> {
    let update = ProfileUpdate::from(edit);
    if update.is_empty() {
        return Err(ApiError::bad_request("No profile fields to update"));
    }

    let profile = state.profiles.update_profile(session.user_id, &update).await?;
    tracing::info!("User {} updated their profile", session.user_id);

    Ok(ApiResponse::success(profile))
}
