use axum::{extract::State, Extension};
use serde::Serialize;

use crate::app::AppState;
use crate::auth::Session;
use crate::database::Profile;
use crate::middleware::{ApiResponse, ApiResult};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub user: Session,
    pub profile: Option<Profile>,
}

/// GET /dashboard - the signed-in user and their profile
pub async fn dashboard(State(state): State<AppState>, Extension(session): Extension<Session>) -> ApiResult<Dashboard> {
    let profile = state.profiles.get_profile(session.user_id).await?;

    Ok(ApiResponse::success(Dashboard { user: session, profile }))
}
