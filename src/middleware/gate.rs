use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::app::AppState;
use crate::middleware::auth::extract_session_token;

/// Run the access gate for every request.
///
/// Redirect decisions short-circuit with a temporary redirect. Allowed
/// requests carry the validated session, when there is one, as an extension.
pub async fn access_gate_middleware(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let token = extract_session_token(request.headers(), &state.config.auth.session_cookie);
    let path = request.uri().path().to_string();

    let evaluation = state.gate.evaluate(&path, token.as_deref()).await;

    if let Some(target) = evaluation.decision.redirect_target() {
        return Redirect::temporary(&target).into_response();
    }

    if let Some(session) = evaluation.session {
        request.extensions_mut().insert(session);
    }

    next.run(request).await
}
