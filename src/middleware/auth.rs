use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::app::AppState;
use crate::auth::Session;
use crate::error::ApiError;

/// Session token from the `Authorization: Bearer` header, falling back to
/// the session cookie
pub fn extract_session_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    bearer_token(headers).or_else(|| cookie_token(headers, cookie_name))
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = auth_str.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then(|| token.to_string())
}

fn cookie_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == cookie_name && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

/// `Set-Cookie` value storing the session token
pub fn session_cookie(name: &str, token: &str, max_age: u64, secure: bool) -> String {
    let mut cookie = format!("{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}", name, token, max_age);
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(name: &str, secure: bool) -> String {
    session_cookie(name, "", 0, secure)
}

/// Require a valid session for API routes.
///
/// Reuses the session the access gate attached, otherwise validates the
/// request's token itself and injects the [`Session`] for handlers.
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, Response> {
    if request.extensions().get::<Session>().is_some() {
        return Ok(next.run(request).await);
    }

    let token = extract_session_token(request.headers(), &state.config.auth.session_cookie)
        .ok_or_else(|| ApiError::unauthorized("Missing session token").into_response())?;

    let session = state.identity.get_user(&token).await.map_err(|e| {
        tracing::warn!("Rejected session token: {}", e);
        ApiError::from(e).into_response()
    })?;

    request.extensions_mut().insert(session);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer header-token"));
        headers.insert(header::COOKIE, HeaderValue::from_static("ctfc-access-token=cookie-token"));
        assert_eq!(extract_session_token(&headers, "ctfc-access-token").as_deref(), Some("header-token"));
    }

    #[test]
    fn cookie_is_found_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("theme=dark; ctfc-access-token=abc.def; lang=en"));
        assert_eq!(extract_session_token(&headers, "ctfc-access-token").as_deref(), Some("abc.def"));
    }

    #[test]
    fn malformed_or_empty_tokens_are_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Basic dXNlcg=="));
        headers.insert(header::COOKIE, HeaderValue::from_static("ctfc-access-token="));
        assert_eq!(extract_session_token(&headers, "ctfc-access-token"), None);
    }

    #[test]
    fn cookies_carry_security_attributes() {
        let cookie = session_cookie("sid", "tok", 3600, true);
        assert_eq!(cookie, "sid=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=3600; Secure");
        assert_eq!(clear_session_cookie("sid", false), "sid=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    }
}
