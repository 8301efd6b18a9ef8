mod common;

use anyhow::Result;
use axum::http::{header, Method, StatusCode};
use uuid::Uuid;

use common::{TestApp, COOKIE};
use ctf_connect::database::{ProfileStore, ProfileUpdate};

#[tokio::test]
async fn first_sign_in_creates_profile_and_starts_onboarding() -> Result<()> {
    let app = TestApp::new();
    let user_id = Uuid::new_v4();
    app.identity.add_code("code-1", user_id, Some("new@example.com"));

    let res = app.get("/auth/callback?code=code-1", None).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/onboarding"));

    let cookie = res.set_cookie().expect("session cookie");
    assert!(cookie.starts_with(&format!("{}=", COOKIE)));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Max-Age=3600"));

    let profile = app.profiles.get_profile(user_id).await?.expect("profile created");
    assert_eq!(profile.email.as_deref(), Some("new@example.com"));
    assert!(!profile.onboarding_completed);
    Ok(())
}

#[tokio::test]
async fn returning_user_goes_where_they_were_headed() -> Result<()> {
    let app = TestApp::new();
    let (user_id, _) = app.onboarded_user().await;

    app.identity.add_code("code-2", user_id, None);
    let res = app.get("/auth/callback?code=code-2&redirectedFrom=%2Fteams%2F7", None).await?;
    assert_eq!(res.location(), Some("/teams/7"));

    app.identity.add_code("code-3", user_id, None);
    let res = app.get("/auth/callback?code=code-3", None).await?;
    assert_eq!(res.location(), Some("/dashboard"));

    app.identity.add_code("code-4", user_id, None);
    let res = app.get("/auth/callback?code=code-4&redirectedFrom=//evil.example", None).await?;
    assert_eq!(res.location(), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn callback_errors_redirect_to_login() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/auth/callback?code=unknown", None).await?;
    assert_eq!(res.location(), Some("/login?error=auth_callback_failed"));
    assert!(res.set_cookie().is_none());

    let res = app.get("/auth/callback", None).await?;
    assert_eq!(res.location(), Some("/home"));
    Ok(())
}

#[tokio::test]
async fn callback_store_failure_redirects_to_login() -> Result<()> {
    let app = TestApp::new();
    app.identity.add_code("code-5", Uuid::new_v4(), None);
    app.profiles.set_fail_writes(true);

    let res = app.get("/auth/callback?code=code-5", None).await?;
    assert_eq!(res.location(), Some("/login?error=auth_callback_failed"));
    Ok(())
}

#[tokio::test]
async fn check_onboarding_matches_the_gate() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/auth/check-onboarding", None).await?;
    assert_eq!(res.location(), Some("/login"));

    let (user_id, token) = app.new_user().await;
    let res = app.get("/auth/check-onboarding", Some(token.as_str())).await?;
    assert_eq!(res.location(), Some("/onboarding"));

    app.profiles
        .upsert_profile(user_id, &ProfileUpdate { onboarding_completed: Some(true), ..Default::default() })
        .await?;
    let res = app.get("/auth/check-onboarding", Some(token.as_str())).await?;
    assert_eq!(res.location(), Some("/dashboard"));
    Ok(())
}

#[tokio::test]
async fn session_cookie_is_accepted_in_place_of_bearer() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.onboarded_user().await;

    let request = axum::http::Request::builder()
        .method(Method::GET)
        .uri("/dashboard")
        .header(header::COOKIE, format!("theme=dark; {}={}", COOKIE, token))
        .body(axum::body::Body::empty())?;
    let res = app.send(request).await?;
    assert_eq!(res.status, StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn logout_signs_out_and_clears_cookie() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.onboarded_user().await;

    let res = app.post("/auth/logout", Some(token.as_str()), None).await?;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/home"));
    assert!(res.set_cookie().unwrap_or_default().contains("Max-Age=0"));
    assert_eq!(app.identity.signed_out(), vec![token]);
    Ok(())
}
