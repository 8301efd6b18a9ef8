mod common;

use std::sync::Arc;

use anyhow::Result;
use axum::http::StatusCode;
use uuid::Uuid;

use common::{ScriptedIdentity, TestApp};
use ctf_connect::database::{MemoryProfileStore, ProfileStore};
use ctf_connect::gate::{AccessGate, Decision, RouteTable};

#[tokio::test]
async fn root_redirects_home_with_or_without_session() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.onboarded_user().await;

    for token in [None, Some(token.as_str())] {
        let res = app.get("/", token).await?;
        assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
        assert_eq!(res.location(), Some("/home"));
    }
    Ok(())
}

#[tokio::test]
async fn public_pages_need_no_session() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/home", None).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["name"], "CTF Connect");
    Ok(())
}

#[tokio::test]
async fn dashboard_without_session_redirects_to_login() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/dashboard", None).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/login?redirectedFrom=/dashboard"));
    Ok(())
}

#[tokio::test]
async fn dashboard_with_invalid_token_redirects_to_login() -> Result<()> {
    let app = TestApp::new();

    let res = app.get("/dashboard", Some("not-a-jwt")).await?;
    assert_eq!(res.location(), Some("/login?redirectedFrom=/dashboard"));
    Ok(())
}

#[tokio::test]
async fn dashboard_before_onboarding_redirects_to_onboarding() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.new_user().await;

    let res = app.get("/dashboard", Some(token.as_str())).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/onboarding"));

    // No profile row at all is treated the same way
    let stranger = app.token_for(Uuid::new_v4());
    let res = app.get("/teams/7", Some(stranger.as_str())).await?;
    assert_eq!(res.location(), Some("/onboarding"));
    Ok(())
}

#[tokio::test]
async fn dashboard_after_onboarding_is_served() -> Result<()> {
    let app = TestApp::new();
    let (user_id, token) = app.onboarded_user().await;

    let res = app.get("/dashboard", Some(token.as_str())).await?;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["data"]["user"]["user_id"], user_id.to_string());
    assert_eq!(res.body["data"]["profile"]["onboarding_completed"], true);
    Ok(())
}

#[tokio::test]
async fn profile_read_failure_sends_user_to_login() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.onboarded_user().await;
    app.profiles.set_fail_reads(true);

    let res = app.get("/dashboard", Some(token.as_str())).await?;
    assert_eq!(res.location(), Some("/login?redirectedFrom=/dashboard"));
    Ok(())
}

#[tokio::test]
async fn auth_routes_bounce_signed_in_users() -> Result<()> {
    let app = TestApp::new();
    let (_, token) = app.new_user().await;

    let res = app.get("/login", Some(token.as_str())).await?;
    assert_eq!(res.status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(res.location(), Some("/dashboard"));

    // Without a session the gate lets the request through to the router
    let res = app.get("/login", None).await?;
    assert_eq!(res.status, StatusCode::NOT_FOUND);
    assert_eq!(res.body["code"], "NOT_FOUND");
    Ok(())
}

#[tokio::test]
async fn every_path_gets_exactly_one_expected_decision() -> Result<()> {
    let profiles = Arc::new(MemoryProfileStore::new());
    let identity = Arc::new(ScriptedIdentity::default());
    let gate = AccessGate::new(RouteTable::default(), identity, profiles.clone());

    let onboarded = Uuid::new_v4();
    profiles.ensure_profile(onboarded, None).await?;
    profiles
        .upsert_profile(
            onboarded,
            &ctf_connect::database::ProfileUpdate { onboarding_completed: Some(true), ..Default::default() },
        )
        .await?;
    let pending = Uuid::new_v4();
    profiles.ensure_profile(pending, None).await?;

    let app = TestApp::new();
    let onboarded_token = app.token_for(onboarded);
    let pending_token = app.token_for(pending);

    let cases: Vec<(&str, Option<&str>, Decision)> = vec![
        ("/", None, Decision::RedirectHome),
        ("/", Some(onboarded_token.as_str()), Decision::RedirectHome),
        ("/home", None, Decision::AllowPublic),
        ("/events/", Some("garbage"), Decision::AllowPublic),
        ("/register", None, Decision::AllowAuth),
        ("/register", Some("garbage"), Decision::AllowAuth),
        ("/auth/callback", Some(pending_token.as_str()), Decision::RedirectDashboard),
        ("/projects", None, Decision::RedirectLogin { from: "/projects".to_string() }),
        ("/projects", Some(pending_token.as_str()), Decision::RedirectOnboarding),
        ("/profile", Some(onboarded_token.as_str()), Decision::AllowProtected),
        ("/api/profile", None, Decision::AllowDefault),
        ("/onboarding", None, Decision::AllowDefault),
    ];

    for (path, token, expected) in cases {
        let evaluation = gate.evaluate(path, token).await;
        assert_eq!(evaluation.decision, expected, "path {path} token {token:?}");
        assert_eq!(
            evaluation.session.is_some(),
            evaluation.decision == Decision::AllowProtected,
            "session attachment for {path}"
        );
    }
    Ok(())
}

#[tokio::test]
async fn onboarding_listed_as_protected_skips_completion_check() -> Result<()> {
    let profiles = Arc::new(MemoryProfileStore::new());
    let routes = RouteTable::new(vec![], vec![], vec!["/onboarding".to_string(), "/dashboard".to_string()]);
    let gate = AccessGate::new(routes, Arc::new(ScriptedIdentity::default()), profiles);
    let token = TestApp::new().token_for(Uuid::new_v4());

    assert_eq!(gate.evaluate("/onboarding", Some(token.as_str())).await.decision, Decision::AllowProtected);
    assert_eq!(gate.evaluate("/dashboard", Some(token.as_str())).await.decision, Decision::RedirectOnboarding);
    Ok(())
}
