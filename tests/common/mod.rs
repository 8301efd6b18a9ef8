#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use ctf_connect::app::{router, AppState};
use ctf_connect::auth::{jwt, IdentityError, IdentityProvider, JwtVerifier, Session, SessionGrant};
use ctf_connect::config::{AppConfig, StoreKind};
use ctf_connect::database::{MemoryProfileStore, ProfileStore, ProfileUpdate};

pub const TEST_SECRET: &str = "integration-test-secret";
pub const COOKIE: &str = "ctfc-access-token";

/// Identity provider that verifies real tokens and exchanges codes from a
/// fixed table instead of calling out over HTTP.
#[derive(Default)]
pub struct ScriptedIdentity {
    codes: Mutex<HashMap<String, (Uuid, Option<String>)>>,
    signed_out: Mutex<Vec<String>>,
}

impl ScriptedIdentity {
    pub fn add_code(&self, code: &str, user_id: Uuid, email: Option<&str>) {
        self.codes
            .lock()
            .unwrap()
            .insert(code.to_string(), (user_id, email.map(str::to_string)));
    }

    pub fn signed_out(&self) -> Vec<String> {
        self.signed_out.lock().unwrap().clone()
    }

    fn verifier() -> JwtVerifier {
        JwtVerifier::new(TEST_SECRET, None)
    }
}

#[async_trait]
impl IdentityProvider for ScriptedIdentity {
    async fn get_user(&self, access_token: &str) -> Result<Session, IdentityError> {
        Self::verifier().verify(access_token)
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionGrant, IdentityError> {
        let (user_id, email) = self.codes.lock().unwrap().remove(code).ok_or_else(|| IdentityError::Rejected {
            status: 400,
            message: "invalid flow state".to_string(),
        })?;

        let access_token = Self::verifier().issue(user_id, email, chrono::Duration::hours(1))?;
        let session = Self::verifier().verify(&access_token)?;

        Ok(SessionGrant {
            access_token,
            expires_in: 3600,
            session,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        self.signed_out.lock().unwrap().push(access_token.to_string());
        Ok(())
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    pub fn location(&self) -> Option<&str> {
        self.headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
    }

    pub fn set_cookie(&self) -> Option<&str> {
        self.headers.get(header::SET_COOKIE).and_then(|v| v.to_str().ok())
    }
}

pub struct TestApp {
    pub router: Router,
    pub profiles: Arc<MemoryProfileStore>,
    pub identity: Arc<ScriptedIdentity>,
}

impl TestApp {
    pub fn new() -> Self {
        let mut config = AppConfig::development();
        config.database.store = StoreKind::Memory;
        config.auth.jwt_secret = TEST_SECRET.to_string();
        config.auth.jwt_audience = None;
        config.auth.session_cookie = COOKIE.to_string();

        let profiles = Arc::new(MemoryProfileStore::new());
        let identity = Arc::new(ScriptedIdentity::default());
        let state = AppState::new(config, identity.clone(), profiles.clone());

        Self {
            router: router(state),
            profiles,
            identity,
        }
    }

    pub fn token_for(&self, user_id: Uuid) -> String {
        jwt::issue(TEST_SECRET, None, user_id, Some(format!("{}@example.com", user_id)), chrono::Duration::hours(1))
            .expect("token issue")
    }

    /// A signed-in user with an empty, not yet onboarded profile
    pub async fn new_user(&self) -> (Uuid, String) {
        let user_id = Uuid::new_v4();
        self.profiles.ensure_profile(user_id, None).await.expect("ensure profile");
        (user_id, self.token_for(user_id))
    }

    /// A signed-in user who has finished onboarding
    pub async fn onboarded_user(&self) -> (Uuid, String) {
        let (user_id, token) = self.new_user().await;
        self.profiles
            .upsert_profile(user_id, &ProfileUpdate { onboarding_completed: Some(true), ..Default::default() })
            .await
            .expect("complete onboarding");
        (user_id, token)
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await.context("router call failed")?;

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        Ok(TestResponse { status, headers, body })
    }

    pub async fn get(&self, path: &str, token: Option<&str>) -> Result<TestResponse> {
        self.send(request(Method::GET, path, token, None)?).await
    }

    pub async fn post(&self, path: &str, token: Option<&str>, body: Option<Value>) -> Result<TestResponse> {
        self.send(request(Method::POST, path, token, body)?).await
    }

    pub async fn patch(&self, path: &str, token: Option<&str>, body: Value) -> Result<TestResponse> {
        self.send(request(Method::PATCH, path, token, Some(body))?).await
    }
}

pub fn request(method: Method, path: &str, token: Option<&str>, body: Option<Value>) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }

    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_vec(&json)?))?,
        None => builder.body(Body::empty())?,
    };
    Ok(request)
}

/// Answers for every step, keyed by field name
pub fn complete_values() -> Value {
    serde_json::json!({
        "skill_level": "intermediate",
        "ctf_experience": "beginner",
        "interests": ["Web Security", "Cryptography"],
        "preferred_roles": ["Researcher", "Developer"],
        "preferred_team_size": "medium",
        "availability": "part_time",
        "communication_style": "mixed",
        "learning_goals": ["Build a portfolio"],
        "time_zone": "UTC-05:00"
    })
}
