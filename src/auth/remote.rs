use async_trait::async_trait;
use chrono::{Duration, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use serde_json::json;
use url::Url;
use uuid::Uuid;

use super::{IdentityError, IdentityProvider, JwtVerifier, Session, SessionGrant};
use crate::config::AuthConfig;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
    user: TokenUser,
}

#[derive(Debug, Deserialize)]
struct TokenUser {
    id: Uuid,
    #[serde(default)]
    email: Option<String>,
}

/// Identity provider client.
///
/// Session tokens are verified locally against the shared signing secret;
/// code exchange and sign-out go to the provider's HTTP API when
/// `identity_url` is configured.
pub struct RemoteIdentityProvider {
    client: reqwest::Client,
    base_url: Option<Url>,
    api_key: String,
    verifier: JwtVerifier,
}

impl RemoteIdentityProvider {
    pub fn new(base_url: Option<Url>, api_key: impl Into<String>, verifier: JwtVerifier) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
            api_key: api_key.into(),
            verifier,
        }
    }

    pub fn from_config(config: &AuthConfig) -> anyhow::Result<Self> {
        let base_url = match config.identity_url.as_deref() {
            Some(raw) => Some(Url::parse(raw).map_err(|e| anyhow::anyhow!("Invalid IDENTITY_URL '{}': {}", raw, e))?),
            None => None,
        };
        let verifier = JwtVerifier::new(config.jwt_secret.clone(), config.jwt_audience.clone());

        Ok(Self::new(base_url, config.identity_api_key.clone(), verifier))
    }

    fn endpoint(&self, path: &str) -> Result<Url, IdentityError> {
        let base = self
            .base_url
            .as_ref()
            .ok_or(IdentityError::NotConfigured("IDENTITY_URL"))?;

        // Keep any path prefix on the base URL, e.g. https://idp.example.com/auth/v1
        let mut url = base.clone();
        let joined = format!("{}/{}", base.path().trim_end_matches('/'), path);
        url.set_path(&joined);
        Ok(url)
    }

    async fn rejection(response: reqwest::Response) -> IdentityError {
        let status = response.status().as_u16();
        let body = response.json::<serde_json::Value>().await.unwrap_or_default();
        let message = ["error_description", "msg", "message", "error"]
            .iter()
            .find_map(|key| body.get(*key).and_then(|v| v.as_str()))
            .unwrap_or("request rejected")
            .to_string();

        IdentityError::Rejected { status, message }
    }
}

#[async_trait]
impl IdentityProvider for RemoteIdentityProvider {
    async fn get_user(&self, access_token: &str) -> Result<Session, IdentityError> {
        self.verifier.verify(access_token)
    }

    async fn exchange_code(&self, code: &str) -> Result<SessionGrant, IdentityError> {
        let mut url = self.endpoint("token")?;
        url.query_pairs_mut().append_pair("grant_type", "authorization_code");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .json(&json!({ "auth_code": code }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token: TokenResponse = response.json().await?;
        tracing::debug!("Exchanged authorization code for user {}", token.user.id);

        Ok(SessionGrant {
            session: Session {
                user_id: token.user.id,
                email: token.user.email,
                expires_at: Utc::now() + Duration::seconds(token.expires_in as i64),
            },
            access_token: token.access_token,
            expires_in: token.expires_in,
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError> {
        let url = match self.endpoint("logout") {
            Ok(url) => url,
            // Without a provider the cookie is all there is to clear
            Err(IdentityError::NotConfigured(_)) => return Ok(()),
            Err(e) => return Err(e),
        };

        let response = self
            .client
            .post(url)
            .header("apikey", &self.api_key)
            .bearer_auth(access_token)
            .send()
            .await?;

        match response.status() {
            // Already-revoked sessions are fine
            s if s.is_success() || s == StatusCode::UNAUTHORIZED => Ok(()),
            _ => Err(Self::rejection(response).await),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: Option<&str>) -> RemoteIdentityProvider {
        RemoteIdentityProvider::new(
            base.map(|b| Url::parse(b).unwrap()),
            "anon-key",
            JwtVerifier::new("remote-test-secret", None),
        )
    }

    #[test]
    fn endpoint_keeps_base_path() {
        let p = provider(Some("https://idp.example.com/auth/v1/"));
        assert_eq!(p.endpoint("token").unwrap().as_str(), "https://idp.example.com/auth/v1/token");

        let p = provider(Some("https://idp.example.com"));
        assert_eq!(p.endpoint("logout").unwrap().as_str(), "https://idp.example.com/logout");
    }

    #[tokio::test]
    async fn exchange_without_provider_is_not_configured() {
        let p = provider(None);
        assert!(matches!(
            p.exchange_code("abc").await,
            Err(IdentityError::NotConfigured("IDENTITY_URL"))
        ));
    }

    #[tokio::test]
    async fn sign_out_without_provider_is_local_only() {
        assert!(provider(None).sign_out("token").await.is_ok());
    }

    #[tokio::test]
    async fn get_user_verifies_locally() {
        let p = provider(None);
        let user_id = Uuid::new_v4();
        let token = p.verifier.issue(user_id, None, Duration::minutes(5)).unwrap();
        assert_eq!(p.get_user(&token).await.unwrap().user_id, user_id);
    }
}
