pub mod jwt;
pub mod remote;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use jwt::{Claims, JwtVerifier};
pub use remote::RemoteIdentityProvider;

/// Authenticated identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: Uuid,
    pub email: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Result of exchanging an authorization code with the identity provider
#[derive(Debug, Clone)]
pub struct SessionGrant {
    pub access_token: String,
    pub expires_in: u64,
    pub session: Session,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Invalid session token: {0}")]
    InvalidToken(String),

    #[error("Session token has expired")]
    Expired,

    #[error("Identity provider rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Identity provider not configured: {0}")]
    NotConfigured(&'static str),

    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}

/// Issues and validates sessions on behalf of the platform
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Resolve the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<Session, IdentityError>;

    /// Trade an OAuth authorization code for a session.
    async fn exchange_code(&self, code: &str) -> Result<SessionGrant, IdentityError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), IdentityError>;
}

/// Current session for an optional token.
///
/// A missing token is `Ok(None)`. Validation failures are returned as errors
/// so callers can decide how to degrade; most treat them as "no session".
pub async fn current_session(
    identity: &dyn IdentityProvider,
    token: Option<&str>,
) -> Result<Option<Session>, IdentityError> {
    match token {
        None => Ok(None),
        Some(token) => identity.get_user(token).await.map(Some),
    }
}
