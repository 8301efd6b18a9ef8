use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{IdentityError, Session};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aud: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, audience: Option<String>, ttl: Duration) -> Self {
        let now = Utc::now();

        Self {
            sub: user_id,
            email,
            aud: audience,
            exp: (now + ttl).timestamp(),
            iat: now.timestamp(),
        }
    }

    fn into_session(self) -> Result<Session, IdentityError> {
        let expires_at = DateTime::<Utc>::from_timestamp(self.exp, 0)
            .ok_or_else(|| IdentityError::InvalidToken("exp out of range".to_string()))?;

        Ok(Session {
            user_id: self.sub,
            email: self.email,
            expires_at,
        })
    }
}

/// HS256 session token verifier
#[derive(Clone)]
pub struct JwtVerifier {
    secret: String,
    audience: Option<String>,
}

impl JwtVerifier {
    pub fn new(secret: impl Into<String>, audience: Option<String>) -> Self {
        Self {
            secret: secret.into(),
            audience,
        }
    }

    pub fn verify(&self, token: &str) -> Result<Session, IdentityError> {
        if self.secret.is_empty() {
            return Err(IdentityError::NotConfigured("AUTH_JWT_SECRET"));
        }

        let mut validation = Validation::default();
        match &self.audience {
            Some(audience) => validation.set_audience(&[audience]),
            None => validation.validate_aud = false,
        }

        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &decoding_key, &validation).map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => IdentityError::Expired,
            _ => IdentityError::InvalidToken(e.to_string()),
        })?;

        token_data.claims.into_session()
    }

    /// Mint a token this verifier accepts
    pub fn issue(&self, user_id: Uuid, email: Option<String>, ttl: Duration) -> Result<String, IdentityError> {
        issue(&self.secret, self.audience.clone(), user_id, email, ttl)
    }
}

pub fn issue(
    secret: &str,
    audience: Option<String>,
    user_id: Uuid,
    email: Option<String>,
    ttl: Duration,
) -> Result<String, IdentityError> {
    if secret.is_empty() {
        return Err(IdentityError::NotConfigured("AUTH_JWT_SECRET"));
    }

    let claims = Claims::new(user_id, email, audience, ttl);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| IdentityError::InvalidToken(format!("JWT generation error: {}", e)))
}
