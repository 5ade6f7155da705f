pub mod permissions;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;

pub use permissions::{Policy, Role};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing session")]
    MissingSession,

    #[error("Authorization header must use Bearer token format")]
    MalformedHeader,

    #[error("Session expired")]
    Expired,

    #[error("Invalid session: {0}")]
    Invalid(String),

    #[error("Session secret not configured")]
    MissingSecret,

    #[error("Failed to sign session: {0}")]
    Encode(jsonwebtoken::errors::Error),
}

/// Session claims carried by the session cookie (or a Bearer token).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: Uuid, email: Option<String>, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id,
            email,
            exp,
            iat: now.timestamp(),
        }
    }
}

/// Sign a session token for `user_id` with the configured secret.
pub fn issue_session_token(
    security: &SecurityConfig,
    user_id: Uuid,
    email: Option<String>,
) -> Result<String, AuthError> {
    if security.session_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let claims = Claims::new(user_id, email, security.session_expiry_hours);
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(security.session_secret.as_bytes()),
    )
    .map_err(AuthError::Encode)
}

/// Validate a session token and extract its claims.
pub fn decode_session_token(security: &SecurityConfig, token: &str) -> Result<Claims, AuthError> {
    if security.session_secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.session_secret.as_bytes());
    let validation = Validation::default();

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        })
}

/// Extract the token from an `Authorization: Bearer <token>` value.
pub fn bearer_token(header_value: &str) -> Result<&str, AuthError> {
    let token = header_value
        .strip_prefix("Bearer ")
        .ok_or(AuthError::MalformedHeader)?
        .trim();
    if token.is_empty() {
        return Err(AuthError::MissingSession);
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn issued_token_decodes_to_same_user() {
        let security = AppConfig::development().security;
        let user_id = Uuid::new_v4();

        let token = issue_session_token(&security, user_id, Some("ada@example.com".into())).unwrap();
        let claims = decode_session_token(&security, &token).unwrap();

        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = AppConfig::development().security;
        let past = Utc::now() - Duration::hours(2);
        let claims = Claims {
            sub: Uuid::new_v4(),
            email: None,
            exp: past.timestamp(),
            iat: (past - Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(security.session_secret.as_bytes()),
        )
        .unwrap();

        assert!(matches!(decode_session_token(&security, &token), Err(AuthError::Expired)));
    }

    #[test]
    fn token_signed_with_other_secret_is_invalid() {
        let security = AppConfig::development().security;
        let mut other = security.clone();
        other.session_secret = "someone-elses-secret".to_string();

        let token = issue_session_token(&other, Uuid::new_v4(), None).unwrap();
        assert!(matches!(decode_session_token(&security, &token), Err(AuthError::Invalid(_))));
    }

    #[test]
    fn bearer_prefix_is_required() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert!(matches!(bearer_token("Token abc"), Err(AuthError::MalformedHeader)));
        assert!(matches!(bearer_token("Bearer   "), Err(AuthError::MissingSession)));
    }
}
