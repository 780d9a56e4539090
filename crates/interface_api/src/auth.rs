//! Session token handling
//!
//! Tokens carry only the subject and expiry. Roles are deliberately absent:
//! the admin flag is re-read from the identity store on every privileged
//! operation, so a revoked admin is locked out on their next call even if
//! their token is still live.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use core_kernel::{Session, UserId};

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Expiration timestamp
    pub exp: i64,
    /// Issued at timestamp
    pub iat: i64,
}

/// Auth errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid token")]
    InvalidToken,
    #[error("Token expired")]
    TokenExpired,
}

/// Creates a new session token for a user
pub fn create_token(
    user_id: UserId,
    secret: &str,
    expiration_secs: u64,
) -> Result<String, AuthError> {
    let now = Utc::now();
    let exp = now + Duration::seconds(expiration_secs as i64);

    let claims = Claims {
        sub: user_id.as_uuid().to_string(),
        exp: exp.timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|_| AuthError::InvalidToken)
}

/// Validates a token and builds the caller's [`Session`]
///
/// The raw token rides along on the session so it can be forwarded verbatim
/// to the trusted payout functions.
pub fn session_from_token(token: &str, secret: &str) -> Result<Session, AuthError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| {
        if matches!(
            e.kind(),
            jsonwebtoken::errors::ErrorKind::ExpiredSignature
        ) {
            AuthError::TokenExpired
        } else {
            AuthError::InvalidToken
        }
    })?;

    let user_id: UserId = token_data
        .claims
        .sub
        .parse()
        .map_err(|_| AuthError::InvalidToken)?;

    let expires_at = DateTime::<Utc>::from_timestamp(token_data.claims.exp, 0)
        .ok_or(AuthError::InvalidToken)?;

    Ok(Session {
        user_id,
        bearer_token: token.to_string(),
        expires_at,
    })
}
