//! HS256 token issue and verification.

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use pfy_core::enums::UserRole;

use crate::claims::{PfyClaims, WireClaims};
use crate::error::AuthError;

/// Issue a token valid for `ttl_secs` from now.
///
/// # Errors
///
/// Returns `AuthError::MissingSecret` for an empty secret.
pub fn issue_token(
    user_id: &str,
    role: UserRole,
    secret: &str,
    ttl_secs: u64,
) -> Result<String, AuthError> {
    issue_token_at(user_id, role, secret, ttl_secs, Utc::now())
}

/// Issue a token as if signed at `issued_at`.
///
/// # Errors
///
/// Returns `AuthError::MissingSecret` for an empty secret.
pub fn issue_token_at(
    user_id: &str,
    role: UserRole,
    secret: &str,
    ttl_secs: u64,
    issued_at: DateTime<Utc>,
) -> Result<String, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let ttl = TimeDelta::seconds(i64::try_from(ttl_secs).unwrap_or(i64::MAX / 1_000));
    let wire = WireClaims {
        user_id: user_id.to_string(),
        role,
        iat: issued_at.timestamp(),
        exp: (issued_at + ttl).timestamp(),
    };
    encode(
        &Header::new(Algorithm::HS256),
        &wire,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Other(format!("failed to sign token: {e}")))
}

/// Verify signature and expiry, returning the claims.
///
/// No leeway is applied to `exp`.
///
/// # Errors
///
/// `TokenExpired` past `exp`, `InvalidToken` for anything else that fails
/// validation, `MissingSecret` for an empty secret.
pub fn verify_token(token: &str, secret: &str) -> Result<PfyClaims, AuthError> {
    if secret.is_empty() {
        return Err(AuthError::MissingSecret);
    }
    let mut validation = Validation::new(Algorithm::HS256);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<WireClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::TokenExpired,
        _ => {
            tracing::debug!(error = %e, "token rejected");
            AuthError::InvalidToken(e.to_string())
        }
    })?;

    let wire = data.claims;
    let issued_at = DateTime::from_timestamp(wire.iat, 0)
        .ok_or_else(|| AuthError::InvalidToken("iat out of range".into()))?;
    let expires_at = DateTime::from_timestamp(wire.exp, 0)
        .ok_or_else(|| AuthError::InvalidToken("exp out of range".into()))?;

    Ok(PfyClaims {
        user_id: wire.user_id,
        role: wire.role,
        issued_at,
        expires_at,
    })
}
