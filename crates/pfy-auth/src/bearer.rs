//! Authorization header parsing and role checks.

use pfy_core::enums::UserRole;

use crate::claims::PfyClaims;
use crate::error::AuthError;

/// Extract the token from an `Authorization` header value.
///
/// Accepts `Bearer <token>` (scheme case-insensitive) or a bare token.
///
/// # Errors
///
/// Returns `AuthError::NotAuthenticated` for a missing or blank value.
pub fn bearer_token(header: Option<&str>) -> Result<&str, AuthError> {
    let value = header.map(str::trim).unwrap_or_default();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => value,
    };
    if token.is_empty() || token.eq_ignore_ascii_case("bearer") {
        Err(AuthError::NotAuthenticated)
    } else {
        Ok(token)
    }
}

/// Succeeds when `allowed` is empty or contains the caller's role.
///
/// # Errors
///
/// Returns `AuthError::Forbidden` naming the caller's role.
pub fn require_role(claims: &PfyClaims, allowed: &[UserRole]) -> Result<(), AuthError> {
    if allowed.is_empty() || allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden {
            role: claims.role.as_str().to_string(),
        })
    }
}
