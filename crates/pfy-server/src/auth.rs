//! Bearer-token extractor for `/api` handlers.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use pfy_auth::{PfyClaims, bearer_token, require_role, verify_token};
use pfy_core::enums::UserRole;

use crate::error::ApiError;
use crate::state::AppState;

/// The verified caller. Rejects with 401 before the handler runs.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub PfyClaims);

impl CurrentUser {
    pub fn id(&self) -> &str {
        &self.0.user_id
    }

    /// 403 unless the caller holds one of `roles`.
    pub fn require(&self, roles: &[UserRole]) -> Result<(), ApiError> {
        require_role(&self.0, roles)?;
        Ok(())
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok());
        let token = bearer_token(header)?;
        let claims = verify_token(token, state.jwt_secret())?;
        Ok(Self(claims))
    }
}
