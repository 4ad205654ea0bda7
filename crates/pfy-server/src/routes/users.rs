use axum::Router;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use pfy_core::enums::UserRole;

use crate::auth::CurrentUser;
use crate::envelope::ok;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/me", get(me))
}

/// Profile lookup is limited to staff accounts.
const PROFILE_ROLES: &[UserRole] = &[UserRole::SuperAdmin, UserRole::Admin];

async fn me(State(state): State<AppState>, user: CurrentUser) -> ApiResult<impl IntoResponse> {
    user.require(PROFILE_ROLES)?;
    let summary = state.service.user_summary(user.id()).await?;
    Ok(ok("User retrieved successfully", summary))
}
