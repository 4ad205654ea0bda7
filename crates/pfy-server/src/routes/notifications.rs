//! `/api/v1/notifications`. A caller only ever sees or touches their own.

use axum::Router;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use pfy_core::entities::Notification;

use crate::auth::CurrentUser;
use crate::envelope::ok;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-notifications", get(my_notifications))
        .route("/read-notification/{id}", post(read_notification))
        .route("/delete-notification/{id}", delete(delete_notification))
}

/// Load `id` and check the caller is its receiver. Someone else's
/// notification is reported as missing.
async fn owned(state: &AppState, user: &CurrentUser, id: &str) -> ApiResult<Notification> {
    let notification = state.service.get_notification(id).await?;
    if notification.receiver_id != user.id() {
        return Err(ApiError::not_found("Notification"));
    }
    Ok(notification)
}

async fn my_notifications(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let inbox = state.service.list_notifications(user.id()).await?;
    Ok(ok("Notifications retrieved successfully", inbox))
}

async fn read_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    owned(&state, &user, &id).await?;
    let notification = state.service.mark_notification_read(&id).await?;
    Ok(ok("Notification read successfully", notification))
}

async fn delete_notification(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    owned(&state, &user, &id).await?;
    let notification = state.service.delete_notification(&id).await?;
    Ok(ok("Notification deleted successfully", notification))
}
