use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, patch, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::envelope::ok;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_comment))
        .route("/task/{task_id}", get(task_comments))
        .route(
            "/{id}",
            patch(update_comment).get(get_comment).delete(delete_comment),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentBody {
    pub task_id: String,
    pub comment: String,
    pub parent_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentBody {
    pub comment: String,
}

async fn create_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateCommentBody>,
) -> ApiResult<impl IntoResponse> {
    let comment = state
        .service
        .create_comment(
            &body.task_id,
            user.id(),
            &body.comment,
            body.parent_id.as_deref(),
        )
        .await?;
    Ok(ok("Task comment created successfully", comment))
}

async fn task_comments(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(task_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    state.service.get_task(&task_id).await?;
    let threads = state.service.list_comments(&task_id).await?;
    Ok(ok("Task comments retrieved successfully", threads))
}

async fn get_comment(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.service.get_comment(&id).await?;
    Ok(ok("Task comment retrieved successfully", comment))
}

async fn update_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateCommentBody>,
) -> ApiResult<impl IntoResponse> {
    let comment = state
        .service
        .update_comment(&id, user.id(), &body.comment)
        .await?;
    Ok(ok("Task comment updated successfully", comment))
}

async fn delete_comment(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let comment = state.service.delete_comment(&id, user.id()).await?;
    Ok(ok("Task comment deleted successfully", comment))
}
