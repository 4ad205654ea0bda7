//! `/api/v1/groups`. Only the creator may change or delete a group.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pfy_db::updates::group::GroupUpdate;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::envelope::ok;
use crate::error::ApiResult;
use crate::routes::explicit_null;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_group))
        .route("/my-groups", get(my_groups))
        .route("/{id}", get(get_group).patch(update_group).delete(delete_group))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateGroupBody {
    pub title: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateGroupBody {
    pub title: Option<String>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "explicit_null")]
    pub image: Option<Option<String>>,
    pub members: Option<Vec<String>>,
    pub status: Option<bool>,
}

impl From<UpdateGroupBody> for GroupUpdate {
    fn from(body: UpdateGroupBody) -> Self {
        Self {
            title: body.title,
            description: body.description,
            image: body.image,
            members: body.members,
            status: body.status,
        }
    }
}

async fn create_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateGroupBody>,
) -> ApiResult<impl IntoResponse> {
    let group = state
        .service
        .create_group(
            user.id(),
            &body.title,
            body.description.as_deref(),
            body.image.as_deref(),
            &body.members,
        )
        .await?;
    Ok(ok("Group created successfully", group))
}

async fn my_groups(
    State(state): State<AppState>,
    user: CurrentUser,
) -> ApiResult<impl IntoResponse> {
    let groups = state.service.list_groups_for_member(user.id()).await?;
    Ok(ok("Groups retrieved successfully", groups))
}

async fn get_group(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let group = state.service.get_group(&id).await?;
    Ok(ok("Group retrieved successfully", group))
}

async fn update_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateGroupBody>,
) -> ApiResult<impl IntoResponse> {
    let group = state
        .service
        .update_group(user.id(), &id, body.into())
        .await?;
    Ok(ok("Group updated successfully", group))
}

async fn delete_group(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let group = state.service.delete_group(user.id(), &id).await?;
    Ok(ok("Group deleted successfully", group))
}
