use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use pfy_db::updates::category::CategoryUpdate;
use serde::Deserialize;

use crate::auth::CurrentUser;
use crate::envelope::ok;
use crate::error::ApiResult;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_category))
        .route("/slug/{slug}", get(get_category_by_slug))
        .route(
            "/{id}",
            get(get_category).patch(update_category).delete(delete_category),
        )
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryBody {
    pub title: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryBody {
    pub title: Option<String>,
    pub status: Option<bool>,
}

async fn create_category(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(body): Json<CreateCategoryBody>,
) -> ApiResult<impl IntoResponse> {
    let category = state.service.create_category(user.id(), &body.title).await?;
    Ok(ok("Category created successfully", category))
}

async fn get_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let category = state.service.get_category(&id).await?;
    Ok(ok("Category retrieved successfully", category))
}

async fn get_category_by_slug(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(slug): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let category = state.service.get_category_by_slug(&slug).await?;
    Ok(ok("Category retrieved successfully", category))
}

async fn update_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    Json(body): Json<UpdateCategoryBody>,
) -> ApiResult<impl IntoResponse> {
    let update = CategoryUpdate {
        title: body.title,
        status: body.status,
    };
    let category = state.service.update_category(&id, update).await?;
    Ok(ok("Category updated successfully", category))
}

async fn delete_category(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let category = state.service.delete_category(&id).await?;
    Ok(ok("Category deleted successfully", category))
}
