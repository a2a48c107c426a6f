//! `/api/categories` handlers.

use assorti_core::{Category, CategoryPayload, CategoryWithProducts, Page, PageRequest};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::page_request;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::categories;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<ApiResponse<Page<Category>>> {
    let page = categories::list(&state.db, page_request(query)?).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<CategoryWithProducts>> {
    Ok(ApiResponse::ok(categories::get(&state.db, &id).await?))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Category>> {
    let Json(payload) = body?;
    let category = categories::create(&state.db, &payload).await?;
    Ok(ApiResponse::created(category).with_message("Категория успешно создана"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<CategoryPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Category>> {
    let Json(payload) = body?;
    let category = categories::update(&state.db, &id, &payload).await?;
    Ok(ApiResponse::ok(category).with_message("Категория успешно обновлена"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    categories::delete(&state.db, &id).await?;
    Ok(ApiResponse::ok(()).with_message("Категория успешно удалена"))
}
