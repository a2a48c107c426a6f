//! `/api/products` handlers.

use assorti_core::{Page, PageRequest, Product, ProductPayload, StockPayload};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::page_request;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::products;
use crate::state::AppState;

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<ApiResponse<Page<Product>>> {
    let page = products::list(&state.db, page_request(query)?).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Product>> {
    Ok(ApiResponse::ok(products::get(&state.db, &id).await?))
}

pub async fn get_by_barcode(
    State(state): State<AppState>,
    Path(barcode): Path<String>,
) -> ApiResult<ApiResponse<Product>> {
    Ok(ApiResponse::ok(products::get_by_barcode(&state.db, &barcode).await?))
}

pub async fn list_by_category(
    State(state): State<AppState>,
    Path(category_id): Path<String>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<ApiResponse<Page<Product>>> {
    let page = products::list_by_category(&state.db, &category_id, page_request(query)?).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    let Json(payload) = body?;
    let product = products::create(&state.db, &payload).await?;
    Ok(ApiResponse::created(product).with_message("Продукт успешно создан"))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<ProductPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    let Json(payload) = body?;
    let product = products::update(&state.db, &id, &payload).await?;
    Ok(ApiResponse::ok(product).with_message("Продукт успешно обновлен"))
}

pub async fn set_stock(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<StockPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Product>> {
    let Json(payload) = body?;
    let product = products::set_stock(&state.db, &id, &payload).await?;
    Ok(ApiResponse::ok(product).with_message("Остаток обновлен"))
}

pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<()>> {
    products::delete(&state.db, &id).await?;
    Ok(ApiResponse::ok(()).with_message("Продукт успешно удален"))
}
