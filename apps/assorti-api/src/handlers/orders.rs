//! `/api/orders` handlers. All of them require Telegram WebApp auth.

use assorti_core::{Order, OrderPayload, Page, PageRequest};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::page_request;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::orders;
use crate::state::AppState;

pub async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    body: Result<Json<OrderPayload>, JsonRejection>,
) -> ApiResult<ApiResponse<Order>> {
    let Json(payload) = body?;
    let order = orders::create(&state.db, &user, &payload).await?;
    Ok(ApiResponse::created(order).with_message("Заказ успешно создан"))
}

pub async fn list(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<ApiResponse<Page<Order>>> {
    let page = orders::list(&state.db, &user, page_request(query)?).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<Order>> {
    Ok(ApiResponse::ok(orders::get(&state.db, &user, &id).await?))
}
