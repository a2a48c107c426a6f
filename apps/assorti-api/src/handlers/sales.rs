//! `/api/sales` handlers.

use assorti_core::{Page, PageRequest, SaleDetails, SaleOutcome, SalePayload};
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::Json;

use super::page_request;
use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::sales;
use crate::state::AppState;

/// `POST /api/sales`: 201 with the sale and the product's new stock.
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<SalePayload>, JsonRejection>,
) -> ApiResult<ApiResponse<SaleOutcome>> {
    let Json(payload) = body?;
    let outcome = sales::record(&state.db, &payload).await?;
    Ok(ApiResponse::created(outcome).with_message("Продажа успешно зарегистрирована"))
}

pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<PageRequest>, QueryRejection>,
) -> ApiResult<ApiResponse<Page<SaleDetails>>> {
    let page = sales::list(&state.db, page_request(query)?).await?;
    Ok(ApiResponse::ok(page))
}

pub async fn get(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<ApiResponse<SaleDetails>> {
    Ok(ApiResponse::ok(sales::get(&state.db, &id).await?))
}
