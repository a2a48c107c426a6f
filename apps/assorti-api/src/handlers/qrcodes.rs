//! `/api/qrcodes` handlers.

use assorti_core::{QrCode, QrCodeRef, QrGeneratePayload};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;

use crate::error::ApiResult;
use crate::response::ApiResponse;
use crate::services::qrcodes;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> ApiResult<ApiResponse<Vec<QrCode>>> {
    Ok(ApiResponse::ok(qrcodes::list(&state.db).await?))
}

pub async fn generate(
    State(state): State<AppState>,
    body: Result<Json<QrGeneratePayload>, JsonRejection>,
) -> ApiResult<ApiResponse<QrCodeRef>> {
    let Json(payload) = body?;
    let code = qrcodes::generate(&state.db, &payload).await?;
    Ok(ApiResponse::ok(code).with_message("QR-код успешно сгенерирован"))
}

pub async fn get(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<ApiResponse<QrCodeRef>> {
    Ok(ApiResponse::ok(qrcodes::get(&state.db, &product_id).await?))
}

/// `GET /api/qrcodes/{productId}/image`: raw PNG.
pub async fn image(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let png = qrcodes::image(&state.db, &product_id).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png))
}
