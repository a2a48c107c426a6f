//! Success envelope shared by every JSON endpoint.
//!
//! ```json
//! { "success": true, "data": { ... }, "message": "Продажа успешно зарегистрирована" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with `data`.
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data,
            message: None,
            status: StatusCode::OK,
        }
    }

    /// 201 with `data`.
    pub fn created(data: T) -> Self {
        ApiResponse {
            status: StatusCode::CREATED,
            ..ApiResponse::ok(data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
