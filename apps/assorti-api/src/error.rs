//! # API Error Type
//!
//! Unified error type for handlers and services.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in the REST API                           │
//! │                                                                         │
//! │  Handler ─► Service ─► Repository                                       │
//! │                 │           │                                           │
//! │                 │           └── DbError ────────┐                       │
//! │                 ├── ValidationError ──► CoreError ──► ApiError          │
//! │                 └── AuthError ──────────────────┘        │              │
//! │                                                          ▼              │
//! │                                    IntoResponse: status + JSON body     │
//! │                                                                         │
//! │  404 ◄── NotFound          {"success": false,                           │
//! │  400 ◄── Validation         "error": "Продукт с ID 999 не найден"}      │
//! │  401 ◄── Unauthorized                                                   │
//! │  500 ◄── Internal  (details logged, generic message returned)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use assorti_core::{CoreError, ValidationError};
use assorti_db::DbError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;

/// Message returned for every 500.
pub const INTERNAL_MESSAGE: &str = "Внутренняя ошибка сервера";

/// API error returned from handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    /// Machine-readable error kind, decides the HTTP status
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error kinds for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation or business rule failed (400)
    Validation,

    /// Missing or forged Telegram init data (401)
    Unauthorized,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Validation => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Error envelope.
#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::NotFound, message)
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Validation, message)
    }

    pub fn internal() -> Self {
        ApiError::new(ErrorCode::Internal, INTERNAL_MESSAGE)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.message,
        };
        (self.code.status(), Json(body)).into_response()
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let code = if err.is_not_found() {
            ErrorCode::NotFound
        } else if matches!(err, CoreError::Unauthorized(_)) {
            ErrorCode::Unauthorized
        } else {
            ErrorCode::Validation
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError::new(ErrorCode::Unauthorized, err.to_string())
    }
}

/// Converts database errors to API errors.
///
/// Only client-caused failures keep their message; everything else is
/// logged and replaced with [`INTERNAL_MESSAGE`].
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => not_found_for(&entity, id).into(),
            DbError::InsufficientStock {
                product_id,
                available,
                requested,
            } => CoreError::InsufficientStock {
                product_id,
                available,
                requested,
            }
            .into(),
            DbError::UniqueViolation { field, value } => {
                ValidationError::Duplicate { field, value }.into()
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::warn!("Foreign key violation: {}", message);
                ApiError::validation("Связанная запись не существует или используется")
            }
            DbError::CheckViolation { message } => {
                tracing::warn!("Check constraint violation: {}", message);
                ApiError::validation("Недопустимое значение поля")
            }
            other => {
                tracing::error!(error = %other, "Database operation failed");
                ApiError::internal()
            }
        }
    }
}

/// Maps a repository entity name to its not-found error.
fn not_found_for(entity: &str, id: String) -> CoreError {
    match entity {
        "Product" => CoreError::ProductNotFound(id),
        "Category" => CoreError::CategoryNotFound(id),
        "Sale" => CoreError::SaleNotFound(id),
        "Order" => CoreError::OrderNotFound(id),
        _ => CoreError::QrCodeNotFound(id),
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::validation(format!("Некорректное тело запроса: {}", rejection.body_text()))
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::validation(format!("Некорректные параметры запроса: {}", rejection.body_text()))
    }
}

/// Result alias for handlers and services.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let err: ApiError = CoreError::ProductNotFound("999".to_string()).into();
        assert_eq!(err.code.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.message, "Продукт с ID 999 не найден");

        let err: ApiError = ValidationError::InvalidPagination.into();
        assert_eq!(err.code.status(), StatusCode::BAD_REQUEST);

        let err: ApiError = AuthError::InvalidSignature.into();
        assert_eq!(err.code.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_db_not_found_uses_entity_message() {
        let err: ApiError = DbError::not_found("Category", "c-9").into();
        assert_eq!(err.code, ErrorCode::NotFound);
        assert_eq!(err.message, "Категория с ID c-9 не найдена");
    }

    #[test]
    fn test_insufficient_stock_is_bad_request() {
        let err: ApiError = DbError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 2,
            requested: 3,
        }
        .into();
        assert_eq!(err.code, ErrorCode::Validation);
        assert!(err.message.starts_with("Недостаточно товара на складе"));
    }

    #[test]
    fn test_internal_details_are_hidden() {
        let err: ApiError = DbError::Internal("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::Internal);
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }
}
