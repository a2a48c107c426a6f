//! # Error Types
//!
//! Domain-specific error types for assorti-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  assorti-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule failures (not found, stock)      │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  assorti-db errors (separate crate)                                    │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  assorti-api errors                                                    │
//! │  └── ApiError         - HTTP status + `{success:false, error}` body     │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → ApiError → client / bot           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Messages are user-facing. The storefront and the bot show them verbatim,
//! so they are written in Russian.

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// No product with this id.
    #[error("Продукт с ID {0} не найден")]
    ProductNotFound(String),

    /// No product carries this barcode.
    #[error("Товар со штрих-кодом {0} не найден")]
    BarcodeNotFound(String),

    /// No category with this id.
    #[error("Категория с ID {0} не найдена")]
    CategoryNotFound(String),

    #[error("Продажа не найдена")]
    SaleNotFound(String),

    /// Order is missing or belongs to another user. Both cases look the
    /// same to the caller.
    #[error("Заказ не найден")]
    OrderNotFound(String),

    /// No QR record has been generated for this product yet.
    #[error("QR-код не найден")]
    QrCodeNotFound(String),

    /// Insufficient stock to complete sale.
    ///
    /// ## User Workflow
    /// ```text
    /// Bot: sell 5 × Phone
    ///      │
    ///      ▼
    /// Conditional update: stock >= 5? (stock = 3)
    ///      │
    ///      ▼
    /// InsufficientStock { available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// HTTP 400 "Недостаточно товара на складе: доступно 3, запрошено 5"
    /// ```
    #[error("Недостаточно товара на складе: доступно {available}, запрошено {requested}")]
    InsufficientStock {
        product_id: String,
        available: i64,
        requested: i64,
    },

    /// Caller is not authenticated (missing or forged Telegram init data).
    #[error("Не авторизован: {0}")]
    Unauthorized(String),

    /// Validation error (wraps ValidationError).
    #[error("{0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// True for every "does not exist" variant.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            CoreError::ProductNotFound(_)
                | CoreError::BarcodeNotFound(_)
                | CoreError::CategoryNotFound(_)
                | CoreError::SaleNotFound(_)
                | CoreError::OrderNotFound(_)
                | CoreError::QrCodeNotFound(_)
        )
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// `field` holds the human label ("Название", "Цена") so the bot can show
/// the message as-is when it re-prompts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field}: обязательное поле")]
    Required { field: String },

    /// Text length outside the allowed range.
    #[error("{field}: длина должна быть от {min} до {max} символов")]
    Length { field: String, min: usize, max: usize },

    /// Text longer than allowed.
    #[error("{field}: не более {max} символов")]
    TooLong { field: String, max: usize },

    /// Value must be strictly positive.
    #[error("{field}: значение должно быть больше 0")]
    MustBePositive { field: String },

    /// Value must be zero or more.
    #[error("{field}: значение не может быть отрицательным")]
    Negative { field: String },

    /// Amount above the allowed maximum.
    #[error("{field}: не более {max} руб.")]
    TooLarge { field: String, max: Money },

    /// Computed amount does not fit into a ruble total.
    #[error("{field}: слишком большое значение")]
    Overflow { field: String },

    /// Numeric value is out of range.
    #[error("{field}: значение должно быть от {min} до {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Text could not be parsed into the expected shape.
    #[error("{field}: неверный формат ({reason})")]
    InvalidFormat { field: String, reason: String },

    /// `page` or `limit` below 1.
    #[error("Page и limit должны быть больше 0")]
    InvalidPagination,

    /// Order without line items.
    #[error("Заказ должен содержать хотя бы одну позицию")]
    EmptyOrder,

    /// 1-based list pick outside `1..=max`.
    #[error("Выберите номер от 1 до {max}")]
    InvalidChoice { max: usize },

    /// Foreign key points at a record that does not exist.
    #[error("{field}: запись {id} не существует")]
    UnknownReference { field: String, id: String },

    /// Record is still referenced and cannot be deleted.
    #[error("{entity} используется и не может быть удалён(а)")]
    InUse { entity: String },

    /// Unique value already taken (e.g. barcode).
    #[error("{field} '{value}' уже существует")]
    Duplicate { field: String, value: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            product_id: "p-1".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Недостаточно товара на складе: доступно 3, запрошено 5"
        );

        let err = CoreError::ProductNotFound("999".to_string());
        assert_eq!(err.to_string(), "Продукт с ID 999 не найден");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Length {
            field: "Название".to_string(),
            min: 1,
            max: 255,
        };
        assert_eq!(
            err.to_string(),
            "Название: длина должна быть от 1 до 255 символов"
        );

        assert_eq!(
            ValidationError::InvalidPagination.to_string(),
            "Page и limit должны быть больше 0"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::EmptyOrder.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
        assert!(!core_err.is_not_found());
        // Wrapper is transparent to the message
        assert_eq!(
            core_err.to_string(),
            "Заказ должен содержать хотя бы одну позицию"
        );
    }
}
