//! # Validation Module
//!
//! Field rules shared by the REST backend and the admin bot.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Bot conversation (assorti-core::conversation)                 │
//! │  ├── Parses typed text (price "99,90", stock "5")                      │
//! │  └── Re-prompts on failure, step does not advance                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: REST service (assorti-api)                                   │
//! │  └── THIS MODULE: payload → validated New* struct                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK (stock >= 0), CHECK (quantity > 0)                          │
//! │  ├── UNIQUE barcode, UNIQUE qrcodes.product_id                         │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lengths are counted in characters, not bytes: product names are mostly
//! Cyrillic.

use crate::error::ValidationError;
use crate::money::Money;
use crate::types::{
    CategoryPayload, NewCategory, NewOrder, NewOrderItem, NewProduct, OrderPayload,
    ProductPayload,
};
use crate::{
    MAX_CATEGORY_NAME_LEN, MAX_DESCRIPTION_LEN, MAX_ITEM_QUANTITY, MAX_PRICE, MAX_PRODUCT_NAME_LEN,
};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

fn validate_name(field: &str, name: &str, max: usize) -> ValidationResult<String> {
    let name = name.trim();
    let len = name.chars().count();

    if len == 0 || len > max {
        return Err(ValidationError::Length {
            field: field.to_string(),
            min: 1,
            max,
        });
    }

    Ok(name.to_string())
}

/// Validates a product name and returns it trimmed.
///
/// ## Rules
/// - 1..=255 characters after trimming
///
/// ```rust
/// use assorti_core::validation::validate_product_name;
///
/// assert_eq!(validate_product_name("  Phone ").unwrap(), "Phone");
/// assert!(validate_product_name("   ").is_err());
/// ```
pub fn validate_product_name(name: &str) -> ValidationResult<String> {
    validate_name("Название", name, MAX_PRODUCT_NAME_LEN)
}

/// Validates a category name and returns it trimmed (1..=100 characters).
pub fn validate_category_name(name: &str) -> ValidationResult<String> {
    validate_name("Название категории", name, MAX_CATEGORY_NAME_LEN)
}

/// Validates an optional description.
///
/// Blank text is treated as "no description".
pub fn validate_description(description: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(text) = description.map(str::trim).filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    if text.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ValidationError::TooLong {
            field: "Описание".to_string(),
            max: MAX_DESCRIPTION_LEN,
        });
    }

    Ok(Some(text.to_string()))
}

/// Trims an optional free-text field; blank becomes `None`.
fn normalize_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validates a required identifier (non-blank after trimming).
pub fn validate_id(field: &str, id: Option<&str>) -> ValidationResult<String> {
    normalize_optional(id).ok_or_else(|| ValidationError::Required {
        field: field.to_string(),
    })
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a product price: strictly positive, at most [`MAX_PRICE`].
pub fn validate_price(price: Money) -> ValidationResult<Money> {
    if !price.is_positive() {
        return Err(ValidationError::MustBePositive {
            field: "Цена".to_string(),
        });
    }
    if price > MAX_PRICE {
        return Err(ValidationError::TooLarge {
            field: "Цена".to_string(),
            max: MAX_PRICE,
        });
    }
    Ok(price)
}

/// Validates a stock level: zero or more.
pub fn validate_stock(stock: i64) -> ValidationResult<i64> {
    if stock < 0 {
        return Err(ValidationError::Negative {
            field: "Остаток".to_string(),
        });
    }
    Ok(stock)
}

/// Validates a quantity for a sale or order line.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<i64> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "Количество".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "Количество".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(qty)
}

// =============================================================================
// Text Parsers (bot input)
// =============================================================================

/// Parses a typed price, accepting `.` or `,` as the decimal separator.
pub fn parse_price(text: &str) -> ValidationResult<Money> {
    validate_price(text.parse()?)
}

/// Parses a typed stock level (integer ≥ 0).
pub fn parse_stock(text: &str) -> ValidationResult<i64> {
    let stock = text.trim().parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: "Остаток".to_string(),
        reason: "ожидается целое число".to_string(),
    })?;
    validate_stock(stock)
}

/// Parses a typed quantity (integer > 0).
pub fn parse_quantity(text: &str) -> ValidationResult<i64> {
    let qty = text.trim().parse::<i64>().map_err(|_| ValidationError::InvalidFormat {
        field: "Количество".to_string(),
        reason: "ожидается целое число".to_string(),
    })?;
    validate_quantity(qty)
}

/// Parses a 1-based pick from a list of `len` entries into a 0-based index.
pub fn parse_choice(text: &str, len: usize) -> ValidationResult<usize> {
    match text.trim().parse::<usize>() {
        Ok(n) if n >= 1 && n <= len => Ok(n - 1),
        _ => Err(ValidationError::InvalidChoice { max: len }),
    }
}

// =============================================================================
// Payload Validators
// =============================================================================

/// Validates a create-product body.
///
/// `name`, `price` and `categoryId` are required; `stock` defaults to 0.
pub fn validate_new_product(payload: &ProductPayload) -> ValidationResult<NewProduct> {
    let name = match payload.name.as_deref() {
        Some(name) => validate_product_name(name)?,
        None => {
            return Err(ValidationError::Required {
                field: "Название".to_string(),
            })
        }
    };
    let price = payload.price.ok_or_else(|| ValidationError::Required {
        field: "Цена".to_string(),
    })?;
    let category_id = validate_id("Категория", payload.category_id.as_deref())?;

    Ok(NewProduct {
        name,
        description: validate_description(payload.description.as_deref())?,
        price: validate_price(price)?,
        stock: validate_stock(payload.stock.unwrap_or(0))?,
        category_id,
        barcode: normalize_optional(payload.barcode.as_deref()),
        image: normalize_optional(payload.image.as_deref()),
    })
}

/// Validates a partial product update. Only supplied fields are checked;
/// the returned payload carries trimmed values.
pub fn validate_product_patch(payload: &ProductPayload) -> ValidationResult<ProductPayload> {
    Ok(ProductPayload {
        name: payload
            .name
            .as_deref()
            .map(validate_product_name)
            .transpose()?,
        description: match payload.description.as_deref() {
            Some(text) => Some(validate_description(Some(text))?.unwrap_or_default()),
            None => None,
        },
        price: payload.price.map(validate_price).transpose()?,
        stock: payload.stock.map(validate_stock).transpose()?,
        category_id: match payload.category_id.as_deref() {
            Some(id) => Some(validate_id("Категория", Some(id))?),
            None => None,
        },
        barcode: payload.barcode.as_deref().map(|b| b.trim().to_string()),
        image: payload.image.as_deref().map(|i| i.trim().to_string()),
    })
}

/// Validates a create-category body.
pub fn validate_new_category(payload: &CategoryPayload) -> ValidationResult<NewCategory> {
    let name = payload.name.as_deref().unwrap_or_default();
    if name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "Название категории".to_string(),
        });
    }

    Ok(NewCategory {
        name: validate_category_name(name)?,
        description: validate_description(payload.description.as_deref())?,
        image: normalize_optional(payload.image.as_deref()),
    })
}

/// Validates a partial category update.
pub fn validate_category_patch(payload: &CategoryPayload) -> ValidationResult<CategoryPayload> {
    Ok(CategoryPayload {
        name: payload
            .name
            .as_deref()
            .map(validate_category_name)
            .transpose()?,
        description: match payload.description.as_deref() {
            Some(text) => Some(validate_description(Some(text))?.unwrap_or_default()),
            None => None,
        },
        image: payload.image.as_deref().map(|i| i.trim().to_string()),
    })
}

/// Validates an order body for `user_id`.
///
/// `total`, when given, must not be negative. When absent the caller prices
/// the order and fills it in, so the returned total is zero.
pub fn validate_new_order(user_id: i64, payload: &OrderPayload) -> ValidationResult<NewOrder> {
    let items = match payload.items.as_deref() {
        Some(items) if !items.is_empty() => items,
        _ => return Err(ValidationError::EmptyOrder),
    };

    let items = items
        .iter()
        .map(|item| {
            Ok(NewOrderItem {
                product_id: validate_id("Товар", item.product_id.as_deref())?,
                quantity: validate_quantity(item.quantity.unwrap_or(0))?,
            })
        })
        .collect::<ValidationResult<Vec<_>>>()?;

    let total = payload.total.unwrap_or_default();
    if total.is_negative() {
        return Err(ValidationError::Negative {
            field: "Сумма".to_string(),
        });
    }

    Ok(NewOrder {
        user_id,
        total,
        items,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
