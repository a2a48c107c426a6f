//! # Domain Types
//!
//! Entities persisted by assorti-db and the request payloads that create or
//! change them.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  ┌──────────────┐  1   n  ┌──────────────┐  1   n  ┌──────────────┐    │
//! │  │   Category   │◄────────│   Product    │────────►│     Sale     │    │
//! │  │  name, slug  │         │  price,stock │         │ qty, price*  │    │
//! │  └──────────────┘         └──────┬───────┘         └──────────────┘    │
//! │                                  │ 1                 * price snapshot   │
//! │                        ┌─────────┴─────────┐                            │
//! │                        │ 0..1              │ n                          │
//! │                 ┌──────┴───────┐   ┌───────┴──────┐  n   1 ┌────────┐  │
//! │                 │    QrCode    │   │  OrderItem   │───────►│ Order  │  │
//! │                 │ PRODUCT:id:n │   │  qty         │        │ userId │  │
//! │                 └──────────────┘   └──────────────┘        └────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Payloads vs Validated Inputs
//! `*Payload` structs mirror request bodies with every field optional, so a
//! missing field becomes a readable [`ValidationError`](crate::ValidationError)
//! instead of a deserializer rejection. The `validation` module turns them
//! into the `New*` structs repositories accept.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub name: String,

    /// Derived from `name`, not unique.
    pub slug: String,

    pub description: Option<String>,

    /// Current price, stored in kopecks.
    #[ts(type = "number")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,

    /// Image URL.
    pub image: Option<String>,

    /// Sellable units on hand, never negative.
    pub stock: i64,

    pub category_id: String,

    /// EAN/UPC or any shop-internal code. Unique when present.
    pub barcode: Option<String>,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Checks whether `quantity` units can be sold right now.
    #[inline]
    pub fn can_sell(&self, quantity: i64) -> bool {
        quantity > 0 && self.stock >= quantity
    }
}

/// Request body for `POST /products` and `PUT /products/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct ProductPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    #[ts(type = "number | null")]
    pub price: Option<Money>,
    pub stock: Option<i64>,
    pub category_id: Option<String>,
    pub barcode: Option<String>,
    pub image: Option<String>,
}

/// A validated product ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: Money,
    pub stock: i64,
    pub category_id: String,
    pub barcode: Option<String>,
    pub image: Option<String>,
}

/// Request body for `PUT /products/{id}/stock`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(default)]
pub struct StockPayload {
    pub stock: Option<i64>,
}

// =============================================================================
// Category
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub image: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Category detail view, as returned by `GET /categories/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CategoryWithProducts {
    #[serde(flatten)]
    pub category: Category,
    pub products: Vec<Product>,
}

/// Request body for `POST /categories` and `PUT /categories/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryPayload {
    pub name: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub description: Option<String>,
    pub image: Option<String>,
}

// =============================================================================
// Sale
// =============================================================================

/// An immutable record of a stock decrement.
///
/// `price` is the unit price frozen at the moment of sale, so later price
/// edits never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    pub id: String,
    pub product_id: String,
    pub quantity: i64,
    #[ts(type = "number")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "price_cents"))]
    pub price: Money,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Sale {
    /// Unit price × quantity.
    #[inline]
    pub fn total(&self) -> Money {
        self.price * self.quantity
    }
}

/// Sale joined with the product name, for history listings.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SaleDetails {
    #[serde(flatten)]
    pub sale: Sale,
    pub product_name: String,
}

/// Result of a successful sale: the record plus the product after the
/// stock decrement.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleOutcome {
    pub sale: Sale,
    pub product: Product,
}

/// Request body for `POST /sales`.
///
/// A client-sent `price` is accepted for compatibility and ignored: the
/// sale always records the stored product price.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct SalePayload {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    #[ts(type = "number | null")]
    pub price: Option<Money>,
}

// =============================================================================
// Order
// =============================================================================

/// A storefront order placed from the Telegram WebApp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    /// Telegram user id of the buyer.
    pub user_id: i64,
    #[ts(type = "number")]
    #[cfg_attr(feature = "sqlx", sqlx(rename = "total_cents"))]
    pub total: Money,
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub product_id: String,
    pub quantity: i64,
}

/// Request body for `POST /orders`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderPayload {
    pub items: Option<Vec<OrderItemPayload>>,
    /// Client-computed total. When absent the server prices the order.
    #[ts(type = "number | null")]
    pub total: Option<Money>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderItemPayload {
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
}

/// A validated order line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrderItem {
    pub product_id: String,
    pub quantity: i64,
}

/// A validated order ready for insertion.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub user_id: i64,
    pub total: Money,
    pub items: Vec<NewOrderItem>,
}

// =============================================================================
// QR Code
// =============================================================================

/// The stored QR payload for a product. At most one per product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QrCode {
    pub id: String,
    pub product_id: String,
    /// `PRODUCT:<id>:<name>`, see [`crate::qr`].
    pub code: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Short form returned by the QR endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct QrCodeRef {
    pub code: String,
    pub product_id: String,
}

impl From<QrCode> for QrCodeRef {
    fn from(qr: QrCode) -> Self {
        QrCodeRef {
            code: qr.code,
            product_id: qr.product_id,
        }
    }
}

/// Request body for `POST /qrcodes/generate`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase", default)]
pub struct QrGeneratePayload {
    pub product_id: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn product(stock: i64) -> Product {
        Product {
            id: "p-1".to_string(),
            name: "Phone".to_string(),
            slug: "phone".to_string(),
            description: None,
            price: Money::from_major(100),
            image: None,
            stock,
            category_id: "c-1".to_string(),
            barcode: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_can_sell() {
        let p = product(5);
        assert!(p.can_sell(5));
        assert!(!p.can_sell(6));
        assert!(!p.can_sell(0));
    }

    #[test]
    fn test_product_json_is_camel_case() {
        let json = serde_json::to_value(product(2)).unwrap();
        assert_eq!(json["categoryId"], "c-1");
        assert_eq!(json["price"], 100);
        assert!(json.get("createdAt").is_some());
    }

    #[test]
    fn test_payload_missing_fields_default_to_none() {
        let payload: ProductPayload = serde_json::from_str(r#"{"name":"Phone"}"#).unwrap();
        assert_eq!(payload.name.as_deref(), Some("Phone"));
        assert!(payload.price.is_none());
        assert!(payload.category_id.is_none());

        let payload: SalePayload =
            serde_json::from_str(r#"{"productId":"p-1","quantity":3,"price":1.5}"#).unwrap();
        assert_eq!(payload.quantity, Some(3));
        assert_eq!(payload.price, Some(Money::from_cents(150)));
    }

    #[test]
    fn test_category_detail_flattens() {
        let category = Category {
            id: "c-1".to_string(),
            name: "Электроника".to_string(),
            slug: "электроника".to_string(),
            description: None,
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_value(CategoryWithProducts {
            category,
            products: vec![product(1)],
        })
        .unwrap();
        assert_eq!(json["slug"], "электроника");
        assert_eq!(json["products"].as_array().unwrap().len(), 1);
    }
}
