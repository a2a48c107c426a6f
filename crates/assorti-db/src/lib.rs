//! # assorti-db: Database Layer for Assorti Shop
//!
//! SQLite storage for the catalog, sales history, storefront orders and QR
//! payloads, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Assorti Data Flow                                │
//! │                                                                         │
//! │  axum handler (POST /api/sales)                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  service (validates with assorti-core)                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    assorti-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │                │   │  (embedded)  │  │   │
//! │  │   │               │◄───│ Product  Sale  │   │ 0001_initial │  │   │
//! │  │   │ SqlitePool    │    │ Category Order │   │   _schema    │  │   │
//! │  │   │ WAL, FKs on   │    │ QrCode         │   │              │  │   │
//! │  │   └───────────────┘    └────────────────┘   └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite file (assorti.db)                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`pool`] - Connection pool and repository accessors
//! - [`migrations`] - Embedded schema migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table
//!
//! ## Usage
//!
//! ```rust,ignore
//! use assorti_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("assorti.db")).await?;
//! let outcome = db.sales().sell(&product_id, 3).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::category::CategoryRepository;
pub use repository::order::OrderRepository;
pub use repository::product::ProductRepository;
pub use repository::qrcode::QrCodeRepository;
pub use repository::sale::SaleRepository;

/// Generates a new entity id (UUID v4).
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use assorti_core::{Money, NewCategory, NewProduct, Product};

    use crate::{Database, DbConfig};

    pub async fn database() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    /// Inserts a category and a product with the given price and stock.
    pub async fn seed_product(db: &Database, name: &str, price_cents: i64, stock: i64) -> Product {
        let category = db
            .categories()
            .insert(&NewCategory {
                name: format!("Category for {name}"),
                description: None,
                image: None,
            })
            .await
            .unwrap();

        db.products()
            .insert(&NewProduct {
                name: name.to_string(),
                description: None,
                price: Money::from_cents(price_cents),
                stock,
                category_id: category.id,
                barcode: None,
                image: None,
            })
            .await
            .unwrap()
    }
}
