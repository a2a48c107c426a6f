//! # Sale Repository
//!
//! The only place stock goes down.
//!
//! ## Atomic Sale
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    UPDATE products                                                      │
//! │       SET stock = stock - :qty                                          │
//! │     WHERE id = :id AND stock >= :qty      ◄── guard and write in one    │
//! │    RETURNING *                                                          │
//! │      │                                                                  │
//! │      ├── no row ─► SELECT stock ─► none    → NotFound                   │
//! │      │                          └► some(n) → InsufficientStock          │
//! │      │             (ROLLBACK, nothing written)                          │
//! │      ▼                                                                  │
//! │    INSERT INTO sales (qty, price_cents = product.price_cents)           │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent sales of the last unit serialize on SQLite's write lock;
//! the second one's `WHERE stock >= qty` sees the first one's decrement.

use assorti_core::pagination::Pagination;
use assorti_core::{Money, Page, Product, Sale, SaleDetails, SaleOutcome};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::new_id;

/// A sale row joined with its product's name.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: String,
    product_id: String,
    quantity: i64,
    price_cents: Money,
    created_at: DateTime<Utc>,
    product_name: String,
}

impl From<SaleRow> for SaleDetails {
    fn from(row: SaleRow) -> Self {
        SaleDetails {
            sale: Sale {
                id: row.id,
                product_id: row.product_id,
                quantity: row.quantity,
                price: row.price_cents,
                created_at: row.created_at,
            },
            product_name: row.product_name,
        }
    }
}

/// Repository for sale operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Decrements stock and records the sale in one transaction.
    ///
    /// `quantity` must already be validated as positive.
    pub async fn sell(&self, product_id: &str, quantity: i64) -> DbResult<SaleOutcome> {
        debug!(product_id = %product_id, quantity = quantity, "Selling product");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET stock = stock - ?2, updated_at = ?3
            WHERE id = ?1 AND stock >= ?2
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(quantity)
        .bind(now)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(product) = product else {
            let available: Option<i64> =
                sqlx::query_scalar("SELECT stock FROM products WHERE id = ?1")
                    .bind(product_id)
                    .fetch_optional(&mut *tx)
                    .await?;
            tx.rollback().await?;

            return Err(match available {
                None => DbError::not_found("Product", product_id),
                Some(available) => DbError::InsufficientStock {
                    product_id: product_id.to_string(),
                    available,
                    requested: quantity,
                },
            });
        };

        let sale = Sale {
            id: new_id(),
            product_id: product.id.clone(),
            quantity,
            price: product.price,
            created_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO sales (id, product_id, quantity, price_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.product_id)
        .bind(sale.quantity)
        .bind(sale.price)
        .bind(sale.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(
            sale_id = %sale.id,
            product_id = %product.id,
            quantity = quantity,
            stock_left = product.stock,
            "Sale recorded"
        );

        Ok(SaleOutcome { sale, product })
    }

    /// Lists sales, newest first, with product names.
    pub async fn list(&self, window: Pagination) -> DbResult<Page<SaleDetails>> {
        let rows = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT s.id, s.product_id, s.quantity, s.price_cents, s.created_at,
                   p.name AS product_name
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            ORDER BY s.created_at DESC, s.rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(rows.into_iter().map(SaleDetails::from).collect(), total, window))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SaleDetails>> {
        let row = sqlx::query_as::<_, SaleRow>(
            r#"
            SELECT s.id, s.product_id, s.quantity, s.price_cents, s.created_at,
                   p.name AS product_name
            FROM sales s
            INNER JOIN products p ON p.id = s.product_id
            WHERE s.id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SaleDetails::from))
    }

    /// Number of sales recorded for a product.
    pub async fn count_for_product(&self, product_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE product_id = ?1")
            .bind(product_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{database, seed_product};
    use crate::{Database, DbConfig};
    use assorti_core::{PageRequest, ProductPayload};

    #[tokio::test]
    async fn test_sell_decrements_and_snapshots_price() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;

        let outcome = db.sales().sell(&product.id, 3).await.unwrap();

        assert_eq!(outcome.product.stock, 2);
        assert_eq!(outcome.sale.quantity, 3);
        assert_eq!(outcome.sale.price, Money::from_cents(10000));
        assert_eq!(outcome.sale.total(), Money::from_cents(30000));

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
    }

    #[tokio::test]
    async fn test_insufficient_stock_writes_nothing() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;
        db.sales().sell(&product.id, 3).await.unwrap();

        let err = db.sales().sell(&product.id, 3).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::InsufficientStock {
                available: 2,
                requested: 3,
                ..
            }
        ));

        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 2);
        assert_eq!(db.sales().count_for_product(&product.id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_sell_exact_stock_reaches_zero() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 2).await;

        let outcome = db.sales().sell(&product.id, 2).await.unwrap();
        assert_eq!(outcome.product.stock, 0);
        assert!(db.sales().sell(&product.id, 1).await.is_err());
    }

    #[tokio::test]
    async fn test_sell_unknown_product() {
        let db = database().await;
        let err = db.sales().sell("missing", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_price_change_does_not_rewrite_history() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;
        let first = db.sales().sell(&product.id, 1).await.unwrap();

        db.products()
            .update(
                &product.id,
                &ProductPayload {
                    price: Some(Money::from_cents(12000)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        db.sales().sell(&product.id, 1).await.unwrap();

        let old = db.sales().get_by_id(&first.sale.id).await.unwrap().unwrap();
        assert_eq!(old.sale.price, Money::from_cents(10000));
        assert_eq!(old.product_name, "Phone");

        let page = db
            .sales()
            .list(PageRequest::default().normalize().unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 2);
        assert_eq!(page.data[0].sale.price, Money::from_cents(12000));
    }

    #[tokio::test]
    async fn test_concurrent_sales_never_oversell() {
        let path = std::env::temp_dir().join(format!("assorti-sales-{}.db", crate::new_id()));
        let db = Database::new(DbConfig::new(&path).max_connections(4))
            .await
            .unwrap();
        let product = seed_product(&db, "Last units", 10000, 5).await;

        let mut handles = Vec::new();
        for _ in 0..10 {
            let sales = db.sales();
            let id = product.id.clone();
            handles.push(tokio::spawn(async move { sales.sell(&id, 1).await }));
        }

        let mut sold = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                sold += 1;
            }
        }

        assert_eq!(sold, 5);
        let stored = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(stored.stock, 0);
        assert_eq!(db.sales().count_for_product(&product.id).await.unwrap(), 5);

        db.close().await;
        let _ = std::fs::remove_file(&path);
    }
}
