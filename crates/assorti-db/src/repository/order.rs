//! # Order Repository
//!
//! Storefront orders. An order and its items are written in one
//! transaction; reads always return the items with the order.

use std::collections::HashMap;

use assorti_core::pagination::Pagination;
use assorti_core::{NewOrder, Order, OrderItem, Page};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::new_id;

/// Repository for order operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts the order and all its items atomically.
    pub async fn create(&self, order: &NewOrder) -> DbResult<Order> {
        debug!(user_id = order.user_id, items = order.items.len(), "Creating order");

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let mut created = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, user_id, total_cents, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?4)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(order.user_id)
        .bind(order.total)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for item in &order.items {
            let item = sqlx::query_as::<_, OrderItem>(
                r#"
                INSERT INTO order_items (id, order_id, product_id, quantity)
                VALUES (?1, ?2, ?3, ?4)
                RETURNING *
                "#,
            )
            .bind(new_id())
            .bind(&created.id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .fetch_one(&mut *tx)
            .await?;

            created.items.push(item);
        }

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        info!(order_id = %created.id, user_id = created.user_id, "Order created");
        Ok(created)
    }

    /// Lists one user's orders, newest first, items included.
    pub async fn list_for_user(&self, user_id: i64, window: Pagination) -> DbResult<Page<Order>> {
        let mut orders = sqlx::query_as::<_, Order>(
            r#"
            SELECT * FROM orders
            WHERE user_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(user_id)
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, OrderItem>(
            r#"
            SELECT oi.* FROM order_items oi
            WHERE oi.order_id IN (
                SELECT id FROM orders
                WHERE user_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2 OFFSET ?3
            )
            ORDER BY oi.rowid
            "#,
        )
        .bind(user_id)
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let mut by_order: HashMap<String, Vec<OrderItem>> = HashMap::new();
        for item in items {
            by_order.entry(item.order_id.clone()).or_default().push(item);
        }
        for order in &mut orders {
            order.items = by_order.remove(&order.id).unwrap_or_default();
        }

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE user_id = ?1")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(orders, total, window))
    }

    /// Loads an order only if it belongs to `user_id`.
    pub async fn get_for_user(&self, id: &str, user_id: i64) -> DbResult<Option<Order>> {
        let order = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders WHERE id = ?1 AND user_id = ?2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(mut order) = order else {
            return Ok(None);
        };

        order.items = sqlx::query_as::<_, OrderItem>(
            "SELECT * FROM order_items WHERE order_id = ?1 ORDER BY rowid",
        )
        .bind(&order.id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some(order))
    }
}
