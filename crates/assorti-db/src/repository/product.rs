//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Partial Updates
//! `update` takes a [`ProductPayload`] where `None` means "leave as is".
//! For the nullable text columns an empty string means "clear":
//!
//! ```text
//! payload.description   column after update
//! ───────────────────   ───────────────────
//! None                  unchanged
//! Some("")              NULL
//! Some("Новинка")       'Новинка'
//! ```

use assorti_core::pagination::Pagination;
use assorti_core::slug::slugify;
use assorti_core::{NewProduct, Page, Product, ProductPayload};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::new_id;

/// Repository for product operations.
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Lists products, newest first.
    pub async fn list(&self, window: Pagination) -> DbResult<Page<Product>> {
        debug!(page = window.page, limit = window.limit, "Listing products");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let total = self.count().await?;
        Ok(Page::new(products, total, window))
    }

    /// Lists one category's products, newest first.
    pub async fn list_by_category(
        &self,
        category_id: &str,
        window: Pagination,
    ) -> DbResult<Page<Product>> {
        debug!(category_id = %category_id, page = window.page, "Listing products by category");

        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE category_id = ?1
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(category_id)
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE category_id = ?1")
            .bind(category_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(products, total, window))
    }

    /// All products of a category, by name. Used for the category detail view.
    pub async fn all_in_category(&self, category_id: &str) -> DbResult<Vec<Product>> {
        let products = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE category_id = ?1 ORDER BY name",
        )
        .bind(category_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(products)
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    pub async fn get_by_barcode(&self, barcode: &str) -> DbResult<Option<Product>> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE barcode = ?1")
            .bind(barcode)
            .fetch_optional(&self.pool)
            .await?;

        Ok(product)
    }

    /// Inserts a validated product. The slug is derived from the name.
    pub async fn insert(&self, product: &NewProduct) -> DbResult<Product> {
        debug!(name = %product.name, "Inserting product");

        let now = Utc::now();

        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, name, slug, description, price_cents, image,
                stock, category_id, barcode, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&product.name)
        .bind(slugify(&product.name))
        .bind(&product.description)
        .bind(product.price)
        .bind(&product.image)
        .bind(product.stock)
        .bind(&product.category_id)
        .bind(&product.barcode)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(product)
    }

    /// Applies a partial update. A new name re-derives the slug.
    pub async fn update(&self, id: &str, patch: &ProductPayload) -> DbResult<Product> {
        debug!(id = %id, "Updating product");

        let now = Utc::now();
        let slug = patch.name.as_deref().map(slugify);

        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products SET
                name        = COALESCE(?2, name),
                slug        = COALESCE(?3, slug),
                description = CASE WHEN ?4 IS NULL THEN description
                                   WHEN ?4 = '' THEN NULL ELSE ?4 END,
                price_cents = COALESCE(?5, price_cents),
                stock       = COALESCE(?6, stock),
                category_id = COALESCE(?7, category_id),
                barcode     = CASE WHEN ?8 IS NULL THEN barcode
                                   WHEN ?8 = '' THEN NULL ELSE ?8 END,
                image       = CASE WHEN ?9 IS NULL THEN image
                                   WHEN ?9 = '' THEN NULL ELSE ?9 END,
                updated_at  = ?10
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(slug)
        .bind(&patch.description)
        .bind(patch.price)
        .bind(patch.stock)
        .bind(&patch.category_id)
        .bind(&patch.barcode)
        .bind(&patch.image)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Sets the stock level to an absolute value (manual correction).
    pub async fn set_stock(&self, id: &str, stock: i64) -> DbResult<Product> {
        debug!(id = %id, stock = stock, "Setting stock");

        let product = sqlx::query_as::<_, Product>(
            "UPDATE products SET stock = ?2, updated_at = ?3 WHERE id = ?1 RETURNING *",
        )
        .bind(id)
        .bind(stock)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        product.ok_or_else(|| DbError::not_found("Product", id))
    }

    /// Deletes a product. Fails with `ForeignKeyViolation` while sales or
    /// order items reference it; its QR record goes with it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
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
    use assorti_core::{Money, PageRequest};

    #[tokio::test]
    async fn test_insert_derives_slug() {
        let db = database().await;
        let product = seed_product(&db, "Умные Часы  X", 499900, 3).await;

        assert_eq!(product.slug, "умные-часы-x");
        assert_eq!(product.price, Money::from_cents(499900));
        assert_eq!(product.stock, 3);

        let loaded = db.products().get_by_id(&product.id).await.unwrap().unwrap();
        assert_eq!(loaded, product);
    }

    #[tokio::test]
    async fn test_list_paginates_newest_first() {
        let db = database().await;
        for i in 0..12 {
            seed_product(&db, &format!("P{i}"), 100, 1).await;
        }

        let window = PageRequest::new(2, 5).normalize().unwrap();
        let page = db.products().list(window).await.unwrap();

        assert_eq!(page.total, 12);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.data.len(), 5);
        assert_eq!(page.data[0].name, "P6");

        let last = PageRequest::new(3, 5).normalize().unwrap();
        assert_eq!(db.products().list(last).await.unwrap().data.len(), 2);
    }

    #[tokio::test]
    async fn test_partial_update() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;

        let updated = db
            .products()
            .update(
                &product.id,
                &ProductPayload {
                    name: Some("Phone Pro".to_string()),
                    description: Some("Флагман".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Phone Pro");
        assert_eq!(updated.slug, "phone-pro");
        assert_eq!(updated.description.as_deref(), Some("Флагман"));
        assert_eq!(updated.price, product.price);
        assert_eq!(updated.stock, 5);

        let cleared = db
            .products()
            .update(
                &product.id,
                &ProductPayload {
                    description: Some(String::new()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(cleared.description, None);
        assert_eq!(cleared.name, "Phone Pro");
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = database().await;
        let err = db
            .products()
            .update("nope", &ProductPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));

        let err = db.products().set_stock("nope", 1).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_barcode_lookup_and_uniqueness() {
        let db = database().await;
        let product = seed_product(&db, "Milk", 8990, 10).await;

        db.products()
            .update(
                &product.id,
                &ProductPayload {
                    barcode: Some("4601234567890".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let found = db.products().get_by_barcode("4601234567890").await.unwrap();
        assert_eq!(found.map(|p| p.id), Some(product.id.clone()));

        let other = seed_product(&db, "Kefir", 7990, 10).await;
        let err = db
            .products()
            .update(
                &other.id,
                &ProductPayload {
                    barcode: Some("4601234567890".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_negative_stock_rejected_by_schema() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;

        let err = db.products().set_stock(&product.id, -1).await.unwrap_err();
        assert!(matches!(err, DbError::CheckViolation { .. }));
    }

    #[tokio::test]
    async fn test_unknown_category_rejected() {
        let db = database().await;
        let err = db
            .products()
            .insert(&NewProduct {
                name: "Orphan".to_string(),
                description: None,
                price: Money::from_cents(100),
                stock: 0,
                category_id: "missing".to_string(),
                barcode: None,
                image: None,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_delete() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 5).await;

        db.products().delete(&product.id).await.unwrap();
        assert!(db.products().get_by_id(&product.id).await.unwrap().is_none());

        let err = db.products().delete(&product.id).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_by_category() {
        let db = database().await;
        let phone = seed_product(&db, "Phone", 10000, 5).await;
        seed_product(&db, "Table", 50000, 1).await;

        let window = PageRequest::default().normalize().unwrap();
        let page = db
            .products()
            .list_by_category(&phone.category_id, window)
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(page.data[0].id, phone.id);
        assert_eq!(
            db.products().all_in_category(&phone.category_id).await.unwrap().len(),
            1
        );
    }
}
