//! # Category Repository
//!
//! Database operations for categories. Slugs are derived on write and are
//! not unique.

use assorti_core::pagination::Pagination;
use assorti_core::slug::slugify;
use assorti_core::{Category, CategoryPayload, NewCategory, Page};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::new_id;

/// Repository for category operations.
#[derive(Debug, Clone)]
pub struct CategoryRepository {
    pool: SqlitePool,
}

impl CategoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        CategoryRepository { pool }
    }

    /// Lists categories, newest first.
    pub async fn list(&self, window: Pagination) -> DbResult<Page<Category>> {
        debug!(page = window.page, limit = window.limit, "Listing categories");

        let categories = sqlx::query_as::<_, Category>(
            r#"
            SELECT * FROM categories
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1 OFFSET ?2
            "#,
        )
        .bind(window.limit)
        .bind(window.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;

        Ok(Page::new(categories, total, window))
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Category>> {
        let category = sqlx::query_as::<_, Category>("SELECT * FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    pub async fn exists(&self, id: &str) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT 1 FROM categories WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    pub async fn insert(&self, category: &NewCategory) -> DbResult<Category> {
        debug!(name = %category.name, "Inserting category");

        let category = sqlx::query_as::<_, Category>(
            r#"
            INSERT INTO categories (id, name, slug, description, image, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)
            RETURNING *
            "#,
        )
        .bind(new_id())
        .bind(&category.name)
        .bind(slugify(&category.name))
        .bind(&category.description)
        .bind(&category.image)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    /// Applies a partial update; an empty description or image clears it.
    pub async fn update(&self, id: &str, patch: &CategoryPayload) -> DbResult<Category> {
        debug!(id = %id, "Updating category");

        let slug = patch.name.as_deref().map(slugify);

        let category = sqlx::query_as::<_, Category>(
            r#"
            UPDATE categories SET
                name        = COALESCE(?2, name),
                slug        = COALESCE(?3, slug),
                description = CASE WHEN ?4 IS NULL THEN description
                                   WHEN ?4 = '' THEN NULL ELSE ?4 END,
                image       = CASE WHEN ?5 IS NULL THEN image
                                   WHEN ?5 = '' THEN NULL ELSE ?5 END,
                updated_at  = ?6
            WHERE id = ?1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&patch.name)
        .bind(slug)
        .bind(&patch.description)
        .bind(&patch.image)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await?;

        category.ok_or_else(|| DbError::not_found("Category", id))
    }

    /// Deletes a category. Fails with `ForeignKeyViolation` while it still
    /// has products.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting category");

        let result = sqlx::query("DELETE FROM categories WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Category", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{database, seed_product};
    use assorti_core::PageRequest;

    fn new_category(name: &str) -> NewCategory {
        NewCategory {
            name: name.to_string(),
            description: None,
            image: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_slug() {
        let db = database().await;
        let category = db.categories().insert(&new_category("Электроника")).await.unwrap();

        assert_eq!(category.slug, "электроника");
        assert!(db.categories().exists(&category.id).await.unwrap());
        assert!(!db.categories().exists("missing").await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_slugs_allowed() {
        let db = database().await;
        let a = db.categories().insert(&new_category("Дом и сад")).await.unwrap();
        let b = db.categories().insert(&new_category("дом  и сад")).await.unwrap();
        assert_eq!(a.slug, b.slug);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn test_update_renames_and_reslugs() {
        let db = database().await;
        let category = db.categories().insert(&new_category("Phones")).await.unwrap();

        let updated = db
            .categories()
            .update(
                &category.id,
                &CategoryPayload {
                    name: Some("Smart Phones".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.slug, "smart-phones");
        assert_eq!(updated.created_at, category.created_at);
    }

    #[tokio::test]
    async fn test_delete_with_products_is_restricted() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 1).await;

        let err = db.categories().delete(&product.category_id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));

        db.products().delete(&product.id).await.unwrap();
        db.categories().delete(&product.category_id).await.unwrap();
    }

    #[tokio::test]
    async fn test_list() {
        let db = database().await;
        for name in ["A", "B", "C"] {
            db.categories().insert(&new_category(name)).await.unwrap();
        }
        let page = db
            .categories()
            .list(PageRequest::new(1, 2).normalize().unwrap())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(page.data[0].name, "C");
    }
}
