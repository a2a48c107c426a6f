//! # QR Code Repository
//!
//! At most one QR record per product (`UNIQUE (product_id)`).
//! `get_or_create` is idempotent: a racing insert loses quietly and both
//! callers read the same row.

use assorti_core::QrCode;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::new_id;

/// Repository for QR code records.
#[derive(Debug, Clone)]
pub struct QrCodeRepository {
    pool: SqlitePool,
}

impl QrCodeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QrCodeRepository { pool }
    }

    /// Returns the product's QR record, inserting `code` if none exists.
    pub async fn get_or_create(&self, product_id: &str, code: &str) -> DbResult<QrCode> {
        debug!(product_id = %product_id, "Ensuring QR code");

        sqlx::query(
            r#"
            INSERT INTO qrcodes (id, product_id, code, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT (product_id) DO NOTHING
            "#,
        )
        .bind(new_id())
        .bind(product_id)
        .bind(code)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_by_product(product_id)
            .await?
            .ok_or_else(|| DbError::not_found("QrCode", product_id))
    }

    pub async fn get_by_product(&self, product_id: &str) -> DbResult<Option<QrCode>> {
        let qr = sqlx::query_as::<_, QrCode>("SELECT * FROM qrcodes WHERE product_id = ?1")
            .bind(product_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(qr)
    }

    pub async fn list(&self) -> DbResult<Vec<QrCode>> {
        let codes = sqlx::query_as::<_, QrCode>(
            "SELECT * FROM qrcodes ORDER BY created_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(codes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{database, seed_product};
    use assorti_core::qr;

    #[tokio::test]
    async fn test_get_or_create_is_idempotent() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 1).await;
        let code = qr::encode(&product.id, &product.name);

        let first = db.qrcodes().get_or_create(&product.id, &code).await.unwrap();
        let second = db
            .qrcodes()
            .get_or_create(&product.id, "PRODUCT:ignored:second")
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(second.code, code);
        assert_eq!(db.qrcodes().list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_deleted_product_takes_its_qr_code() {
        let db = database().await;
        let product = seed_product(&db, "Phone", 10000, 1).await;
        db.qrcodes()
            .get_or_create(&product.id, &qr::encode(&product.id, &product.name))
            .await
            .unwrap();

        db.products().delete(&product.id).await.unwrap();
        assert!(db.qrcodes().get_by_product(&product.id).await.unwrap().is_none());
    }
}
