//! QR code records and images.
//!
//! ```text
//! generate(productId)
//!     │
//!     ├── product missing ──────────────► 404
//!     ▼
//! code = "PRODUCT:<id>:<name>"
//!     │
//!     ▼
//! INSERT ... ON CONFLICT(product_id) DO NOTHING
//! SELECT by product_id  ──► existing row wins, same code every time
//! ```

use assorti_core::validation::validate_id;
use assorti_core::{qr, CoreError, QrCode, QrCodeRef, QrGeneratePayload};
use assorti_db::Database;
use tracing::{error, info};

use super::products;
use crate::error::{ApiError, ApiResult};
use crate::qr_image;

/// Returns the product's QR record, creating it on first use.
pub async fn generate(db: &Database, payload: &QrGeneratePayload) -> ApiResult<QrCodeRef> {
    let product_id = validate_id("Товар", payload.product_id.as_deref())?;
    let product = products::get(db, &product_id).await?;

    let code = qr::encode(&product.id, &product.name);
    let record = db.qrcodes().get_or_create(&product.id, &code).await?;
    info!(product_id = %product.id, "QR code ready");

    Ok(record.into())
}

pub async fn get(db: &Database, product_id: &str) -> ApiResult<QrCodeRef> {
    find(db, product_id).await.map(QrCodeRef::from)
}

pub async fn list(db: &Database) -> ApiResult<Vec<QrCode>> {
    Ok(db.qrcodes().list().await?)
}

/// PNG bytes of an already generated code.
pub async fn image(db: &Database, product_id: &str) -> ApiResult<Vec<u8>> {
    let record = find(db, product_id).await?;

    qr_image::render_png(&record.code).map_err(|e| {
        error!(product_id = %product_id, error = %e, "QR rendering failed");
        ApiError::internal()
    })
}

async fn find(db: &Database, product_id: &str) -> ApiResult<QrCode> {
    db.qrcodes()
        .get_by_product(product_id)
        .await?
        .ok_or_else(|| CoreError::QrCodeNotFound(product_id.to_string()).into())
}
