//! Product catalog operations.

use assorti_core::validation::{validate_new_product, validate_product_patch, validate_stock};
use assorti_core::{
    CoreError, Page, PageRequest, Product, ProductPayload, StockPayload, ValidationError,
};
use assorti_db::Database;
use tracing::{info, warn};

use super::in_use;
use crate::error::ApiResult;

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<Product>> {
    let window = request.normalize()?;
    Ok(db.products().list(window).await?)
}

pub async fn get(db: &Database, id: &str) -> ApiResult<Product> {
    db.products()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(id.to_string()).into())
}

pub async fn get_by_barcode(db: &Database, barcode: &str) -> ApiResult<Product> {
    db.products()
        .get_by_barcode(barcode)
        .await?
        .ok_or_else(|| CoreError::BarcodeNotFound(barcode.to_string()).into())
}

pub async fn list_by_category(
    db: &Database,
    category_id: &str,
    request: PageRequest,
) -> ApiResult<Page<Product>> {
    let window = request.normalize()?;
    if !db.categories().exists(category_id).await? {
        return Err(CoreError::CategoryNotFound(category_id.to_string()).into());
    }
    Ok(db.products().list_by_category(category_id, window).await?)
}

pub async fn create(db: &Database, payload: &ProductPayload) -> ApiResult<Product> {
    let product = validate_new_product(payload).inspect_err(|e| {
        warn!(error = %e, "Product rejected");
    })?;
    ensure_category(db, &product.category_id).await?;

    let product = db.products().insert(&product).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");
    Ok(product)
}

pub async fn update(db: &Database, id: &str, payload: &ProductPayload) -> ApiResult<Product> {
    let patch = validate_product_patch(payload)?;
    if let Some(category_id) = patch.category_id.as_deref() {
        ensure_category(db, category_id).await?;
    }

    let product = db.products().update(id, &patch).await?;
    info!(product_id = %product.id, "Product updated");
    Ok(product)
}

/// Manual stock correction.
pub async fn set_stock(db: &Database, id: &str, payload: &StockPayload) -> ApiResult<Product> {
    let stock = payload.stock.ok_or_else(|| ValidationError::Required {
        field: "Количество".to_string(),
    })?;
    let stock = validate_stock(stock)?;

    let product = db.products().set_stock(id, stock).await?;
    info!(product_id = %product.id, stock = stock, "Stock set");
    Ok(product)
}

pub async fn delete(db: &Database, id: &str) -> ApiResult<()> {
    db.products().delete(id).await.map_err(in_use("Товар"))?;
    info!(product_id = %id, "Product deleted");
    Ok(())
}

async fn ensure_category(db: &Database, category_id: &str) -> ApiResult<()> {
    if db.categories().exists(category_id).await? {
        Ok(())
    } else {
        Err(ValidationError::UnknownReference {
            field: "Категория".to_string(),
            id: category_id.to_string(),
        }
        .into())
    }
}
