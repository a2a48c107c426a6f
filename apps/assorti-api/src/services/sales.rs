//! Sale recording and history.
//!
//! The client-supplied `price` is ignored: a sale always records the
//! product's current price, read inside the same transaction that
//! decrements stock.

use assorti_core::validation::{validate_id, validate_quantity};
use assorti_core::{
    CoreError, Page, PageRequest, SaleDetails, SaleOutcome, SalePayload, ValidationError,
};
use assorti_db::{Database, DbError};
use tracing::warn;

use crate::error::ApiResult;

pub async fn record(db: &Database, payload: &SalePayload) -> ApiResult<SaleOutcome> {
    let product_id = validate_id("Товар", payload.product_id.as_deref())?;
    let quantity = payload.quantity.ok_or_else(|| ValidationError::Required {
        field: "Количество".to_string(),
    })?;
    let quantity = validate_quantity(quantity)?;

    db.sales()
        .sell(&product_id, quantity)
        .await
        .map_err(|err| match err {
            DbError::NotFound { id, .. } => CoreError::ProductNotFound(id).into(),
            DbError::InsufficientStock {
                product_id,
                available,
                requested,
            } => {
                warn!(
                    product_id = %product_id,
                    available = available,
                    requested = requested,
                    "Sale rejected: insufficient stock"
                );
                CoreError::InsufficientStock {
                    product_id,
                    available,
                    requested,
                }
                .into()
            }
            other => other.into(),
        })
}

pub async fn list(db: &Database, request: PageRequest) -> ApiResult<Page<SaleDetails>> {
    let window = request.normalize()?;
    Ok(db.sales().list(window).await?)
}

pub async fn get(db: &Database, id: &str) -> ApiResult<SaleDetails> {
    db.sales()
        .get_by_id(id)
        .await?
        .ok_or_else(|| CoreError::SaleNotFound(id.to_string()).into())
}
