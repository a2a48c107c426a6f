//! Storefront orders, always scoped to the authenticated Telegram user.

use assorti_core::validation::validate_new_order;
use assorti_core::{CoreError, Money, Order, OrderPayload, Page, PageRequest, ValidationError};
use assorti_db::Database;
use tracing::{info, warn};

use crate::auth::TelegramUser;
use crate::error::ApiResult;

/// Creates an order for `user`.
///
/// Every item must reference an existing product. When the body carries no
/// `total`, the order is priced from current product prices.
pub async fn create(db: &Database, user: &TelegramUser, payload: &OrderPayload) -> ApiResult<Order> {
    let mut order = validate_new_order(user.id, payload).inspect_err(|e| {
        warn!(user_id = user.id, error = %e, "Order rejected");
    })?;

    let mut priced = Money::zero();
    for item in &order.items {
        let product = db
            .products()
            .get_by_id(&item.product_id)
            .await?
            .ok_or_else(|| ValidationError::UnknownReference {
                field: "Товар".to_string(),
                id: item.product_id.clone(),
            })?;
        priced = product
            .price
            .checked_mul(item.quantity)
            .and_then(|line| priced.checked_add(line))
            .ok_or_else(|| ValidationError::Overflow {
                field: "Сумма".to_string(),
            })?;
    }
    if payload.total.is_none() {
        order.total = priced;
    }

    let order = db.orders().create(&order).await?;
    info!(order_id = %order.id, user_id = user.id, total = %order.total, "Order placed");
    Ok(order)
}

pub async fn list(db: &Database, user: &TelegramUser, request: PageRequest) -> ApiResult<Page<Order>> {
    let window = request.normalize()?;
    Ok(db.orders().list_for_user(user.id, window).await?)
}

/// Someone else's order reads as missing.
pub async fn get(db: &Database, user: &TelegramUser, id: &str) -> ApiResult<Order> {
    db.orders()
        .get_for_user(id, user.id)
        .await?
        .ok_or_else(|| CoreError::OrderNotFound(id.to_string()).into())
}
