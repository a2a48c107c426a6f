//! # Storefront Cart
//!
//! The WebApp's shopping cart, kept on the client and persisted as a JSON
//! array in browser storage under [`STORAGE_KEY`].
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Storefront Action        Cart method             Change                │
//! │  ─────────────────        ───────────             ──────                │
//! │  "В корзину" ───────────► add(product, size) ───► qty += 1 or push      │
//! │  +/- buttons ───────────► update_quantity() ────► qty = n (≤ 0 drops)   │
//! │  Trash icon ────────────► remove(id, size) ─────► items.retain(..)      │
//! │  Checkout done ─────────► clear() ──────────────► items.clear()         │
//! │  Checkout ──────────────► to_order_payload() ───► POST /api/orders      │
//! │                                                                         │
//! │  Every mutation recomputes total_price and total_discount.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lines are keyed by `(id, size)`: the same product in two sizes is two
//! lines.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{OrderItemPayload, OrderPayload, Product};

/// Browser storage key for the serialized item list.
pub const STORAGE_KEY: &str = "assortiShop_cart";

/// One cart line.
///
/// Name, price and image are snapshots taken when the line was added.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    /// Product id.
    pub id: String,
    pub name: String,
    #[ts(type = "number")]
    pub price: Money,
    #[serde(default)]
    pub image: Option<String>,
    pub quantity: i64,
    pub size: String,
    /// Discount in percent (0..=100).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount: Option<u32>,
}

impl CartItem {
    /// Snapshots a product into a single-unit line.
    pub fn from_product(product: &Product, size: &str) -> Self {
        CartItem {
            id: product.id.clone(),
            name: product.name.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity: 1,
            size: size.to_string(),
            discount: None,
        }
    }

    /// Unit price × quantity, clamped at the `Money` bounds.
    pub fn line_total(&self) -> Money {
        self.price * self.quantity
    }

    /// Discount amount for the whole line.
    pub fn line_discount(&self) -> Money {
        match self.discount {
            Some(pct) => self.line_total().percent(pct.min(100)),
            None => Money::zero(),
        }
    }

    fn matches(&self, id: &str, size: &str) -> bool {
        self.id == id && self.size == size
    }
}

/// The storefront cart with derived totals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    items: Vec<CartItem>,
    #[ts(type = "number")]
    total_price: Money,
    #[ts(type = "number")]
    total_discount: Money,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Builds a cart from stored lines, recomputing totals.
    ///
    /// Lines with `quantity <= 0` are dropped.
    pub fn from_items(mut items: Vec<CartItem>) -> Self {
        items.retain(|item| item.quantity > 0);
        let mut cart = Cart {
            items,
            ..Cart::default()
        };
        cart.recompute();
        cart
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Σ price × quantity.
    pub fn total_price(&self) -> Money {
        self.total_price
    }

    /// Σ price × quantity × discount%.
    pub fn total_discount(&self) -> Money {
        self.total_discount
    }

    /// Total units across all lines.
    pub fn item_count(&self) -> i64 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Adds one unit of `product` in `size`.
    ///
    /// An existing `(id, size)` line gets `quantity += 1`.
    pub fn add(&mut self, product: &Product, size: &str) {
        self.add_item(CartItem::from_product(product, size));
    }

    /// Adds a prepared line, merging into an existing `(id, size)` line.
    /// A non-positive quantity counts as one unit.
    pub fn add_item(&mut self, mut item: CartItem) {
        item.quantity = item.quantity.max(1);
        match self
            .items
            .iter_mut()
            .find(|existing| existing.matches(&item.id, &item.size))
        {
            Some(existing) => existing.quantity += item.quantity,
            None => self.items.push(item),
        }
        self.recompute();
    }

    /// Removes the `(id, size)` line if present.
    pub fn remove(&mut self, id: &str, size: &str) {
        self.items.retain(|item| !item.matches(id, size));
        self.recompute();
    }

    /// Sets the quantity of an existing line. `quantity <= 0` removes it;
    /// unknown lines are ignored.
    pub fn update_quantity(&mut self, id: &str, size: &str, quantity: i64) {
        if quantity <= 0 {
            self.remove(id, size);
            return;
        }
        if let Some(item) = self.items.iter_mut().find(|item| item.matches(id, size)) {
            item.quantity = quantity;
            self.recompute();
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.recompute();
    }

    /// Serializes the lines for browser storage.
    pub fn to_storage_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    /// Restores a cart from storage.
    ///
    /// Malformed JSON is an error for the caller to log; it should fall back
    /// to an empty cart.
    pub fn from_storage_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str::<Vec<CartItem>>(json).map(Cart::from_items)
    }

    /// Builds the checkout body. Sizes collapse: the backend orders by
    /// product and quantity only.
    pub fn to_order_payload(&self) -> OrderPayload {
        OrderPayload {
            items: Some(
                self.items
                    .iter()
                    .map(|item| OrderItemPayload {
                        product_id: Some(item.id.clone()),
                        quantity: Some(item.quantity),
                    })
                    .collect(),
            ),
            total: Some(self.total_price - self.total_discount),
        }
    }

    fn recompute(&mut self) {
        self.total_price = self.items.iter().map(CartItem::line_total).sum();
        self.total_discount = self.items.iter().map(CartItem::line_discount).sum();
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
