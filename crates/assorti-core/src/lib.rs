//! # assorti-core: Pure Business Logic for Assorti Shop
//!
//! Everything that decides *what is valid* lives here, with zero I/O. The
//! REST backend and the Telegram admin bot both depend on this crate, so a
//! price that the bot accepts is a price the backend accepts.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Assorti Shop Architecture                          │
//! │                                                                         │
//! │   Storefront (WebApp)          Telegram admin bot                       │
//! │   cart ─► POST /api/orders     /start ─► forms ─► REST calls            │
//! │          │                               │                              │
//! │          ▼                               ▼                              │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                 assorti-api (axum REST server)                    │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │                                      │
//! │  ┌───────────────────────────────▼──────────────────────────────────┐  │
//! │  │              ★ assorti-core (THIS CRATE) ★                        │  │
//! │  │                                                                   │  │
//! │  │  types  money  validation  slug  pagination  qr  cart             │  │
//! │  │  conversation (bot form state machine)                            │  │
//! │  └───────────────────────────────┬──────────────────────────────────┘  │
//! │                                  │                                      │
//! │  ┌───────────────────────────────▼──────────────────────────────────┐  │
//! │  │              assorti-db (SQLite repositories)                     │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Entities and request payloads (Product, Category, Sale, Order, QrCode)
//! - [`money`] - Integer kopeck amounts that travel as decimal JSON numbers
//! - [`error`] - Domain error types
//! - [`validation`] - Field rules shared by backend and bot
//! - [`slug`] - URL slugs derived from display names
//! - [`pagination`] - Page/limit normalization and the page envelope
//! - [`qr`] - `PRODUCT:<id>:<name>` payload codec
//! - [`cart`] - Storefront cart math and storage format
//! - [`conversation`] - Admin bot form state machine
//!
//! ## Example Usage
//!
//! ```rust
//! use assorti_core::{qr, slug::slugify, Money};
//!
//! assert_eq!(slugify("Бытовая  Техника"), "бытовая-техника");
//!
//! let payload = qr::encode("p-1", "Phone");
//! assert_eq!(payload, "PRODUCT:p-1:Phone");
//!
//! let price: Money = "99,90".parse().unwrap();
//! assert_eq!(price.cents(), 9990);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod conversation;
pub mod error;
pub mod money;
pub mod pagination;
pub mod qr;
pub mod slug;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use pagination::{Page, PageRequest};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Page size used when the client does not send `limit`.
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Upper bound for `limit`; larger requests are clamped, not rejected.
pub const MAX_PAGE_SIZE: i64 = 100;

/// Maximum quantity of a single product in one sale or order line.
///
/// ## Business Reason
/// Prevents accidental over-selling (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest accepted product price: 10 000 000 руб.
///
/// Keeps price × [`MAX_ITEM_QUANTITY`] sums far inside `i64` kopecks.
pub const MAX_PRICE: Money = Money::from_major(10_000_000);

/// Maximum product name length (characters).
pub const MAX_PRODUCT_NAME_LEN: usize = 255;

/// Maximum category name length (characters).
pub const MAX_CATEGORY_NAME_LEN: usize = 100;

/// Maximum description length for products and categories (characters).
pub const MAX_DESCRIPTION_LEN: usize = 1000;
