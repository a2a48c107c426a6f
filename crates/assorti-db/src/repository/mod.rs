//! # Repository Module
//!
//! One repository per table. Each holds a clone of the pool and is created
//! on demand through [`Database`](crate::Database).
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Service                                                                │
//! │     │  db.sales().sell(&product_id, 3)                                  │
//! │     ▼                                                                   │
//! │  SaleRepository ── BEGIN                                                │
//! │                    UPDATE products SET stock = stock - 3                │
//! │                      WHERE id = ? AND stock >= 3 RETURNING *            │
//! │                    INSERT INTO sales (..price snapshot..)               │
//! │                    COMMIT                                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product CRUD, barcode lookup, stock
//! - [`category::CategoryRepository`] - Category CRUD
//! - [`sale::SaleRepository`] - Atomic sale and sales history
//! - [`order::OrderRepository`] - Orders with their items
//! - [`qrcode::QrCodeRepository`] - One QR payload per product

pub mod category;
pub mod order;
pub mod product;
pub mod qrcode;
pub mod sale;
