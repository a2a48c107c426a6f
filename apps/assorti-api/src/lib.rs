//! # Assorti API
//!
//! REST backend for the shop: catalog, sales, QR codes and storefront
//! orders.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         REST API Layers                                 │
//! │                                                                         │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────────┐│
//! │  │  routes        │  │  handlers      │  │  services                  ││
//! │  │                │  │                │  │                            ││
//! │  │ • /api nesting │─►│ • extractors   │─►│ • validation (core)        ││
//! │  │ • CORS, trace  │  │ • envelope     │  │ • reference checks         ││
//! │  │ • 404 fallback │  │ • AuthUser     │  │ • repository calls (db)    ││
//! │  └────────────────┘  └────────────────┘  └────────────────────────────┘│
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      Infrastructure                               │  │
//! │  │  ┌──────────────┐  ┌──────────────┐  ┌──────────────────────────┐│  │
//! │  │  │  SQLite      │  │  QR render   │  │  Telegram init data      ││  │
//! │  │  │  (assorti-db)│  │  (PNG)       │  │  (HMAC-SHA256)           ││  │
//! │  │  └──────────────┘  └──────────────┘  └──────────────────────────┘│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration
//! Environment variables:
//! - `PORT` - HTTP port (default: 3000)
//! - `BIND_ADDR` - Interface (default: 0.0.0.0)
//! - `DATABASE_PATH` / `DATABASE_URL` - SQLite file (default: assorti.db)
//! - `DB_MAX_CONNECTIONS` - Pool size (default: 5)
//! - `TELEGRAM_BOT_TOKEN` - Verifies storefront init data
//! - `FRONTEND_URL` - CORS origin

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod qr_image;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;

// Re-exports
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::router;
pub use state::AppState;
