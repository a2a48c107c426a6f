//! # assorti-bot: Telegram Admin Bot
//!
//! Shop administration over chat: catalog listing, product and category
//! forms, sales by QR code or barcode, and QR label generation. All data
//! goes through the REST API; the forms themselves are
//! [`assorti_core::conversation`].
//!
//! ## Modules
//!
//! - [`config`] - Environment configuration
//! - [`backend`] - REST API client behind the [`Backend`] trait
//! - [`telegram`] - Bot API client behind the [`Messenger`] trait
//! - [`session`] - Per-user conversation storage
//! - [`format`] - Chat texts and keyboards
//! - [`dispatcher`] - Message routing and flow steps
//! - [`polling`] - `getUpdates` loop

pub mod backend;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod format;
pub mod polling;
pub mod session;
pub mod telegram;

pub use backend::{Backend, BackendClient};
pub use config::BotConfig;
pub use dispatcher::Dispatcher;
pub use error::{BotError, BotResult};
pub use session::{InMemorySessionStore, SessionStore};
pub use telegram::{Messenger, TelegramClient};
