//! Shared application state.

use std::sync::Arc;

use assorti_db::Database;

/// Handed to every handler through `State<AppState>`.
///
/// `Database` wraps a `SqlitePool`, so cloning the state per request is
/// cheap and needs no locking.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: Database,

    /// Verifies Telegram WebApp init data on order routes.
    pub bot_token: Option<Arc<str>>,
}

impl AppState {
    pub fn new(db: Database, bot_token: Option<String>) -> Self {
        AppState {
            db,
            bot_token: bot_token.map(Arc::from),
        }
    }
}
