//! Error types for the admin bot.

use crate::config::ConfigError;

/// Bot errors.
#[derive(Debug, thiserror::Error)]
pub enum BotError {
    /// The backend answered with its error envelope (validation, not found,
    /// insufficient stock). The message is safe to show to the admin.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// The backend answered with something that is not the expected JSON.
    #[error("Unexpected backend response: {0}")]
    Backend(String),

    /// The Bot API returned `ok: false`.
    #[error("Telegram API error: {0}")]
    Telegram(String),

    /// Transport failure, including timeouts.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl BotError {
    /// Message to show in the chat, if the error carries one meant for
    /// people.
    pub fn user_message(&self) -> Option<&str> {
        match self {
            BotError::Api { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result alias for bot operations.
pub type BotResult<T> = Result<T, BotError>;
