//! # Telegram WebApp Authentication
//!
//! Storefront requests carry the Mini App's signed init data in the
//! `X-Telegram-Init-Data` header.
//!
//! ## Verification
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  init data: "auth_date=1700000000&user=%7B...%7D&hash=ab12..."          │
//! │       │                                                                 │
//! │       ▼  url-decode, drop `hash`, sort by key                           │
//! │  data_check_string = "auth_date=1700000000\nuser={...}"                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  secret   = HMAC_SHA256(key = "WebAppData", msg = bot_token)            │
//! │  expected = HMAC_SHA256(key = secret, msg = data_check_string)          │
//! │       │                                                                 │
//! │       ▼  constant-time compare with hex-decoded `hash`                  │
//! │  parse `user` JSON ──► AuthUser(TelegramUser)                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use tracing::warn;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::state::AppState;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the raw init data string.
pub const INIT_DATA_HEADER: &str = "x-telegram-init-data";

/// The `user` object Telegram embeds in init data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelegramUser {
    pub id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub username: Option<String>,
    pub language_code: Option<String>,
}

/// Why init data was rejected.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("Отсутствуют данные авторизации Telegram")]
    MissingInitData,

    #[error("Неверная подпись Telegram")]
    InvalidSignature,

    #[error("Неверные данные пользователя Telegram")]
    InvalidUser,
}

/// Checks the signature of `init_data` against `bot_token` and returns the
/// signed user.
pub fn verify_init_data(init_data: &str, bot_token: &str) -> Result<TelegramUser, AuthError> {
    let mut hash = None;
    let mut fields = Vec::new();
    for (key, value) in form_urlencoded::parse(init_data.as_bytes()) {
        if key == "hash" {
            hash = Some(value.into_owned());
        } else {
            fields.push((key.into_owned(), value.into_owned()));
        }
    }

    let hash = hash.ok_or(AuthError::InvalidSignature)?;
    let expected = hex::decode(hash).map_err(|_| AuthError::InvalidSignature)?;

    fields.sort_by(|a, b| a.0.cmp(&b.0));
    let mut mac = data_mac(bot_token)?;
    mac.update(data_check_string(&fields).as_bytes());
    mac.verify_slice(&expected)
        .map_err(|_| AuthError::InvalidSignature)?;

    let user = fields
        .iter()
        .find(|(key, _)| key == "user")
        .ok_or(AuthError::InvalidUser)?;
    serde_json::from_str(&user.1).map_err(|_| AuthError::InvalidUser)
}

/// Builds signed init data for `fields`, the way Telegram does.
pub fn sign_init_data(fields: &[(&str, &str)], bot_token: &str) -> Result<String, AuthError> {
    let mut sorted: Vec<(String, String)> = fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    sorted.sort_by(|a, b| a.0.cmp(&b.0));

    let mut mac = data_mac(bot_token)?;
    mac.update(data_check_string(&sorted).as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        query.append_pair(key, value);
    }
    query.append_pair("hash", &hash);
    Ok(query.finish())
}

fn data_check_string(sorted: &[(String, String)]) -> String {
    sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// HMAC keyed with the WebApp secret derived from the bot token.
fn data_mac(bot_token: &str) -> Result<HmacSha256, AuthError> {
    let mut secret =
        HmacSha256::new_from_slice(b"WebAppData").map_err(|_| AuthError::InvalidSignature)?;
    secret.update(bot_token.as_bytes());
    let secret = secret.finalize().into_bytes();

    HmacSha256::new_from_slice(&secret).map_err(|_| AuthError::InvalidSignature)
}

// =============================================================================
// Extractor
// =============================================================================

/// Authenticated storefront user. Handlers that take this argument reject
/// unsigned requests with 401.
#[derive(Debug, Clone)]
pub struct AuthUser(pub TelegramUser);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(bot_token) = state.bot_token.as_deref() else {
            warn!(uri = %parts.uri, "Order request rejected: TELEGRAM_BOT_TOKEN not configured");
            return Err(AuthError::MissingInitData.into());
        };

        let init_data = parts
            .headers
            .get(INIT_DATA_HEADER)
            .and_then(|h| h.to_str().ok())
            .ok_or(AuthError::MissingInitData)?;

        match verify_init_data(init_data, bot_token) {
            Ok(user) => Ok(AuthUser(user)),
            Err(e) => {
                warn!(uri = %parts.uri, error = %e, "Telegram init data rejected");
                Err(e.into())
            }
        }
    }
}
