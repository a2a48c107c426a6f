//! # Telegram Bot API
//!
//! The small slice of the Bot API the admin bot uses:
//!
//! | Method        | Use                                         |
//! |---------------|---------------------------------------------|
//! | `getUpdates`  | long polling, 30 s timeout, offset tracking |
//! | `sendMessage` | HTML text with an optional reply keyboard   |
//! | `sendPhoto`   | multipart PNG upload with an HTML caption   |
//!
//! Outgoing traffic goes through the [`Messenger`] trait so the dispatcher
//! can be driven in tests without Telegram.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::error::{BotError, BotResult};

/// Long-poll timeout passed to `getUpdates`.
pub const POLL_TIMEOUT_SECS: u64 = 30;

const API_BASE: &str = "https://api.telegram.org";

// =============================================================================
// Incoming Types
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub first_name: String,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

/// Bot API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiReply<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

// =============================================================================
// Outgoing Types
// =============================================================================

/// Keyboard attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplyMarkup {
    /// Persistent reply keyboard, one `Vec` per row.
    Keyboard(Vec<Vec<String>>),
    /// Opens the reply field so the next message answers the prompt.
    ForceReply,
}

impl ReplyMarkup {
    pub fn keyboard<R, B>(rows: R) -> Self
    where
        R: IntoIterator<Item = B>,
        B: IntoIterator<Item = &'static str>,
    {
        ReplyMarkup::Keyboard(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_string).collect())
                .collect(),
        )
    }

    fn to_json(&self) -> serde_json::Value {
        match self {
            ReplyMarkup::Keyboard(rows) => json!({
                "keyboard": rows
                    .iter()
                    .map(|row| row.iter().map(|text| json!({ "text": text })).collect::<Vec<_>>())
                    .collect::<Vec<_>>(),
                "resize_keyboard": true,
            }),
            ReplyMarkup::ForceReply => json!({ "force_reply": true }),
        }
    }
}

/// One HTML message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub markup: Option<ReplyMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Reply {
            text: text.into(),
            markup: None,
        }
    }

    pub fn with_markup(mut self, markup: ReplyMarkup) -> Self {
        self.markup = Some(markup);
        self
    }
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<serde_json::Value>,
}

// =============================================================================
// Messenger
// =============================================================================

/// Outgoing side of the Bot API.
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_message(&self, chat_id: i64, reply: &Reply) -> BotResult<()>;

    async fn send_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> BotResult<()>;
}

/// Bot API client.
#[derive(Debug, Clone)]
pub struct TelegramClient {
    http: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> BotResult<Self> {
        Self::with_base_url(API_BASE, token)
    }

    pub fn with_base_url(api_base: &str, token: &str) -> BotResult<Self> {
        // Must outlive the long-poll window.
        let http = Client::builder()
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .build()?;
        Ok(TelegramClient {
            http,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    /// Fetches updates after `offset`, waiting up to [`POLL_TIMEOUT_SECS`].
    pub async fn get_updates(&self, offset: i64) -> BotResult<Vec<Update>> {
        let body = json!({
            "offset": offset,
            "timeout": POLL_TIMEOUT_SECS,
            "allowed_updates": ["message"],
        });
        let response = self
            .http
            .post(self.method_url("getUpdates"))
            .json(&body)
            .send()
            .await?;
        read_reply(response).await
    }
}

async fn read_reply<T: DeserializeOwned>(response: reqwest::Response) -> BotResult<T> {
    let reply: ApiReply<T> = response.json().await?;
    if !reply.ok {
        return Err(BotError::Telegram(
            reply.description.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }
    reply
        .result
        .ok_or_else(|| BotError::Telegram("response has no result".to_string()))
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_message(&self, chat_id: i64, reply: &Reply) -> BotResult<()> {
        let body = SendMessage {
            chat_id,
            text: &reply.text,
            parse_mode: "HTML",
            reply_markup: reply.markup.as_ref().map(ReplyMarkup::to_json),
        };
        let response = self
            .http
            .post(self.method_url("sendMessage"))
            .json(&body)
            .send()
            .await?;
        read_reply::<serde_json::Value>(response).await?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: i64, png: Vec<u8>, caption: &str) -> BotResult<()> {
        let photo = Part::bytes(png)
            .file_name("qrcode.png")
            .mime_str("image/png")?;
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .text("parse_mode", "HTML")
            .part("photo", photo);

        let response = self
            .http
            .post(self.method_url("sendPhoto"))
            .multipart(form)
            .send()
            .await?;
        read_reply::<serde_json::Value>(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_deserialize() {
        let json = r#"{
            "update_id": 10,
            "message": {
                "message_id": 5,
                "from": {"id": 42, "is_bot": false, "first_name": "Анна"},
                "chat": {"id": 42, "type": "private"},
                "date": 1700000000,
                "text": "/start"
            }
        }"#;
        let update: Update = serde_json::from_str(json).unwrap();
        let message = update.message.unwrap();
        assert_eq!(message.from.unwrap().id, 42);
        assert_eq!(message.text.as_deref(), Some("/start"));
    }

    #[test]
    fn test_keyboard_markup() {
        let markup = ReplyMarkup::keyboard([["A", "B"], ["C", "D"]]).to_json();
        assert_eq!(markup["keyboard"][1][0]["text"], "C");
        assert_eq!(markup["resize_keyboard"], true);
    }

    #[test]
    fn test_method_url() {
        let client = TelegramClient::with_base_url("http://localhost:8081/", "123:abc").unwrap();
        assert_eq!(
            client.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }
}
