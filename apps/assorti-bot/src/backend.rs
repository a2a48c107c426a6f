//! # Backend Client
//!
//! The bot never touches the database; every read and write goes through
//! the REST API.
//!
//! ```text
//! Dispatcher ──► dyn Backend ──► BackendClient ──► GET/POST {BACKEND_API_URL}/...
//!                                     │
//!                                     └── { "success": true,  "data": ... }  ─► Ok(data)
//!                                         { "success": false, "error": ".." } ─► BotError::Api
//! ```
//!
//! [`Backend`] is a trait so the dispatcher can be tested without a server.

use std::time::Duration;

use assorti_core::{
    Category, CategoryPayload, Page, Product, ProductPayload, QrCodeRef, QrGeneratePayload,
    SaleOutcome, SalePayload,
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use crate::error::{BotError, BotResult};

/// Rows fetched for numbered pick lists.
pub const LIST_LIMIT: i64 = 100;

/// Operations the bot needs from the REST API.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn list_products(&self) -> BotResult<Vec<Product>>;

    /// `Ok(None)` when the backend answers 404.
    async fn get_product(&self, id: &str) -> BotResult<Option<Product>>;

    /// `Ok(None)` when the backend answers 404.
    async fn product_by_barcode(&self, barcode: &str) -> BotResult<Option<Product>>;

    async fn list_categories(&self) -> BotResult<Vec<Category>>;

    async fn create_product(&self, payload: &ProductPayload) -> BotResult<Product>;

    async fn create_category(&self, payload: &CategoryPayload) -> BotResult<Category>;

    async fn sell(&self, product_id: &str, quantity: i64) -> BotResult<SaleOutcome>;

    async fn generate_qr(&self, product_id: &str) -> BotResult<QrCodeRef>;

    /// PNG bytes of a product's QR code.
    async fn qr_image(&self, product_id: &str) -> BotResult<Vec<u8>>;
}

// =============================================================================
// HTTP Implementation
// =============================================================================

/// [`Backend`] over HTTP.
#[derive(Debug, Clone)]
pub struct BackendClient {
    http: Client,
    base_url: String,
}

/// Response envelope shared by every JSON endpoint.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    error: Option<String>,
}

impl BackendClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> BotResult<Self> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(BackendClient {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// `{base}/{segments...}` with each segment percent-encoded, so typed
    /// text can never leave its path segment.
    fn endpoint(&self, segments: &[&str]) -> BotResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|err| BotError::Backend(format!("invalid backend URL: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| BotError::Backend("backend URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> BotResult<T> {
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        debug!(status = status.as_u16(), bytes = body.len(), "Backend response");
        read_envelope(status, &body)
    }

    /// Like [`send`](Self::send) but maps 404 to `None`.
    async fn send_optional<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> BotResult<Option<T>> {
        match self.send(request).await {
            Ok(value) => Ok(Some(value)),
            Err(BotError::Api { status: 404, .. }) => Ok(None),
            Err(err) => Err(err),
        }
    }
}

/// Decodes the `{success, data, error}` envelope.
fn read_envelope<T: DeserializeOwned>(status: StatusCode, body: &[u8]) -> BotResult<T> {
    let envelope: Envelope<T> = serde_json::from_slice(body).map_err(|err| {
        BotError::Backend(format!("status {}: {}", status.as_u16(), err))
    })?;

    if !envelope.success || !status.is_success() {
        return Err(api_error(status, envelope.error));
    }

    envelope
        .data
        .ok_or_else(|| BotError::Backend("response has no data".to_string()))
}

fn api_error(status: StatusCode, message: Option<String>) -> BotError {
    BotError::Api {
        status: status.as_u16(),
        message: message.unwrap_or_else(|| format!("Ошибка сервера ({})", status.as_u16())),
    }
}

#[async_trait]
impl Backend for BackendClient {
    async fn list_products(&self) -> BotResult<Vec<Product>> {
        let page: Page<Product> = self
            .send(
                self.http
                    .get(self.url("/products"))
                    .query(&[("page", 1), ("limit", LIST_LIMIT)]),
            )
            .await?;
        Ok(page.data)
    }

    async fn get_product(&self, id: &str) -> BotResult<Option<Product>> {
        let url = self.endpoint(&["products", id])?;
        self.send_optional(self.http.get(url)).await
    }

    async fn product_by_barcode(&self, barcode: &str) -> BotResult<Option<Product>> {
        let url = self.endpoint(&["products", "barcode", barcode])?;
        self.send_optional(self.http.get(url)).await
    }

    async fn list_categories(&self) -> BotResult<Vec<Category>> {
        let page: Page<Category> = self
            .send(
                self.http
                    .get(self.url("/categories"))
                    .query(&[("page", 1), ("limit", LIST_LIMIT)]),
            )
            .await?;
        Ok(page.data)
    }

    async fn create_product(&self, payload: &ProductPayload) -> BotResult<Product> {
        self.send(self.http.post(self.url("/products")).json(payload))
            .await
    }

    async fn create_category(&self, payload: &CategoryPayload) -> BotResult<Category> {
        self.send(self.http.post(self.url("/categories")).json(payload))
            .await
    }

    async fn sell(&self, product_id: &str, quantity: i64) -> BotResult<SaleOutcome> {
        let payload = SalePayload {
            product_id: Some(product_id.to_string()),
            quantity: Some(quantity),
            price: None,
        };
        self.send(self.http.post(self.url("/sales")).json(&payload))
            .await
    }

    async fn generate_qr(&self, product_id: &str) -> BotResult<QrCodeRef> {
        let payload = QrGeneratePayload {
            product_id: Some(product_id.to_string()),
        };
        self.send(self.http.post(self.url("/qrcodes/generate")).json(&payload))
            .await
    }

    async fn qr_image(&self, product_id: &str) -> BotResult<Vec<u8>> {
        let url = self.endpoint(&["qrcodes", product_id, "image"])?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Errors still come back as the JSON envelope.
        if !status.is_success() {
            return Err(match serde_json::from_slice::<Envelope<serde_json::Value>>(&body) {
                Ok(envelope) => api_error(status, envelope.error),
                Err(err) => BotError::Backend(format!("status {}: {}", status.as_u16(), err)),
            });
        }
        Ok(body.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_data() {
        let body = br#"{"success":true,"data":{"code":"PRODUCT:p-1:Phone","productId":"p-1"}}"#;
        let qr: QrCodeRef = read_envelope(StatusCode::CREATED, body).unwrap();
        assert_eq!(qr.product_id, "p-1");
        assert_eq!(qr.code, "PRODUCT:p-1:Phone");
    }

    #[test]
    fn test_envelope_error_keeps_message() {
        let body = r#"{"success":false,"error":"Недостаточно товара на складе: доступно 2, запрошено 3"}"#
            .as_bytes();
        let err = read_envelope::<QrCodeRef>(StatusCode::BAD_REQUEST, body).unwrap_err();
        match err {
            BotError::Api { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("Недостаточно товара"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_non_json_body() {
        let err = read_envelope::<QrCodeRef>(StatusCode::BAD_GATEWAY, b"<html>").unwrap_err();
        assert!(matches!(err, BotError::Backend(_)));
        assert!(err.user_message().is_none());
    }

    #[test]
    fn test_lookup_text_stays_in_one_segment() {
        let client = BackendClient::new("http://localhost:3000/api", Duration::from_secs(10)).unwrap();

        let url = client.endpoint(&["products", "../categories"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/products/..%2Fcategories");

        let url = client.endpoint(&["products", "barcode", "a?b#c d"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/products/barcode/a%3Fb%23c%20d");

        let root = BackendClient::new("http://localhost:3000", Duration::from_secs(10)).unwrap();
        let url = root.endpoint(&["qrcodes", "p-1", "image"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/qrcodes/p-1/image");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let client = BackendClient::new("http://localhost:3000/api/", Duration::from_secs(10)).unwrap();
        assert_eq!(client.url("/products"), "http://localhost:3000/api/products");
    }
}
