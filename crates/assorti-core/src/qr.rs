//! # QR Payload Codec
//!
//! The text stored in a product's QR code:
//!
//! ```text
//! PRODUCT:<id>:<name>
//!         └─┬┘ └──┬─┘
//!           │     └── everything after the second ':' (may contain ':')
//!           └──────── never contains ':' (UUID)
//! ```
//!
//! Image rendering lives in the API crate; this module only deals with
//! the string.

/// Payload prefix.
pub const PREFIX: &str = "PRODUCT";

/// A decoded QR payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQr {
    pub product_id: String,
    pub name: String,
}

/// Builds the payload for a product.
pub fn encode(product_id: &str, name: &str) -> String {
    format!("{PREFIX}:{product_id}:{name}")
}

/// Parses a scanned payload.
///
/// Returns `None` unless the text starts with `PRODUCT` and has at least
/// three `:`-separated segments.
///
/// ```rust
/// use assorti_core::qr::decode;
///
/// let qr = decode("PRODUCT:p-1:Cable: USB-C").unwrap();
/// assert_eq!(qr.product_id, "p-1");
/// assert_eq!(qr.name, "Cable: USB-C");
///
/// assert!(decode("PRODUCT:p-1").is_none());
/// assert!(decode("ITEM:p-1:Cable").is_none());
/// ```
pub fn decode(payload: &str) -> Option<ProductQr> {
    let mut parts = payload.splitn(3, ':');

    if parts.next()? != PREFIX {
        return None;
    }
    let product_id = parts.next()?;
    let name = parts.next()?;

    Some(ProductQr {
        product_id: product_id.to_string(),
        name: name.to_string(),
    })
}
