//! PNG rendering of QR payloads.
//!
//! Error correction level H, 300×300 pixels, grayscale.

use std::io::Cursor;

use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, Luma};
use qrcode::types::QrError;
use qrcode::{EcLevel, QrCode};

/// Side length of the rendered image in pixels.
pub const IMAGE_SIZE: u32 = 300;

#[derive(Debug, thiserror::Error)]
pub enum QrImageError {
    #[error("QR encoding failed: {0}")]
    Encode(#[from] QrError),

    #[error("PNG encoding failed: {0}")]
    Png(#[from] image::ImageError),
}

/// Renders `payload` as PNG bytes.
pub fn render_png(payload: &str) -> Result<Vec<u8>, QrImageError> {
    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::H)?;

    let mut img = code
        .render::<Luma<u8>>()
        .min_dimensions(IMAGE_SIZE, IMAGE_SIZE)
        .build();

    // module size rounds up; scale back to the exact size
    if img.width() != IMAGE_SIZE {
        img = imageops::resize(&img, IMAGE_SIZE, IMAGE_SIZE, FilterType::Nearest);
    }

    let mut png = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(img).write_to(&mut png, ImageFormat::Png)?;
    Ok(png.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_renders_png_of_fixed_size() {
        let png = render_png("PRODUCT:3f2a:Phone X").unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (IMAGE_SIZE, IMAGE_SIZE));
    }

    #[test]
    fn test_cyrillic_payload() {
        assert!(render_png("PRODUCT:1:Телефон: чёрный").is_ok());
    }
}
