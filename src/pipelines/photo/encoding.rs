// SPDX-License-Identifier: GPL-3.0-only

//! PNG encoding and data URL handling
//!
//! Captured photos travel through the booth as `data:image/png;base64,...`
//! strings: self-describing, lossless and trivially written to disk.

use crate::errors::PhotoError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, RgbaImage};
use std::io::Cursor;

/// Prefix of every PNG data URL produced by the booth
pub const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Encode an RGBA image as PNG bytes
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, PhotoError> {
    let mut bytes = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(|e| PhotoError::EncodingFailed(e.to_string()))?;
    Ok(bytes)
}

/// Wrap PNG bytes in a data URL
pub fn png_data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}

/// Extract the raw bytes of a base64 image data URL
///
/// Any `data:image/<kind>;base64,` URL is accepted so externally supplied
/// photos work too.
pub fn data_url_bytes(url: &str) -> Result<Vec<u8>, PhotoError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| PhotoError::DecodeFailed("not a data URL".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PhotoError::DecodeFailed("missing data URL payload".to_string()))?;
    if !header.starts_with("image/") || !header.ends_with(";base64") {
        return Err(PhotoError::DecodeFailed(format!(
            "unsupported data URL header: {}",
            header
        )));
    }
    STANDARD
        .decode(payload)
        .map_err(|e| PhotoError::DecodeFailed(e.to_string()))
}

/// Decode an image data URL back into RGBA pixels
pub fn decode_data_url(url: &str) -> Result<RgbaImage, PhotoError> {
    let bytes = data_url_bytes(url)?;
    let image =
        image::load_from_memory(&bytes).map_err(|e| PhotoError::DecodeFailed(e.to_string()))?;
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_data_url_preserves_pixels() {
        let img = RgbaImage::from_fn(3, 2, |x, y| Rgba([x as u8 * 40, y as u8 * 90, 7, 255]));
        let url = png_data_url(&encode_png(&img).unwrap());
        assert!(url.starts_with(PNG_DATA_URL_PREFIX));

        let decoded = decode_data_url(&url).unwrap();
        assert_eq!(decoded, img);
    }

    #[test]
    fn test_rejects_non_image_data_urls() {
        assert!(data_url_bytes("https://example.com/a.png").is_err());
        assert!(data_url_bytes("data:text/plain;base64,aGk=").is_err());
        assert!(data_url_bytes("data:image/png;base64").is_err());
        assert!(decode_data_url("data:image/png;base64,aGk=").is_err());
    }
}
