/// Image normalization: decode arbitrary image bytes, pin the height to
/// the board's thumbnail height (aspect ratio preserved), and re-encode as
/// a JPEG data URI. The real compression is the downscale; the JPEG
/// quality stays at maximum.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use image::imageops::FilterType;
use std::io::Cursor;

/// JPEG quality for re-encoding (out of 100)
const JPEG_QUALITY: u8 = 100;

const DATA_URI_PREFIX: &str = "data:image/jpeg;base64,";

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The payload claimed to be an image but could not be decoded.
    /// Callers treat this as "that entry didn't happen."
    #[error("input is not a decodable image")]
    Malformed,

    #[error("re-encode failed: {0}")]
    Encode(image::ImageError),

    #[error("codec task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Normalize raw image bytes into a storage-safe data URI.
///
/// The output height equals `target_height` exactly; the width scales to
/// keep the aspect ratio. Decode and re-encode are CPU-bound, so the work
/// runs on the blocking pool like the other image pipelines here.
pub async fn encode_image(raw_bytes: Vec<u8>, target_height: u32) -> Result<String, CodecError> {
    tokio::task::spawn_blocking(move || encode_image_blocking(&raw_bytes, target_height)).await?
}

fn encode_image_blocking(raw_bytes: &[u8], target_height: u32) -> Result<String, CodecError> {
    let img = image::load_from_memory(raw_bytes).map_err(|_| CodecError::Malformed)?;
    if img.height() == 0 || img.width() == 0 {
        return Err(CodecError::Malformed);
    }

    let scale = target_height as f32 / img.height() as f32;
    let width = ((img.width() as f32 * scale).round() as u32).max(1);
    let scaled = img.resize_exact(width, target_height, FilterType::Lanczos3);

    // JPEG has no alpha channel
    let rgb = scaled.to_rgb8();
    let mut jpeg = Vec::new();
    let mut encoder =
        image::codecs::jpeg::JpegEncoder::new_with_quality(Cursor::new(&mut jpeg), JPEG_QUALITY);
    encoder
        .encode(rgb.as_raw(), width, target_height, image::ExtendedColorType::Rgb8)
        .map_err(CodecError::Encode)?;

    Ok(format!("{}{}", DATA_URI_PREFIX, BASE64.encode(&jpeg)))
}

/// Extract the raw encoded bytes from a data URI (for rendering).
/// Returns None for anything that is not a base64 data URI.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (_, payload) = uri.split_once("base64,")?;
    BASE64.decode(payload).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::test_support::test_png;

    #[tokio::test]
    async fn test_encode_pins_height_and_scales_width() {
        let png = test_png(100, 160);

        let uri = encode_image(png, 80).await.unwrap();
        assert!(uri.starts_with(DATA_URI_PREFIX));

        let jpeg = decode_data_uri(&uri).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.height(), 80);
        // 160 -> 80 is a 0.5 scale, so 100 -> 50
        assert_eq!(decoded.width(), 50);
    }

    #[tokio::test]
    async fn test_upscales_small_images_to_target_height() {
        let png = test_png(10, 20);

        let uri = encode_image(png, 80).await.unwrap();
        let decoded = image::load_from_memory(&decode_data_uri(&uri).unwrap()).unwrap();
        assert_eq!(decoded.height(), 80);
        assert_eq!(decoded.width(), 40);
    }

    #[tokio::test]
    async fn test_malformed_input_is_an_error_not_a_hang() {
        let err = encode_image(b"definitely not an image".to_vec(), 80)
            .await
            .unwrap_err();
        assert!(matches!(err, CodecError::Malformed));
    }

    #[tokio::test]
    async fn test_zero_byte_input_is_malformed() {
        let err = encode_image(Vec::new(), 80).await.unwrap_err();
        assert!(matches!(err, CodecError::Malformed));
    }

    #[test]
    fn test_decode_data_uri_rejects_plain_strings() {
        assert_eq!(decode_data_uri("https://example.com/cat.png"), None);
    }
}
