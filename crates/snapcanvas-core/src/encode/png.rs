//! PNG encoding for saved canvases.

use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;
use thiserror::Error;

use crate::raster::Raster;

/// The eight bytes every PNG file starts with.
pub const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Errors that can occur during PNG encoding.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Pixel data length doesn't match expected dimensions
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// PNG encoding failed
    #[error("PNG encoding failed: {0}")]
    EncodingFailed(String),
}

/// Encode packed RGB pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, EncodeError> {
    if width == 0 || height == 0 {
        return Err(EncodeError::InvalidDimensions { width, height });
    }

    let expected_len = (width as usize) * (height as usize) * 3;
    if pixels.len() != expected_len {
        return Err(EncodeError::InvalidPixelData {
            expected: expected_len,
            actual: pixels.len(),
        });
    }

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(pixels, width, height, ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

/// Encode a raster as RGB PNG, discarding alpha.
///
/// Flattened output is always opaque, so nothing is lost.
pub fn encode_raster_png(raster: &Raster) -> Result<Vec<u8>, EncodeError> {
    encode_png(&raster.to_rgb_bytes(), raster.width, raster.height)
}


// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy for generating image dimensions (keep small for speed).
    fn dimensions_strategy() -> impl Strategy<Value = (u32, u32)> {
        (1u32..=40, 1u32..=40)
    }

    proptest! {
        /// Property: Encoding is lossless for any RGB content.
        #[test]
        fn prop_encoding_is_lossless(
            ((width, height), seed) in (dimensions_strategy(), any::<u8>()),
        ) {
            let size = (width as usize) * (height as usize) * 3;
            let pixels: Vec<u8> = (0..size).map(|i| (i as u8).wrapping_mul(31).wrapping_add(seed)).collect();

            let png_bytes = encode_png(&pixels, width, height).unwrap();
            prop_assert_eq!(&png_bytes[0..8], &PNG_SIGNATURE);

            let decoded = image::load_from_memory(&png_bytes).unwrap().to_rgb8();
            prop_assert_eq!(decoded.dimensions(), (width, height));
            prop_assert_eq!(decoded.into_raw(), pixels);
        }

        /// Property: Wrong buffer lengths are always rejected.
        #[test]
        fn prop_mismatched_length_rejected(
            (width, height) in dimensions_strategy(),
            delta in 1usize..10,
        ) {
            let size = (width as usize) * (height as usize) * 3 + delta;
            let pixels = vec![0u8; size];

            let is_invalid = matches!(
                encode_png(&pixels, width, height),
                Err(EncodeError::InvalidPixelData { .. })
            );
            prop_assert!(is_invalid);
        }
    }
}
