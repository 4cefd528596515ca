//! Image encoding WASM bindings.
//!
//! # Functions
//!
//! - [`encode_png`] - Encode RGB pixel data to PNG bytes
//! - [`encode_png_from_raster`] - Encode a JsRaster to PNG bytes, dropping alpha
//!
//! # Example
//!
//! ```typescript
//! import { encode_png } from '@snapcanvas/wasm';
//!
//! const png = encode_png(pixels, width, height);
//! await writable.write(new Blob([png], { type: 'image/png' }));
//! ```

use crate::types::{js_error, JsRaster};
use snapcanvas_core::encode;
use wasm_bindgen::prelude::*;

/// Encode RGB pixel data to PNG bytes.
///
/// # Arguments
///
/// * `pixels` - RGB pixel data as a `Uint8Array` (3 bytes per pixel, row-major order)
/// * `width` - Image width in pixels
/// * `height` - Image height in pixels
///
/// # Errors
///
/// Returns an error if:
/// - The pixel data length doesn't match width * height * 3
/// - Width or height is zero
#[wasm_bindgen]
pub fn encode_png(pixels: &[u8], width: u32, height: u32) -> Result<Vec<u8>, JsValue> {
    encode::encode_png(pixels, width, height).map_err(js_error)
}

/// Encode a JsRaster to PNG bytes. The alpha channel is dropped.
#[wasm_bindgen]
pub fn encode_png_from_raster(image: &JsRaster) -> Result<Vec<u8>, JsValue> {
    encode::encode_raster_png(&image.to_raster()).map_err(js_error)
}


/// WASM-specific tests that require JsValue.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_encode_png_invalid_dimensions() {
        assert!(encode_png(&[0u8; 12], 0, 4).is_err());
    }

    #[wasm_bindgen_test]
    fn test_encode_png_invalid_pixel_data() {
        assert!(encode_png(&[0u8; 10], 2, 2).is_err());
    }
}
