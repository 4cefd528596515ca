//! Snapcanvas WASM - WebAssembly bindings for Snapcanvas
//!
//! This crate provides WASM bindings to expose the snapcanvas-core editor
//! session to JavaScript/TypeScript applications.
//!
//! # Module Structure
//!
//! - `editor` - The `CanvasEditor` session class
//! - `types` - WASM-compatible wrapper types for image data
//! - `encode` - PNG encoding bindings
//! - `logger` - Forwards `log` records to the browser console
//!
//! # Usage
//!
//! ```typescript
//! import init, { CanvasEditor } from '@snapcanvas/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const editor = new CanvasEditor(bytes, 512, 512);
//! const preview = editor.render_preview();
//! ```

use wasm_bindgen::prelude::*;

mod editor;
mod encode;
mod logger;
mod types;

// Re-export public types
pub use editor::CanvasEditor;
pub use encode::{encode_png, encode_png_from_raster};
pub use types::JsRaster;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::init(log::LevelFilter::Info);
}

/// Change how much the core logs to the browser console.
///
/// Accepts `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"` or `"off"`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) -> Result<(), JsValue> {
    let filter = parse_level(level).ok_or_else(|| {
        JsValue::from_str(&format!("Unknown log level: {}", level))
    })?;
    logger::init(filter);
    Ok(())
}

fn parse_level(level: &str) -> Option<log::LevelFilter> {
    level.parse().ok()
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!version().is_empty());
    }

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug"), Some(log::LevelFilter::Debug));
        assert_eq!(parse_level("WARN"), Some(log::LevelFilter::Warn));
        assert_eq!(parse_level("off"), Some(log::LevelFilter::Off));
        assert_eq!(parse_level("loud"), None);
    }
}
