//! Output encoding.
//!
//! Flattened canvases are written as 8-bit RGB PNG files, matching the
//! opaque white-backed composite the editor produces.

mod png;

pub use png::{encode_png, encode_raster_png, EncodeError, PNG_SIGNATURE};
