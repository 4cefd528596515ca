//! Source image loading.
//!
//! This module provides functionality for:
//! - Decoding PNG and JPEG images from bytes or from a file path
//! - Applying EXIF orientation so photos land upright on the canvas
//! - Fitting an image inside the canvas bounds while preserving aspect ratio
//!
//! All operations are synchronous and run on the caller's thread.

mod load;
mod resize;
mod types;

pub use load::{decode_image, load_image};
pub use resize::{fit_dimensions, fit_within, resize};
pub use types::{DecodeError, FilterType, Orientation};
