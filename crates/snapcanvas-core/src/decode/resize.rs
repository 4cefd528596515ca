//! Image resizing used to fit the source image onto the canvas.
//!
//! All functions return new `Raster` instances without modifying the input.

use super::{DecodeError, FilterType};
use crate::raster::Raster;

/// Resize an image to exact dimensions.
///
/// # Errors
///
/// Returns `DecodeError::InvalidFormat` if a target dimension is zero or the
/// source buffer does not match its dimensions.
pub fn resize(
    image: &Raster,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<Raster, DecodeError> {
    if width == 0 || height == 0 {
        return Err(DecodeError::InvalidFormat);
    }

    // Fast path: if dimensions match, just clone
    if image.width == width && image.height == height {
        return Ok(image.clone());
    }

    let rgba = image
        .to_rgba_image()
        .ok_or_else(|| DecodeError::CorruptedFile("Failed to create RgbaImage".to_string()))?;

    let resized = image::imageops::resize(&rgba, width, height, filter.to_image_filter());

    Ok(Raster::from_rgba_image(resized))
}

/// Scale an image so it fits inside `max_width x max_height`, preserving
/// aspect ratio.
///
/// Unlike a thumbnail fit, smaller images are scaled up as well: the
/// constrained dimension always ends up equal to its bound.
pub fn fit_within(
    image: &Raster,
    max_width: u32,
    max_height: u32,
    filter: FilterType,
) -> Result<Raster, DecodeError> {
    if max_width == 0 || max_height == 0 || image.is_empty() {
        return Err(DecodeError::InvalidFormat);
    }

    let (new_width, new_height) = fit_dimensions(image.width, image.height, max_width, max_height);
    resize(image, new_width, new_height, filter)
}

/// Largest size with the aspect ratio of `width x height` that fits in
/// `max_width x max_height`.
///
/// Integer arithmetic truncates, so a 1024x768 source in a 512x512 box
/// becomes exactly 512x384.
pub fn fit_dimensions(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (0, 0);
    }

    let (w, h) = (width as u64, height as u64);
    let (max_w, max_h) = (max_width as u64, max_height as u64);

    // Width if we let the height hit its bound
    let height_bound_width = max_h * w / h;

    if height_bound_width <= max_w {
        ((height_bound_width as u32).max(1), max_height)
    } else {
        let width_bound_height = max_w * h / w;
        (max_width, (width_bound_height as u32).max(1))
    }
}
