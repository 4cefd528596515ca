//! Editor configuration.
//!
//! Every tunable the editor uses lives in [`EditorConfig`]. Hosts that do not
//! care get [`EditorConfig::default`], which reproduces the legacy behavior:
//! a 512x512 canvas, a 15 px resize handle, a resize sensitivity divisor of
//! 500 and output written below the current working directory.
//!
//! The struct is `serde`-friendly with `#[serde(default)]`, so a host may
//! supply only the fields it wants to override.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::decode::FilterType;
use crate::scene::InterpolationFilter;

/// Legacy save location, relative to the working directory.
pub const DEFAULT_SAVE_DIR: &str = "ComfyUI/custom_nodes/ComfyUI-Snap_Processing/save";

/// Legacy location for the standalone runner's second copy.
///
/// The casing differs from [`DEFAULT_SAVE_DIR`]; on case-sensitive
/// filesystems these are two different directories.
pub const DEFAULT_MODIFIED_DIR: &str = "ComfyUI/custom_nodes/Comfyui-Snap_Processing/save";

/// 8192 x 8192, a 256 MiB RGBA buffer.
pub const DEFAULT_MAX_CANVAS_PIXELS: u64 = 8192 * 8192;

/// Errors reported by [`EditorConfig::validate`].
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Canvas dimensions must be positive, got {width}x{height}")]
    CanvasSize { width: u32, height: u32 },

    #[error("Canvas {width}x{height} exceeds the {max_pixels} pixel limit")]
    CanvasTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("Scale range is invalid: min {min}, max {max}")]
    ScaleRange { min: f64, max: f64 },

    #[error("{name} must be a positive finite number, got {value}")]
    NotPositive { name: &'static str, value: f64 },
}

/// Tunables for the canvas editor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Initial canvas width when the host does not specify one.
    pub canvas_width: u32,
    /// Initial canvas height when the host does not specify one.
    pub canvas_height: u32,
    /// Largest canvas area (width x height) a resize may request.
    pub max_canvas_pixels: u64,
    /// Side length of the square resize handle at the item's bottom-right corner.
    pub handle_size: f64,
    /// Horizontal drag distance (local px) that doubles the scale.
    pub resize_sensitivity: f64,
    /// Smallest allowed uniform scale.
    pub min_scale: f64,
    /// Largest allowed uniform scale.
    pub max_scale: f64,
    /// Scale multiplier for a positive wheel delta.
    pub wheel_zoom_in: f64,
    /// Scale multiplier for a zero or negative wheel delta.
    pub wheel_zoom_out: f64,
    /// Filter used when fitting the source image to the canvas.
    pub resample_filter: FilterType,
    /// Filter used when drawing the transformed layer into previews and output.
    pub render_filter: InterpolationFilter,
    /// Border overlay color (RGBA).
    pub border_color: [u8; 4],
    /// Border overlay stroke width in px.
    pub border_width: f64,
    /// Directory receiving `output_<ms>.png` files.
    pub save_dir: PathBuf,
    /// Directory receiving the runner's `modified_output_<ms>.png` files.
    pub modified_dir: PathBuf,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            canvas_width: 512,
            canvas_height: 512,
            max_canvas_pixels: DEFAULT_MAX_CANVAS_PIXELS,
            handle_size: 15.0,
            resize_sensitivity: 500.0,
            min_scale: 0.1,
            max_scale: 10.0,
            wheel_zoom_in: 1.1,
            wheel_zoom_out: 0.9,
            resample_filter: FilterType::Bilinear,
            render_filter: InterpolationFilter::Bilinear,
            border_color: [255, 0, 0, 255],
            border_width: 2.0,
            save_dir: PathBuf::from(DEFAULT_SAVE_DIR),
            modified_dir: PathBuf::from(DEFAULT_MODIFIED_DIR),
        }
    }
}

impl EditorConfig {
    /// Create a configuration with the legacy defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Same configuration, saving into `dir`.
    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Same configuration, writing runner copies into `dir`.
    pub fn with_modified_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.modified_dir = dir.into();
        self
    }

    /// Whether a `width x height` canvas stays within `max_canvas_pixels`.
    pub fn fits_canvas(&self, width: u32, height: u32) -> bool {
        (width as u64) * (height as u64) <= self.max_canvas_pixels
    }

    /// Check that the values can drive an editor session.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(ConfigError::CanvasSize {
                width: self.canvas_width,
                height: self.canvas_height,
            });
        }

        if !self.fits_canvas(self.canvas_width, self.canvas_height) {
            return Err(ConfigError::CanvasTooLarge {
                width: self.canvas_width,
                height: self.canvas_height,
                max_pixels: self.max_canvas_pixels,
            });
        }

        for (name, value) in [
            ("handle_size", self.handle_size),
            ("resize_sensitivity", self.resize_sensitivity),
            ("wheel_zoom_in", self.wheel_zoom_in),
            ("wheel_zoom_out", self.wheel_zoom_out),
            ("border_width", self.border_width),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NotPositive { name, value });
            }
        }

        if !(self.min_scale.is_finite() && self.max_scale.is_finite())
            || self.min_scale <= 0.0
            || self.min_scale > self.max_scale
        {
            return Err(ConfigError::ScaleRange {
                min: self.min_scale,
                max: self.max_scale,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_legacy_constants() {
        let config = EditorConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (512, 512));
        assert_eq!(config.handle_size, 15.0);
        assert_eq!(config.resize_sensitivity, 500.0);
        assert_eq!((config.min_scale, config.max_scale), (0.1, 10.0));
        assert_eq!(config.save_dir, PathBuf::from(DEFAULT_SAVE_DIR));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_dirs() {
        let config = EditorConfig::new()
            .with_save_dir("/tmp/a")
            .with_modified_dir("/tmp/b");
        assert_eq!(config.save_dir, PathBuf::from("/tmp/a"));
        assert_eq!(config.modified_dir, PathBuf::from("/tmp/b"));
    }

    #[test]
    fn test_validate_rejects_zero_canvas() {
        let mut config = EditorConfig::default();
        config.canvas_height = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::CanvasSize {
                width: 512,
                height: 0
            })
        );
    }

    #[test]
    fn test_validate_rejects_canvas_over_pixel_limit() {
        let mut config = EditorConfig::default();
        config.max_canvas_pixels = 100;
        assert!(config.fits_canvas(10, 10));
        assert!(!config.fits_canvas(10, 11));
        assert!(matches!(
            config.validate(),
            Err(ConfigError::CanvasTooLarge { max_pixels: 100, .. })
        ));
    }

    #[test]
    fn test_fits_canvas_does_not_overflow() {
        let config = EditorConfig::default();
        assert!(!config.fits_canvas(u32::MAX, u32::MAX));
        assert!(config.fits_canvas(8192, 8192));
        assert!(!config.fits_canvas(8193, 8192));
    }

    #[test]
    fn test_validate_rejects_inverted_scale_range() {
        let mut config = EditorConfig::default();
        config.min_scale = 5.0;
        config.max_scale = 1.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ScaleRange { .. })
        ));
    }

    #[test]
    fn test_validate_rejects_non_positive_sensitivity() {
        let mut config = EditorConfig::default();
        config.resize_sensitivity = 0.0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NotPositive {
                name: "resize_sensitivity",
                ..
            })
        ));

        config.resize_sensitivity = f64::NAN;
        assert!(config.validate().is_err());
    }
}
