//! The canvas surface: a fixed-size white canvas hosting the image layer and
//! a visual border, plus the operations a toolbar drives.
//!
//! # Scene layout
//!
//! | Item | z | Input | In output |
//! |------|---|-------|-----------|
//! | white background | 0 | no | yes |
//! | transformable image | 0 (added after background) | yes | yes |
//! | border overlay | 1 | no | no |
//!
//! Text-driven operations validate the whole input before touching any
//! state, so a rejected request never leaves a partial change behind.

use std::ops::Deref;

use kurbo::{Point, Rect};
use thiserror::Error;

use crate::config::{ConfigError, EditorConfig};
use crate::decode::{fit_within, DecodeError};
use crate::raster::{Raster, WHITE};
use crate::scene::{
    BorderItem, ItemKey, PixmapItem, RasterRenderer, RenderError, Scene, SceneItem,
};
use crate::transformable::{CursorShape, ItemLimits, PointerButton, TransformableImage};

pub const BACKGROUND_KEY: ItemKey = ItemKey(0);
pub const IMAGE_KEY: ItemKey = ItemKey(1);
pub const BORDER_KEY: ItemKey = ItemKey(2);

/// z value that keeps the border above the image.
const BORDER_Z: f64 = 1.0;

/// Rejected toolbar text.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InputError {
    #[error("Canvas {field} must be a positive integer, got {text:?}")]
    NotAnInteger { field: &'static str, text: String },

    #[error("Rotation angle must be a number, got {text:?}")]
    NotANumber { text: String },
}

/// Errors raised by canvas operations.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Canvas dimensions must be positive, got {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Canvas {width}x{height} exceeds the {max_pixels} pixel limit")]
    TooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },

    #[error("Source image is empty")]
    EmptySource,

    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Failed to fit source image: {0}")]
    Fit(#[from] DecodeError),

    #[error("Render failed: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),
}

/// Parse a canvas dimension typed by the user.
///
/// Surrounding whitespace is ignored; zero and negative values are rejected.
pub fn parse_dimension(field: &'static str, text: &str) -> Result<u32, InputError> {
    match text.trim().parse::<u32>() {
        Ok(value) if value > 0 => Ok(value),
        _ => Err(InputError::NotAnInteger {
            field,
            text: text.to_string(),
        }),
    }
}

/// Parse a rotation angle typed by the user. Must be a finite number.
pub fn parse_angle(text: &str) -> Result<f64, InputError> {
    match text.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(InputError::NotANumber {
            text: text.to_string(),
        }),
    }
}

/// Reject empty canvases and canvases over `max_pixels` before anything
/// allocates.
fn check_size(width: u32, height: u32, max_pixels: u64) -> Result<(), CanvasError> {
    if width == 0 || height == 0 {
        return Err(CanvasError::InvalidDimensions { width, height });
    }
    if (width as u64) * (height as u64) > max_pixels {
        return Err(CanvasError::TooLarge {
            width,
            height,
            max_pixels,
        });
    }
    Ok(())
}

/// The editable scene of one session.
#[derive(Debug, Clone)]
pub struct CanvasSurface {
    width: u32,
    height: u32,
    background: PixmapItem,
    image: TransformableImage,
    border: BorderItem,
    border_color: [u8; 4],
    border_width: f64,
    max_pixels: u64,
    renderer: RasterRenderer,
    cursor: CursorShape,
    last_output: Option<Raster>,
}

impl CanvasSurface {
    /// Build the scene for `source` on a `width x height` canvas.
    ///
    /// The source is scaled to fit the canvas, preserving aspect ratio, and
    /// placed at the scene origin.
    pub fn new(
        source: &Raster,
        width: u32,
        height: u32,
        config: &EditorConfig,
    ) -> Result<Self, CanvasError> {
        config.validate()?;
        check_size(width, height, config.max_canvas_pixels)?;
        if source.is_empty() {
            return Err(CanvasError::EmptySource);
        }

        let fitted = fit_within(source, width, height, config.resample_filter)?;
        log::debug!(
            "fitted {}x{} source to {}x{} on {}x{} canvas",
            source.width,
            source.height,
            fitted.width,
            fitted.height,
            width,
            height
        );

        let image = TransformableImage::new(IMAGE_KEY, fitted, ItemLimits::from(config));

        Ok(Self {
            width,
            height,
            background: Self::make_background(width, height),
            image,
            border: Self::make_border(width, height, config.border_color, config.border_width),
            border_color: config.border_color,
            border_width: config.border_width,
            max_pixels: config.max_canvas_pixels,
            renderer: RasterRenderer::new(config.render_filter),
            cursor: CursorShape::Arrow,
            last_output: None,
        })
    }

    /// Build the scene using the configured default canvas size.
    pub fn with_default_size(source: &Raster, config: &EditorConfig) -> Result<Self, CanvasError> {
        Self::new(source, config.canvas_width, config.canvas_height, config)
    }

    fn make_background(width: u32, height: u32) -> PixmapItem {
        PixmapItem::new(BACKGROUND_KEY, Raster::filled(width, height, WHITE))
    }

    fn make_border(width: u32, height: u32, color: [u8; 4], stroke: f64) -> BorderItem {
        let mut border = BorderItem::new(
            BORDER_KEY,
            Rect::new(0.0, 0.0, width as f64, height as f64),
            color,
            stroke,
        );
        border.set_z_value(BORDER_Z);
        border
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Canvas bounds in scene coordinates.
    pub fn scene_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width as f64, self.height as f64)
    }

    pub fn image(&self) -> &TransformableImage {
        &self.image
    }

    pub fn image_mut(&mut self) -> &mut TransformableImage {
        &mut self.image
    }

    pub fn background(&self) -> &Raster {
        self.background.pixmap()
    }

    pub fn border(&self) -> &BorderItem {
        &self.border
    }

    /// Cursor for the last pointer position.
    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    /// All items in paint order.
    pub fn scene(&self) -> Scene<'_> {
        Scene::new([
            &self.background as &dyn SceneItem,
            &self.image,
            &self.border,
        ])
    }

    /// Resize the canvas to numeric dimensions.
    ///
    /// Background and border are rebuilt; the image layer keeps its
    /// transform even if it now lies partly or wholly off-canvas.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), CanvasError> {
        check_size(width, height, self.max_pixels)?;

        self.width = width;
        self.height = height;
        self.background
            .set_pixmap(Raster::filled(width, height, WHITE));
        self.border = Self::make_border(width, height, self.border_color, self.border_width);

        log::info!("canvas resized to {}x{}", width, height);
        Ok(())
    }

    /// Resize from toolbar text. Both fields are parsed before anything changes.
    pub fn set_canvas_size(&mut self, width_text: &str, height_text: &str) -> Result<(), CanvasError> {
        let width = parse_dimension("width", width_text)?;
        let height = parse_dimension("height", height_text)?;
        self.resize(width, height)
    }

    /// Rotate the image layer by the angle in `angle_text`, in degrees.
    ///
    /// Returns the new absolute rotation.
    pub fn rotate(&mut self, angle_text: &str) -> Result<f64, CanvasError> {
        let angle = parse_angle(angle_text)?;
        self.image.rotate(angle);
        Ok(self.image.rotation())
    }

    /// Primary/secondary/middle press at a scene point.
    ///
    /// Returns whether the image layer took the press.
    pub fn pointer_down(&mut self, scene: Point, button: PointerButton) -> bool {
        let hit = self.scene().hit_test(scene);
        let accepted = match hit {
            Some(hit) if hit.key == IMAGE_KEY => self.image.pointer_down(hit.local, scene, button),
            _ => false,
        };
        if accepted {
            self.cursor = self.image.cursor();
        }
        accepted
    }

    /// Pointer motion at a scene point, pressed or not.
    ///
    /// While the image holds the pointer it receives every move, even
    /// outside its bounds.
    pub fn pointer_move(&mut self, scene: Point) -> CursorShape {
        if self.image.is_interacting() {
            self.image.pointer_dragged(scene);
            self.cursor = self.image.cursor();
            return self.cursor;
        }

        let hit = self.scene().hit_test(scene);
        self.cursor = match hit {
            Some(hit) if hit.key == IMAGE_KEY => self.image.hover(hit.local),
            _ => CursorShape::Arrow,
        };
        self.cursor
    }

    /// Release of any button.
    pub fn pointer_up(&mut self, scene: Point) {
        if self.image.is_interacting() {
            self.image.pointer_up();
        }
        self.pointer_move(scene);
    }

    /// Wheel over a scene point. Only reaches the image when it is under
    /// the pointer.
    pub fn scroll(&mut self, scene: Point, delta: f64) -> bool {
        match self.scene().hit_test(scene) {
            Some(hit) if hit.key == IMAGE_KEY => self.image.scroll(delta),
            _ => false,
        }
    }

    /// What the user sees: the scene including the border.
    pub fn render_preview(&self) -> Result<Raster, RenderError> {
        self.render_canvas()
    }

    fn render_canvas(&self) -> Result<Raster, RenderError> {
        self.scene()
            .render(&self.renderer, self.scene_rect(), self.width, self.height)
    }

    /// Render background and image layer, without the border, into a raster
    /// of exactly the canvas size, and keep it as the last output.
    ///
    /// The border is visible again afterwards whether or not rendering
    /// succeeded.
    pub fn flatten(&mut self) -> Result<&Raster, CanvasError> {
        let output = {
            let hidden = HiddenBorder::new(self);
            hidden.render_canvas()?
        };

        log::debug!("flattened canvas to {}x{}", output.width, output.height);
        Ok(self.last_output.insert(output))
    }

    /// Raster produced by the most recent flatten.
    pub fn last_output(&self) -> Option<&Raster> {
        self.last_output.as_ref()
    }

    pub fn into_last_output(self) -> Option<Raster> {
        self.last_output
    }
}

/// Keeps the border hidden for its lifetime.
struct HiddenBorder<'a> {
    surface: &'a mut CanvasSurface,
}

impl<'a> HiddenBorder<'a> {
    fn new(surface: &'a mut CanvasSurface) -> Self {
        surface.border.set_visible(false);
        Self { surface }
    }
}

impl Deref for HiddenBorder<'_> {
    type Target = CanvasSurface;

    fn deref(&self) -> &CanvasSurface {
        self.surface
    }
}

impl Drop for HiddenBorder<'_> {
    fn drop(&mut self) {
        self.surface.border.set_visible(true);
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
