//! Scene rasterization.
//!
//! The CPU renderer uses inverse mapping: for each pixel of the output
//! raster, the pixel centre is mapped into scene coordinates, then through
//! each item's inverse transform into the item's local space, where the item
//! is sampled. Samples are composited bottom-to-top over an opaque base.

use kurbo::{Affine, Rect};
use thiserror::Error;

use super::{InterpolationFilter, Scene, SceneItem};
use crate::raster::{blend_over, Raster, Rgba, WHITE};

/// Errors raised while rendering a scene.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    /// Output raster would be empty
    #[error("Invalid render size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },

    /// Source rectangle has no area
    #[error("Source rectangle has no area")]
    EmptySource,

    /// An item's transform cannot be inverted
    #[error("Item transform is not invertible")]
    SingularTransform,
}

/// Turns a scene into pixels.
pub trait Renderer {
    /// Render the part of `scene` inside `source` (scene coordinates) into a
    /// `width x height` raster. The source rectangle is stretched to the
    /// output size, ignoring aspect ratio.
    fn render(
        &self,
        scene: &Scene<'_>,
        source: Rect,
        width: u32,
        height: u32,
    ) -> Result<Raster, RenderError>;
}

/// Headless CPU renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RasterRenderer {
    /// Color every output pixel starts from.
    pub base: Rgba,
    /// How transformed rasters are sampled.
    pub filter: InterpolationFilter,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        Self {
            base: WHITE,
            filter: InterpolationFilter::Bilinear,
        }
    }
}

impl RasterRenderer {
    pub fn new(filter: InterpolationFilter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }
}

impl Renderer for RasterRenderer {
    fn render(
        &self,
        scene: &Scene<'_>,
        source: Rect,
        width: u32,
        height: u32,
    ) -> Result<Raster, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        if !(source.width() > 0.0 && source.height() > 0.0) {
            return Err(RenderError::EmptySource);
        }

        // Output pixel space -> scene space
        let to_scene = Affine::translate((source.x0, source.y0))
            * Affine::scale_non_uniform(
                source.width() / width as f64,
                source.height() / height as f64,
            );

        let layers = scene
            .items()
            .iter()
            .filter(|item| item.is_visible())
            .map(|item| {
                let transform = item.transform();
                if !transform.determinant().is_normal() {
                    return Err(RenderError::SingularTransform);
                }
                // Output pixel space -> item local space
                Ok((*item, transform.inverse() * to_scene))
            })
            .collect::<Result<Vec<(&dyn SceneItem, Affine)>, _>>()?;

        let mut output = Raster::filled(width, height, self.base);

        for y in 0..height {
            for x in 0..width {
                let centre = kurbo::Point::new(x as f64 + 0.5, y as f64 + 0.5);
                let mut color = self.base;
                for (item, to_local) in &layers {
                    if let Some(sample) = item.sample(*to_local * centre, self.filter) {
                        color = blend_over(color, sample);
                    }
                }
                output.put_pixel(x, y, color);
            }
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{BorderItem, ItemKey, PixmapItem};
    use kurbo::Vec2;

    const RED: Rgba = [255, 0, 0, 255];
    const BLUE: Rgba = [0, 0, 255, 255];

    #[test]
    fn test_empty_scene_is_base_color() {
        let scene = Scene::new(std::iter::empty());
        let out = RasterRenderer::default()
            .render(&scene, Rect::new(0.0, 0.0, 8.0, 8.0), 8, 8)
            .unwrap();
        assert_eq!(out, Raster::filled(8, 8, WHITE));
    }

    #[test]
    fn test_render_rejects_zero_size() {
        let scene = Scene::new(std::iter::empty());
        let err = RasterRenderer::default()
            .render(&scene, Rect::new(0.0, 0.0, 8.0, 8.0), 0, 8)
            .unwrap_err();
        assert_eq!(err, RenderError::InvalidSize { width: 0, height: 8 });
    }

    #[test]
    fn test_render_rejects_empty_source() {
        let scene = Scene::new(std::iter::empty());
        let err = RasterRenderer::default()
            .render(&scene, Rect::new(0.0, 0.0, 0.0, 8.0), 8, 8)
            .unwrap_err();
        assert_eq!(err, RenderError::EmptySource);
    }

    #[test]
    fn test_translated_item_lands_at_offset() {
        let mut item = PixmapItem::new(ItemKey(1), Raster::filled(4, 4, BLUE));
        item.set_transform(Affine::translate(Vec2::new(4.0, 2.0)));
        let scene = Scene::new([&item as &dyn SceneItem]);

        let out = RasterRenderer::new(InterpolationFilter::Nearest)
            .render(&scene, Rect::new(0.0, 0.0, 10.0, 10.0), 10, 10)
            .unwrap();

        assert_eq!(out.pixel(3, 3), WHITE);
        assert_eq!(out.pixel(4, 2), BLUE);
        assert_eq!(out.pixel(7, 5), BLUE);
        assert_eq!(out.pixel(8, 5), WHITE);
    }

    #[test]
    fn test_source_rect_stretches_ignoring_aspect() {
        // 10x10 scene squeezed into 20x5 pixels
        let item = PixmapItem::new(ItemKey(1), Raster::filled(5, 10, BLUE));
        let scene = Scene::new([&item as &dyn SceneItem]);

        let out = RasterRenderer::new(InterpolationFilter::Nearest)
            .render(&scene, Rect::new(0.0, 0.0, 10.0, 10.0), 20, 5)
            .unwrap();

        assert_eq!((out.width, out.height), (20, 5));
        assert_eq!(out.pixel(9, 4), BLUE);
        assert_eq!(out.pixel(10, 0), WHITE);
    }

    #[test]
    fn test_hidden_items_are_skipped() {
        let mut border = BorderItem::new(ItemKey(2), Rect::new(0.0, 0.0, 6.0, 6.0), RED, 2.0);
        let scene_visible = Scene::new([&border as &dyn SceneItem]);
        let out = RasterRenderer::default()
            .render(&scene_visible, Rect::new(0.0, 0.0, 6.0, 6.0), 6, 6)
            .unwrap();
        assert_eq!(out.pixel(0, 0), RED);

        border.set_visible(false);
        let scene_hidden = Scene::new([&border as &dyn SceneItem]);
        let out = RasterRenderer::default()
            .render(&scene_hidden, Rect::new(0.0, 0.0, 6.0, 6.0), 6, 6)
            .unwrap();
        assert_eq!(out.pixel(0, 0), WHITE);
    }

    #[test]
    fn test_singular_transform_is_an_error() {
        let mut item = PixmapItem::new(ItemKey(1), Raster::filled(4, 4, BLUE));
        item.set_transform(Affine::scale(0.0));
        let scene = Scene::new([&item as &dyn SceneItem]);

        let err = RasterRenderer::default()
            .render(&scene, Rect::new(0.0, 0.0, 4.0, 4.0), 4, 4)
            .unwrap_err();
        assert_eq!(err, RenderError::SingularTransform);
    }

    #[test]
    fn test_transparent_pixels_show_base() {
        let item = PixmapItem::new(ItemKey(1), Raster::filled(4, 4, [0, 0, 0, 0]));
        let scene = Scene::new([&item as &dyn SceneItem]);
        let out = RasterRenderer::default()
            .render(&scene, Rect::new(0.0, 0.0, 4.0, 4.0), 4, 4)
            .unwrap();
        assert!(out.is_opaque());
        assert_eq!(out.pixel(2, 2), WHITE);
    }
}
