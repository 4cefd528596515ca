//! Backend-independent 2D scene.
//!
//! A scene is an ordered set of items, each with a local bounding box, a
//! local-to-scene affine transform, a z value, visibility and an input flag.
//! The editor logic only needs four capabilities from it: draw (per-item
//! sampling), hit-test, transform and render-to-raster. Any GUI toolkit or
//! a headless renderer can sit behind those.
//!
//! # Coordinate System
//!
//! - Scene and local spaces are y-down, origin at the top-left
//! - Rotations are in degrees, positive = clockwise on screen
//! - Pixel (x, y) covers the unit square `[x, x+1) x [y, y+1)`

mod item;
mod render;
mod sample;

use kurbo::{Point, Rect};

use crate::raster::Raster;

pub use item::{BorderItem, ItemKey, PixmapItem, SceneItem};
pub use render::{RasterRenderer, RenderError, Renderer};
pub use sample::{sample, InterpolationFilter};

/// Result of a successful hit-test.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// The item under the point.
    pub key: ItemKey,
    /// The point in the item's untransformed local space.
    pub local: Point,
}

/// An ordered, borrowed view over scene items.
///
/// Items are painted in ascending z order; equal z values keep their
/// insertion order, so later items sit on top.
pub struct Scene<'a> {
    items: Vec<&'a dyn SceneItem>,
}

impl<'a> Scene<'a> {
    /// Build a scene from items in insertion order.
    pub fn new(items: impl IntoIterator<Item = &'a dyn SceneItem>) -> Self {
        let mut items: Vec<&'a dyn SceneItem> = items.into_iter().collect();
        items.sort_by(|a, b| a.z_value().total_cmp(&b.z_value()));
        Self { items }
    }

    /// Items in paint order (bottom first).
    pub fn items(&self) -> &[&'a dyn SceneItem] {
        &self.items
    }

    /// Render the part of the scene inside `source` into a `width x height`
    /// raster.
    pub fn render(
        &self,
        renderer: &impl Renderer,
        source: Rect,
        width: u32,
        height: u32,
    ) -> Result<Raster, RenderError> {
        renderer.render(self, source, width, height)
    }

    /// Find the topmost visible, input-accepting item containing `point`.
    ///
    /// Hidden items and items that do not accept input are transparent to
    /// the pointer.
    pub fn hit_test(&self, point: Point) -> Option<Hit> {
        self.items
            .iter()
            .rev()
            .filter(|item| item.is_visible() && item.accepts_input())
            .find_map(|item| {
                let transform = item.transform();
                if !transform.determinant().is_normal() {
                    return None;
                }
                let local = transform.inverse() * point;
                item.contains(local).then_some(Hit {
                    key: item.key(),
                    local,
                })
            })
    }
}
