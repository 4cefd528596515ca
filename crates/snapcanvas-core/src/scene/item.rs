//! Scene item capability trait and the two stock items.

use kurbo::{Affine, Point, Rect};

use super::sample::{sample, InterpolationFilter};
use crate::raster::{Raster, Rgba};

/// Identifies an item within one scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ItemKey(pub u32);

/// What a renderer and a hit-tester need to know about an item.
pub trait SceneItem {
    /// Identity of the item within its scene.
    fn key(&self) -> ItemKey;

    /// Bounds in the item's own untransformed coordinates.
    fn bounding_rect(&self) -> Rect;

    /// Local-to-scene transform.
    fn transform(&self) -> Affine {
        Affine::IDENTITY
    }

    fn z_value(&self) -> f64 {
        0.0
    }

    fn is_visible(&self) -> bool {
        true
    }

    /// Whether the item takes part in hit-testing.
    fn accepts_input(&self) -> bool {
        false
    }

    /// Whether a local point lies on the item. Edges count as inside, so
    /// the far corner `(x1, y1)` still hits.
    fn contains(&self, local: Point) -> bool {
        let r = self.bounding_rect();
        local.x >= r.x0 && local.x <= r.x1 && local.y >= r.y0 && local.y <= r.y1
    }

    /// Color contributed at a local point, `None` where the item is absent.
    fn sample(&self, local: Point, filter: InterpolationFilter) -> Option<Rgba>;

    /// Bounding box of the item in scene coordinates.
    fn scene_bounding_rect(&self) -> Rect {
        self.transform().transform_rect_bbox(self.bounding_rect())
    }
}

/// A raster drawn at its native size, origin at the local top-left.
#[derive(Debug, Clone)]
pub struct PixmapItem {
    key: ItemKey,
    pixmap: Raster,
    transform: Affine,
    z_value: f64,
    visible: bool,
    accepts_input: bool,
}

impl PixmapItem {
    pub fn new(key: ItemKey, pixmap: Raster) -> Self {
        Self {
            key,
            pixmap,
            transform: Affine::IDENTITY,
            z_value: 0.0,
            visible: true,
            accepts_input: false,
        }
    }

    pub fn pixmap(&self) -> &Raster {
        &self.pixmap
    }

    /// Replace the raster; the bounding rect follows its size.
    pub fn set_pixmap(&mut self, pixmap: Raster) {
        self.pixmap = pixmap;
    }

    pub fn set_transform(&mut self, transform: Affine) {
        self.transform = transform;
    }

    pub fn set_z_value(&mut self, z: f64) {
        self.z_value = z;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_accepts_input(&mut self, accepts: bool) {
        self.accepts_input = accepts;
    }
}

impl SceneItem for PixmapItem {
    fn key(&self) -> ItemKey {
        self.key
    }

    fn bounding_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.pixmap.width as f64, self.pixmap.height as f64)
    }

    fn transform(&self) -> Affine {
        self.transform
    }

    fn z_value(&self) -> f64 {
        self.z_value
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn accepts_input(&self) -> bool {
        self.accepts_input
    }

    fn sample(&self, local: Point, filter: InterpolationFilter) -> Option<Rgba> {
        sample(&self.pixmap, local, filter)
    }
}

/// A rectangle outline, stroke centred on the rectangle's edges.
///
/// Purely visual: never accepts input.
#[derive(Debug, Clone)]
pub struct BorderItem {
    key: ItemKey,
    rect: Rect,
    color: Rgba,
    width: f64,
    z_value: f64,
    visible: bool,
}

impl BorderItem {
    pub fn new(key: ItemKey, rect: Rect, color: Rgba, width: f64) -> Self {
        Self {
            key,
            rect,
            color,
            width,
            z_value: 0.0,
            visible: true,
        }
    }

    pub fn rect(&self) -> Rect {
        self.rect
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn set_z_value(&mut self, z: f64) {
        self.z_value = z;
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }
}

impl SceneItem for BorderItem {
    fn key(&self) -> ItemKey {
        self.key
    }

    fn bounding_rect(&self) -> Rect {
        let half = self.width / 2.0;
        self.rect.inflate(half, half)
    }

    fn z_value(&self) -> f64 {
        self.z_value
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn sample(&self, local: Point, _filter: InterpolationFilter) -> Option<Rgba> {
        let half = self.width / 2.0;
        let outer = self.rect.inflate(half, half);
        let inner = self.rect.inflate(-half, -half);

        let in_outer = local.x >= outer.x0
            && local.x <= outer.x1
            && local.y >= outer.y0
            && local.y <= outer.y1;
        let in_inner = inner.width() > 0.0
            && inner.height() > 0.0
            && local.x > inner.x0
            && local.x < inner.x1
            && local.y > inner.y0
            && local.y < inner.y1;

        (in_outer && !in_inner).then_some(self.color)
    }
}
