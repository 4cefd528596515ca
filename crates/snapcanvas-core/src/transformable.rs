//! The user's image as a movable, scalable, rotatable scene item.
//!
//! # Interaction
//!
//! ```text
//!          down in handle           up
//!   Idle ------------------> Resizing ----> Idle
//!     |     down elsewhere             up
//!     +--------------------> Dragging ----> Idle
//! ```
//!
//! Only the primary button starts an interaction. While resizing, the scale
//! is multiplied by `1 + offset.x / sensitivity` on every move, where
//! `offset` is the pointer's local displacement from the press point.
//! While dragging, the position follows the scene-space pointer delta.
//!
//! Scale and rotation both pivot on the centre of the item's untransformed
//! bounding box.

use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

use crate::config::EditorConfig;
use crate::raster::{Raster, Rgba};
use crate::scene::{sample, InterpolationFilter, ItemKey, SceneItem};

/// Pointer shape the host should show over the item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CursorShape {
    /// Plain pointer, shown over the bare canvas.
    Arrow,
    #[default]
    OpenHand,
    ClosedHand,
    /// Top-left to bottom-right diagonal resize arrow.
    ResizeDiagonal,
}

impl CursorShape {
    /// CSS cursor keyword for web hosts.
    pub fn css_name(self) -> &'static str {
        match self {
            CursorShape::Arrow => "default",
            CursorShape::OpenHand => "grab",
            CursorShape::ClosedHand => "grabbing",
            CursorShape::ResizeDiagonal => "nwse-resize",
        }
    }
}

/// Mouse button of a press event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

impl PointerButton {
    /// Map a DOM `MouseEvent.button` value.
    pub fn from_dom(button: i16) -> Self {
        match button {
            1 => PointerButton::Middle,
            2 => PointerButton::Secondary,
            _ => PointerButton::Primary,
        }
    }
}

/// Modal interaction state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionState {
    Idle,
    /// Corner-drag scaling; `anchor` is the press point in local space.
    Resizing { anchor: Point },
    /// Moving; `last` is the previous pointer position in scene space.
    Dragging { last: Point },
}

/// Numeric snapshot of the layer transform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LayerTransform {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    /// Degrees in `[0, 360)`.
    pub rotation: f64,
}

/// Interaction constants, taken from [`EditorConfig`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemLimits {
    pub handle_size: f64,
    pub resize_sensitivity: f64,
    pub min_scale: f64,
    pub max_scale: f64,
    pub wheel_zoom_in: f64,
    pub wheel_zoom_out: f64,
}

impl Default for ItemLimits {
    fn default() -> Self {
        Self::from(&EditorConfig::default())
    }
}

impl From<&EditorConfig> for ItemLimits {
    fn from(config: &EditorConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            resize_sensitivity: config.resize_sensitivity,
            min_scale: config.min_scale,
            max_scale: config.max_scale,
            wheel_zoom_in: config.wheel_zoom_in,
            wheel_zoom_out: config.wheel_zoom_out,
        }
    }
}

/// The single interactive image on the canvas.
#[derive(Debug, Clone)]
pub struct TransformableImage {
    key: ItemKey,
    pixmap: Raster,
    position: Vec2,
    scale: f64,
    rotation: f64,
    state: InteractionState,
    cursor: CursorShape,
    limits: ItemLimits,
}

impl TransformableImage {
    /// Wrap an already fitted raster, placed at the scene origin.
    pub fn new(key: ItemKey, pixmap: Raster, limits: ItemLimits) -> Self {
        Self {
            key,
            pixmap,
            position: Vec2::ZERO,
            scale: 1.0,
            rotation: 0.0,
            state: InteractionState::Idle,
            cursor: CursorShape::OpenHand,
            limits,
        }
    }

    pub fn pixmap(&self) -> &Raster {
        &self.pixmap
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Rotation in degrees, always in `[0, 360)`.
    pub fn rotation(&self) -> f64 {
        self.rotation
    }

    pub fn state(&self) -> InteractionState {
        self.state
    }

    pub fn cursor(&self) -> CursorShape {
        self.cursor
    }

    pub fn is_interacting(&self) -> bool {
        !matches!(self.state, InteractionState::Idle)
    }

    pub fn snapshot(&self) -> LayerTransform {
        LayerTransform {
            x: self.position.x,
            y: self.position.y,
            scale: self.scale,
            rotation: self.rotation,
        }
    }

    /// Pivot for scale and rotation: centre of the local bounding box.
    pub fn transform_origin(&self) -> Point {
        self.bounding_rect().center()
    }

    /// Map a scene point into local space. `None` if the transform is singular.
    pub fn map_from_scene(&self, scene: Point) -> Option<Point> {
        let transform = self.transform();
        transform
            .determinant()
            .is_normal()
            .then(|| transform.inverse() * scene)
    }

    /// True iff `local` lies in the square handle at the bottom-right corner
    /// (edges inclusive).
    pub fn hit_test_resize_handle(&self, local: Point) -> bool {
        let rect = self.bounding_rect();
        let size = self.limits.handle_size;
        let handle = Rect::new(rect.x1 - size, rect.y1 - size, rect.x1, rect.y1);
        local.x >= handle.x0 && local.x <= handle.x1 && local.y >= handle.y0 && local.y <= handle.y1
    }

    /// Hover without a pressed button: only the cursor changes.
    pub fn hover(&mut self, local: Point) -> CursorShape {
        self.cursor = if self.hit_test_resize_handle(local) {
            CursorShape::ResizeDiagonal
        } else {
            CursorShape::OpenHand
        };
        self.cursor
    }

    /// Press at `local` (item space) / `scene` (scene space).
    ///
    /// Returns `false` when the press is ignored (non-primary button).
    pub fn pointer_down(&mut self, local: Point, scene: Point, button: PointerButton) -> bool {
        if button != PointerButton::Primary {
            return false;
        }

        if self.hit_test_resize_handle(local) {
            self.state = InteractionState::Resizing { anchor: local };
            self.cursor = CursorShape::ResizeDiagonal;
        } else {
            self.state = InteractionState::Dragging { last: scene };
            self.cursor = CursorShape::ClosedHand;
        }
        true
    }

    /// Pointer moved to `scene` while the item holds the pointer.
    pub fn pointer_dragged(&mut self, scene: Point) {
        match self.state {
            InteractionState::Resizing { anchor } => {
                if let Some(local) = self.map_from_scene(scene) {
                    self.resize_by_offset(local - anchor);
                }
            }
            InteractionState::Dragging { last } => {
                self.position += scene - last;
                self.state = InteractionState::Dragging { last: scene };
            }
            InteractionState::Idle => {
                if let Some(local) = self.map_from_scene(scene) {
                    self.hover(local);
                }
            }
        }
    }

    /// Release: back to idle with the open-hand cursor.
    pub fn pointer_up(&mut self) {
        self.state = InteractionState::Idle;
        self.cursor = CursorShape::OpenHand;
    }

    /// Corner-drag scaling from a local offset.
    ///
    /// Returns whether the scale changed.
    pub fn resize_by_offset(&mut self, offset: Vec2) -> bool {
        let factor = 1.0 + offset.x / self.limits.resize_sensitivity;
        if factor <= 0.0 {
            return false;
        }
        self.apply_scale_factor(factor)
    }

    /// Wheel scaling: zoom in for a positive delta, out otherwise.
    pub fn scroll(&mut self, delta: f64) -> bool {
        let factor = if delta > 0.0 {
            self.limits.wheel_zoom_in
        } else {
            self.limits.wheel_zoom_out
        };
        self.apply_scale_factor(factor)
    }

    /// Multiply the scale by `factor` if the result stays within
    /// `[min_scale, max_scale]`; otherwise leave it untouched.
    pub fn apply_scale_factor(&mut self, factor: f64) -> bool {
        let candidate = self.scale * factor;
        if !(self.limits.min_scale..=self.limits.max_scale).contains(&candidate) {
            return false;
        }
        self.scale = candidate;
        log::debug!("image scale -> {:.4}", self.scale);
        true
    }

    /// Add `degrees` to the rotation, normalized into `[0, 360)`.
    ///
    /// Non-finite angles are ignored.
    pub fn rotate(&mut self, degrees: f64) -> bool {
        if !degrees.is_finite() {
            return false;
        }
        self.rotation = normalize_degrees(self.rotation + degrees);
        log::debug!("image rotation -> {:.2}", self.rotation);
        true
    }
}

/// Normalize an angle into `[0, 360)`.
pub fn normalize_degrees(degrees: f64) -> f64 {
    let r = degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360 for tiny negative inputs
    if r >= 360.0 {
        0.0
    } else {
        r
    }
}

impl SceneItem for TransformableImage {
    fn key(&self) -> ItemKey {
        self.key
    }

    fn bounding_rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.pixmap.width as f64, self.pixmap.height as f64)
    }

    /// `T(pos) * T(origin) * R * S * T(-origin)`
    fn transform(&self) -> Affine {
        let origin = self.transform_origin().to_vec2();
        Affine::translate(self.position + origin)
            * Affine::rotate(self.rotation.to_radians())
            * Affine::scale(self.scale)
            * Affine::translate(-origin)
    }

    fn accepts_input(&self) -> bool {
        true
    }

    fn sample(&self, local: Point, filter: InterpolationFilter) -> Option<Rgba> {
        sample(&self.pixmap, local, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::WHITE;

    fn item(width: u32, height: u32) -> TransformableImage {
        TransformableImage::new(
            ItemKey(1),
            Raster::filled(width, height, WHITE),
            ItemLimits::default(),
        )
    }

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{} != {}", a, b);
    }

    #[test]
    fn test_new_item_is_identity() {
        let it = item(100, 50);
        assert_eq!(it.transform(), Affine::IDENTITY);
        assert_eq!(it.state(), InteractionState::Idle);
        assert_eq!(it.cursor(), CursorShape::OpenHand);
        assert_eq!(it.transform_origin(), Point::new(50.0, 25.0));
    }

    #[test]
    fn test_resize_handle_region() {
        let it = item(100, 50);
        assert!(it.hit_test_resize_handle(Point::new(100.0, 50.0)));
        assert!(it.hit_test_resize_handle(Point::new(85.0, 35.0)));
        assert!(it.hit_test_resize_handle(Point::new(92.0, 40.0)));
        assert!(!it.hit_test_resize_handle(Point::new(84.9, 40.0)));
        assert!(!it.hit_test_resize_handle(Point::new(92.0, 34.9)));
        assert!(!it.hit_test_resize_handle(Point::new(10.0, 10.0)));
    }

    #[test]
    fn test_hover_updates_cursor_only() {
        let mut it = item(100, 100);
        assert_eq!(it.hover(Point::new(95.0, 95.0)), CursorShape::ResizeDiagonal);
        assert_eq!(it.hover(Point::new(5.0, 5.0)), CursorShape::OpenHand);
        assert_eq!(it.state(), InteractionState::Idle);
        assert_eq!(it.scale(), 1.0);
    }

    #[test]
    fn test_press_in_handle_enters_resizing() {
        let mut it = item(100, 100);
        let p = Point::new(95.0, 95.0);
        assert!(it.pointer_down(p, p, PointerButton::Primary));
        assert_eq!(it.state(), InteractionState::Resizing { anchor: p });
        assert_eq!(it.cursor(), CursorShape::ResizeDiagonal);
    }

    #[test]
    fn test_press_elsewhere_enters_dragging() {
        let mut it = item(100, 100);
        let p = Point::new(10.0, 10.0);
        assert!(it.pointer_down(p, p, PointerButton::Primary));
        assert_eq!(it.state(), InteractionState::Dragging { last: p });
        assert_eq!(it.cursor(), CursorShape::ClosedHand);
    }

    #[test]
    fn test_secondary_button_is_ignored() {
        let mut it = item(100, 100);
        let p = Point::new(95.0, 95.0);
        assert!(!it.pointer_down(p, p, PointerButton::Secondary));
        assert_eq!(it.state(), InteractionState::Idle);
    }

    #[test]
    fn test_drag_moves_by_scene_delta() {
        let mut it = item(100, 100);
        it.pointer_down(Point::new(10.0, 10.0), Point::new(10.0, 10.0), PointerButton::Primary);
        it.pointer_dragged(Point::new(30.0, 25.0));
        it.pointer_dragged(Point::new(35.0, 20.0));
        assert_eq!(it.position(), Vec2::new(25.0, 10.0));
        it.pointer_up();
        assert_eq!(it.state(), InteractionState::Idle);
        assert_eq!(it.cursor(), CursorShape::OpenHand);
    }

    #[test]
    fn test_resize_drag_scales_up() {
        let mut it = item(100, 100);
        let anchor = Point::new(95.0, 95.0);
        it.pointer_down(anchor, anchor, PointerButton::Primary);

        // Scene point 50 local px to the right of the anchor at scale 1.
        it.pointer_dragged(Point::new(145.0, 95.0));
        assert_close(it.scale(), 1.1);
        it.pointer_up();
        assert_eq!(it.state(), InteractionState::Idle);
    }

    #[test]
    fn test_zero_offset_keeps_scale() {
        let mut it = item(100, 100);
        assert!(it.resize_by_offset(Vec2::new(0.0, 40.0)));
        assert_eq!(it.scale(), 1.0);
    }

    #[test]
    fn test_non_positive_factor_rejected() {
        let mut it = item(100, 100);
        assert!(!it.resize_by_offset(Vec2::new(-500.0, 0.0)));
        assert!(!it.resize_by_offset(Vec2::new(-900.0, 0.0)));
        assert_eq!(it.scale(), 1.0);
    }

    #[test]
    fn test_scale_clamped_range() {
        let mut it = item(10, 10);
        assert!(!it.apply_scale_factor(10.5));
        assert_eq!(it.scale(), 1.0);
        assert!(it.apply_scale_factor(10.0));
        assert_eq!(it.scale(), 10.0);
        assert!(!it.apply_scale_factor(1.01));
        assert_eq!(it.scale(), 10.0);
    }

    #[test]
    fn test_scroll_directions() {
        let mut it = item(10, 10);
        assert!(it.scroll(120.0));
        assert_close(it.scale(), 1.1);
        assert!(it.scroll(-120.0));
        assert_close(it.scale(), 0.99);
        assert!(it.scroll(0.0));
        assert_close(it.scale(), 0.891);
    }

    #[test]
    fn test_scroll_stops_at_min_scale() {
        let mut it = item(10, 10);
        let mut steps = 0;
        while it.scroll(-1.0) {
            steps += 1;
            assert!(steps < 100);
        }
        assert!(it.scale() >= 0.1);
        assert!(it.scale() * 0.9 < 0.1);
    }

    #[test]
    fn test_rotation_accumulates_mod_360() {
        let mut it = item(10, 10);
        it.rotate(300.0);
        it.rotate(90.0);
        assert_close(it.rotation(), 30.0);
        it.rotate(-45.0);
        assert_close(it.rotation(), 345.0);
    }

    #[test]
    fn test_rotation_ignores_non_finite() {
        let mut it = item(10, 10);
        it.rotate(10.0);
        assert!(!it.rotate(f64::NAN));
        assert!(!it.rotate(f64::INFINITY));
        assert_eq!(it.rotation(), 10.0);
    }

    #[test]
    fn test_normalize_degrees_edge_cases() {
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-90.0), 270.0);
        assert_eq!(normalize_degrees(720.0 + 15.0), 15.0);
        assert!(normalize_degrees(-1e-20) < 360.0);
    }

    #[test]
    fn test_transform_pivots_on_centre() {
        let mut it = item(100, 50);
        it.apply_scale_factor(2.0);
        it.rotate(90.0);

        // The centre stays put under scale and rotation.
        let centre = it.transform() * Point::new(50.0, 25.0);
        assert_close(centre.x, 50.0);
        assert_close(centre.y, 25.0);

        // Clockwise on screen: the right edge midpoint swings downwards.
        let right_mid = it.transform() * Point::new(100.0, 25.0);
        assert_close(right_mid.x, 50.0);
        assert_close(right_mid.y, 125.0);
    }

    #[test]
    fn test_map_from_scene_round_trips() {
        let mut it = item(80, 60);
        it.set_position(Vec2::new(12.0, -7.0));
        it.apply_scale_factor(1.5);
        it.rotate(33.0);

        let local = Point::new(17.0, 41.0);
        let back = it.map_from_scene(it.transform() * local).unwrap();
        assert_close(back.x, local.x);
        assert_close(back.y, local.y);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::WHITE;
    use proptest::prelude::*;

    fn item() -> TransformableImage {
        TransformableImage::new(ItemKey(1), Raster::filled(8, 8, WHITE), ItemLimits::default())
    }

    proptest! {
        /// Property: Scale never leaves [min, max]; rejected requests are no-ops.
        #[test]
        fn prop_scale_stays_in_range(factors in prop::collection::vec(0.01f64..20.0, 1..40)) {
            let mut it = item();
            for factor in factors {
                let before = it.scale();
                let candidate = before * factor;
                let applied = it.apply_scale_factor(factor);
                if (0.1..=10.0).contains(&candidate) {
                    prop_assert!(applied);
                    prop_assert_eq!(it.scale(), candidate);
                } else {
                    prop_assert!(!applied);
                    prop_assert_eq!(it.scale(), before);
                }
                prop_assert!((0.1..=10.0).contains(&it.scale()));
            }
        }

        /// Property: Rotation is (previous + requested) mod 360, in [0, 360).
        #[test]
        fn prop_rotation_normalized(angles in prop::collection::vec(-1.0e4f64..1.0e4, 1..20)) {
            let mut it = item();
            for angle in angles {
                let previous = it.rotation();
                it.rotate(angle);
                let r = it.rotation();
                prop_assert!((0.0..360.0).contains(&r));
                let expected = (previous + angle).rem_euclid(360.0);
                let diff = (r - expected).abs();
                prop_assert!(diff < 1e-6 || (360.0 - diff) < 1e-6);
            }
        }

        /// Property: A resize drag with zero horizontal offset never changes scale.
        #[test]
        fn prop_zero_offset_is_identity(dy in -1000.0f64..1000.0, start in 0.1f64..10.0) {
            let mut it = item();
            it.scale = start;
            it.resize_by_offset(Vec2::new(0.0, dy));
            prop_assert_eq!(it.scale(), start);
        }
    }
}
