//! Canvas editor WASM bindings.
//!
//! [`CanvasEditor`] wraps one editing session. The host forwards DOM pointer
//! and wheel events in canvas coordinates, drives the toolbar, draws
//! `render_preview()` and finally calls `save_and_close()` or `close()`.
//!
//! # Example
//!
//! ```typescript
//! import { CanvasEditor } from '@snapcanvas/wasm';
//!
//! const editor = new CanvasEditor(bytes, 512, 512, { border_width: 3 });
//! canvas.onpointerdown = (e) => editor.pointer_down(e.offsetX, e.offsetY, e.button);
//! canvas.onpointermove = (e) => {
//!   canvas.style.cursor = editor.pointer_move(e.offsetX, e.offsetY);
//! };
//! canvas.onwheel = (e) => editor.wheel(e.offsetX, e.offsetY, e.deltaY);
//!
//! const png = editor.save_and_close();
//! for (const event of editor.take_events()) console.log(event.type);
//! ```

use crate::types::{js_error, JsRaster};
use kurbo::Point;
use snapcanvas_core::{
    EditorConfig, LayerTransform, MemoryStore, PointerButton, Session, SessionError,
};
use wasm_bindgen::prelude::*;

fn now_millis() -> u64 {
    js_sys::Date::now() as u64
}

/// One editing session for JavaScript hosts.
#[wasm_bindgen]
pub struct CanvasEditor {
    session: Session<MemoryStore>,
}

#[wasm_bindgen]
impl CanvasEditor {
    /// Open an editor on encoded image bytes (PNG or JPEG).
    ///
    /// `width`/`height` default to the config's canvas size. `config` is an
    /// optional object with any subset of the editor settings.
    #[wasm_bindgen(constructor)]
    pub fn new(
        bytes: &[u8],
        width: Option<u32>,
        height: Option<u32>,
        config: JsValue,
    ) -> Result<CanvasEditor, JsValue> {
        let config: EditorConfig = if config.is_undefined() || config.is_null() {
            EditorConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&format!("Invalid editor config: {}", e)))?
        };
        let store = MemoryStore::with_clock(now_millis);
        Self::open(bytes, width, height, &config, store).map_err(js_error)
    }

    /// Current canvas width
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.session.surface().width()
    }

    /// Current canvas height
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.session.surface().height()
    }

    /// CSS cursor keyword for the last pointer position
    pub fn cursor(&self) -> String {
        self.session.surface().cursor().css_name().to_string()
    }

    #[wasm_bindgen(getter)]
    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }

    /// Press at canvas coordinates; `button` is `MouseEvent.button`.
    pub fn pointer_down(&mut self, x: f64, y: f64, button: i16) -> Result<bool, JsValue> {
        self.session
            .pointer_down(Point::new(x, y), PointerButton::from_dom(button))
            .map_err(js_error)
    }

    /// Pointer motion. Returns the CSS cursor to show.
    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<String, JsValue> {
        self.session
            .pointer_move(Point::new(x, y))
            .map(|cursor| cursor.css_name().to_string())
            .map_err(js_error)
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<(), JsValue> {
        self.session.pointer_up(Point::new(x, y)).map_err(js_error)
    }

    /// Wheel event; `delta_y` is `WheelEvent.deltaY` (negative = scroll up = zoom in).
    pub fn wheel(&mut self, x: f64, y: f64, delta_y: f64) -> Result<bool, JsValue> {
        self.session
            .scroll(Point::new(x, y), -delta_y)
            .map_err(js_error)
    }

    /// Resize the canvas from the toolbar's width and height text.
    pub fn set_canvas_size(&mut self, width_text: &str, height_text: &str) -> Result<(), JsValue> {
        self.apply_size(width_text, height_text).map_err(js_error)
    }

    /// Rotate by the toolbar's angle text. Returns the new rotation in degrees.
    pub fn rotate(&mut self, angle_text: &str) -> Result<f64, JsValue> {
        self.apply_angle(angle_text).map_err(js_error)
    }

    /// Current layer transform as `{ x, y, scale, rotation }`.
    pub fn transform(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.layer_transform()).map_err(js_error)
    }

    /// Render the canvas as the user sees it, border included.
    pub fn render_preview(&self) -> Result<JsRaster, JsValue> {
        self.session
            .render_preview()
            .map(JsRaster::from_raster)
            .map_err(js_error)
    }

    /// Flatten and keep the output without closing. Returns PNG bytes.
    pub fn save(&mut self) -> Result<Vec<u8>, JsValue> {
        self.save_png(false).map_err(js_error)
    }

    /// Flatten, keep the output and close. Returns PNG bytes.
    pub fn save_and_close(&mut self) -> Result<Vec<u8>, JsValue> {
        self.save_png(true).map_err(js_error)
    }

    pub fn close(&mut self) -> Result<(), JsValue> {
        self.session.close().map_err(js_error)
    }

    /// Drain queued events as plain objects tagged by `type`.
    pub fn take_events(&mut self) -> Result<js_sys::Array, JsValue> {
        let events = js_sys::Array::new();
        for event in self.session.take_events() {
            events.push(&serde_wasm_bindgen::to_value(&event).map_err(js_error)?);
        }
        Ok(events)
    }

    /// Raster of the most recent save, available after close.
    pub fn last_output(&self) -> Option<JsRaster> {
        self.session.last_output().cloned().map(JsRaster::from_raster)
    }
}

impl CanvasEditor {
    fn open(
        bytes: &[u8],
        width: Option<u32>,
        height: Option<u32>,
        config: &EditorConfig,
        store: MemoryStore,
    ) -> Result<Self, SessionError> {
        let width = width.unwrap_or(config.canvas_width);
        let height = height.unwrap_or(config.canvas_height);
        let session = Session::open_encoded(bytes, width, height, config, store)?;
        Ok(Self { session })
    }

    fn apply_size(&mut self, width_text: &str, height_text: &str) -> Result<(), SessionError> {
        self.session.set_width_text(width_text)?;
        self.session.set_height_text(height_text)?;
        self.session.apply_canvas_size()
    }

    fn apply_angle(&mut self, angle_text: &str) -> Result<f64, SessionError> {
        self.session.set_angle_text(angle_text)?;
        self.session.apply_rotation()
    }

    fn layer_transform(&self) -> LayerTransform {
        self.session.surface().image().snapshot()
    }

    fn save_png(&mut self, close: bool) -> Result<Vec<u8>, SessionError> {
        if close {
            self.session.save_and_close()?;
        } else {
            self.session.save()?;
        }
        Ok(self
            .session
            .store()
            .latest()
            .map(|image| image.bytes.clone())
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapcanvas_core::{encode_png, SessionEvent};

    fn png(width: u32, height: u32) -> Vec<u8> {
        let rgb = vec![90u8; (width * height * 3) as usize];
        encode_png(&rgb, width, height).unwrap()
    }

    fn editor() -> CanvasEditor {
        CanvasEditor::open(
            &png(80, 40),
            None,
            None,
            &EditorConfig::default(),
            MemoryStore::with_clock(|| 1_000),
        )
        .unwrap()
    }

    #[test]
    fn test_open_uses_config_size() {
        let ed = editor();
        assert_eq!((ed.width(), ed.height()), (512, 512));
        assert_eq!(ed.cursor(), "default");
    }

    #[test]
    fn test_drag_and_wheel() {
        let mut ed = editor();
        assert!(ed.pointer_down(10.0, 10.0, 0).unwrap());
        assert_eq!(ed.pointer_move(40.0, 30.0).unwrap(), "grabbing");
        ed.pointer_up(40.0, 30.0).unwrap();
        let t = ed.layer_transform();
        assert_eq!((t.x, t.y), (30.0, 20.0));

        // Scroll up over the image zooms in.
        assert!(ed.wheel(100.0, 100.0, -100.0).unwrap());
        assert!((ed.layer_transform().scale - 1.1).abs() < 1e-12);
    }

    #[test]
    fn test_right_click_does_not_grab() {
        let mut ed = editor();
        assert!(!ed.pointer_down(10.0, 10.0, 2).unwrap());
    }

    #[test]
    fn test_toolbar_helpers() {
        let mut ed = editor();
        ed.apply_size("300", "200").unwrap();
        assert_eq!((ed.width(), ed.height()), (300, 200));
        assert_eq!(ed.apply_angle("-90").unwrap(), 270.0);
        assert!(ed.apply_angle("abc").is_err());
    }

    #[test]
    fn test_save_and_close_returns_png() {
        let mut ed = editor();
        let bytes = ed.save_png(true).unwrap();
        assert_eq!(&bytes[..8], &snapcanvas_core::encode::PNG_SIGNATURE);
        assert!(ed.is_closed());

        let out = ed.last_output().unwrap();
        assert_eq!((out.width(), out.height()), (512, 512));

        let events = ed.session.take_events();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], SessionEvent::Closed { saved: true }));
    }
}
