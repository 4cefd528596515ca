//! One editing session, from open to close.
//!
//! A [`Session`] owns the [`CanvasSurface`], the toolbar's text fields and an
//! [`OutputStore`]. Hosts feed it pointer and toolbar input, then either
//! [`Session::save_and_close`] or [`Session::close`]. Everything the user
//! should be told, and every lifecycle signal, is queued as a
//! [`SessionEvent`] and drained with [`Session::take_events`].
//!
//! Once closed, the session only answers queries about its last output;
//! every operation returns [`SessionError::Closed`].

use kurbo::Point;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{CanvasError, CanvasSurface};
use crate::config::EditorConfig;
use crate::decode::{decode_image, DecodeError};
use crate::encode::{encode_raster_png, EncodeError};
use crate::raster::Raster;
use crate::store::{OutputStore, PersistError, SavedOutput, OUTPUT_PREFIX};
use crate::transformable::{CursorShape, PointerButton};

/// Severity of a user-facing notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Signals queued for the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    /// An output image was flattened and stored.
    SaveCompleted { location: String },
    /// The session ended. Emitted exactly once.
    Closed { saved: bool },
    /// Something to show the user.
    Notice {
        level: NoticeLevel,
        title: String,
        message: String,
    },
}

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Session is closed")]
    Closed,

    #[error(transparent)]
    Canvas(#[from] CanvasError),

    #[error("Failed to decode source image: {0}")]
    Decode(#[from] DecodeError),

    #[error("Failed to encode output: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to store output: {0}")]
    Persist(#[from] PersistError),
}

/// Text currently typed into the toolbar fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toolbar {
    pub width_text: String,
    pub height_text: String,
    pub angle_text: String,
}

impl Toolbar {
    /// Fields pre-filled with the canvas size and an empty angle.
    pub fn for_canvas(width: u32, height: u32) -> Self {
        Self {
            width_text: width.to_string(),
            height_text: height.to_string(),
            angle_text: String::new(),
        }
    }
}

/// An editing session over one source image.
#[derive(Debug)]
pub struct Session<S: OutputStore> {
    surface: CanvasSurface,
    toolbar: Toolbar,
    store: S,
    events: Vec<SessionEvent>,
    last_saved: Option<SavedOutput>,
    closed: bool,
}

impl<S: OutputStore> Session<S> {
    /// Open a session on an already decoded image.
    pub fn open(
        source: &Raster,
        width: u32,
        height: u32,
        config: &EditorConfig,
        store: S,
    ) -> Result<Self, SessionError> {
        let surface = CanvasSurface::new(source, width, height, config)?;
        log::info!("session opened on {}x{} canvas", width, height);

        Ok(Self {
            toolbar: Toolbar::for_canvas(width, height),
            surface,
            store,
            events: Vec::new(),
            last_saved: None,
            closed: false,
        })
    }

    /// Open a session on encoded image bytes (PNG or JPEG).
    pub fn open_encoded(
        bytes: &[u8],
        width: u32,
        height: u32,
        config: &EditorConfig,
        store: S,
    ) -> Result<Self, SessionError> {
        let source = decode_image(bytes)?;
        Self::open(&source, width, height, config, store)
    }

    fn ensure_open(&self) -> Result<(), SessionError> {
        if self.closed {
            Err(SessionError::Closed)
        } else {
            Ok(())
        }
    }

    fn notify(&mut self, level: NoticeLevel, title: &str, message: String) {
        self.events.push(SessionEvent::Notice {
            level,
            title: title.to_string(),
            message,
        });
    }

    pub fn surface(&self) -> &CanvasSurface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> Result<&mut CanvasSurface, SessionError> {
        self.ensure_open()?;
        Ok(&mut self.surface)
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Whether any save succeeded during this session.
    pub fn was_saved(&self) -> bool {
        self.last_saved.is_some()
    }

    pub fn last_saved(&self) -> Option<&SavedOutput> {
        self.last_saved.as_ref()
    }

    pub fn set_width_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.toolbar.width_text = text.into();
        Ok(())
    }

    pub fn set_height_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.toolbar.height_text = text.into();
        Ok(())
    }

    pub fn set_angle_text(&mut self, text: impl Into<String>) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.toolbar.angle_text = text.into();
        Ok(())
    }

    /// Resize the canvas from the width/height fields.
    ///
    /// Rejected text leaves the canvas unchanged and queues a warning notice.
    pub fn apply_canvas_size(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        let result = self
            .surface
            .set_canvas_size(&self.toolbar.width_text, &self.toolbar.height_text);
        self.report_input(result)
    }

    /// Rotate the image layer by the angle field. Returns the new rotation.
    pub fn apply_rotation(&mut self) -> Result<f64, SessionError> {
        self.ensure_open()?;
        let result = self.surface.rotate(&self.toolbar.angle_text);
        self.report_input(result)
    }

    fn report_input<T>(&mut self, result: Result<T, CanvasError>) -> Result<T, SessionError> {
        match &result {
            Err(CanvasError::Input(err)) => {
                log::warn!("rejected toolbar input: {}", err);
                self.notify(NoticeLevel::Warning, "Input error", err.to_string());
            }
            Err(err @ CanvasError::TooLarge { .. }) => {
                log::warn!("rejected canvas size: {}", err);
                self.notify(NoticeLevel::Warning, "Input error", err.to_string());
            }
            _ => {}
        }
        result.map_err(SessionError::from)
    }

    pub fn pointer_down(&mut self, scene: Point, button: PointerButton) -> Result<bool, SessionError> {
        self.ensure_open()?;
        Ok(self.surface.pointer_down(scene, button))
    }

    pub fn pointer_move(&mut self, scene: Point) -> Result<CursorShape, SessionError> {
        self.ensure_open()?;
        Ok(self.surface.pointer_move(scene))
    }

    pub fn pointer_up(&mut self, scene: Point) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.surface.pointer_up(scene);
        Ok(())
    }

    pub fn scroll(&mut self, scene: Point, delta: f64) -> Result<bool, SessionError> {
        self.ensure_open()?;
        Ok(self.surface.scroll(scene, delta))
    }

    /// Current view including the border.
    pub fn render_preview(&self) -> Result<Raster, SessionError> {
        self.ensure_open()?;
        self.surface
            .render_preview()
            .map_err(|err| SessionError::Canvas(CanvasError::Render(err)))
    }

    /// Flatten the canvas, encode it as PNG and hand it to the store.
    ///
    /// On failure the session stays open, no `SaveCompleted` is queued and
    /// an error notice is.
    pub fn save(&mut self) -> Result<SavedOutput, SessionError> {
        self.ensure_open()?;
        match self.flatten_and_store() {
            Ok(saved) => {
                self.events.push(SessionEvent::SaveCompleted {
                    location: saved.location.clone(),
                });
                self.last_saved = Some(saved.clone());
                Ok(saved)
            }
            Err(err) => {
                log::error!("save failed: {}", err);
                self.notify(NoticeLevel::Error, "Save failed", err.to_string());
                Err(err)
            }
        }
    }

    fn flatten_and_store(&mut self) -> Result<SavedOutput, SessionError> {
        let output = self.surface.flatten()?;
        let png = encode_raster_png(output)?;
        Ok(self.store.store(OUTPUT_PREFIX, &png)?)
    }

    /// Save, then close. A failed save leaves the session open.
    pub fn save_and_close(&mut self) -> Result<SavedOutput, SessionError> {
        let saved = self.save()?;
        self.close()?;
        Ok(saved)
    }

    /// End the session, saved or not.
    pub fn close(&mut self) -> Result<(), SessionError> {
        self.ensure_open()?;
        self.closed = true;
        let saved = self.was_saved();
        log::info!("session closed (saved: {})", saved);
        self.events.push(SessionEvent::Closed { saved });
        Ok(())
    }

    /// Drain queued events, oldest first.
    pub fn take_events(&mut self) -> Vec<SessionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Raster of the most recent save, if any.
    pub fn last_output(&self) -> Option<&Raster> {
        self.surface.last_output()
    }

    pub fn into_last_output(self) -> Option<Raster> {
        self.surface.into_last_output()
    }

    /// Give back the store, dropping the session.
    pub fn into_store(self) -> S {
        self.store
    }
}
