//! Snapcanvas Core - Image canvas editor library
//!
//! This crate provides the core of the Snapcanvas editor: a source image
//! placed on a fixed-size white canvas, moved, scaled and rotated by the
//! user, then flattened to a PNG and saved.
//!
//! The editing logic talks to a small scene abstraction ([`scene`]) instead
//! of a GUI toolkit, so the same code runs headless, in tests and behind the
//! WebAssembly bindings.

pub mod canvas;
pub mod config;
pub mod decode;
pub mod encode;
pub mod raster;
pub mod runner;
pub mod scene;
pub mod session;
pub mod store;
pub mod transformable;

pub use canvas::{CanvasError, CanvasSurface, InputError};
pub use config::{ConfigError, EditorConfig};
pub use decode::{decode_image, load_image, DecodeError, FilterType};
pub use encode::{encode_png, encode_raster_png, EncodeError};
pub use raster::{Raster, Rgba};
pub use runner::{run_standalone, run_with_defaults, RunOutcome, RunnerError};
pub use scene::InterpolationFilter;
pub use session::{NoticeLevel, Session, SessionError, SessionEvent, Toolbar};
pub use store::{DirectoryStore, MemoryStore, OutputStore, PersistError, SavedOutput};
pub use transformable::{CursorShape, LayerTransform, PointerButton, TransformableImage};
