//! Standalone entry point: load an image from disk, run one session, then
//! keep a second copy of whatever was saved.

use std::path::Path;

use thiserror::Error;

use crate::config::EditorConfig;
use crate::decode::{load_image, DecodeError};
use crate::encode::{encode_raster_png, EncodeError};
use crate::raster::Raster;
use crate::session::{Session, SessionError, SessionEvent};
use crate::store::{
    DirectoryStore, OutputStore, PersistError, SavedOutput, MODIFIED_OUTPUT_PREFIX,
};

/// Errors raised by [`run_standalone`].
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("Failed to load image: {0}")]
    Load(#[from] DecodeError),

    #[error(transparent)]
    Session(#[from] SessionError),

    #[error("Failed to encode modified image: {0}")]
    Encode(#[from] EncodeError),

    #[error("Failed to store modified image: {0}")]
    Persist(#[from] PersistError),
}

/// What a standalone run produced.
#[derive(Debug)]
pub struct RunOutcome {
    /// Every event the session queued, oldest first.
    pub events: Vec<SessionEvent>,
    /// Raster of the last save, if the user saved.
    pub output: Option<Raster>,
    /// Where the `modified_output_<ms>.png` copy went.
    pub modified: Option<SavedOutput>,
}

/// Load `path`, open a session on a `width x height` canvas and hand it to
/// `drive`.
///
/// The session is closed once `drive` returns, even when it fails, if it is
/// still open. When the session saved successfully, the last output is
/// written again as `modified_output_<ms>.png` into `config.modified_dir`.
/// A driver error is returned only after the session is closed and the copy
/// attempted.
pub fn run_standalone<S, F>(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    config: &EditorConfig,
    store: S,
    drive: F,
) -> Result<RunOutcome, RunnerError>
where
    S: OutputStore,
    F: FnOnce(&mut Session<S>) -> Result<(), SessionError>,
{
    let path = path.as_ref();
    let source = load_image(path).inspect_err(|err| {
        log::error!("Load failed for {}: {}", path.display(), err);
    })?;

    let mut session = Session::open(&source, width, height, config, store)?;
    let driven = drive(&mut session).inspect_err(|err| {
        log::error!("Session ended with an error: {}", err);
    });
    if !session.is_closed() {
        session.close()?;
    }

    let saved = session.was_saved();
    let events = session.take_events();
    let output = session.into_last_output().filter(|_| saved);

    let modified = match (&output, driven) {
        (Some(raster), Ok(())) => Some(store_modified(raster, config)?),
        (Some(raster), Err(err)) => {
            if let Err(copy_err) = store_modified(raster, config) {
                log::error!("Modified copy failed: {}", copy_err);
            }
            return Err(err.into());
        }
        (None, Ok(())) => {
            log::info!("No modified image available");
            None
        }
        (None, Err(err)) => return Err(err.into()),
    };

    Ok(RunOutcome {
        events,
        output,
        modified,
    })
}

/// [`run_standalone`] with saves going to `config.save_dir`.
pub fn run_with_defaults<F>(
    path: impl AsRef<Path>,
    width: u32,
    height: u32,
    config: &EditorConfig,
    drive: F,
) -> Result<RunOutcome, RunnerError>
where
    F: FnOnce(&mut Session<DirectoryStore>) -> Result<(), SessionError>,
{
    let store = DirectoryStore::from_config(config);
    run_standalone(path, width, height, config, store, drive)
}

fn store_modified(raster: &Raster, config: &EditorConfig) -> Result<SavedOutput, RunnerError> {
    let png = encode_raster_png(raster)?;
    let mut copies = DirectoryStore::new(&config.modified_dir);
    Ok(copies.store(MODIFIED_OUTPUT_PREFIX, &png)?)
}
