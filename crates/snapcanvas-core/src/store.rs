//! Destinations for encoded output images.
//!
//! A save names its output `<prefix>_<epoch_ms>.png`. [`DirectoryStore`]
//! writes those files to disk; [`MemoryStore`] keeps them in memory for
//! hosts without a filesystem and for tests.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use thiserror::Error;

use crate::config::EditorConfig;

/// Prefix of files written by a save.
pub const OUTPUT_PREFIX: &str = "output";

/// Prefix of the standalone runner's second copy.
pub const MODIFIED_OUTPUT_PREFIX: &str = "modified_output";

/// Errors raised while persisting an output image.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where a stored image ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedOutput {
    /// File path, or a `memory://` name for in-memory stores.
    pub location: String,
    /// Millisecond timestamp used in the name.
    pub timestamp_ms: u64,
    /// Encoded size in bytes.
    pub len: usize,
}

/// A sink for encoded PNG images.
pub trait OutputStore {
    /// Store `png` under a fresh `<prefix>_<epoch_ms>.png` name.
    fn store(&mut self, prefix: &str, png: &[u8]) -> Result<SavedOutput, PersistError>;
}

/// Current wall-clock time in milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// File name for a timestamped output.
pub fn output_file_name(prefix: &str, timestamp_ms: u64) -> String {
    format!("{}_{}.png", prefix, timestamp_ms)
}

/// Hands out millisecond timestamps that strictly increase, so two saves
/// within the same millisecond still get distinct names.
#[derive(Debug, Clone, Copy, Default)]
struct Stamp {
    last: Option<u64>,
}

impl Stamp {
    fn next(&mut self, now: u64) -> u64 {
        let stamp = match self.last {
            Some(last) if now <= last => last + 1,
            _ => now,
        };
        self.last = Some(stamp);
        stamp
    }
}

/// Writes outputs into a directory on disk.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    dir: PathBuf,
    stamp: Stamp,
}

impl DirectoryStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            stamp: Stamp::default(),
        }
    }

    /// Store under the configured `save_dir`.
    pub fn from_config(config: &EditorConfig) -> Self {
        Self::new(&config.save_dir)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl OutputStore for DirectoryStore {
    fn store(&mut self, prefix: &str, png: &[u8]) -> Result<SavedOutput, PersistError> {
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        // Skip over names already taken by an earlier run.
        let mut timestamp_ms = self.stamp.next(epoch_millis());
        let mut path = self.dir.join(output_file_name(prefix, timestamp_ms));
        while path.exists() {
            timestamp_ms = self.stamp.next(timestamp_ms);
            path = self.dir.join(output_file_name(prefix, timestamp_ms));
        }

        fs::write(&path, png).map_err(|source| PersistError::Write {
            path: path.clone(),
            source,
        })?;

        log::info!("saved {} bytes to {}", png.len(), path.display());
        Ok(SavedOutput {
            location: path.display().to_string(),
            timestamp_ms,
            len: png.len(),
        })
    }
}

/// One image held by a [`MemoryStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Source of millisecond timestamps.
pub type Clock = fn() -> u64;

/// Keeps outputs in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    images: Vec<StoredImage>,
    stamp: Stamp,
    clock: Clock,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::with_clock(epoch_millis)
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `clock` for timestamps. `wasm32-unknown-unknown` has no
    /// `SystemTime`, so browser hosts pass their own.
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            images: Vec::new(),
            stamp: Stamp::default(),
            clock,
        }
    }

    /// Everything stored so far, oldest first.
    pub fn images(&self) -> &[StoredImage] {
        &self.images
    }

    pub fn latest(&self) -> Option<&StoredImage> {
        self.images.last()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl OutputStore for MemoryStore {
    fn store(&mut self, prefix: &str, png: &[u8]) -> Result<SavedOutput, PersistError> {
        let timestamp_ms = self.stamp.next((self.clock)());
        let name = output_file_name(prefix, timestamp_ms);
        log::info!("kept {} bytes in memory as {}", png.len(), name);

        self.images.push(StoredImage {
            name: name.clone(),
            bytes: png.to_vec(),
        });
        Ok(SavedOutput {
            location: format!("memory://{}", name),
            timestamp_ms,
            len: png.len(),
        })
    }
}

impl<S: OutputStore + ?Sized> OutputStore for &mut S {
    fn store(&mut self, prefix: &str, png: &[u8]) -> Result<SavedOutput, PersistError> {
        (**self).store(prefix, png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_strictly_increases() {
        let mut stamp = Stamp::default();
        assert_eq!(stamp.next(100), 100);
        assert_eq!(stamp.next(100), 101);
        assert_eq!(stamp.next(50), 102);
        assert_eq!(stamp.next(500), 500);
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("output", 1234), "output_1234.png");
        assert_eq!(
            output_file_name(MODIFIED_OUTPUT_PREFIX, 7),
            "modified_output_7.png"
        );
    }

    #[test]
    fn test_directory_store_creates_dir_and_writes() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("save");
        let mut store = DirectoryStore::new(&dir);

        let saved = store.store(OUTPUT_PREFIX, b"png-bytes").unwrap();
        let path = PathBuf::from(&saved.location);

        assert!(path.starts_with(&dir));
        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            output_file_name(OUTPUT_PREFIX, saved.timestamp_ms)
        );
        assert_eq!(fs::read(&path).unwrap(), b"png-bytes");
        assert_eq!(saved.len, 9);
    }

    #[test]
    fn test_directory_store_never_reuses_names() {
        let tmp = tempfile::tempdir().unwrap();
        let mut store = DirectoryStore::new(tmp.path());

        let a = store.store(OUTPUT_PREFIX, b"a").unwrap();
        let b = store.store(OUTPUT_PREFIX, b"b").unwrap();
        assert_ne!(a.location, b.location);
        assert_eq!(fs::read(&a.location).unwrap(), b"a");
        assert_eq!(fs::read(&b.location).unwrap(), b"b");

        // A second store over the same directory skips existing files.
        let mut other = DirectoryStore::new(tmp.path());
        let c = other.store(OUTPUT_PREFIX, b"c").unwrap();
        assert_ne!(c.location, a.location);
        assert_ne!(c.location, b.location);
    }

    #[test]
    fn test_directory_store_reports_write_failure() {
        let tmp = tempfile::tempdir().unwrap();
        // A plain file where the directory should be.
        let blocker = tmp.path().join("blocked");
        fs::write(&blocker, b"x").unwrap();

        let mut store = DirectoryStore::new(&blocker);
        let err = store.store(OUTPUT_PREFIX, b"png").unwrap_err();
        assert!(matches!(err, PersistError::CreateDir { .. }));
    }

    #[test]
    fn test_memory_store_keeps_images() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());

        let first = store.store(OUTPUT_PREFIX, b"one").unwrap();
        let second = store.store(OUTPUT_PREFIX, b"two").unwrap();

        assert_eq!(store.len(), 2);
        assert!(first.location.starts_with("memory://output_"));
        assert_ne!(first.location, second.location);
        assert_eq!(store.latest().unwrap().bytes, b"two");
    }

    #[test]
    fn test_memory_store_custom_clock() {
        let mut store = MemoryStore::with_clock(|| 42);
        let a = store.store(OUTPUT_PREFIX, b"a").unwrap();
        let b = store.store(OUTPUT_PREFIX, b"b").unwrap();
        assert_eq!(a.location, "memory://output_42.png");
        assert_eq!(b.timestamp_ms, 43);
    }

    #[test]
    fn test_store_through_mut_reference() {
        fn save_once<S: OutputStore>(mut store: S) -> SavedOutput {
            store.store(OUTPUT_PREFIX, b"x").unwrap()
        }

        let mut store = MemoryStore::new();
        save_once(&mut store);
        save_once(&mut store);
        assert_eq!(store.len(), 2);
    }
}
