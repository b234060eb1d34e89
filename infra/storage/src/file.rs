//! The file backend: one JSON document per key, replaced atomically on every save.

use crate::FlagStorage;
use crate::builder::JsonFileStorageBuilder;
use crate::codec::{self, PersistedFlags};
use crate::error::{StorageError, StorageErrorExt};
use crate::key::StorageKey;
use flagkit_domain::FlagMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Marker embedded in temp file names; maintenance removes stale ones.
pub(crate) const TMP_MARKER: &str = ".flagtmp.";

/// The internal shared state of a [`JsonFileStorage`] instance.
#[derive(Debug)]
pub struct JsonFileStorageInner {
    /// The canonicalized data directory.
    pub(crate) root: PathBuf,
    pub(crate) key: StorageKey,
    /// `<root>/<key>.json`
    pub(crate) path: PathBuf,
    /// A unique counter used to generate temporary file names.
    pub(crate) tmp_counter: AtomicU64,
}

/// Flag persistence backed by `<data_dir>/<key>.json`.
///
/// Writes use an "atomic swap": a unique temp file is written and synced to hardware,
/// then renamed over the document. A crash mid-write leaves either the old or the new
/// document, never a torn one.
///
/// The handle is internally reference-counted and cheap to clone.
///
/// # Example
///
/// ```rust
/// use flagkit_domain::{FlagId, FlagMap};
/// use flagkit_storage::{FlagStorage, JsonFileStorage, StorageError};
///
/// # fn main() -> Result<(), StorageError> {
/// # let tmp = tempfile::tempdir().unwrap();
/// let storage = JsonFileStorage::builder().root(tmp.path()).open()?;
/// assert!(storage.load()?.is_none());
///
/// storage.save(&FlagMap::from([(FlagId::from("DASHBOARD"), false)]))?;
/// assert_eq!(storage.load()?.and_then(|p| p.get("DASHBOARD")), Some(false));
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    pub(crate) inner: Arc<JsonFileStorageInner>,
}

impl Deref for JsonFileStorage {
    type Target = JsonFileStorageInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl JsonFileStorage {
    #[must_use = "The storage is not ready until you call .open()"]
    pub fn builder() -> JsonFileStorageBuilder {
        JsonFileStorageBuilder::new()
    }

    /// Physical path of the flag document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn write_atomic(&self, data: &[u8]) -> Result<(), StorageError> {
        let target = &self.path;
        let temp = unique_tmp_path(target, &self.tmp_counter);

        {
            let mut file = fs::OpenOptions::new()
                .create_new(true)
                .write(true)
                .open(&temp)
                .context(format!("Temp creation failed: {}", temp.display()))?;
            file.write_all(data).context("Write failed")?;
            file.sync_all().context("Hardware sync failed")?;
        }

        if let Err(err) = fs::rename(&temp, target) {
            if err.kind() == ErrorKind::AlreadyExists {
                fs::remove_file(target)
                    .context(format!("Failed to replace existing file: {}", target.display()))?;
                fs::rename(&temp, target).context(format!(
                    "Atomic swap failed: {} -> {}",
                    temp.display(),
                    target.display()
                ))?;
            } else {
                let _ = fs::remove_file(&temp);
                return Err(StorageError::Io {
                    source: err,
                    context: Some(
                        format!("Atomic swap failed: {} -> {}", temp.display(), target.display())
                            .into(),
                    ),
                });
            }
        }

        sync_dir(&self.root);
        Ok(())
    }
}

impl FlagStorage for JsonFileStorage {
    fn load(&self) -> Result<Option<PersistedFlags>, StorageError> {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No flag document yet");
                return Ok(None);
            },
            Err(err) => {
                return Err(StorageError::Io {
                    source: err,
                    context: Some(format!("Read failed: {}", self.path.display()).into()),
                });
            },
        };

        codec::decode(&data).context(format!("Reading {}", self.path.display())).map(Some)
    }

    fn save(&self, flags: &FlagMap) -> Result<(), StorageError> {
        let data = codec::encode(flags)?;
        self.write_atomic(&data)?;
        debug!(path = %self.path.display(), flags = flags.len(), "Flag document saved atomically");
        Ok(())
    }
}

fn sync_dir(path: &Path) {
    // Directories cannot be opened for syncing on every platform.
    match fs::File::open(path) {
        Ok(dir) => {
            if let Err(err) = dir.sync_all() {
                debug!(path = %path.display(), error = %err, "Directory sync failed");
            }
        },
        Err(err) => {
            warn!(path = %path.display(), error = %err, "Directory open failed");
        },
    }
}

fn unique_tmp_path(target: &Path, counter: &AtomicU64) -> PathBuf {
    let counter = counter.fetch_add(1, Ordering::Relaxed);
    let file_name = target.file_name().and_then(|s| s.to_str()).unwrap_or("flags");
    let tmp_name = format!("{file_name}{TMP_MARKER}{}.{counter}", std::process::id());
    target.with_file_name(tmp_name)
}
