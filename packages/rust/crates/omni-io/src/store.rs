//! Source stores: where edited files are read from and written back to.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use dashmap::DashMap;
use omni_types::{FilePatch, apply_patches};
use tokio::sync::Mutex;

use crate::async_io::{read_text_safe_async, write_text_atomic_async};
use crate::error::{IoError, StoreError};

/// Default per-file size limit (1 MiB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Read and patch source files by project-relative path.
///
/// `write_patches` is all-or-nothing per file: either every patch lands or the
/// file is untouched. It is also conditional: the write only happens when the
/// file still holds `base`, compared and replaced as one step.
#[async_trait]
pub trait SourceStore: Send + Sync {
    /// Current content of `file_path`.
    async fn read_source(&self, file_path: &str) -> Result<String, StoreError>;

    /// Apply `patches` to `base` and persist the result, provided the file
    /// still equals `base`.
    ///
    /// Returns the new content.
    ///
    /// # Errors
    /// `StoreError::Conflict` when the file changed since `base` was read.
    async fn write_patches(&self, file_path: &str, base: &str, patches: &[FilePatch]) -> Result<String, StoreError>;
}

/// Store backed by files under a project root.
///
/// Writes to one path are serialized, and each runs on its own task: dropping
/// the `write_patches` future does not cancel a write already in flight, and
/// the next write to that path waits for it.
#[derive(Debug, Clone)]
pub struct FsSourceStore {
    root: PathBuf,
    max_file_size: u64,
    locks: Arc<DashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl FsSourceStore {
    /// Store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            locks: Arc::new(DashMap::new()),
        }
    }

    /// Override the per-file size limit.
    #[must_use]
    pub fn with_max_file_size(mut self, max_file_size: u64) -> Self {
        self.max_file_size = max_file_size;
        self
    }

    /// Project root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute path of `file_path`, refusing anything that leaves the root.
    ///
    /// # Errors
    /// `StoreError::OutsideRoot` for absolute paths outside the root or `..`
    /// components.
    pub fn resolve(&self, file_path: &str) -> Result<PathBuf, StoreError> {
        let path = Path::new(file_path);
        let relative = if path.is_absolute() {
            path.strip_prefix(&self.root)
                .map_err(|_| StoreError::OutsideRoot(file_path.to_string()))?
        } else {
            path
        };
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes {
            return Err(StoreError::OutsideRoot(file_path.to_string()));
        }
        Ok(self.root.join(relative))
    }

    fn io_error(file_path: &str, source: IoError) -> StoreError {
        StoreError::Io {
            path: file_path.to_string(),
            source,
        }
    }

    fn path_lock(&self, path: &Path) -> Arc<Mutex<()>> {
        self.locks.entry(path.to_path_buf()).or_default().clone()
    }
}

/// Compare, patch and atomically replace one file. Caller holds the path lock.
async fn write_if_unchanged(
    path: PathBuf,
    file_path: String,
    max_file_size: u64,
    base: String,
    patches: Vec<FilePatch>,
) -> Result<String, StoreError> {
    let current = read_text_safe_async(&path, max_file_size)
        .await
        .map_err(|e| FsSourceStore::io_error(&file_path, e))?;
    if current != base {
        return Err(StoreError::Conflict { path: file_path });
    }
    let next = apply_patches(&current, &patches).map_err(|source| StoreError::Patch {
        path: file_path.clone(),
        source,
    })?;
    if next == current {
        return Ok(next);
    }
    write_text_atomic_async(&path, &next)
        .await
        .map_err(|e| FsSourceStore::io_error(&file_path, e))?;
    tracing::debug!(
        file = %file_path,
        patches = patches.len(),
        bytes = next.len(),
        "Source written"
    );
    Ok(next)
}

#[async_trait]
impl SourceStore for FsSourceStore {
    async fn read_source(&self, file_path: &str) -> Result<String, StoreError> {
        let path = self.resolve(file_path)?;
        read_text_safe_async(&path, self.max_file_size)
            .await
            .map_err(|e| Self::io_error(file_path, e))
    }

    async fn write_patches(&self, file_path: &str, base: &str, patches: &[FilePatch]) -> Result<String, StoreError> {
        let path = self.resolve(file_path)?;
        let guard = self.path_lock(&path).lock_owned().await;
        let (file, max_file_size) = (file_path.to_string(), self.max_file_size);
        let (base, patches) = (base.to_string(), patches.to_vec());
        let task = tokio::spawn(async move {
            let _guard = guard;
            write_if_unchanged(path, file, max_file_size, base, patches).await
        });
        task.await.unwrap_or_else(|e| {
            Err(StoreError::Rejected {
                path: file_path.to_string(),
                reason: e.to_string(),
            })
        })
    }
}

/// In-memory store, for hosts that own the file buffers and for tests.
#[derive(Debug, Default)]
pub struct MemorySourceStore {
    files: DashMap<String, String>,
    read_only: RwLock<HashSet<String>>,
}

impl MemorySourceStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a file.
    pub fn insert(&self, file_path: impl Into<String>, content: impl Into<String>) {
        self.files.insert(file_path.into(), content.into());
    }

    /// Current content of a file.
    #[must_use]
    pub fn get(&self, file_path: &str) -> Option<String> {
        self.files.get(file_path).map(|c| c.clone())
    }

    /// Mark a file read-only; writes to it are rejected.
    pub fn set_read_only(&self, file_path: &str, read_only: bool) {
        let mut guard = match self.read_only.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        if read_only {
            guard.insert(file_path.to_string());
        } else {
            guard.remove(file_path);
        }
    }

    fn is_read_only(&self, file_path: &str) -> bool {
        self.read_only
            .read()
            .map_or(true, |guard| guard.contains(file_path))
    }
}

#[async_trait]
impl SourceStore for MemorySourceStore {
    async fn read_source(&self, file_path: &str) -> Result<String, StoreError> {
        self.get(file_path).ok_or_else(|| StoreError::Io {
            path: file_path.to_string(),
            source: IoError::NotFound(file_path.to_string()),
        })
    }

    async fn write_patches(&self, file_path: &str, base: &str, patches: &[FilePatch]) -> Result<String, StoreError> {
        if self.is_read_only(file_path) {
            return Err(StoreError::Rejected {
                path: file_path.to_string(),
                reason: "file is read-only".to_string(),
            });
        }
        let mut entry = self.files.get_mut(file_path).ok_or_else(|| StoreError::Io {
            path: file_path.to_string(),
            source: IoError::NotFound(file_path.to_string()),
        })?;
        if entry.as_str() != base {
            return Err(StoreError::Conflict {
                path: file_path.to_string(),
            });
        }
        let next = apply_patches(&entry, patches).map_err(|source| StoreError::Patch {
            path: file_path.to_string(),
            source,
        })?;
        entry.clone_from(&next);
        Ok(next)
    }
}
