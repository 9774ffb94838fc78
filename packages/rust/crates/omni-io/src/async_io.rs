//! Asynchronous file I/O operations.
//!
//! Powered by Tokio for non-blocking I/O.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::fs as tokio_fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::detect::decode_buffer;
use crate::error::IoError;

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Read a source file with size, binary and encoding checks (asynchronous).
///
/// # Errors
/// `NotFound`, `TooLarge`, `BinaryFile`, `Encoding` or `System`.
pub async fn read_text_safe_async<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, IoError> {
    let path = path.as_ref();

    let metadata = tokio_fs::metadata(path)
        .await
        .map_err(|_| IoError::NotFound(path.to_string_lossy().to_string()))?;

    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = tokio_fs::File::open(path).await?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer).await?;

    decode_buffer(buffer)
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or("source");
    let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
    path.with_file_name(format!(".{name}.{}.{n}.tmp", std::process::id()))
}

/// Replace a file's content atomically (asynchronous).
///
/// # Errors
/// `System` when any step fails; the temp file is removed.
pub async fn write_text_atomic_async<P: AsRef<Path>>(path: P, content: &str) -> Result<(), IoError> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio_fs::create_dir_all(parent).await?;
    }

    let temp = temp_path(path);
    let written = async {
        let mut file = tokio_fs::File::create(&temp).await?;
        file.write_all(content.as_bytes()).await?;
        file.sync_all().await?;
        tokio_fs::rename(&temp, path).await
    }
    .await;
    if let Err(error) = written {
        let _ = tokio_fs::remove_file(&temp).await;
        return Err(IoError::System(error));
    }
    Ok(())
}

