//! Synchronous file I/O operations.
//!
//! Used where no runtime is available (settings loading, tooling).

use std::fs as std_fs;
use std::io::{Read, Write};
use std::path::Path;

use crate::detect::decode_buffer;
use crate::error::IoError;

/// Read a source file with size, binary and encoding checks.
///
/// # Errors
/// `NotFound`, `TooLarge`, `BinaryFile`, `Encoding` or `System`.
pub fn read_text_safe<P: AsRef<Path>>(path: P, max_bytes: u64) -> Result<String, IoError> {
    let path = path.as_ref();

    let metadata = std_fs::metadata(path)
        .map_err(|_| IoError::NotFound(path.to_string_lossy().to_string()))?;

    if metadata.len() > max_bytes {
        return Err(IoError::TooLarge(metadata.len(), max_bytes));
    }

    let mut file = std_fs::File::open(path)?;
    let mut buffer = Vec::with_capacity(usize::try_from(metadata.len()).unwrap_or_default());
    file.read_to_end(&mut buffer)?;

    decode_buffer(buffer)
}

/// Replace a file's content atomically.
///
/// Writes a temp file next to `path`, fsyncs it and renames it into place, so
/// readers see either the old or the new content.
///
/// # Errors
/// `System` when any step fails; the temp file is cleaned up.
pub fn write_text_atomic<P: AsRef<Path>>(path: P, content: &str) -> Result<(), IoError> {
    let path = path.as_ref();
    let parent = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std_fs::create_dir_all(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content.as_bytes())?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| IoError::System(e.error))?;
    Ok(())
}

