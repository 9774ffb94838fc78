//! Binary detection and strict decoding of source buffers.

use memchr::memchr;

use crate::error::IoError;

/// Number of leading bytes scanned for NULs.
const SNIFF_LEN: usize = 8192;

/// Quick binary detection - checks the first 8KB for NULL bytes.
#[must_use]
pub fn is_binary(buffer: &[u8]) -> bool {
    memchr(0, &buffer[..buffer.len().min(SNIFF_LEN)]).is_some()
}

/// Decode a source buffer.
///
/// Unlike display-oriented readers this never substitutes U+FFFD: byte
/// offsets computed on the text are written back to the same file.
///
/// # Errors
/// `BinaryFile` for NUL bytes, `Encoding` for invalid UTF-8.
pub fn decode_buffer(buffer: Vec<u8>) -> Result<String, IoError> {
    if is_binary(&buffer) {
        return Err(IoError::BinaryFile);
    }
    String::from_utf8(buffer).map_err(|e| IoError::Encoding(e.utf8_error().valid_up_to()))
}
