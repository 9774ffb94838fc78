//! Location token codec.
//!
//! A token is the record packed as a positional JSON array, deflated, then
//! URL-safe base64 without padding, so it can ride along as a markup
//! attribute.

use std::cmp::Ordering;
use std::io::{Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use omni_types::{LocationRecord, SourceSpan, TagRange};
use serde::{Deserialize, Serialize};

use crate::error::{DecodeError, EncodeError};

/// Attribute name the token is embedded under on rendered elements.
pub const LOCATION_ATTRIBUTE: &str = "data-omni-loc";

/// Upper bound on the inflated payload, guards against decompression bombs.
const MAX_PAYLOAD_BYTES: u64 = 64 * 1024;

/// Positional wire form: `[file, root, [l, c, l, c], [l, c, l, c]?]`.
#[derive(Serialize, Deserialize)]
struct Wire(String, u8, [u32; 4], Option<[u32; 4]>);

impl From<&LocationRecord> for Wire {
    fn from(record: &LocationRecord) -> Self {
        Self(
            record.file_path.clone(),
            u8::from(record.is_component_root),
            tag_to_wire(&record.open_tag),
            record.close_tag.as_ref().map(tag_to_wire),
        )
    }
}

impl From<Wire> for LocationRecord {
    fn from(wire: Wire) -> Self {
        let Wire(file_path, root, open, close) = wire;
        LocationRecord::new(file_path, root != 0, wire_to_tag(open), close.map(wire_to_tag))
    }
}

fn tag_to_wire(tag: &TagRange) -> [u32; 4] {
    [tag.start.line, tag.start.column, tag.end.line, tag.end.column]
}

fn wire_to_tag(raw: [u32; 4]) -> TagRange {
    TagRange::new(SourceSpan::new(raw[0], raw[1]), SourceSpan::new(raw[2], raw[3]))
}

/// Encode a record into a transport token.
///
/// # Errors
/// Returns `EncodeError::Invariant` for records whose spans are out of order,
/// and `EncodeError::TooLarge` when the payload exceeds what [`decode`]
/// accepts.
pub fn encode(record: &LocationRecord) -> Result<String, EncodeError> {
    if !record.is_well_formed() {
        return Err(EncodeError::Invariant);
    }
    let json = serde_json::to_vec(&Wire::from(record))?;
    if json.len() as u64 > MAX_PAYLOAD_BYTES {
        return Err(EncodeError::TooLarge(json.len()));
    }
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(json.len()), Compression::best());
    encoder.write_all(&json)?;
    let compressed = encoder.finish()?;
    Ok(URL_SAFE_NO_PAD.encode(compressed))
}

/// Decode a transport token back into a record.
///
/// # Errors
/// Returns `DecodeError` for anything that is not a token produced by
/// [`encode`]. A partial record is never returned.
pub fn decode(token: &str) -> Result<LocationRecord, DecodeError> {
    let compressed = URL_SAFE_NO_PAD.decode(token.trim())?;
    let mut json = Vec::new();
    DeflateDecoder::new(compressed.as_slice())
        .take(MAX_PAYLOAD_BYTES)
        .read_to_end(&mut json)?;
    let wire: Wire = serde_json::from_slice(&json)?;
    let record = LocationRecord::from(wire);
    if !record.is_well_formed() {
        return Err(DecodeError::Invariant);
    }
    Ok(record)
}

/// Order two records by the start of their opening tags.
#[must_use]
pub fn compare(a: &LocationRecord, b: &LocationRecord) -> Ordering {
    a.compare(b)
}

/// Same file, same component-root flag, same opening-tag start.
#[must_use]
pub fn equals(a: &LocationRecord, b: &LocationRecord) -> bool {
    a == b
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LocationRecord {
        LocationRecord::new(
            "src/components/Hero.tsx",
            true,
            TagRange::new(SourceSpan::new(12, 4), SourceSpan::new(12, 31)),
            Some(TagRange::new(SourceSpan::new(18, 4), SourceSpan::new(18, 10))),
        )
    }

    #[test]
    fn test_token_is_attribute_safe() {
        let token = encode(&sample()).expect("encode");
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_truncated_token_fails() {
        let token = encode(&sample()).expect("encode");
        let truncated = &token[..token.len() / 2];
        assert!(decode(truncated).is_err());
    }

    #[test]
    fn test_garbage_fails() {
        assert!(matches!(decode("!!!"), Err(DecodeError::Encoding(_))));
    }

    #[test]
    fn test_wrong_shape_fails() {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(br#"{"file":"x"}"#).expect("write");
        let token = URL_SAFE_NO_PAD.encode(encoder.finish().expect("finish"));
        assert!(matches!(decode(&token), Err(DecodeError::Structure(_))));
    }

    #[test]
    fn test_payload_limit_is_symmetric() {
        let mut record = sample();
        record.file_path = "a/".repeat(40 * 1024);
        assert!(matches!(encode(&record), Err(EncodeError::TooLarge(_))));

        // Largest path that still fits decodes back unchanged.
        let base = sample();
        let overhead = serde_json::to_vec(&Wire::from(&base)).expect("json").len() - base.file_path.len();
        let limit = usize::try_from(MAX_PAYLOAD_BYTES).expect("fits");
        record.file_path = "x".repeat(limit - overhead);
        let token = encode(&record).expect("encode at limit");
        assert_eq!(decode(&token).expect("decode at limit").file_path, record.file_path);
    }

    #[test]
    fn test_out_of_order_record_rejected() {
        let mut record = sample();
        record.open_tag.end = SourceSpan::new(1, 0);
        assert!(matches!(encode(&record), Err(EncodeError::Invariant)));
    }
}
