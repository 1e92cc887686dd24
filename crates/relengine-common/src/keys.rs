//! Deterministic document keys
//!
//! Edges without an explicit `_key` are keyed by an 8-byte BLAKE2b digest of
//! the source identifier followed by the target identifier, hex encoded. The
//! network parser and the bulk-import staging step share this derivation so
//! that repeated imports of unchanged data upsert the same documents.

use blake2::digest::consts::U8;
use blake2::{Blake2b, Digest};
use serde_json::{Map, Value};

type Blake2b64 = Blake2b<U8>;

/// Size of the edge key digest in bytes
pub const EDGE_KEY_BYTES: usize = 8;

/// Compute the key for an edge between `from` and `to`
///
/// The digest covers the plain concatenation of both identifiers, so the
/// result depends on the order of the endpoints.
pub fn edge_key(from: &str, to: &str) -> String {
    let mut hasher = Blake2b64::new();
    hasher.update(from.as_bytes());
    hasher.update(to.as_bytes());
    hex::encode(hasher.finalize())
}

/// Assign a derived `_key` to an edge-shaped document
///
/// Only documents with no `_key` and string `_from` and `_to` fields are
/// touched. Returns `true` when a key was written.
pub fn assign_edge_key(doc: &mut Map<String, Value>) -> bool {
    if doc.contains_key("_key") {
        return false;
    }

    let key = match (doc.get("_from"), doc.get("_to")) {
        (Some(Value::String(from)), Some(Value::String(to))) => edge_key(from, to),
        _ => return false,
    };

    doc.insert("_key".to_string(), Value::String(key));
    true
}

/// Current time in milliseconds since the Unix epoch, used to stamp
/// `updated_at` on ingested documents
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
