//! Structural hashing for entity content comparison.
//!
//! Entities are compared by a deterministic SHA-256 digest over their
//! fields. Every field is type-tagged and length-prefixed before it
//! reaches the digest, so a field value can never straddle a field
//! boundary: `("ab", "c")` and `("a", "bc")` hash differently by
//! construction, and an absent field is distinct from an explicitly
//! empty one.

use sha2::{Digest, Sha256};

use super::value::Value;

/// Field-level type tags fed to the digest ahead of each payload.
const TAG_ABSENT: u8 = 0;
const TAG_UNKNOWN: u8 = 1;
const TAG_TEXT: u8 = 2;
const TAG_NUMBER: u8 = 3;
const TAG_FLAG: u8 = 4;
const TAG_NONE: u8 = 5;

/// Incremental hasher over an entity's fields.
///
/// Call one method per field, in a fixed order per entity type, then
/// [`finish`](Self::finish) for the hex digest.
#[derive(Debug, Default)]
pub struct ContentHasher {
    hasher: Sha256,
}

impl ContentHasher {
    /// Creates a new content hasher.
    #[must_use]
    pub fn new() -> Self {
        Self {
            hasher: Sha256::new(),
        }
    }

    /// Hashes a text field.
    pub fn text(&mut self, value: &str) {
        self.hasher.update([TAG_TEXT]);
        self.hasher.update((value.len() as u64).to_be_bytes());
        self.hasher.update(value.as_bytes());
    }

    /// Hashes an optional text field, distinguishing `None` from `""`.
    pub fn opt_text(&mut self, value: Option<&str>) {
        match value {
            Some(v) => self.text(v),
            None => self.hasher.update([TAG_NONE]),
        }
    }

    /// Hashes a numeric field.
    pub fn number(&mut self, value: u64) {
        self.hasher.update([TAG_NUMBER]);
        self.hasher.update(value.to_be_bytes());
    }

    /// Hashes a boolean field.
    pub fn flag(&mut self, value: bool) {
        self.hasher.update([TAG_FLAG]);
        self.hasher.update([u8::from(value)]);
    }

    /// Hashes a three-state text field, keeping absent, unknown, and every
    /// known payload (including the empty string) mutually distinct.
    pub fn value_text(&mut self, value: &Value<String>) {
        match value {
            Value::Absent => self.hasher.update([TAG_ABSENT]),
            Value::Unknown => self.hasher.update([TAG_UNKNOWN]),
            Value::Known(v) => self.text(v),
        }
    }

    /// Hashes a three-state numeric field.
    pub fn value_number(&mut self, value: &Value<u64>) {
        match value {
            Value::Absent => self.hasher.update([TAG_ABSENT]),
            Value::Unknown => self.hasher.update([TAG_UNKNOWN]),
            Value::Known(v) => self.number(*v),
        }
    }

    /// Finalizes the digest as a lowercase hex string.
    #[must_use]
    pub fn finish(self) -> String {
        hex::encode(self.hasher.finalize())
    }
}

/// Encodes identity fields into a single key.
///
/// Each part is length-prefixed in decimal, so no part value can be
/// confused with a boundary; the result stays readable in diagnostics
/// (e.g. `4:user|6:ext-42`).
#[must_use]
pub fn encode_identity(parts: &[&str]) -> String {
    let mut key = String::new();
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            key.push('|');
        }
        key.push_str(&part.len().to_string());
        key.push(':');
        key.push_str(part);
    }
    key
}
