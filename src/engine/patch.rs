//! Sparse partial-update fields.
//!
//! The control plane applies PATCH semantics: any field present in a
//! request body overwrites the remote value, any field absent leaves it
//! untouched, and an explicit `null` clears it. [`FieldPatch`] models
//! those three outcomes per field of a partial-update document.

use serde::{Serialize, Serializer};

/// One field of a partial-update document.
///
/// Patch structs mark every field with
/// `#[serde(skip_serializing_if = "FieldPatch::is_omit")]` so that omitted
/// fields never reach the wire; cleared fields serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldPatch<T> {
    /// Leave the remote value untouched (field absent from the body).
    #[default]
    Omit,
    /// Explicitly clear the remote value (serialized as `null`).
    Clear,
    /// Overwrite the remote value.
    Set(T),
}

impl<T> FieldPatch<T> {
    /// Returns true if the field is omitted from the payload.
    #[must_use]
    pub const fn is_omit(&self) -> bool {
        matches!(self, Self::Omit)
    }

    /// Returns true if the field explicitly clears the remote value.
    #[must_use]
    pub const fn is_clear(&self) -> bool {
        matches!(self, Self::Clear)
    }

    /// Returns the replacement value if one is set.
    #[must_use]
    pub const fn as_set(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }
}

impl<T: Serialize> Serialize for FieldPatch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            // Omit is normally stripped by skip_serializing_if; a stray
            // one degrades to null rather than inventing a value.
            Self::Omit | Self::Clear => serializer.serialize_none(),
            Self::Set(v) => v.serialize(serializer),
        }
    }
}
