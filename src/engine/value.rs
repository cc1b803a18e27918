//! Three-state configuration values.
//!
//! Every field in a plan or state tree carries one of three presence
//! states: absent (not configured), known (has a concrete value), or
//! unknown (will be determined later, e.g. computed from another resource
//! that has not been applied yet). "Explicitly empty" is a known value
//! whose payload happens to be empty. Every comparison and every
//! payload-construction decision in the engine accounts for all three.

use crate::error::{ApplyError, Result};

/// A configuration value with explicit presence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Value<T> {
    /// The field is not configured.
    #[default]
    Absent,
    /// The field has a concrete value.
    Known(T),
    /// The field's value is not yet determinable.
    Unknown,
}

impl<T> Value<T> {
    /// Returns true if the value is absent.
    #[must_use]
    pub const fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// Returns true if the value is known.
    #[must_use]
    pub const fn is_known(&self) -> bool {
        matches!(self, Self::Known(_))
    }

    /// Returns true if the value is not yet determinable.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    /// Returns the concrete value if known.
    #[must_use]
    pub const fn as_known(&self) -> Option<&T> {
        match self {
            Self::Known(v) => Some(v),
            _ => None,
        }
    }

    /// Maps a known payload, preserving the presence state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Value<U> {
        match self {
            Self::Known(v) => Value::Known(f(v)),
            Self::Absent => Value::Absent,
            Self::Unknown => Value::Unknown,
        }
    }

    /// Returns the concrete value, or an error suitable for payload
    /// construction: unknown values defer the operation, absent values
    /// report a missing required field.
    ///
    /// # Errors
    ///
    /// Returns [`ApplyError::Unresolved`] when the value is unknown and
    /// [`ApplyError::MissingField`] when it is absent.
    pub fn require(&self, field: &str) -> Result<&T> {
        match self {
            Self::Known(v) => Ok(v),
            Self::Unknown => Err(ApplyError::unresolved(field).into()),
            Self::Absent => Err(ApplyError::MissingField {
                field: field.to_string(),
            }
            .into()),
        }
    }

    /// Builds a value from an optional payload, mapping `None` to absent.
    ///
    /// Used when decoding remote state, where the API either returns a
    /// field or omits it; remote state never carries unknowns.
    #[must_use]
    pub fn from_option(opt: Option<T>) -> Self {
        opt.map_or(Self::Absent, Self::Known)
    }
}
