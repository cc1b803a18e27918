//! Managed entity kinds and their wire adapters.
//!
//! Each entity type declares its two reconciliation projections (content
//! hash, identity key) and how it renders into control-plane request
//! bodies. That is all the per-entity code there is; the generic engine
//! handles everything else.

mod grant;
mod membership;
mod namespace;
mod policy;

pub use grant::{AccessGrant, SubjectKind};
pub use membership::{TeamMembership, TeamRole};
pub use namespace::NamespaceBinding;
pub use policy::{AttachScope, EnforcementMode, PolicyAttachment};

use crate::engine::Entity;
use crate::error::Result;

/// An entity that can render itself into control-plane requests.
///
/// Collection updates are full replacements, not field-level patches:
/// the update body is the same fully-specified value as the create body.
pub trait WireEntity: Entity {
    /// Collection segment in the control-plane API.
    const COLLECTION: &'static str;

    /// Full-value body for create and update requests.
    ///
    /// # Errors
    ///
    /// Returns a deferrable [`crate::error::ApplyError::Unresolved`] when
    /// a required field is not yet known.
    fn request_body(&self) -> Result<serde_json::Value>;

    /// Identity-only body for delete requests.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::request_body`]; observed state is
    /// always concrete in practice, so this is a totality guard.
    fn delete_body(&self) -> Result<serde_json::Value>;
}
