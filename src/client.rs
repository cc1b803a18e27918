//! Control-plane client boundary.
//!
//! The engine performs no network I/O; it hands fully-built request
//! bodies to an implementation of [`ControlPlaneClient`], which owns
//! transport, retries, and surfacing remote errors back up the call
//! chain. Tests drive the engine against a mock of this trait.

use async_trait::async_trait;

use crate::error::Result;

/// Operations a collection request can perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create a new collection member.
    Create,
    /// Replace an existing member in place (full value, not a patch).
    Update,
    /// Remove a member.
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// A fully-built collection request, opaque payload to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct WireRequest {
    /// Operation to perform.
    pub operation: Operation,
    /// Collection segment in the control-plane API.
    pub collection: &'static str,
    /// Request body: the full value for create and update, the identity
    /// selector for delete.
    pub body: serde_json::Value,
}

/// Client for the workspace control plane.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ControlPlaneClient: Send + Sync {
    /// Applies a sparse settings patch to the workspace object.
    ///
    /// The body follows PATCH semantics: present fields overwrite,
    /// `null` clears, absent fields are left untouched.
    async fn patch_settings(&self, workspace: &str, body: serde_json::Value) -> Result<()>;

    /// Executes one collection request against the workspace.
    async fn execute(&self, workspace: &str, request: WireRequest) -> Result<()>;
}

#[async_trait]
impl ControlPlaneClient for Box<dyn ControlPlaneClient> {
    async fn patch_settings(&self, workspace: &str, body: serde_json::Value) -> Result<()> {
        (**self).patch_settings(workspace, body).await
    }

    async fn execute(&self, workspace: &str, request: WireRequest) -> Result<()> {
        (**self).execute(workspace, request).await
    }
}
