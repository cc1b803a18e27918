//! Namespace bindings: a namespace bound to an environment with an
//! optional quota.

use serde::Serialize;

use crate::engine::{ContentHasher, Entity, Value, encode_identity};
use crate::error::{ApplyError, Result};

use super::WireEntity;

/// A namespace bound into the workspace.
///
/// The namespace name is the slot; environment and quota are mutable in
/// place. An absent quota means the control-plane default applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamespaceBinding {
    /// Namespace name.
    pub namespace: String,
    /// Environment the namespace serves.
    pub environment: String,
    /// Storage quota in GiB; absent leaves the server default in place.
    pub quota_gib: Value<u64>,
}

impl Entity for NamespaceBinding {
    fn content_hash(&self) -> String {
        let mut hasher = ContentHasher::new();
        hasher.text(&self.namespace);
        hasher.text(&self.environment);
        hasher.value_number(&self.quota_gib);
        hasher.finish()
    }

    fn identity_key(&self) -> Option<String> {
        Some(encode_identity(&[&self.namespace]))
    }

    fn describe(&self) -> String {
        format!("namespace {} ({})", self.namespace, self.environment)
    }
}

/// Wire body for binding create and update requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingRequest<'a> {
    namespace: &'a str,
    environment: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    quota_gib: Option<u64>,
}

/// Identity selector for binding deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct BindingSelector<'a> {
    namespace: &'a str,
}

impl WireEntity for NamespaceBinding {
    const COLLECTION: &'static str = "namespaces";

    fn request_body(&self) -> Result<serde_json::Value> {
        if self.quota_gib.is_unknown() {
            return Err(ApplyError::unresolved("quota_gib").into());
        }
        let body = BindingRequest {
            namespace: &self.namespace,
            environment: &self.environment,
            quota_gib: self.quota_gib.as_known().copied(),
        };
        Ok(serde_json::to_value(body).map_err(ApplyError::Serialize)?)
    }

    fn delete_body(&self) -> Result<serde_json::Value> {
        let selector = BindingSelector {
            namespace: &self.namespace,
        };
        Ok(serde_json::to_value(selector).map_err(ApplyError::Serialize)?)
    }
}
