//! Policy attachments: a policy bound to a scope with an enforcement
//! mode.

use serde::Serialize;

use crate::engine::{ContentHasher, Entity, Value, encode_identity};
use crate::error::{ApplyError, Result};

use super::WireEntity;

/// Where a policy applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum AttachScope {
    /// The whole workspace.
    Workspace,
    /// A single namespace.
    Namespace {
        /// The namespace name.
        name: String,
    },
}

impl AttachScope {
    fn hash_into(&self, hasher: &mut ContentHasher) {
        match self {
            Self::Workspace => hasher.text("workspace"),
            Self::Namespace { name } => {
                hasher.text("namespace");
                hasher.text(name);
            }
        }
    }

    fn key_parts(&self) -> Vec<&str> {
        match self {
            Self::Workspace => vec!["workspace"],
            Self::Namespace { name } => vec!["namespace", name],
        }
    }
}

/// How strictly an attached policy is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnforcementMode {
    /// Violations are reported but allowed.
    Advisory,
    /// Violations are rejected.
    Enforcing,
}

impl EnforcementMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Advisory => "advisory",
            Self::Enforcing => "enforcing",
        }
    }
}

/// A policy attached to a scope.
///
/// (policy, scope) is the attachment's slot; the enforcement mode is
/// mutable in place. The policy id is unknown while the policy resource
/// has not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PolicyAttachment {
    /// Identifier of the attached policy.
    pub policy_id: Value<String>,
    /// Scope the policy applies to.
    pub scope: AttachScope,
    /// Enforcement mode.
    pub enforcement: EnforcementMode,
}

impl Entity for PolicyAttachment {
    fn content_hash(&self) -> String {
        let mut hasher = ContentHasher::new();
        hasher.value_text(&self.policy_id);
        self.scope.hash_into(&mut hasher);
        hasher.text(self.enforcement.as_str());
        hasher.finish()
    }

    fn identity_key(&self) -> Option<String> {
        let id = self.policy_id.as_known()?;
        let mut parts = vec![id.as_str()];
        parts.extend(self.scope.key_parts());
        Some(encode_identity(&parts))
    }

    fn describe(&self) -> String {
        let scope = match &self.scope {
            AttachScope::Workspace => String::from("workspace"),
            AttachScope::Namespace { name } => format!("namespace/{name}"),
        };
        format!(
            "policy {} on {scope} ({})",
            self.policy_id.as_known().map_or("<unknown>", String::as_str),
            self.enforcement.as_str()
        )
    }
}

/// Wire body for attachment create and update requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentRequest<'a> {
    policy_id: &'a str,
    scope: &'a AttachScope,
    enforcement: EnforcementMode,
}

/// Identity selector for attachment deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct AttachmentSelector<'a> {
    policy_id: &'a str,
    scope: &'a AttachScope,
}

impl WireEntity for PolicyAttachment {
    const COLLECTION: &'static str = "policy-attachments";

    fn request_body(&self) -> Result<serde_json::Value> {
        let body = AttachmentRequest {
            policy_id: self.policy_id.require("policy_id")?,
            scope: &self.scope,
            enforcement: self.enforcement,
        };
        Ok(serde_json::to_value(body).map_err(ApplyError::Serialize)?)
    }

    fn delete_body(&self) -> Result<serde_json::Value> {
        let selector = AttachmentSelector {
            policy_id: self.policy_id.require("policy_id")?,
            scope: &self.scope,
        };
        Ok(serde_json::to_value(selector).map_err(ApplyError::Serialize)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile_collection;

    fn attachment(policy: &str, scope: AttachScope, mode: EnforcementMode) -> PolicyAttachment {
        PolicyAttachment {
            policy_id: Value::Known(policy.to_string()),
            scope,
            enforcement: mode,
        }
    }

    #[test]
    fn test_enforcement_change_is_an_update() {
        // Tightening enforcement must not detach the policy, even
        // briefly.
        let plan = vec![attachment(
            "pol-1",
            AttachScope::Workspace,
            EnforcementMode::Enforcing,
        )];
        let state = vec![attachment(
            "pol-1",
            AttachScope::Workspace,
            EnforcementMode::Advisory,
        )];
        let delta = reconcile_collection("policy-attachments", &plan, &state).unwrap();
        assert_eq!(delta.to_update.len(), 1);
        assert!(delta.to_create.is_empty());
        assert!(delta.to_delete.is_empty());
    }

    #[test]
    fn test_scope_change_moves_the_slot() {
        let plan = vec![attachment(
            "pol-1",
            AttachScope::Namespace {
                name: String::from("prod"),
            },
            EnforcementMode::Advisory,
        )];
        let state = vec![attachment(
            "pol-1",
            AttachScope::Workspace,
            EnforcementMode::Advisory,
        )];
        let delta = reconcile_collection("policy-attachments", &plan, &state).unwrap();
        assert_eq!(delta.to_create.len(), 1);
        assert_eq!(delta.to_delete.len(), 1);
        assert!(delta.to_update.is_empty());
    }

    #[test]
    fn test_scope_encoding_cannot_be_spoofed_by_names() {
        // A namespace literally named "workspace" is still a different
        // slot than the workspace scope.
        let ns = attachment(
            "pol-1",
            AttachScope::Namespace {
                name: String::from("workspace"),
            },
            EnforcementMode::Advisory,
        );
        let ws = attachment("pol-1", AttachScope::Workspace, EnforcementMode::Advisory);
        assert_ne!(ns.identity_key(), ws.identity_key());
        assert_ne!(ns.content_hash(), ws.content_hash());
    }

    #[test]
    fn test_request_body() {
        let body = attachment(
            "pol-9",
            AttachScope::Namespace {
                name: String::from("prod"),
            },
            EnforcementMode::Enforcing,
        )
        .request_body()
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "policyId": "pol-9",
                "scope": { "kind": "namespace", "name": "prod" },
                "enforcement": "enforcing",
            })
        );
    }

    #[test]
    fn test_unknown_policy_defers() {
        let pending = PolicyAttachment {
            policy_id: Value::Unknown,
            scope: AttachScope::Workspace,
            enforcement: EnforcementMode::Advisory,
        };
        assert_eq!(pending.identity_key(), None);
        assert!(pending.request_body().unwrap_err().is_deferrable());
    }
}
