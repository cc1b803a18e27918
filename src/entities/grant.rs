//! Access grants: a role granted to a subject on the workspace.

use serde::Serialize;

use crate::engine::{ContentHasher, Entity, Value, encode_identity};
use crate::error::{ApplyError, Result};

use super::WireEntity;

/// Kinds of subjects a grant can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SubjectKind {
    /// A human user.
    User,
    /// A user group.
    Group,
    /// A service account.
    Service,
}

impl SubjectKind {
    /// Stable string form used in projections and diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Group => "group",
            Self::Service => "service",
        }
    }
}

/// A role granted to a subject.
///
/// The subject (kind + id) is the grant's slot; the role is mutable in
/// place. The subject id is unknown while the subject resource itself has
/// not been applied yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessGrant {
    /// What kind of subject the grant targets.
    pub subject_kind: SubjectKind,
    /// Subject identifier.
    pub subject_id: Value<String>,
    /// Granted role.
    pub role: String,
}

impl Entity for AccessGrant {
    fn content_hash(&self) -> String {
        let mut hasher = ContentHasher::new();
        hasher.text(self.subject_kind.as_str());
        hasher.value_text(&self.subject_id);
        hasher.text(&self.role);
        hasher.finish()
    }

    fn identity_key(&self) -> Option<String> {
        let id = self.subject_id.as_known()?;
        Some(encode_identity(&[self.subject_kind.as_str(), id]))
    }

    fn describe(&self) -> String {
        format!(
            "{}:{} role={}",
            self.subject_kind.as_str(),
            self.subject_id.as_known().map_or("<unknown>", String::as_str),
            self.role
        )
    }
}

/// Wire body for grant create and update requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantRequest<'a> {
    subject_kind: SubjectKind,
    subject_id: &'a str,
    role: &'a str,
}

/// Identity selector for grant deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GrantSelector<'a> {
    subject_kind: SubjectKind,
    subject_id: &'a str,
}

impl WireEntity for AccessGrant {
    const COLLECTION: &'static str = "grants";

    fn request_body(&self) -> Result<serde_json::Value> {
        let body = GrantRequest {
            subject_kind: self.subject_kind,
            subject_id: self.subject_id.require("subject_id")?,
            role: &self.role,
        };
        Ok(serde_json::to_value(body).map_err(ApplyError::Serialize)?)
    }

    fn delete_body(&self) -> Result<serde_json::Value> {
        let selector = GrantSelector {
            subject_kind: self.subject_kind,
            subject_id: self.subject_id.require("subject_id")?,
        };
        Ok(serde_json::to_value(selector).map_err(ApplyError::Serialize)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile_collection;

    fn grant(kind: SubjectKind, id: &str, role: &str) -> AccessGrant {
        AccessGrant {
            subject_kind: kind,
            subject_id: Value::Known(id.to_string()),
            role: role.to_string(),
        }
    }

    #[test]
    fn test_role_change_is_an_update() {
        let plan = vec![grant(SubjectKind::User, "ext-42", "admin")];
        let state = vec![grant(SubjectKind::User, "ext-42", "viewer")];
        let delta = reconcile_collection("grants", &plan, &state).unwrap();
        assert_eq!(delta.to_update.len(), 1);
        assert!(delta.to_create.is_empty());
        assert!(delta.to_delete.is_empty());
    }

    #[test]
    fn test_same_id_different_kind_is_a_different_slot() {
        let plan = vec![grant(SubjectKind::Group, "ext-42", "viewer")];
        let state = vec![grant(SubjectKind::User, "ext-42", "viewer")];
        let delta = reconcile_collection("grants", &plan, &state).unwrap();
        assert_eq!(delta.to_create.len(), 1);
        assert_eq!(delta.to_delete.len(), 1);
        assert!(delta.to_update.is_empty());
    }

    #[test]
    fn test_unknown_subject_has_no_identity() {
        let pending = AccessGrant {
            subject_kind: SubjectKind::Service,
            subject_id: Value::Unknown,
            role: String::from("writer"),
        };
        assert_eq!(pending.identity_key(), None);
        assert!(pending.describe().contains("<unknown>"));
    }

    #[test]
    fn test_request_body() {
        let body = grant(SubjectKind::User, "ext-42", "admin")
            .request_body()
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "subjectKind": "user",
                "subjectId": "ext-42",
                "role": "admin",
            })
        );
    }

    #[test]
    fn test_request_body_defers_on_unknown_subject() {
        let pending = AccessGrant {
            subject_kind: SubjectKind::User,
            subject_id: Value::Unknown,
            role: String::from("admin"),
        };
        let err = pending.request_body().unwrap_err();
        assert!(err.is_deferrable());
    }

    #[test]
    fn test_delete_body_carries_identity_only() {
        let body = grant(SubjectKind::Group, "g-7", "viewer")
            .delete_body()
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "subjectKind": "group", "subjectId": "g-7" })
        );
    }
}
