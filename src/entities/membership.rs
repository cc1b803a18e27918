//! Team memberships: a member's seat in a team, with a team role.

use serde::Serialize;

use crate::engine::{ContentHasher, Entity, Value, encode_identity};
use crate::error::{ApplyError, Result};

use super::WireEntity;

/// Roles a member can hold within a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TeamRole {
    /// Full control over the team.
    Owner,
    /// Can manage team resources.
    Maintainer,
    /// Read-only access.
    Reader,
}

impl TeamRole {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Owner => "owner",
            Self::Maintainer => "maintainer",
            Self::Reader => "reader",
        }
    }
}

/// One member's seat in a team.
///
/// (team, member) is the seat; the role is mutable in place, so a role
/// change never evicts the member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamMembership {
    /// Team name.
    pub team: String,
    /// Member identifier.
    pub member_id: Value<String>,
    /// Role within the team.
    pub role: TeamRole,
}

impl Entity for TeamMembership {
    fn content_hash(&self) -> String {
        let mut hasher = ContentHasher::new();
        hasher.text(&self.team);
        hasher.value_text(&self.member_id);
        hasher.text(self.role.as_str());
        hasher.finish()
    }

    fn identity_key(&self) -> Option<String> {
        let member = self.member_id.as_known()?;
        Some(encode_identity(&[&self.team, member]))
    }

    fn describe(&self) -> String {
        format!(
            "{} in {} as {}",
            self.member_id.as_known().map_or("<unknown>", String::as_str),
            self.team,
            self.role.as_str()
        )
    }
}

/// Wire body for membership create and update requests.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MembershipRequest<'a> {
    team: &'a str,
    member_id: &'a str,
    role: TeamRole,
}

/// Identity selector for membership deletion.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct MembershipSelector<'a> {
    team: &'a str,
    member_id: &'a str,
}

impl WireEntity for TeamMembership {
    const COLLECTION: &'static str = "memberships";

    fn request_body(&self) -> Result<serde_json::Value> {
        let body = MembershipRequest {
            team: &self.team,
            member_id: self.member_id.require("member_id")?,
            role: self.role,
        };
        Ok(serde_json::to_value(body).map_err(ApplyError::Serialize)?)
    }

    fn delete_body(&self) -> Result<serde_json::Value> {
        let selector = MembershipSelector {
            team: &self.team,
            member_id: self.member_id.require("member_id")?,
        };
        Ok(serde_json::to_value(selector).map_err(ApplyError::Serialize)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::reconcile_collection;

    fn membership(team: &str, member: &str, role: TeamRole) -> TeamMembership {
        TeamMembership {
            team: team.to_string(),
            member_id: Value::Known(member.to_string()),
            role,
        }
    }

    #[test]
    fn test_promotion_is_an_update() {
        let plan = vec![membership("platform", "u-9", TeamRole::Maintainer)];
        let state = vec![membership("platform", "u-9", TeamRole::Reader)];
        let delta = reconcile_collection("memberships", &plan, &state).unwrap();
        assert_eq!(delta.to_update.len(), 1);
        assert!(delta.to_create.is_empty());
        assert!(delta.to_delete.is_empty());
    }

    #[test]
    fn test_team_move_is_churn() {
        // Moving a member between teams is a new seat, not an update of
        // the old one.
        let plan = vec![membership("platform", "u-9", TeamRole::Reader)];
        let state = vec![membership("data", "u-9", TeamRole::Reader)];
        let delta = reconcile_collection("memberships", &plan, &state).unwrap();
        assert_eq!(delta.to_create.len(), 1);
        assert_eq!(delta.to_delete.len(), 1);
        assert!(delta.to_update.is_empty());
    }

    #[test]
    fn test_request_body() {
        let body = membership("platform", "u-9", TeamRole::Owner)
            .request_body()
            .unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "team": "platform",
                "memberId": "u-9",
                "role": "owner",
            })
        );
    }

    #[test]
    fn test_unknown_member_defers() {
        let pending = TeamMembership {
            team: String::from("platform"),
            member_id: Value::Unknown,
            role: TeamRole::Reader,
        };
        assert_eq!(pending.identity_key(), None);
        assert!(pending.request_body().unwrap_err().is_deferrable());
    }
}
