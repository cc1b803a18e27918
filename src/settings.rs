//! Workspace settings: the nested configuration object managed through
//! the differ.
//!
//! The shape is two levels deep: the root wraps optional child objects
//! (retention, alerting) which wrap scalar fields; alerting additionally
//! carries an ordered rule list that is replaced wholesale on any change.
//! Each node has a derived sparse patch type that serializes under PATCH
//! semantics.

use serde::Serialize;

use crate::engine::{DiffNode, FieldDiffer, FieldPatch, Value};

/// Root settings object for one workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkspaceSettings {
    /// Display name shown in the control-plane UI.
    pub display_name: Value<String>,
    /// Free-form description.
    pub description: Value<String>,
    /// Data retention settings.
    pub retention: Value<RetentionSettings>,
    /// Alerting settings.
    pub alerting: Value<AlertSettings>,
}

/// Data retention settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RetentionSettings {
    /// How long records are kept, in days.
    pub days: Value<u64>,
    /// Whether expired records are archived instead of dropped.
    pub archive: Value<bool>,
}

/// Alerting settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertSettings {
    /// Delivery channel identifier.
    pub channel: Value<String>,
    /// Minimum severity that triggers delivery.
    pub min_severity: Value<Severity>,
    /// Ordered match rules, replaced wholesale on any change.
    pub rules: Value<Vec<AlertRule>>,
}

/// Alert severity levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// Needs immediate attention.
    Critical,
}

/// One alert match rule. Rules are positional configuration; order
/// matters and elements have no identity of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Pattern matched against event names.
    pub pattern: String,
    /// What to do on a match.
    pub action: RuleAction,
}

/// Actions an alert rule can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    /// Deliver to the configured channel.
    Notify,
    /// Page the on-call rotation.
    Page,
    /// Drop the event.
    Suppress,
}

/// Sparse partial update for [`WorkspaceSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceSettingsPatch {
    /// Display name change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub display_name: FieldPatch<String>,
    /// Description change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub description: FieldPatch<String>,
    /// Retention change, clear, or omission.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub retention: FieldPatch<RetentionPatch>,
    /// Alerting change, clear, or omission.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub alerting: FieldPatch<AlertingPatch>,
}

/// Sparse partial update for [`RetentionSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RetentionPatch {
    /// Retention period change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub days: FieldPatch<u64>,
    /// Archive flag change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub archive: FieldPatch<bool>,
}

/// Sparse partial update for [`AlertSettings`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertingPatch {
    /// Channel change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub channel: FieldPatch<String>,
    /// Minimum severity change, if any.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub min_severity: FieldPatch<Severity>,
    /// Full replacement rule list, if any rule changed.
    #[serde(skip_serializing_if = "FieldPatch::is_omit")]
    pub rules: FieldPatch<Vec<AlertRule>>,
}

impl WorkspaceSettingsPatch {
    /// Returns true if the patch carries nothing to send.
    ///
    /// A diff can report changed fields while the patch stays empty when
    /// the only changes are still-unknown values; the caller defers those
    /// to the next pass instead of sending an empty body.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.display_name.is_omit()
            && self.description.is_omit()
            && self.retention.is_omit()
            && self.alerting.is_omit()
    }
}

impl DiffNode for WorkspaceSettings {
    type Patch = WorkspaceSettingsPatch;

    fn diff_fields(&self, state: &Self) -> (Self::Patch, bool) {
        let mut differ = FieldDiffer::new();
        let patch = WorkspaceSettingsPatch {
            display_name: differ.scalar(&self.display_name, &state.display_name),
            description: differ.scalar(&self.description, &state.description),
            retention: differ.nested(&self.retention, &state.retention),
            alerting: differ.nested(&self.alerting, &state.alerting),
        };
        (patch, differ.changed())
    }
}

impl DiffNode for RetentionSettings {
    type Patch = RetentionPatch;

    fn diff_fields(&self, state: &Self) -> (Self::Patch, bool) {
        let mut differ = FieldDiffer::new();
        let patch = RetentionPatch {
            days: differ.scalar(&self.days, &state.days),
            archive: differ.scalar(&self.archive, &state.archive),
        };
        (patch, differ.changed())
    }
}

impl DiffNode for AlertSettings {
    type Patch = AlertingPatch;

    fn diff_fields(&self, state: &Self) -> (Self::Patch, bool) {
        let mut differ = FieldDiffer::new();
        let patch = AlertingPatch {
            channel: differ.scalar(&self.channel, &state.channel),
            min_severity: differ.scalar(&self.min_severity, &state.min_severity),
            rules: differ.list(&self.rules, &state.rules),
        };
        (patch, differ.changed())
    }
}
