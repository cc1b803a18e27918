//! Workspace synchronization engine.
//!
//! Ties the differ and the collection reconciler together for one
//! workspace: computes a sync plan (settings patch plus ordered
//! collection actions), then executes it against the control-plane
//! client. Operations whose payloads cannot be built yet (a required
//! value still unknown) are recorded as deferred and retried on the next
//! pass once the missing value becomes known.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::client::{ControlPlaneClient, Operation, WireRequest};
use crate::engine::{DiffNode, reconcile_collection};
use crate::entities::{
    AccessGrant, NamespaceBinding, PolicyAttachment, TeamMembership, WireEntity,
};
use crate::error::{ApplyError, Result};
use crate::settings::{WorkspaceSettings, WorkspaceSettingsPatch};

/// Desired configuration for one workspace.
#[derive(Debug, Clone, Default)]
pub struct WorkspacePlan {
    /// Nested settings object.
    pub settings: WorkspaceSettings,
    /// Access grants.
    pub grants: Vec<AccessGrant>,
    /// Policy attachments.
    pub policies: Vec<PolicyAttachment>,
    /// Team memberships.
    pub memberships: Vec<TeamMembership>,
    /// Namespace bindings.
    pub namespaces: Vec<NamespaceBinding>,
}

/// Last-observed remote configuration for one workspace.
///
/// `None` at the call site means the workspace does not exist remotely
/// yet; a missing collection is an empty one.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceState {
    /// Nested settings object.
    pub settings: WorkspaceSettings,
    /// Access grants.
    pub grants: Vec<AccessGrant>,
    /// Policy attachments.
    pub policies: Vec<PolicyAttachment>,
    /// Team memberships.
    pub memberships: Vec<TeamMembership>,
    /// Namespace bindings.
    pub namespaces: Vec<NamespaceBinding>,
}

/// One executable step of a sync plan.
#[derive(Debug, Clone)]
pub struct SyncAction {
    /// Human-readable label of the affected entity.
    pub subject: String,
    /// The request handed to the client.
    pub request: WireRequest,
}

/// An operation that cannot be built yet and waits for the next pass.
#[derive(Debug, Clone)]
pub struct DeferredAction {
    /// Collection the operation belongs to.
    pub collection: &'static str,
    /// Human-readable label of the affected entity.
    pub subject: String,
    /// Why the operation was deferred.
    pub reason: String,
}

/// A computed, not-yet-executed synchronization plan.
#[derive(Debug)]
pub struct SyncPlan {
    /// When the plan was computed.
    pub created_at: DateTime<Utc>,
    /// Sparse settings patch, when the settings object changed and the
    /// patch carries something concrete.
    pub settings_patch: Option<WorkspaceSettingsPatch>,
    /// Collection actions in execution order: per collection, deletes
    /// before updates before creates, so identity slots are freed before
    /// anything claims them.
    pub actions: Vec<SyncAction>,
    /// Operations deferred to the next pass.
    pub deferred: Vec<DeferredAction>,
    /// Number of collection entities already converged.
    pub unchanged: usize,
}

impl SyncPlan {
    /// Returns true if executing the plan would touch the remote.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.settings_patch.is_some() || !self.actions.is_empty()
    }

    /// Returns true if nothing needs to happen now or on a later pass.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        !self.has_changes() && self.deferred.is_empty()
    }

    fn count(&self, operation: Operation) -> usize {
        self.actions
            .iter()
            .filter(|a| a.request.operation == operation)
            .count()
    }
}

impl std::fmt::Display for SyncPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_converged() {
            return write!(f, "No changes - workspace is converged");
        }
        writeln!(f, "Sync plan:")?;
        if self.settings_patch.is_some() {
            writeln!(f, "  patch settings")?;
        }
        for action in &self.actions {
            writeln!(
                f,
                "  {} {} {}",
                action.request.operation, action.request.collection, action.subject
            )?;
        }
        for deferred in &self.deferred {
            writeln!(
                f,
                "  deferred {} {} ({})",
                deferred.collection, deferred.subject, deferred.reason
            )?;
        }
        Ok(())
    }
}

/// Result of executing a sync plan.
#[derive(Debug, serde::Serialize)]
pub struct SyncReport {
    /// Whether every executed action succeeded.
    pub success: bool,
    /// Whether a settings patch was applied.
    pub settings_patched: bool,
    /// Number of entities created.
    pub created: usize,
    /// Number of entities updated in place.
    pub updated: usize,
    /// Number of entities deleted.
    pub deleted: usize,
    /// Number of entities already converged.
    pub unchanged: usize,
    /// Number of operations deferred to the next pass.
    pub deferred: usize,
    /// Errors encountered.
    pub errors: Vec<String>,
}

impl std::fmt::Display for SyncReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = if self.success { "successful" } else { "failed" };
        writeln!(f, "Sync {status}:")?;
        writeln!(f, "  Created: {}", self.created)?;
        writeln!(f, "  Updated: {}", self.updated)?;
        writeln!(f, "  Deleted: {}", self.deleted)?;
        writeln!(f, "  Unchanged: {}", self.unchanged)?;
        writeln!(f, "  Deferred: {}", self.deferred)?;
        if !self.errors.is_empty() {
            writeln!(f, "  Errors:")?;
            for error in &self.errors {
                writeln!(f, "    - {error}")?;
            }
        }
        Ok(())
    }
}

/// Synchronization engine for one workspace.
pub struct SyncEngine<'a, C: ControlPlaneClient> {
    /// Workspace identifier.
    workspace: &'a str,
    /// Control-plane client.
    client: &'a C,
    /// Whether to keep executing after a failed action.
    continue_on_error: bool,
}

impl<'a, C: ControlPlaneClient> SyncEngine<'a, C> {
    /// Creates a new sync engine for the given workspace.
    #[must_use]
    pub const fn new(workspace: &'a str, client: &'a C) -> Self {
        Self {
            workspace,
            client,
            continue_on_error: false,
        }
    }

    /// Sets whether to continue executing after a failed action.
    #[must_use]
    pub const fn with_continue_on_error(mut self, continue_on_error: bool) -> Self {
        self.continue_on_error = continue_on_error;
        self
    }

    /// Computes the sync plan for the workspace.
    ///
    /// # Errors
    ///
    /// Returns an error when an input collection violates its set
    /// invariants, or when payload construction fails for a reason other
    /// than a still-unknown value (those are deferred, not failed).
    pub fn plan(
        &self,
        desired: &WorkspacePlan,
        observed: Option<&WorkspaceState>,
    ) -> Result<SyncPlan> {
        info!("Planning sync for workspace {}", self.workspace);

        // A missing remote workspace diffs against the canonical empty
        // state, so the first write carries every plan-specified field.
        let empty = WorkspaceState::default();
        let state = observed.unwrap_or(&empty);

        let (patch, settings_changed) = desired.settings.diff_fields(&state.settings);

        let mut actions = Vec::new();
        let mut deferred = Vec::new();
        let mut unchanged = 0;

        Self::plan_collection(
            &desired.namespaces,
            &state.namespaces,
            &mut actions,
            &mut deferred,
            &mut unchanged,
        )?;
        Self::plan_collection(
            &desired.memberships,
            &state.memberships,
            &mut actions,
            &mut deferred,
            &mut unchanged,
        )?;
        Self::plan_collection(
            &desired.grants,
            &state.grants,
            &mut actions,
            &mut deferred,
            &mut unchanged,
        )?;
        Self::plan_collection(
            &desired.policies,
            &state.policies,
            &mut actions,
            &mut deferred,
            &mut unchanged,
        )?;

        let settings_patch = if patch.is_empty() {
            if settings_changed {
                // Changed solely through still-unknown values: nothing
                // concrete to send yet.
                deferred.push(DeferredAction {
                    collection: "settings",
                    subject: self.workspace.to_string(),
                    reason: String::from("settings values are not yet known"),
                });
            }
            None
        } else {
            Some(patch)
        };

        let plan = SyncPlan {
            created_at: Utc::now(),
            settings_patch,
            actions,
            deferred,
            unchanged,
        };

        info!(
            "Plan: {} creates, {} updates, {} deletes, {} deferred, {} unchanged",
            plan.count(Operation::Create),
            plan.count(Operation::Update),
            plan.count(Operation::Delete),
            plan.deferred.len(),
            plan.unchanged,
        );

        Ok(plan)
    }

    /// Executes a sync plan against the control plane.
    ///
    /// # Errors
    ///
    /// Returns the first action error unless `continue_on_error` is set,
    /// in which case errors are collected into the report.
    pub async fn apply(&self, plan: &SyncPlan) -> Result<SyncReport> {
        info!(
            "Applying sync plan with {} actions for workspace {}",
            plan.actions.len(),
            self.workspace
        );

        let mut report = SyncReport {
            success: true,
            settings_patched: false,
            created: 0,
            updated: 0,
            deleted: 0,
            unchanged: plan.unchanged,
            deferred: plan.deferred.len(),
            errors: vec![],
        };

        if let Some(patch) = &plan.settings_patch {
            let body = serde_json::to_value(patch).map_err(ApplyError::Serialize)?;
            match self.client.patch_settings(self.workspace, body).await {
                Ok(()) => report.settings_patched = true,
                Err(err) => {
                    error!("Settings patch failed: {err}");
                    report.success = false;
                    report.errors.push(format!("patch settings: {err}"));
                    if !self.continue_on_error {
                        return Ok(report);
                    }
                }
            }
        }

        for action in &plan.actions {
            let operation = action.request.operation;
            let collection = action.request.collection;
            match self
                .client
                .execute(self.workspace, action.request.clone())
                .await
            {
                Ok(()) => {
                    debug!("{operation} {collection} {} succeeded", action.subject);
                    match operation {
                        Operation::Create => report.created += 1,
                        Operation::Update => report.updated += 1,
                        Operation::Delete => report.deleted += 1,
                    }
                }
                Err(err) => {
                    error!("{operation} {collection} {} failed: {err}", action.subject);
                    report.success = false;
                    report
                        .errors
                        .push(format!("{operation} {collection} {}: {err}", action.subject));
                    if !self.continue_on_error {
                        return Ok(report);
                    }
                }
            }
        }

        Ok(report)
    }

    /// Plans and applies in one pass.
    ///
    /// # Errors
    ///
    /// Propagates errors from [`Self::plan`] and [`Self::apply`].
    pub async fn sync(
        &self,
        desired: &WorkspacePlan,
        observed: Option<&WorkspaceState>,
    ) -> Result<SyncReport> {
        let plan = self.plan(desired, observed)?;
        if !plan.has_changes() {
            info!("No changes required - workspace {} is converged", self.workspace);
        }
        self.apply(&plan).await
    }

    fn plan_collection<E: WireEntity + Clone>(
        desired: &[E],
        observed: &[E],
        actions: &mut Vec<SyncAction>,
        deferred: &mut Vec<DeferredAction>,
        unchanged: &mut usize,
    ) -> Result<()> {
        let delta = reconcile_collection(E::COLLECTION, desired, observed)?;
        *unchanged += delta.unchanged;

        for entity in &delta.to_delete {
            Self::push_action(entity, Operation::Delete, actions, deferred)?;
        }
        for entity in &delta.to_update {
            Self::push_action(entity, Operation::Update, actions, deferred)?;
        }
        for entity in &delta.to_create {
            Self::push_action(entity, Operation::Create, actions, deferred)?;
        }
        Ok(())
    }

    fn push_action<E: WireEntity>(
        entity: &E,
        operation: Operation,
        actions: &mut Vec<SyncAction>,
        deferred: &mut Vec<DeferredAction>,
    ) -> Result<()> {
        let body = match operation {
            Operation::Delete => entity.delete_body(),
            Operation::Create | Operation::Update => entity.request_body(),
        };
        match body {
            Ok(body) => actions.push(SyncAction {
                subject: entity.describe(),
                request: WireRequest {
                    operation,
                    collection: E::COLLECTION,
                    body,
                },
            }),
            Err(err) if err.is_deferrable() => {
                debug!(
                    "Deferring {operation} of {} in {}: {err}",
                    entity.describe(),
                    E::COLLECTION
                );
                deferred.push(DeferredAction {
                    collection: E::COLLECTION,
                    subject: entity.describe(),
                    reason: err.to_string(),
                });
            }
            Err(err) => return Err(err),
        }
        Ok(())
    }
}
