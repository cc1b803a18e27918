// ============================================================================
// Strict linting - Dangerous or non-idiomatic practices are forbidden
// ============================================================================

#![deny(warnings)]                    // All warnings are treated as errors
#![deny(unsafe_code)]                 // Unsafe code is forbidden
#![deny(missing_docs)]                // All public items must be documented
#![deny(dead_code)]                   // Unused code is forbidden
#![deny(non_camel_case_types)]        // Types must follow CamelCase convention

// Additional strictness - Leave nothing unchecked
#![deny(unused_imports)]              // Unused imports are forbidden
#![deny(unused_variables)]            // Unused variables are forbidden
#![deny(unused_must_use)]             // Must handle Result and Option explicitly
#![deny(non_snake_case)]              // Variables and functions must be snake_case
#![deny(non_upper_case_globals)]      // Constants must be UPPER_CASE
#![deny(nonstandard_style)]           // Non-standard code style is forbidden
#![forbid(unsafe_op_in_unsafe_fn)]    // Unsafe ops in unsafe fns are forbidden

// Clippy lints (warnings only)
#![warn(clippy::all)]                 // All standard Clippy lints
#![warn(clippy::pedantic)]            // Very strict Clippy lints
#![warn(clippy::nursery)]             // Experimental lints
#![warn(clippy::unwrap_used)]         // unwrap() warning
#![warn(clippy::expect_used)]         // expect() warning
#![warn(clippy::panic)]               // panic!() warning
#![warn(clippy::print_stdout)]        // println!() warning
#![warn(clippy::todo)]                // TODO warning
#![warn(clippy::unimplemented)]       // unimplemented!() warning
#![warn(clippy::missing_const_for_fn)] // Force const when possible
#![warn(clippy::unwrap_in_result)]    // unwrap() in Result warning
#![warn(clippy::module_inception)]    // Module with same name as crate warning
#![warn(clippy::redundant_clone)]     // Useless clones warning
#![warn(clippy::shadow_unrelated)]    // Shadowing unrelated variables warning
#![warn(clippy::too_many_arguments)]  // Limit function arguments
#![warn(clippy::cognitive_complexity)] // Limit cognitive complexity

// Safety and robustness lints
#![deny(overflowing_literals)]        // Overflowing literals are forbidden
#![deny(arithmetic_overflow)]         // Arithmetic overflow is forbidden

// ============================================================================
// Crate Documentation
// ============================================================================

//! # Tidesync
//!
//! A desired-state reconciliation engine for remote workspace
//! configuration.
//!
//! ## Overview
//!
//! Given a desired configuration (plan) and the last-known remote
//! configuration (state), tidesync computes:
//!
//! - the minimal partial-update payload for a nested configuration
//!   object, relying on server-side PATCH semantics, and
//! - the minimal create/update/delete sets for each managed collection
//!   of child entities (grants, policy attachments, memberships,
//!   namespace bindings).
//!
//! The engine never deletes and recreates an entity when only a mutable
//! attribute changed, never transmits fields that did not change, and
//! handles three-valued presence (absent, known, unknown) consistently
//! across every entity shape.
//!
//! ## Architecture
//!
//! Two pure components do the work:
//!
//! 1. **Differ**: walks a nested configuration tree bottom-up and emits
//!    a sparse partial update plus a changed signal
//! 2. **Collection reconciler**: hash-set difference plus identity
//!    re-matching over entity collections
//!
//! Per-entity code shrinks to two projections (content hash, identity
//! key) and a wire-request builder; the [`sync`] module orchestrates a
//! full pass against a control-plane client.
//!
//! ## Modules
//!
//! - [`engine`]: Generic differ and collection reconciler
//! - [`entities`]: Managed entity kinds and their wire adapters
//! - [`settings`]: The nested workspace settings shape
//! - [`client`]: Control-plane client boundary
//! - [`sync`]: Per-workspace plan/apply orchestration
//! - [`error`]: Error hierarchy
//!
//! ## Example
//!
//! ```
//! use tidesync::{AccessGrant, SubjectKind, Value, reconcile_collection};
//!
//! let plan = vec![AccessGrant {
//!     subject_kind: SubjectKind::User,
//!     subject_id: Value::Known("ext-42".into()),
//!     role: "admin".into(),
//! }];
//! let state = vec![AccessGrant {
//!     subject_kind: SubjectKind::User,
//!     subject_id: Value::Known("ext-42".into()),
//!     role: "viewer".into(),
//! }];
//!
//! // Same subject, different role: one in-place update, no churn.
//! let delta = reconcile_collection("grants", &plan, &state).unwrap();
//! assert_eq!(delta.to_update.len(), 1);
//! assert!(delta.to_create.is_empty());
//! assert!(delta.to_delete.is_empty());
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod client;
pub mod engine;
pub mod entities;
pub mod error;
pub mod settings;
pub mod sync;

// ============================================================================
// Re-exports
// ============================================================================

pub use client::{ControlPlaneClient, Operation, WireRequest};
pub use engine::{
    CollectionDelta, ContentHasher, DiffNode, Entity, FieldDiffer, FieldPatch, Value,
    diff_list, diff_nested, diff_root, diff_scalar, encode_identity, reconcile_collection,
};
pub use entities::{
    AccessGrant, AttachScope, EnforcementMode, NamespaceBinding, PolicyAttachment, SubjectKind,
    TeamMembership, TeamRole, WireEntity,
};
pub use error::{ApplyError, EngineError, Result, TidesyncError};
pub use settings::{
    AlertRule, AlertSettings, AlertingPatch, RetentionPatch, RetentionSettings, RuleAction,
    Severity, WorkspaceSettings, WorkspaceSettingsPatch,
};
pub use sync::{
    DeferredAction, SyncAction, SyncEngine, SyncPlan, SyncReport, WorkspacePlan, WorkspaceState,
};
