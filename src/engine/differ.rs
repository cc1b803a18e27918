//! Scalar and nested-object diffing.
//!
//! Walks a plan tree against a state tree of the same shape, bottom-up,
//! and produces a sparse partial update plus a "did anything change"
//! signal per node. Only changed fields are set in the partial update;
//! the transport layer omits everything else, so server-managed defaults
//! are never clobbered.
//!
//! The differ is a pure function of its two inputs, stateless across
//! calls.

use tracing::debug;

use super::patch::FieldPatch;
use super::value::Value;

/// A nested configuration node the differ can walk.
///
/// Implementations compare their fields one by one, scalars via
/// [`FieldDiffer::scalar`], child nodes via [`FieldDiffer::nested`], and
/// list-valued fields via [`FieldDiffer::list`]. `Default` must yield the
/// canonical empty node of the shape (every field absent); it stands in
/// for a missing state node so that a first write reports every
/// plan-specified field as changed without special-casing create vs
/// update.
pub trait DiffNode: Default {
    /// The sparse partial-update document for this shape.
    type Patch: Default;

    /// Compares every field of `self` (the plan) against `state`,
    /// returning the sparse patch and whether any field changed.
    fn diff_fields(&self, state: &Self) -> (Self::Patch, bool);
}

/// Diffs one scalar field.
///
/// An absent plan value means the field is unmanaged: it is never written
/// and never counts as changed, whatever the remote side holds. An
/// unknown plan value is never written either (there is nothing concrete
/// to send) but always counts as changed so the caller knows the field is
/// in flux.
pub fn diff_scalar<T: PartialEq + Clone>(
    plan: &Value<T>,
    state: &Value<T>,
) -> (FieldPatch<T>, bool) {
    match plan {
        Value::Absent => (FieldPatch::Omit, false),
        Value::Unknown => (FieldPatch::Omit, true),
        Value::Known(v) => match state {
            Value::Known(w) if w == v => (FieldPatch::Omit, false),
            _ => (FieldPatch::Set(v.clone()), true),
        },
    }
}

/// Diffs one nested-object field, recursing into the child shape.
///
/// A plan-absent node against a present state node signals an explicit
/// clear one level up. A plan-present node against a missing state node
/// diffs against the canonical empty node, so every plan-specified child
/// field lands in the patch, and the node counts as changed even when the
/// resulting patch is empty (presence itself changed).
pub fn diff_nested<N: DiffNode>(
    plan: &Value<N>,
    state: &Value<N>,
) -> (FieldPatch<N::Patch>, bool) {
    match plan {
        Value::Absent => match state {
            Value::Absent => (FieldPatch::Omit, false),
            _ => (FieldPatch::Clear, true),
        },
        Value::Unknown => (FieldPatch::Omit, true),
        Value::Known(p) => match state {
            Value::Known(s) => {
                let (patch, changed) = p.diff_fields(s);
                if changed {
                    (FieldPatch::Set(patch), true)
                } else {
                    (FieldPatch::Omit, false)
                }
            }
            _ => {
                let (patch, _) = p.diff_fields(&N::default());
                (FieldPatch::Set(patch), true)
            }
        },
    }
}

/// Diffs one list-of-nested-object field, wholesale.
///
/// List elements are positional configuration with no stable per-element
/// identity, so there is nothing to match an element against: any
/// difference anywhere replaces the entire list, which is also what the
/// remote API accepts. Equality is structural, derived per element shape.
pub fn diff_list<T: PartialEq + Clone>(
    plan: &Value<Vec<T>>,
    state: &Value<Vec<T>>,
) -> (FieldPatch<Vec<T>>, bool) {
    diff_scalar(plan, state)
}

/// Diffs a whole resource's configuration object.
///
/// `None` state means the resource does not yet exist remotely: the plan
/// is diffed against the canonical empty node and the result is always a
/// change (the first write must go out even if the plan sets nothing).
pub fn diff_root<N: DiffNode>(plan: &N, state: Option<&N>) -> (N::Patch, bool) {
    match state {
        Some(s) => {
            let (patch, changed) = plan.diff_fields(s);
            debug!("Root diff computed, changed: {changed}");
            (patch, changed)
        }
        None => {
            debug!("No remote state, building first-write patch from plan");
            let (patch, _) = plan.diff_fields(&N::default());
            (patch, true)
        }
    }
}

/// Per-field diff accumulator used inside [`DiffNode::diff_fields`].
///
/// Collects the changed flag across fields so adapter code stays a flat
/// list of field declarations.
#[derive(Debug, Default)]
pub struct FieldDiffer {
    changed: bool,
}

impl FieldDiffer {
    /// Creates a fresh accumulator.
    #[must_use]
    pub const fn new() -> Self {
        Self { changed: false }
    }

    /// Diffs a scalar field and folds its changed flag.
    pub fn scalar<T: PartialEq + Clone>(
        &mut self,
        plan: &Value<T>,
        state: &Value<T>,
    ) -> FieldPatch<T> {
        let (patch, changed) = diff_scalar(plan, state);
        self.changed |= changed;
        patch
    }

    /// Diffs a nested-object field and folds its changed flag.
    pub fn nested<N: DiffNode>(
        &mut self,
        plan: &Value<N>,
        state: &Value<N>,
    ) -> FieldPatch<N::Patch> {
        let (patch, changed) = diff_nested(plan, state);
        self.changed |= changed;
        patch
    }

    /// Diffs a list field wholesale and folds its changed flag.
    pub fn list<T: PartialEq + Clone>(
        &mut self,
        plan: &Value<Vec<T>>,
        state: &Value<Vec<T>>,
    ) -> FieldPatch<Vec<T>> {
        let (patch, changed) = diff_list(plan, state);
        self.changed |= changed;
        patch
    }

    /// Returns true if any field diffed through this accumulator changed.
    #[must_use]
    pub const fn changed(&self) -> bool {
        self.changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct Rule {
        pattern: String,
        action: String,
    }

    fn rule(pattern: &str, action: &str) -> Rule {
        Rule {
            pattern: pattern.to_string(),
            action: action.to_string(),
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Probe {
        label: Value<String>,
        enabled: Value<bool>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct ProbePatch {
        label: FieldPatch<String>,
        enabled: FieldPatch<bool>,
    }

    impl DiffNode for Probe {
        type Patch = ProbePatch;

        fn diff_fields(&self, state: &Self) -> (Self::Patch, bool) {
            let mut differ = FieldDiffer::new();
            let patch = ProbePatch {
                label: differ.scalar(&self.label, &state.label),
                enabled: differ.scalar(&self.enabled, &state.enabled),
            };
            (patch, differ.changed())
        }
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct Root {
        name: Value<String>,
        description: Value<String>,
        probe: Value<Probe>,
        rules: Value<Vec<Rule>>,
    }

    #[derive(Debug, Clone, Default, PartialEq, Eq)]
    struct RootPatch {
        name: FieldPatch<String>,
        description: FieldPatch<String>,
        probe: FieldPatch<ProbePatch>,
        rules: FieldPatch<Vec<Rule>>,
    }

    impl DiffNode for Root {
        type Patch = RootPatch;

        fn diff_fields(&self, state: &Self) -> (Self::Patch, bool) {
            let mut differ = FieldDiffer::new();
            let patch = RootPatch {
                name: differ.scalar(&self.name, &state.name),
                description: differ.scalar(&self.description, &state.description),
                probe: differ.nested(&self.probe, &state.probe),
                rules: differ.list(&self.rules, &state.rules),
            };
            (patch, differ.changed())
        }
    }

    fn known(s: &str) -> Value<String> {
        Value::Known(s.to_string())
    }

    #[test]
    fn test_scalar_equal_known_is_unchanged() {
        let (patch, changed) = diff_scalar(&known("x"), &known("x"));
        assert_eq!(patch, FieldPatch::Omit);
        assert!(!changed);
    }

    #[test]
    fn test_scalar_known_differs() {
        let (patch, changed) = diff_scalar(&known("x"), &known("y"));
        assert_eq!(patch, FieldPatch::Set(String::from("x")));
        assert!(changed);
    }

    #[test]
    fn test_scalar_newly_set() {
        let (patch, changed) = diff_scalar(&known("x"), &Value::Absent);
        assert_eq!(patch, FieldPatch::Set(String::from("x")));
        assert!(changed);
    }

    #[test]
    fn test_scalar_absent_plan_is_unmanaged() {
        // Sparsity: an unconfigured field never touches the remote value.
        let (patch, changed) = diff_scalar(&Value::Absent, &known("old"));
        assert_eq!(patch, FieldPatch::Omit);
        assert!(!changed);
    }

    #[test]
    fn test_scalar_unknown_plan_counts_as_changed_but_is_not_written() {
        let (patch, changed) = diff_scalar(&Value::<String>::Unknown, &known("old"));
        assert_eq!(patch, FieldPatch::Omit);
        assert!(changed);
    }

    #[test]
    fn test_scalar_known_over_unknown_state() {
        let (patch, changed) = diff_scalar(&known("x"), &Value::Unknown);
        assert_eq!(patch, FieldPatch::Set(String::from("x")));
        assert!(changed);
    }

    #[test]
    fn test_sparsity_scenario() {
        // Plan sets name="x", leaves description unconfigured; state has
        // name="x", description="old". Nothing changed, nothing sent.
        let plan = Root {
            name: known("x"),
            ..Root::default()
        };
        let state = Root {
            name: known("x"),
            description: known("old"),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(!changed);
        assert_eq!(patch, RootPatch::default());
    }

    #[test]
    fn test_first_write_completeness() {
        // No remote state: every plan-specified field is written, absent
        // fields are omitted rather than defaulted.
        let plan = Root {
            name: known("x"),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, None);
        assert!(changed);
        assert_eq!(patch.name, FieldPatch::Set(String::from("x")));
        assert_eq!(patch.description, FieldPatch::Omit);
        assert_eq!(patch.probe, FieldPatch::Omit);
    }

    #[test]
    fn test_nested_absent_plan_clears() {
        let plan = Root::default();
        let state = Root {
            probe: Value::Known(Probe {
                label: known("p"),
                enabled: Value::Known(true),
            }),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(changed);
        assert_eq!(patch.probe, FieldPatch::Clear);
    }

    #[test]
    fn test_nested_newly_present_reports_all_plan_fields() {
        let plan = Root {
            probe: Value::Known(Probe {
                label: known("p"),
                enabled: Value::Absent,
            }),
            ..Root::default()
        };
        let state = Root::default();
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(changed);
        let probe = match patch.probe {
            FieldPatch::Set(p) => p,
            other => panic!("expected Set, got {other:?}"),
        };
        assert_eq!(probe.label, FieldPatch::Set(String::from("p")));
        assert_eq!(probe.enabled, FieldPatch::Omit);
    }

    #[test]
    fn test_nested_presence_alone_is_a_change() {
        // A present-but-empty node still differs from an absent one.
        let plan = Root {
            probe: Value::Known(Probe::default()),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&Root::default()));
        assert!(changed);
        assert_eq!(patch.probe, FieldPatch::Set(ProbePatch::default()));
    }

    #[test]
    fn test_nested_unchanged_child_is_omitted() {
        let node = Root {
            probe: Value::Known(Probe {
                label: known("p"),
                enabled: Value::Known(false),
            }),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&node, Some(&node.clone()));
        assert!(!changed);
        assert_eq!(patch.probe, FieldPatch::Omit);
    }

    #[test]
    fn test_changed_child_marks_parent_changed() {
        let plan = Root {
            probe: Value::Known(Probe {
                label: known("p2"),
                enabled: Value::Known(true),
            }),
            ..Root::default()
        };
        let state = Root {
            probe: Value::Known(Probe {
                label: known("p1"),
                enabled: Value::Known(true),
            }),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(changed);
        let probe = match patch.probe {
            FieldPatch::Set(p) => p,
            other => panic!("expected Set, got {other:?}"),
        };
        assert_eq!(probe.label, FieldPatch::Set(String::from("p2")));
        assert_eq!(probe.enabled, FieldPatch::Omit);
    }

    #[test]
    fn test_list_replaced_wholesale() {
        // One element differs: the entire list is resent.
        let plan = Root {
            rules: Value::Known(vec![rule("a", "notify"), rule("b", "page")]),
            ..Root::default()
        };
        let state = Root {
            rules: Value::Known(vec![rule("a", "notify"), rule("b", "suppress")]),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(changed);
        assert_eq!(
            patch.rules,
            FieldPatch::Set(vec![rule("a", "notify"), rule("b", "page")])
        );
    }

    #[test]
    fn test_equal_list_is_omitted() {
        let node = Root {
            rules: Value::Known(vec![rule("a", "notify")]),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&node, Some(&node.clone()));
        assert!(!changed);
        assert_eq!(patch.rules, FieldPatch::Omit);
    }

    #[test]
    fn test_explicitly_empty_list_replaces_remote() {
        let plan = Root {
            rules: Value::Known(vec![]),
            ..Root::default()
        };
        let state = Root {
            rules: Value::Known(vec![rule("a", "notify")]),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(changed);
        assert_eq!(patch.rules, FieldPatch::Set(vec![]));
    }

    #[test]
    fn test_absent_list_is_unmanaged() {
        let plan = Root::default();
        let state = Root {
            rules: Value::Known(vec![rule("a", "notify")]),
            ..Root::default()
        };
        let (patch, changed) = diff_root(&plan, Some(&state));
        assert!(!changed);
        assert_eq!(patch.rules, FieldPatch::Omit);
    }
}
