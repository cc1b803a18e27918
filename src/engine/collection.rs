//! Collection reconciliation.
//!
//! Given the desired and last-observed members of a managed collection,
//! computes the minimal disjoint create/update/delete sets. Content
//! hashes drive bulk set difference; identity keys then re-match changed
//! entities to their existing remote slot, so an entity whose mutable
//! attributes changed is reported as a single update rather than a
//! delete plus create (which would open an observable gap and can violate
//! create uniqueness constraints keyed by the identity fields).

use std::collections::{HashMap, HashSet};
use tracing::debug;

use crate::error::{EngineError, Result};

use super::entity::Entity;

/// Disjoint output sets of one collection reconciliation.
///
/// Output order follows input order; callers needing a different
/// deterministic order sort before emission.
#[derive(Debug, Clone, Default)]
pub struct CollectionDelta<E> {
    /// Entities present in the plan with no remote counterpart.
    pub to_create: Vec<E>,
    /// Plan entities whose identity matches an existing remote slot but
    /// whose content differs; each carries the fully-specified new value.
    pub to_update: Vec<E>,
    /// Remote entities with no plan counterpart.
    pub to_delete: Vec<E>,
    /// Number of plan entities already converged.
    pub unchanged: usize,
}

impl<E> CollectionDelta<E> {
    /// Returns true if the collection is already converged.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.to_create.is_empty() && self.to_update.is_empty() && self.to_delete.is_empty()
    }

    /// Returns the total number of changes.
    #[must_use]
    pub fn total_changes(&self) -> usize {
        self.to_create.len() + self.to_update.len() + self.to_delete.len()
    }
}

/// Reconciles the desired members of a collection against the observed
/// ones.
///
/// `kind` names the collection in diagnostics and logs. Either slice may
/// be empty; a missing remote object maps to an empty observed
/// collection.
///
/// # Errors
///
/// Returns [`EngineError::DuplicateContentHash`] or
/// [`EngineError::DuplicateIdentityKey`] when one input collection
/// violates its set invariants. Well-formed inputs always succeed.
pub fn reconcile_collection<E: Entity + Clone>(
    kind: &str,
    plan: &[E],
    state: &[E],
) -> Result<CollectionDelta<E>> {
    let plan_hashes = index_hashes(kind, plan)?;
    let state_hashes = index_hashes(kind, state)?;
    check_identity_uniqueness(kind, plan)?;
    check_identity_uniqueness(kind, state)?;

    // Bulk pass: hash-set difference in both directions.
    let raw_create: Vec<&E> = plan
        .iter()
        .filter(|e| !state_hashes.contains(&e.content_hash()))
        .collect();
    let raw_delete: Vec<&E> = state
        .iter()
        .filter(|e| !plan_hashes.contains(&e.content_hash()))
        .collect();

    let unchanged = plan.len() - raw_create.len();

    // Re-match pass: a raw create whose identity slot survives on the
    // state side is an in-place update of that slot.
    let by_identity: HashMap<String, usize> = raw_delete
        .iter()
        .enumerate()
        .filter_map(|(i, e)| e.identity_key().map(|key| (key, i)))
        .collect();

    let mut matched: HashSet<usize> = HashSet::new();
    let mut to_create = Vec::new();
    let mut to_update = Vec::new();

    for entity in raw_create {
        let slot = entity.identity_key().and_then(|key| by_identity.get(&key));
        match slot {
            Some(&i) => {
                matched.insert(i);
                to_update.push(entity.clone());
            }
            None => to_create.push(entity.clone()),
        }
    }

    let to_delete: Vec<E> = raw_delete
        .into_iter()
        .enumerate()
        .filter(|(i, _)| !matched.contains(i))
        .map(|(_, e)| e.clone())
        .collect();

    debug!(
        "Reconciled {kind}: {} creates, {} updates, {} deletes, {unchanged} unchanged",
        to_create.len(),
        to_update.len(),
        to_delete.len(),
    );

    Ok(CollectionDelta {
        to_create,
        to_update,
        to_delete,
        unchanged,
    })
}

fn index_hashes<E: Entity>(kind: &str, entities: &[E]) -> Result<HashSet<String>> {
    let mut hashes = HashSet::with_capacity(entities.len());
    for entity in entities {
        if !hashes.insert(entity.content_hash()) {
            return Err(EngineError::DuplicateContentHash {
                collection: kind.to_string(),
                entity: entity.describe(),
            }
            .into());
        }
    }
    Ok(hashes)
}

fn check_identity_uniqueness<E: Entity>(kind: &str, entities: &[E]) -> Result<()> {
    let mut keys = HashSet::new();
    for entity in entities {
        if let Some(key) = entity.identity_key()
            && !keys.insert(key.clone())
        {
            return Err(EngineError::DuplicateIdentityKey {
                collection: kind.to_string(),
                identity: key,
            }
            .into());
        }
    }
    Ok(())
}
