//! The capability contract entities expose to the collection reconciler.

/// A member of a managed one-to-many collection.
///
/// The reconciler never looks inside an entity; it works entirely through
/// these two projections. Entity types declare which fields feed each one
/// and the generic engine does the rest.
pub trait Entity {
    /// Deterministic encoding of all fields that matter for equality.
    ///
    /// Two entities with equal content hashes are identical for
    /// reconciliation purposes. Within one input collection no two
    /// entities may share a content hash; collections are sets.
    fn content_hash(&self) -> String;

    /// Deterministic encoding of the fields that identify the entity's
    /// slot, independent of its mutable attributes.
    ///
    /// Returns `None` while any identity field is still unknown, which
    /// makes the entity ineligible for identity-based update matching.
    /// Within one input collection non-`None` keys must be unique.
    fn identity_key(&self) -> Option<String>;

    /// Human-readable label used in diagnostics and logs.
    fn describe(&self) -> String;
}
