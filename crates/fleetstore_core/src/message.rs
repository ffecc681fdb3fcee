//! Pending-mutation messages.

use crate::key::Category;

/// What a mutation does to its entity's stored record.
///
/// Upsert covers both creation and modification: the current registry
/// entry is serialized and written over whatever the store holds. The
/// closed enum makes message dispatch exhaustive at compile time; there
/// is no unknown-kind runtime case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Serialize the registry entry and write it at the entity's key.
    Upsert,
    /// Remove the entity's key from the store (idempotent).
    Delete,
}

/// One pending change to a single entity, queued for durable application.
///
/// Callers that mutate a [`Registry`](crate::Registry) entry enqueue a
/// matching `Mutation` so the next flush persists the change. That
/// pairing is a contract on callers; the core does not verify it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    /// Category the entity belongs to.
    pub category: Category,
    /// Entity id within the category.
    pub id: String,
    /// Upsert or delete.
    pub kind: MutationKind,
}

impl Mutation {
    /// Creates an upsert mutation.
    #[must_use]
    pub fn upsert(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            kind: MutationKind::Upsert,
        }
    }

    /// Creates a delete mutation.
    #[must_use]
    pub fn delete(category: Category, id: impl Into<String>) -> Self {
        Self {
            category,
            id: id.into(),
            kind: MutationKind::Delete,
        }
    }
}
