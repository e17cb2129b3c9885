//! Entity trait: identity + continuity across updates.

/// A persisted record with a stable identifier.
pub trait Entity {
    /// Strongly-typed entity identifier (time-ordered, so `Ord` follows creation order).
    type Id: Copy
        + Eq
        + Ord
        + core::hash::Hash
        + core::fmt::Debug
        + core::fmt::Display
        + Send
        + Sync
        + 'static;

    /// Human-readable resource name, used in error messages and logs.
    const NAME: &'static str;

    /// Returns the entity identifier.
    fn id(&self) -> Self::Id;
}

/// In-process predicate mirroring a list endpoint's query filter.
pub trait Filter<T> {
    fn matches(&self, record: &T) -> bool;
}
