//! Explicit partial updates.
//!
//! Every updatable resource exposes a patch struct listing exactly the fields a
//! client may change. Fields left as `None` keep their current value.

/// A partial update that can be applied to a `T`.
pub trait Patch<T> {
    /// Overwrite the fields present in `self` on `target`.
    fn apply_to(self, target: &mut T);

    /// `true` when the patch would not change anything.
    fn is_empty(&self) -> bool;
}

/// Replace `slot` with `value` when a new value was supplied.
pub fn set_if_some<V>(slot: &mut V, value: Option<V>) {
    if let Some(v) = value {
        *slot = v;
    }
}
