use std::fmt::Debug;

/// Decides who owns the items of a [`ManagedPool`][crate::ManagedPool].
///
/// The policy is a type parameter of the pool, so the choice is made at compile time:
///
/// * [`Ephemeral`] - items are owned by their handles alone and are destroyed the moment the
///   last [`Handle`][crate::Handle] referencing them is dropped.
/// * [`PoolOwned`] - the pool keeps one reference to every item for itself, so items survive
///   any number of handles coming and going and are only destroyed when the pool is cleared
///   or dropped.
///
/// This trait is sealed and cannot be implemented outside this crate.
pub trait OwnershipPolicy: sealed::Sealed + Debug + 'static {
    /// Number of references the pool itself holds on every live item.
    const RETAINED_REFERENCES: u32;

    /// Whether the pool keeps items alive until it is cleared.
    #[must_use]
    fn retains_items() -> bool {
        Self::RETAINED_REFERENCES > 0
    }
}

/// Items are destroyed as soon as their last handle is dropped.
///
/// This is the default policy of [`ManagedPool`][crate::ManagedPool].
///
/// # Example
///
/// ```rust
/// use managed_pool::{Ephemeral, ManagedPool};
///
/// let mut pool = ManagedPool::<u32, 16, Ephemeral>::new();
///
/// let handle = pool.allocate().unwrap();
/// assert_eq!(pool.len(), 1);
///
/// drop(handle);
/// assert_eq!(pool.len(), 0);
/// ```
#[derive(Debug)]
pub enum Ephemeral {}

/// The pool holds a reference to every item, keeping it alive until the pool is cleared.
///
/// Useful for long-lived, de-duplicated objects that are looked up again and again, such as
/// cached state objects, where handing out and dropping handles must never destroy the item.
///
/// Clearing or dropping the pool while any handle to one of its items is still alive is a
/// programming error and panics.
///
/// # Example
///
/// ```rust
/// use managed_pool::{ManagedPool, PoolOwned};
///
/// let mut pool = ManagedPool::<u32, 16, PoolOwned>::new();
///
/// let handle = pool.allocate().unwrap();
/// drop(handle);
///
/// // The item is still there; only clearing the pool destroys it.
/// assert_eq!(pool.len(), 1);
///
/// pool.clear();
/// assert_eq!(pool.len(), 0);
/// ```
#[derive(Debug)]
pub enum PoolOwned {}

impl OwnershipPolicy for Ephemeral {
    const RETAINED_REFERENCES: u32 = 0;
}

impl OwnershipPolicy for PoolOwned {
    const RETAINED_REFERENCES: u32 = 1;
}

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Ephemeral {}
    impl Sealed for super::PoolOwned {}
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn ephemeral_does_not_retain() {
        assert_eq!(Ephemeral::RETAINED_REFERENCES, 0);
        assert!(!Ephemeral::retains_items());
    }

    #[test]
    fn pool_owned_retains_one_reference() {
        assert_eq!(PoolOwned::RETAINED_REFERENCES, 1);
        assert!(PoolOwned::retains_items());
    }
}
