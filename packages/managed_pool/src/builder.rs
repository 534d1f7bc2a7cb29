use std::any::type_name;
use std::fmt;
use std::marker::PhantomData;

use crate::{DropPolicy, ManagedPool, OwnershipPolicy};

/// Builder for creating an instance of [`ManagedPool`].
///
/// You only need to use this builder if you want to customize the pool configuration.
/// The default configuration used by [`ManagedPool::new()`][1] is sufficient for most use cases.
///
/// The page size and the ownership policy are type parameters of the pool and are chosen when
/// naming the pool type, not here.
///
/// # Examples
///
/// ```
/// use managed_pool::{DropPolicy, ManagedPool};
///
/// let pool = ManagedPool::<u32, 16>::builder()
///     .name("particles")
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
///
/// [1]: ManagedPool::new
#[must_use]
pub struct ManagedPoolBuilder<T, const PAGE_SIZE: usize, P> {
    name: Option<&'static str>,
    drop_policy: DropPolicy,
    max_items: usize,

    _item: PhantomData<T>,
    _policy: PhantomData<P>,
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for ManagedPoolBuilder<T, PAGE_SIZE, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ManagedPoolBuilder")
            .field("item_type", &format_args!("{}", type_name::<T>()))
            .field("page_size", &PAGE_SIZE)
            .field("policy", &format_args!("{}", type_name::<P>()))
            .field("name", &self.name)
            .field("drop_policy", &self.drop_policy)
            .field("max_items", &self.max_items)
            .finish()
    }
}

impl<T, const PAGE_SIZE: usize, P> ManagedPoolBuilder<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    pub(crate) fn new() -> Self {
        Self {
            name: None,
            drop_policy: DropPolicy::default(),
            max_items: usize::MAX,
            _item: PhantomData,
            _policy: PhantomData,
        }
    }

    /// Sets the name the pool reports in its log events.
    ///
    /// Defaults to the name of the item type.
    pub fn name(mut self, name: &'static str) -> Self {
        self.name = Some(name);
        self
    }

    /// Sets the [drop policy][DropPolicy] for the pool. This governs how
    /// to treat remaining items in the pool when the pool is cleared or dropped.
    pub fn drop_policy(mut self, policy: DropPolicy) -> Self {
        self.drop_policy = policy;
        self
    }

    /// Limits the number of items the pool may hold.
    ///
    /// The pool grows in whole pages, so the limit is rounded down to a multiple of
    /// `PAGE_SIZE`. Adding an item beyond it fails with
    /// [`Error::CapacityExhausted`][crate::Error::CapacityExhausted].
    ///
    /// Defaults to the largest number of items whose IDs fit in a `u32`.
    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    /// Builds the pool with the specified configuration.
    ///
    /// # Panics
    ///
    /// Panics if `PAGE_SIZE` is zero or does not fit in `u32`.
    #[must_use]
    pub fn build(self) -> ManagedPool<T, PAGE_SIZE, P> {
        ManagedPool::new_inner(
            self.name.unwrap_or_else(type_name::<T>),
            self.drop_policy,
            self.max_items,
        )
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::{Ephemeral, PoolOwned};

    #[test]
    fn defaults_match_new() {
        let builder = ManagedPoolBuilder::<u32, 8, Ephemeral>::new();

        assert_eq!(builder.name, None);
        assert_eq!(builder.drop_policy, DropPolicy::MayDropItems);
        assert_eq!(builder.max_items, usize::MAX);

        let pool = builder.build();
        assert!(pool.is_empty());
        assert_eq!(pool.max_items(), ManagedPool::<u32, 8>::new().max_items());
    }

    #[test]
    fn settings_are_kept() {
        let builder = ManagedPool::<u32, 8, PoolOwned>::builder()
            .name("states")
            .drop_policy(DropPolicy::MustNotDropItems)
            .max_items(64);

        assert_eq!(builder.name, Some("states"));
        assert_eq!(builder.drop_policy, DropPolicy::MustNotDropItems);
        assert_eq!(builder.max_items, 64);

        assert_eq!(builder.build().max_items(), 64);
    }

    #[test]
    #[should_panic]
    fn must_not_drop_items_is_enforced_on_drop() {
        let mut pool = ManagedPool::<u32, 8>::builder()
            .drop_policy(DropPolicy::MustNotDropItems)
            .build();

        let handle = pool.insert(1).unwrap();

        // The handle outlives the pool, so the pool still contains the item when dropped.
        drop(pool);
        drop(handle);
    }
}
