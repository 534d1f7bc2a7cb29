/// Determines what happens when a pool is cleared or dropped while it still contains items.
///
/// By default, the pool tears its items down: items owned by the pool are destroyed and
/// items still referenced by handles are detached from the pool, to be destroyed when their
/// last handle is dropped.
///
/// # Examples
///
/// ```
/// use managed_pool::{DropPolicy, ManagedPool};
///
/// // The drop policy is set at pool creation time.
/// let pool = ManagedPool::<u32>::builder()
///     .drop_policy(DropPolicy::MustNotDropItems)
///     .build();
/// ```
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[non_exhaustive]
pub enum DropPolicy {
    /// The pool will tear down any items within when it is cleared or dropped. This is the
    /// default.
    #[default]
    MayDropItems,

    /// The pool will panic if it still contains items when it is cleared or dropped.
    ///
    /// This may be valuable if there are external requirements before the items can be
    /// dropped, for example when every item must be explicitly released by its owner first.
    MustNotDropItems,
}
