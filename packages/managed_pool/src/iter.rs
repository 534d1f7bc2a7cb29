use std::any::type_name;
use std::fmt;
use std::iter::FusedIterator;
use std::mem;

use crate::{Handle, OwnershipPolicy, PoolCore, SENTINEL};

/// Iterator over handles to the live items of a [`ManagedPool`][crate::ManagedPool], in
/// allocation order.
///
/// Created by [`ManagedPool::iter()`][crate::ManagedPool::iter]. The iterator holds handles to
/// the next items it will yield from either end, so those items stay alive even if every other
/// handle to them is dropped mid-iteration. Items released before the iterator reaches them
/// are skipped.
///
/// # Example
///
/// ```rust
/// use managed_pool::ManagedPool;
///
/// let mut pool = ManagedPool::<char>::new();
/// let _handles: Vec<_> = "abc".chars().map(|c| pool.insert(c).unwrap()).collect();
///
/// let forward: String = pool.iter().map(|c| *c).collect();
/// let backward: String = pool.iter().rev().map(|c| *c).collect();
///
/// assert_eq!(forward, "abc");
/// assert_eq!(backward, "cba");
/// ```
pub struct Iter<'a, T, const PAGE_SIZE: usize, P> {
    core: &'a PoolCore<T, PAGE_SIZE, P>,

    // Both null once the iterator is exhausted.
    front: Handle<T>,
    back: Handle<T>,
}

impl<'a, T, const PAGE_SIZE: usize, P> Iter<'a, T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    pub(crate) fn new(core: &'a PoolCore<T, PAGE_SIZE, P>) -> Self {
        Self {
            core,
            front: core.next_live(SENTINEL).unwrap_or_default(),
            back: core.prev_live(SENTINEL).unwrap_or_default(),
        }
    }

    fn finish(&mut self) {
        self.front = Handle::null();
        self.back = Handle::null();
    }
}

impl<T, const PAGE_SIZE: usize, P> Iterator for Iter<'_, T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    type Item = Handle<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = mem::take(&mut self.front);
        let id = Handle::slot_id(&current)?;

        if Handle::ptr_eq(&current, &self.back) {
            self.finish();
        } else {
            match self.core.next_live(id) {
                Some(next) => self.front = next,
                None => self.finish(),
            }
        }

        Some(current)
    }
}

impl<T, const PAGE_SIZE: usize, P> DoubleEndedIterator for Iter<'_, T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        let current = mem::take(&mut self.back);
        let id = Handle::slot_id(&current)?;

        if Handle::ptr_eq(&current, &self.front) {
            self.finish();
        } else {
            match self.core.prev_live(id) {
                Some(prev) => self.back = prev,
                None => self.finish(),
            }
        }

        Some(current)
    }
}

impl<T, const PAGE_SIZE: usize, P> FusedIterator for Iter<'_, T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for Iter<'_, T, PAGE_SIZE, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("front", &self.front)
            .field("back", &self.back)
            .finish_non_exhaustive()
    }
}

/// A position in the allocation order of a [`ManagedPool`][crate::ManagedPool] that can move
/// in both directions.
///
/// Besides pointing at live items, a cursor can point at the end position, which sits after
/// the newest item and before the oldest one. Moving past either end lands on the end position,
/// and moving on from there wraps around to the other end.
///
/// # Example
///
/// ```rust
/// use managed_pool::ManagedPool;
///
/// let mut pool = ManagedPool::<u32>::new();
/// let _a = pool.insert(1).unwrap();
/// let _b = pool.insert(2).unwrap();
///
/// let mut cursor = pool.cursor_back();
/// assert_eq!(cursor.current().copied(), Some(2));
///
/// cursor.move_next();
/// assert!(cursor.is_end());
///
/// cursor.move_next();
/// assert_eq!(cursor.current().copied(), Some(1));
/// ```
pub struct Cursor<'a, T, const PAGE_SIZE: usize, P> {
    core: &'a PoolCore<T, PAGE_SIZE, P>,

    // Null at the end position.
    current: Handle<T>,
}

impl<'a, T, const PAGE_SIZE: usize, P> Cursor<'a, T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    pub(crate) fn new(core: &'a PoolCore<T, PAGE_SIZE, P>, current: Option<Handle<T>>) -> Self {
        Self {
            core,
            current: current.unwrap_or_default(),
        }
    }

    /// The item at the cursor, or `None` at the end position.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        Handle::try_get(&self.current).ok()
    }

    /// A new handle to the item at the cursor, or `None` at the end position.
    #[must_use]
    pub fn handle(&self) -> Option<Handle<T>> {
        Handle::is_valid(&self.current).then(|| self.current.clone())
    }

    /// The ID of the item at the cursor, or `None` at the end position.
    #[must_use]
    pub fn id(&self) -> Option<u32> {
        Handle::slot_id(&self.current)
    }

    /// Whether the cursor is at the end position.
    #[must_use]
    pub fn is_end(&self) -> bool {
        !Handle::is_valid(&self.current)
    }

    /// Moves to the next newer item, to the end position after the newest item, or from the
    /// end position to the oldest item.
    pub fn move_next(&mut self) {
        let id = Handle::slot_id(&self.current).unwrap_or(SENTINEL);
        self.current = self.core.next_live(id).unwrap_or_default();
    }

    /// Moves to the next older item, to the end position before the oldest item, or from the
    /// end position to the newest item.
    pub fn move_prev(&mut self) {
        let id = Handle::slot_id(&self.current).unwrap_or(SENTINEL);
        self.current = self.core.prev_live(id).unwrap_or_default();
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for Cursor<'_, T, PAGE_SIZE, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use static_assertions::{assert_impl_all, assert_not_impl_any};

    use crate::{Ephemeral, Handle, ManagedPool};

    use super::*;

    assert_impl_all!(Iter<'static, u32, 64, Ephemeral>: DoubleEndedIterator, FusedIterator);
    assert_not_impl_any!(Iter<'static, u32, 64, Ephemeral>: Send, Sync);
    assert_not_impl_any!(Cursor<'static, u32, 64, Ephemeral>: Send, Sync);

    fn values<const PAGE_SIZE: usize>(pool: &ManagedPool<u32, PAGE_SIZE>) -> Vec<u32> {
        pool.iter().map(|handle| *handle).collect()
    }

    #[test]
    fn empty_pool_yields_nothing() {
        let pool = ManagedPool::<u32>::new();

        assert_eq!(pool.iter().next(), None);
        assert_eq!(pool.iter().next_back(), None);
        assert!(pool.cursor_front().is_end());
        assert!(pool.cursor_back().is_end());
    }

    #[test]
    fn iterates_across_pages_in_allocation_order() {
        let mut pool = ManagedPool::<u32, 2>::new();
        let _handles: Vec<_> = (0..5).map(|value| pool.insert(value).unwrap()).collect();

        assert_eq!(values(&pool), [0, 1, 2, 3, 4]);

        let backward: Vec<u32> = pool.iter().rev().map(|handle| *handle).collect();
        assert_eq!(backward, [4, 3, 2, 1, 0]);
    }

    #[test]
    fn both_ends_meet_in_the_middle() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let _handles: Vec<_> = (0..3).map(|value| pool.insert(value).unwrap()).collect();

        let mut iter = pool.iter();

        assert_eq!(iter.next().as_deref(), Some(&0));
        assert_eq!(iter.next_back().as_deref(), Some(&2));
        assert_eq!(iter.next().as_deref(), Some(&1));
        assert_eq!(iter.next_back(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn single_item_is_yielded_once() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let _handle = pool.insert(7).unwrap();

        let mut iter = pool.iter();

        assert_eq!(iter.next().as_deref(), Some(&7));
        assert_eq!(iter.next_back(), None);
    }

    #[test]
    fn dropping_handles_mid_iteration_skips_released_items() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let mut handles: Vec<_> = (0..4).map(|value| pool.insert(value).unwrap()).collect();

        let mut iter = pool.iter();
        assert_eq!(iter.next().as_deref(), Some(&0));

        // Item 1 is held by the iterator, item 2 is not.
        handles.truncate(1);

        let rest: Vec<u32> = iter.map(|handle| *handle).collect();
        assert_eq!(rest, [1, 3]);
    }

    #[test]
    fn iterator_keeps_front_item_alive() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let first = pool.insert(1).unwrap();
        let _second = pool.insert(2).unwrap();

        let mut iter = pool.iter();
        drop(first);

        // Still alive because the iterator holds it.
        assert_eq!(pool.len(), 2);
        assert_eq!(iter.next().as_deref(), Some(&1));
        assert_eq!(iter.next().as_deref(), Some(&2));
        assert_eq!(iter.next(), None);
        drop(iter);

        assert_eq!(values(&pool), [2]);
    }

    #[test]
    fn into_iterator_for_reference() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let _a = pool.insert(1).unwrap();
        let _b = pool.insert(2).unwrap();

        let mut sum = 0;
        for handle in &pool {
            sum += *handle;
        }

        assert_eq!(sum, 3);
    }

    #[test]
    fn cursor_wraps_through_end() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let _handles: Vec<_> = (1..=3).map(|value| pool.insert(value).unwrap()).collect();

        let mut cursor = pool.cursor_end();
        assert!(cursor.is_end());
        assert_eq!(cursor.current(), None);
        assert_eq!(cursor.id(), None);

        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&3));

        cursor.move_prev();
        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&1));
        assert_eq!(cursor.id(), Some(0));

        cursor.move_prev();
        assert!(cursor.is_end());

        cursor.move_next();
        assert_eq!(cursor.current(), Some(&1));
    }

    #[test]
    fn cursor_handle_adds_reference() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let item = pool.insert(1).unwrap();

        let cursor = pool.cursor_front();
        let handle = cursor.handle().unwrap();

        assert!(Handle::ptr_eq(&handle, &item));
        // Ours, the cursor's and the new one.
        assert_eq!(Handle::reference_count(&item), 3);
    }

    #[test]
    fn cursor_at_handle_starts_mid_sequence() {
        let mut pool = ManagedPool::<u32, 2>::new();
        let handles: Vec<_> = (1..=4).map(|value| pool.insert(value).unwrap()).collect();

        let mut cursor = pool.cursor_at(&handles[2]).unwrap();
        assert_eq!(cursor.current(), Some(&3));
        assert_eq!(cursor.id(), Some(2));

        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&2));

        cursor.move_next();
        cursor.move_next();
        assert_eq!(cursor.current(), Some(&4));

        cursor.move_next();
        assert!(cursor.is_end());
    }

    #[test]
    fn cursor_at_item_reference() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let _a = pool.insert(1).unwrap();
        let b = pool.insert(2).unwrap();

        let mut cursor = pool.cursor_at_item(&b).unwrap();
        assert!(Handle::ptr_eq(&cursor.handle().unwrap(), &b));

        cursor.move_prev();
        assert_eq!(cursor.current(), Some(&1));

        let unrelated = 2_u32;
        assert!(pool.cursor_at_item(&unrelated).is_none());
    }

    #[test]
    fn cursor_at_rejects_null_foreign_and_detached_handles() {
        let mut pool = ManagedPool::<u32, 4>::new();
        let mut other = ManagedPool::<u32, 4>::new();

        let detached = pool.insert(1).unwrap();
        pool.clear();
        let _ours = pool.insert(2).unwrap();
        let theirs = other.insert(3).unwrap();

        assert!(pool.cursor_at(&Handle::null()).is_none());
        assert!(pool.cursor_at(&theirs).is_none());
        assert!(pool.cursor_at(&detached).is_none());
        assert!(pool.cursor_at_item(&detached).is_none());
    }
}
