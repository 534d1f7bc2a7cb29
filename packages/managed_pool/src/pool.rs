use std::any::type_name;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::mem;
use std::rc::{Rc, Weak};
use std::thread;

use num_integer::Integer;
use tracing::{debug, trace};

use crate::{
    Cursor, DropPolicy, Ephemeral, Error, Handle, ItemCoordinates, Iter, Link, ManagedPoolBuilder,
    OwnershipPolicy, Page, SENTINEL, SlotOwner,
};

/// A paged object pool whose items are shared through reference-counting [`Handle`]s.
///
/// The pool stores items in fixed-size pages of `PAGE_SIZE` items each. Items never move once
/// placed, so handles stay valid while the pool grows. Slots of destroyed items go onto a free
/// list and are reused last-in-first-out by later allocations.
///
/// Every item has a dense `u32` ID derived from its page and slot, which can be used to look
/// the item up again via [`get()`][Self::get]. An ID is stable for the lifetime of its item
/// and may be reused by a later item once the slot is freed.
///
/// The pool remembers the order in which items were allocated. Iteration visits the live
/// items in that order, skipping destroyed ones.
///
/// # Ownership
///
/// The ownership policy `P` decides when items are destroyed:
///
/// * With [`Ephemeral`] (the default) an item is destroyed as soon as its last handle is dropped.
/// * With [`PoolOwned`][crate::PoolOwned] the pool keeps every item alive until it is cleared
///   or dropped.
///
/// # Example
///
/// ```rust
/// use managed_pool::ManagedPool;
///
/// let mut pool = ManagedPool::<String>::new();
///
/// let hello = pool.insert("Hello".to_string()).unwrap();
/// let world = pool.insert("world".to_string()).unwrap();
///
/// let words: Vec<String> = pool.iter().map(|word| word.to_string()).collect();
/// assert_eq!(words, ["Hello", "world"]);
///
/// let id = pool.id_of(&world).unwrap();
/// assert_eq!(&*pool.get(id).unwrap(), "world");
///
/// drop(hello);
/// assert_eq!(pool.len(), 1);
/// ```
///
/// # Thread safety
///
/// The pool and its handles are single-threaded.
pub struct ManagedPool<T, const PAGE_SIZE: usize = 64, P: OwnershipPolicy = Ephemeral>
where
    T: 'static,
{
    core: Rc<PoolCore<T, PAGE_SIZE, P>>,
}

impl<T, const PAGE_SIZE: usize, P> ManagedPool<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    /// Creates an empty pool with the default configuration.
    ///
    /// No memory is allocated until the first item is added.
    ///
    /// # Panics
    ///
    /// Panics if `PAGE_SIZE` is zero or does not fit in `u32`.
    #[must_use]
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Starts building a pool with a non-default configuration.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::{DropPolicy, ManagedPool, PoolOwned};
    ///
    /// let pool = ManagedPool::<u64, 32, PoolOwned>::builder()
    ///     .name("render_states")
    ///     .drop_policy(DropPolicy::MayDropItems)
    ///     .build();
    ///
    /// assert!(pool.is_empty());
    /// ```
    #[must_use]
    pub fn builder() -> ManagedPoolBuilder<T, PAGE_SIZE, P> {
        ManagedPoolBuilder::new()
    }

    #[must_use]
    pub(crate) fn new_inner(
        name: &'static str,
        drop_policy: DropPolicy,
        max_items: usize,
    ) -> Self {
        assert!(PAGE_SIZE > 0, "ManagedPool must have non-zero PAGE_SIZE");
        assert!(
            u32::try_from(PAGE_SIZE).is_ok_and(|size| size < SENTINEL),
            "ManagedPool PAGE_SIZE must fit in u32"
        );

        Self {
            core: PoolCore::new(name, drop_policy, max_items),
        }
    }

    /// Adds a default-constructed item to the pool and returns a handle to it.
    ///
    /// A free slot is reused if one exists, otherwise the pool grows by one page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the pool needed to grow but memory could not be
    /// reserved, and [`Error::CapacityExhausted`] if the pool cannot grow further without
    /// exceeding its item limit. The pool is unchanged in both cases.
    pub fn allocate(&mut self) -> crate::Result<Handle<T>>
    where
        T: Default,
    {
        self.core.insert(T::default())
    }

    /// Adds an item to the pool and returns a handle to it.
    ///
    /// A free slot is reused if one exists, otherwise the pool grows by one page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AllocationFailed`] if the pool needed to grow but memory could not be
    /// reserved, and [`Error::CapacityExhausted`] if the pool cannot grow further without
    /// exceeding its item limit. The pool is unchanged in both cases and `value` is dropped.
    pub fn insert(&mut self, value: T) -> crate::Result<Handle<T>> {
        self.core.insert(value)
    }

    /// Ensures the pool can hold at least `additional` more items without growing.
    ///
    /// # Errors
    ///
    /// Returns the same errors as [`insert()`][Self::insert]. Pages added before the failure
    /// remain in the pool.
    pub fn reserve(&mut self, additional: usize) -> crate::Result<()> {
        self.core.reserve(additional)
    }

    /// Tears down the pool, leaving it empty but usable.
    ///
    /// Items owned by the pool are destroyed. Items that are still referenced by handles are
    /// detached: they are no longer counted, found or iterated by the pool and are destroyed
    /// when their last handle is dropped.
    ///
    /// Clearing an empty pool does nothing.
    ///
    /// # Panics
    ///
    /// Panics if the pool is [`PoolOwned`][crate::PoolOwned] and any item is still referenced
    /// by a handle, or if the pool uses [`DropPolicy::MustNotDropItems`] and is not empty.
    pub fn clear(&mut self) {
        self.core.clear();
    }

    /// The number of live items in the pool.
    #[must_use]
    pub fn len(&self) -> usize {
        self.core.len()
    }

    /// Whether the pool has no live items.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The number of items the pool can hold without growing.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    /// The largest number of items the pool will ever hold.
    ///
    /// This is the limit set with [`ManagedPoolBuilder::max_items()`], rounded down to whole
    /// pages and capped by the `u32` ID space.
    #[must_use]
    pub fn max_items(&self) -> usize {
        self.core.max_items()
    }

    /// The number of pages allocated by the pool.
    #[must_use]
    pub fn page_count(&self) -> usize {
        self.core.page_count()
    }

    /// The number of pages the page directory can list before it has to grow.
    #[must_use]
    pub fn directory_capacity(&self) -> usize {
        self.core.directory_capacity()
    }

    /// Returns a new handle to the live item with the given ID.
    ///
    /// Returns `None` if no live item has this ID.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<Handle<T>> {
        self.core.handle_at(id)
    }

    /// The ID of the item a handle points to.
    ///
    /// Returns `None` for null handles and for handles to items of other pools, including
    /// items detached from this pool by [`clear()`][Self::clear].
    #[must_use]
    pub fn id_of(&self, handle: &Handle<T>) -> Option<u32> {
        self.core.id_of(handle)
    }

    /// The ID of a live item of this pool, given a reference to the item.
    ///
    /// Returns `None` if the reference does not point to a live item of this pool.
    ///
    /// This searches the page directory, so it takes time proportional to the number of
    /// pages. Prefer [`id_of()`][Self::id_of] when a handle is at hand, which takes constant
    /// time.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::ManagedPool;
    ///
    /// let mut pool = ManagedPool::<u32, 4>::new();
    /// let first = pool.insert(10).unwrap();
    /// let second = pool.insert(20).unwrap();
    ///
    /// assert_eq!(pool.id_of_item(&first), Some(0));
    /// assert_eq!(pool.id_of_item(&second), Some(1));
    /// assert_eq!(pool.id_of_item(&20), None);
    /// ```
    #[must_use]
    pub fn id_of_item(&self, item: &T) -> Option<u32> {
        self.core.id_of_item(item)
    }

    /// Creates a new handle from a reference to a live item of this pool.
    ///
    /// Returns `None` if the reference does not point to a live item of this pool.
    ///
    /// Like [`id_of_item()`][Self::id_of_item], this takes time proportional to the number of
    /// pages. Cloning an existing handle takes constant time.
    #[must_use]
    pub fn handle_of(&self, item: &T) -> Option<Handle<T>> {
        self.core.handle_of(item)
    }

    /// Iterates over handles to the live items, in allocation order.
    ///
    /// The iterator keeps the items it has yet to visit at each end alive, so dropping handles
    /// during iteration is fine.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, T, PAGE_SIZE, P> {
        Iter::new(&self.core)
    }

    /// A handle to the oldest live item, if any.
    #[must_use]
    pub fn first(&self) -> Option<Handle<T>> {
        self.core.next_live(SENTINEL)
    }

    /// A handle to the most recently allocated live item, if any.
    #[must_use]
    pub fn last(&self) -> Option<Handle<T>> {
        self.core.prev_live(SENTINEL)
    }

    /// A cursor positioned at the oldest live item, or at the end if the pool is empty.
    #[must_use]
    pub fn cursor_front(&self) -> Cursor<'_, T, PAGE_SIZE, P> {
        Cursor::new(&self.core, self.first())
    }

    /// A cursor positioned at the most recently allocated live item, or at the end if the pool
    /// is empty.
    #[must_use]
    pub fn cursor_back(&self) -> Cursor<'_, T, PAGE_SIZE, P> {
        Cursor::new(&self.core, self.last())
    }

    /// A cursor positioned at the end, one past the last item and one before the first.
    #[must_use]
    pub fn cursor_end(&self) -> Cursor<'_, T, PAGE_SIZE, P> {
        Cursor::new(&self.core, None)
    }

    /// A cursor positioned at the item a handle points to.
    ///
    /// Returns `None` for null handles and for handles to items of other pools, including
    /// items detached from this pool by [`clear()`][Self::clear].
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::ManagedPool;
    ///
    /// let mut pool = ManagedPool::<u32, 4>::new();
    /// let _a = pool.insert(1).unwrap();
    /// let b = pool.insert(2).unwrap();
    /// let _c = pool.insert(3).unwrap();
    ///
    /// let mut cursor = pool.cursor_at(&b).unwrap();
    /// cursor.move_next();
    /// assert_eq!(cursor.current(), Some(&3));
    /// ```
    #[must_use]
    pub fn cursor_at(&self, handle: &Handle<T>) -> Option<Cursor<'_, T, PAGE_SIZE, P>> {
        self.core.id_of(handle)?;

        Some(Cursor::new(&self.core, Some(handle.clone())))
    }

    /// A cursor positioned at a live item of this pool, given a reference to the item.
    ///
    /// Returns `None` if the reference does not point to a live item of this pool. Takes time
    /// proportional to the number of pages, like [`handle_of()`][Self::handle_of].
    #[must_use]
    pub fn cursor_at_item(&self, item: &T) -> Option<Cursor<'_, T, PAGE_SIZE, P>> {
        let handle = self.core.handle_of(item)?;

        Some(Cursor::new(&self.core, Some(handle)))
    }
}

impl<T, const PAGE_SIZE: usize, P> Default for ManagedPool<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const PAGE_SIZE: usize, P> Drop for ManagedPool<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    fn drop(&mut self) {
        self.core.clear();
    }
}

impl<'a, T, const PAGE_SIZE: usize, P> IntoIterator for &'a ManagedPool<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    type Item = Handle<T>;
    type IntoIter = Iter<'a, T, PAGE_SIZE, P>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for ManagedPool<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("core", &self.core)
            .finish()
    }
}

/// State shared between the pool and its pages.
///
/// Pages reach the core through a weak reference to recycle slots of released items. All
/// state uses interior mutability because releases happen through handles, at any time.
pub(crate) struct PoolCore<T, const PAGE_SIZE: usize, P> {
    weak_self: Weak<Self>,

    name: &'static str,
    drop_policy: DropPolicy,

    pages: RefCell<Vec<Rc<Page<T, PAGE_SIZE, P>>>>,

    /// Sentinel of the circular live set. `next` is the oldest item, `prev` the newest.
    live: Link,

    /// Head of the free list, `SENTINEL` if empty.
    first_free: Cell<u32>,

    live_count: Cell<usize>,

    /// Whole pages' worth of items the pool may grow to.
    max_items: usize,
}

impl<T, const PAGE_SIZE: usize, P> PoolCore<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    #[must_use]
    fn new(name: &'static str, drop_policy: DropPolicy, max_items: usize) -> Rc<Self> {
        let limit = max_items.min(Self::id_space_items());
        let max_items = Integer::div_floor(&limit, &PAGE_SIZE).saturating_mul(PAGE_SIZE);

        Rc::new_cyclic(|weak_self| Self {
            weak_self: Weak::clone(weak_self),
            name,
            drop_policy,
            pages: RefCell::new(Vec::new()),
            live: Link::new(),
            first_free: Cell::new(SENTINEL),
            live_count: Cell::new(0),
            max_items,
        })
    }

    /// The first ID of the page at `page_index`, if every ID of that page stays below
    /// `SENTINEL`.
    #[must_use]
    fn base_id_for(page_index: usize) -> Option<u32> {
        let last_in_page = PAGE_SIZE.checked_sub(1)?;
        let last_id = ItemCoordinates::from_parts(page_index, last_in_page).to_id::<PAGE_SIZE>()?;

        if last_id == SENTINEL {
            return None;
        }

        ItemCoordinates::from_parts(page_index, 0).to_id::<PAGE_SIZE>()
    }

    /// The number of items in all the pages whose IDs fit below `SENTINEL`.
    #[must_use]
    fn id_space_items() -> usize {
        let ids = usize::try_from(SENTINEL).expect("u32 always fits in usize on supported targets");

        Integer::div_floor(&ids, &PAGE_SIZE).saturating_mul(PAGE_SIZE)
    }

    #[must_use]
    fn page(&self, page_index: usize) -> Option<Rc<Page<T, PAGE_SIZE, P>>> {
        self.pages.borrow().get(page_index).map(Rc::clone)
    }

    /// Runs `f` on the link of the node with the given ID, or on the live set sentinel.
    ///
    /// # Panics
    ///
    /// Panics if the ID does not belong to any page.
    fn with_link<R>(&self, id: u32, f: impl FnOnce(&Link) -> R) -> R {
        if id == SENTINEL {
            return f(&self.live);
        }

        let coordinates = ItemCoordinates::from_id::<PAGE_SIZE>(id);
        let pages = self.pages.borrow();

        let page = pages.get(coordinates.page_index()).unwrap_or_else(|| {
            panic!(
                "item {id} is outside the pages of pool {} of {}",
                self.name,
                type_name::<T>()
            )
        });

        f(page.node(coordinates.index_in_page()).link())
    }

    /// Appends a node to the tail of the live set.
    fn push_live(&self, id: u32) {
        let newest = self.live.prev();

        self.with_link(id, |link| {
            link.set_prev(newest);
            link.set_next(SENTINEL);
        });
        self.with_link(newest, |link| link.set_next(id));
        self.live.set_prev(id);
    }

    fn unlink_live(&self, id: u32) {
        let (prev, next) = self.with_link(id, |link| (link.prev(), link.next()));

        self.with_link(prev, |link| link.set_next(next));
        self.with_link(next, |link| link.set_prev(prev));
        self.with_link(id, Link::reset);
    }

    fn push_free(&self, id: u32) {
        let head = self.first_free.get();

        self.with_link(id, |link| {
            link.reset();
            link.set_next(head);
        });
        self.first_free.set(id);
    }

    #[must_use]
    fn pop_free(&self) -> Option<u32> {
        let head = self.first_free.get();

        if head == SENTINEL {
            return None;
        }

        let next = self.with_link(head, |link| {
            let next = link.next();
            link.reset();
            next
        });
        self.first_free.set(next);

        Some(head)
    }

    /// Adds a page, pushing all its nodes except the first onto the free list.
    ///
    /// Returns the ID of the first node, which the caller is expected to use. Leaves the pool
    /// unchanged on failure.
    fn add_page(&self) -> crate::Result<u32> {
        let page_index = self.pages.borrow().len();

        let exhausted = Error::CapacityExhausted {
            type_name: type_name::<T>(),
            max_items: self.max_items,
        };

        let capacity_after = page_index
            .checked_add(1)
            .and_then(|pages| pages.checked_mul(PAGE_SIZE));

        if capacity_after.is_none_or(|capacity| capacity > self.max_items) {
            return Err(exhausted);
        }

        let base_id = Self::base_id_for(page_index).ok_or(exhausted)?;

        let page = Page::try_new(Weak::clone(&self.weak_self), base_id).map_err(|source| {
            Error::AllocationFailed {
                type_name: type_name::<T>(),
                source,
            }
        })?;
        let page = Rc::new(page);

        {
            let mut pages = self.pages.borrow_mut();

            if pages.len() == pages.capacity() {
                let old_capacity = pages.capacity();
                let new_capacity = if old_capacity == 0 {
                    8
                } else {
                    old_capacity.saturating_add(Integer::div_floor(&old_capacity, &2))
                };

                // The directory is full, so its length equals `old_capacity`.
                pages
                    .try_reserve_exact(new_capacity.saturating_sub(old_capacity))
                    .map_err(|source| Error::AllocationFailed {
                        type_name: type_name::<T>(),
                        source,
                    })?;

                debug!(
                    pool = self.name,
                    old_capacity,
                    new_capacity = pages.capacity(),
                    "page directory grown"
                );
            }

            pages.push(Rc::clone(&page));
        }

        debug!(pool = self.name, page_index, base_id, "page added");

        // Descending, so that the lowest free index ends up on top.
        for index_in_page in (1..PAGE_SIZE).rev() {
            self.push_free(page.id_of(index_in_page));
        }

        Ok(base_id)
    }

    pub(crate) fn insert(&self, value: T) -> crate::Result<Handle<T>> {
        let id = match self.pop_free() {
            Some(id) => id,
            None => self.add_page()?,
        };

        let coordinates = ItemCoordinates::from_id::<PAGE_SIZE>(id);
        let page = self
            .page(coordinates.page_index())
            .expect("free list only contains IDs of existing pages");

        let node = page.node(coordinates.index_in_page());
        node.occupy(value);
        node.header().seed(P::RETAINED_REFERENCES);

        self.push_live(id);
        self.live_count.set(
            self.live_count
                .get()
                .checked_add(1)
                .expect("live items are bounded by the u32 ID space"),
        );

        trace!(pool = self.name, id, "allocated");

        Ok(page.handle(coordinates.index_in_page()))
    }

    pub(crate) fn reserve(&self, additional: usize) -> crate::Result<()> {
        let required = self.len().saturating_add(additional);

        while self.capacity() < required {
            let base_id = self.add_page()?;

            // The whole page is spare, so the first node goes on top of the others.
            self.push_free(base_id);
        }

        Ok(())
    }

    /// Returns the slot of a destroyed item to the free list.
    pub(crate) fn recycle(&self, id: u32) {
        self.unlink_live(id);
        self.push_free(id);

        self.live_count.set(
            self.live_count
                .get()
                .checked_sub(1)
                .expect("recycled an item that was not counted as live"),
        );

        trace!(pool = self.name, id, "recycled");
    }

    #[must_use]
    pub(crate) fn handle_at(&self, id: u32) -> Option<Handle<T>> {
        if id == SENTINEL {
            return None;
        }

        let coordinates = ItemCoordinates::from_id::<PAGE_SIZE>(id);
        let page = self.page(coordinates.page_index())?;

        page.node(coordinates.index_in_page())
            .is_live()
            .then(|| page.handle(coordinates.index_in_page()))
    }

    /// A handle to the live item after `id` in allocation order. `SENTINEL` starts at the
    /// oldest item.
    #[must_use]
    pub(crate) fn next_live(&self, id: u32) -> Option<Handle<T>> {
        let next = self.with_link(id, Link::next);
        self.handle_at(next)
    }

    /// A handle to the live item before `id` in allocation order. `SENTINEL` starts at the
    /// newest item.
    #[must_use]
    pub(crate) fn prev_live(&self, id: u32) -> Option<Handle<T>> {
        let prev = self.with_link(id, Link::prev);
        self.handle_at(prev)
    }

    #[must_use]
    pub(crate) fn id_of(&self, handle: &Handle<T>) -> Option<u32> {
        let id = Handle::slot_id(handle)?;
        let page_ptr = Handle::page_ptr(handle)?;

        let page = self.page(ItemCoordinates::from_id::<PAGE_SIZE>(id).page_index())?;

        (Rc::as_ptr(&page).cast::<()>() == page_ptr).then_some(id)
    }

    #[must_use]
    pub(crate) fn id_of_item(&self, item: &T) -> Option<u32> {
        let item: *const T = item;

        self.pages.borrow().iter().find_map(|page| {
            page.index_of_item(item)
                .map(|index_in_page| page.id_of(index_in_page))
        })
    }

    #[must_use]
    pub(crate) fn handle_of(&self, item: &T) -> Option<Handle<T>> {
        let id = self.id_of_item(item)?;
        self.handle_at(id)
    }

    pub(crate) fn clear(&self) {
        let live_items = self.len();
        let panicking = thread::panicking();

        if live_items > 0 && self.drop_policy == DropPolicy::MustNotDropItems && !panicking {
            panic!(
                "pool {} of {} was cleared with {live_items} items still in it, which its drop policy forbids",
                self.name,
                type_name::<T>()
            );
        }

        if P::retains_items() && !panicking {
            self.assert_no_outstanding_handles();
        }

        // Everything below runs with the pool already reset, so destructors of items that
        // release other items of this pool find it in a consistent state.
        let pages = mem::take(&mut *self.pages.borrow_mut());
        self.live.reset();
        self.first_free.set(SENTINEL);
        self.live_count.set(0);

        for page in &pages {
            page.detach();
        }

        let mut destroyed_items: usize = 0;

        if P::retains_items() {
            for page in &pages {
                // Handles that survive this (only possible while panicking) are from here on
                // the sole owners of their items.
                page.forget_pool_references();

                for index_in_page in 0..PAGE_SIZE {
                    let node = page.node(index_in_page);

                    if !node.is_live() {
                        continue;
                    }

                    let remaining = node
                        .header()
                        .release()
                        .expect("items of a retaining pool are always referenced by the pool");

                    if remaining == 0 {
                        page.release_slot(index_in_page);
                        destroyed_items = destroyed_items.saturating_add(1);
                    }
                }
            }
        }

        let page_count = pages.len();
        drop(pages);

        debug!(
            pool = self.name,
            live_items,
            pages = page_count,
            detached_items = live_items.saturating_sub(destroyed_items),
            "cleared"
        );
    }

    fn assert_no_outstanding_handles(&self) {
        for page in self.pages.borrow().iter() {
            for index_in_page in 0..PAGE_SIZE {
                let node = page.node(index_in_page);

                if !node.is_live() {
                    continue;
                }

                let count = node.header().reference_count();

                assert!(
                    count == P::RETAINED_REFERENCES,
                    "pool {} of {} was cleared while item {} still has {} outstanding handles",
                    self.name,
                    type_name::<T>(),
                    page.id_of(index_in_page),
                    count.saturating_sub(P::RETAINED_REFERENCES)
                );
            }
        }
    }

    #[must_use]
    pub(crate) fn len(&self) -> usize {
        self.live_count.get()
    }

    #[must_use]
    pub(crate) fn capacity(&self) -> usize {
        self.page_count().saturating_mul(PAGE_SIZE)
    }

    #[must_use]
    pub(crate) fn max_items(&self) -> usize {
        self.max_items
    }

    #[must_use]
    pub(crate) fn page_count(&self) -> usize {
        self.pages.borrow().len()
    }

    #[must_use]
    pub(crate) fn directory_capacity(&self) -> usize {
        self.pages.borrow().capacity()
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for PoolCore<T, PAGE_SIZE, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("name", &self.name)
            .field("drop_policy", &self.drop_policy)
            .field("pages", &self.pages.borrow().len())
            .field("live", &self.live)
            .field("first_free", &self.first_free.get())
            .field("live_count", &self.live_count.get())
            .field("max_items", &self.max_items)
            .finish_non_exhaustive()
    }
}
