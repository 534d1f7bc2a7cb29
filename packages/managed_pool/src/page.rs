use std::any::type_name;
use std::cell::{Cell, UnsafeCell};
use std::collections::TryReserveError;
use std::fmt;
use std::mem::MaybeUninit;
use std::ptr::{NonNull, addr_of_mut};
use std::rc::{Rc, Weak};

use num_integer::Integer;

use crate::{Handle, OwnershipPolicy, PoolCore, RefCountedHeader};

/// Link target meaning "the live set sentinel" for live links and "end of list" for the
/// free list. Never a valid item ID.
pub(crate) const SENTINEL: u32 = u32::MAX;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SlotState {
    Free,
    Live,
}

/// Previous/next links of a node, addressed by item ID.
///
/// While the node is live, both fields link it into the circular live set. While the node
/// is free, only `next` is meaningful and points to the next node of the free list.
#[derive(Debug)]
pub(crate) struct Link {
    prev: Cell<u32>,
    next: Cell<u32>,
}

impl Link {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            prev: Cell::new(SENTINEL),
            next: Cell::new(SENTINEL),
        }
    }

    #[must_use]
    pub(crate) fn prev(&self) -> u32 {
        self.prev.get()
    }

    #[must_use]
    pub(crate) fn next(&self) -> u32 {
        self.next.get()
    }

    pub(crate) fn set_prev(&self, id: u32) {
        self.prev.set(id);
    }

    pub(crate) fn set_next(&self, id: u32) {
        self.next.set(id);
    }

    pub(crate) fn reset(&self) {
        self.prev.set(SENTINEL);
        self.next.set(SENTINEL);
    }
}

/// One slot of a page: storage for one item plus its bookkeeping.
///
/// The pool never creates references to the item itself. All access to the item goes
/// through the pointer returned by [`item_ptr()`][Self::item_ptr], which handles turn into
/// references for as long as they keep the item alive.
pub(crate) struct Node<T> {
    item: UnsafeCell<MaybeUninit<T>>,
    header: RefCountedHeader,
    link: Link,
    state: Cell<SlotState>,
    index_in_page: u32,
}

impl<T> Node<T> {
    /// Initializes a free node directly in its final location.
    ///
    /// The item storage is left uninitialized, so no `T`-sized value ever passes through the
    /// stack.
    fn init_vacant(slot: &mut MaybeUninit<Self>, index_in_page: u32) {
        let node = slot.as_mut_ptr();

        // SAFETY: We have exclusive access to this uninitialized memory.
        let header_ptr = unsafe { addr_of_mut!((*node).header) };
        // SAFETY: We have exclusive access to this uninitialized memory.
        let link_ptr = unsafe { addr_of_mut!((*node).link) };
        // SAFETY: We have exclusive access to this uninitialized memory.
        let state_ptr = unsafe { addr_of_mut!((*node).state) };
        // SAFETY: We have exclusive access to this uninitialized memory.
        let index_ptr = unsafe { addr_of_mut!((*node).index_in_page) };

        // SAFETY: Writing to a field of our own uninitialized node.
        unsafe {
            header_ptr.write(RefCountedHeader::new());
        }
        // SAFETY: Writing to a field of our own uninitialized node.
        unsafe {
            link_ptr.write(Link::new());
        }
        // SAFETY: Writing to a field of our own uninitialized node.
        unsafe {
            state_ptr.write(Cell::new(SlotState::Free));
        }
        // SAFETY: Writing to a field of our own uninitialized node.
        unsafe {
            index_ptr.write(index_in_page);
        }

        // `item` is `UnsafeCell<MaybeUninit<T>>`, for which uninitialized memory is valid.
    }

    #[must_use]
    pub(crate) fn header(&self) -> &RefCountedHeader {
        &self.header
    }

    #[must_use]
    pub(crate) fn link(&self) -> &Link {
        &self.link
    }

    #[must_use]
    pub(crate) fn is_live(&self) -> bool {
        self.state.get() == SlotState::Live
    }

    #[must_use]
    pub(crate) fn index_in_page(&self) -> u32 {
        self.index_in_page
    }

    /// Pointer to the item storage. Only valid to dereference while the node is live.
    #[must_use]
    pub(crate) fn item_ptr(&self) -> NonNull<T> {
        // `UnsafeCell` and `MaybeUninit` are both `repr(transparent)` wrappers around `T`.
        NonNull::from(&self.item).cast::<T>()
    }

    /// Moves a value into a free node, making it live.
    ///
    /// # Panics
    ///
    /// Panics if the node is already live.
    pub(crate) fn occupy(&self, value: T) {
        assert!(
            !self.is_live(),
            "node {} was already live when an item was placed in it, in pool of {}",
            self.index_in_page,
            type_name::<T>()
        );

        let item = self.item.get();

        // SAFETY: The node is free, so nobody holds a reference to its storage and we are
        // the only ones touching it.
        unsafe {
            (*item).write(value);
        }

        self.state.set(SlotState::Live);
    }

    /// Moves the value out of a live node, making it free.
    ///
    /// # Panics
    ///
    /// Panics if the node is not live.
    #[must_use]
    pub(crate) fn vacate(&self) -> T {
        assert!(
            self.is_live(),
            "node {} was released while not live (double release?), in pool of {}",
            self.index_in_page,
            type_name::<T>()
        );

        self.state.set(SlotState::Free);

        let item = self.item.get();

        // SAFETY: The node was live, so the item is initialized. The reference count reached
        // zero (or the pool is tearing the item down with no handles left), so no references
        // to the item exist. We flipped the state first, so the value is never read twice.
        unsafe { (*item).assume_init_read() }
    }
}

impl<T> Drop for Node<T> {
    fn drop(&mut self) {
        if self.state.get() == SlotState::Live {
            self.state.set(SlotState::Free);

            // SAFETY: The node was live, so the item is initialized. We have exclusive
            // access, so there are no outstanding references to it.
            unsafe {
                self.item.get_mut().assume_init_drop();
            }
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T> fmt::Debug for Node<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("header", &self.header)
            .field("link", &self.link)
            .field("state", &self.state.get())
            .field("index_in_page", &self.index_in_page)
            .finish_non_exhaustive()
    }
}

/// Release strategy of a page, as seen by handles.
///
/// Handles only know the item type, not the page size or ownership policy of the pool the
/// item came from, so they reach the page through this trait.
pub(crate) trait SlotOwner<T> {
    /// Destroys the item whose reference count just dropped to zero and recycles its slot.
    fn release_slot(&self, index_in_page: usize);

    /// The reference count of an item referenced by exactly one handle.
    fn sole_handle_count(&self) -> u32;
}

/// A fixed-size array of nodes, the unit by which a pool grows.
///
/// Pages are never resized and never move their nodes. A page is freed when the pool no
/// longer lists it and no handle references any of its items.
pub(crate) struct Page<T, const PAGE_SIZE: usize, P> {
    /// The pool that recycles slots of this page. Released items of a detached page are
    /// destroyed without being recycled.
    owner: Weak<PoolCore<T, PAGE_SIZE, P>>,

    /// ID of the first node of the page.
    base_id: u32,

    detached: Cell<bool>,

    /// Whether the pool still holds its own reference on every live item of the page.
    holds_pool_references: Cell<bool>,

    nodes: Box<[Node<T>]>,
}

impl<T, const PAGE_SIZE: usize, P> Page<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    /// Reserves a page with all nodes free.
    ///
    /// The nodes are not linked into any list; that is the job of the pool.
    pub(crate) fn try_new(
        owner: Weak<PoolCore<T, PAGE_SIZE, P>>,
        base_id: u32,
    ) -> Result<Self, TryReserveError> {
        let mut nodes: Vec<Node<T>> = Vec::new();
        nodes.try_reserve_exact(PAGE_SIZE)?;

        for (index, slot) in nodes
            .spare_capacity_mut()
            .iter_mut()
            .take(PAGE_SIZE)
            .enumerate()
        {
            Node::init_vacant(
                slot,
                u32::try_from(index).expect("page size is verified to fit in u32 on pool creation"),
            );
        }

        // SAFETY: We reserved room for PAGE_SIZE nodes and initialized every one of them above.
        unsafe {
            nodes.set_len(PAGE_SIZE);
        }

        Ok(Self {
            owner,
            base_id,
            detached: Cell::new(false),
            holds_pool_references: Cell::new(P::retains_items()),
            nodes: nodes.into_boxed_slice(),
        })
    }

    /// # Panics
    ///
    /// Panics if the index is out of bounds.
    #[must_use]
    pub(crate) fn node(&self, index_in_page: usize) -> &Node<T> {
        self.nodes.get(index_in_page).unwrap_or_else(|| {
            panic!(
                "node {index_in_page} index out of bounds in page of {}",
                type_name::<T>()
            )
        })
    }

    #[must_use]
    pub(crate) fn id_of(&self, index_in_page: usize) -> u32 {
        u32::try_from(index_in_page)
            .ok()
            .and_then(|index| self.base_id.checked_add(index))
            .expect("pages are only created if all of their IDs fit in u32")
    }

    /// Marks the page as no longer belonging to its pool.
    pub(crate) fn detach(&self) {
        self.detached.set(true);
    }

    /// Records that the pool is about to give up its own reference on the items of this page.
    ///
    /// From here on, a single handle is the sole owner of its item.
    pub(crate) fn forget_pool_references(&self) {
        self.holds_pool_references.set(false);
    }

    /// Finds the index of the live node whose item lives at `item`, if any.
    #[must_use]
    pub(crate) fn index_of_item(&self, item: *const T) -> Option<usize> {
        let first_node = self.nodes.as_ptr();
        let offset = item.addr().checked_sub(first_node.addr())?;
        let (index_in_page, _) = offset.div_rem(&size_of::<Node<T>>());

        let node = self.nodes.get(index_in_page)?;

        (node.is_live() && node.item_ptr().as_ptr().cast_const() == item).then_some(index_in_page)
    }

    /// Creates a new handle to the live item in the given slot.
    ///
    /// # Panics
    ///
    /// Panics if the node is not live.
    #[must_use]
    pub(crate) fn handle(self: &Rc<Self>, index_in_page: usize) -> Handle<T> {
        let node = self.node(index_in_page);

        assert!(
            node.is_live(),
            "requested a handle to free node {index_in_page} in page of {}",
            type_name::<T>()
        );

        let owner: Rc<dyn SlotOwner<T>> = Rc::<Self>::clone(self);

        Handle::new(owner, node, self.id_of(index_in_page))
    }
}

impl<T, const PAGE_SIZE: usize, P> SlotOwner<T> for Page<T, PAGE_SIZE, P>
where
    T: 'static,
    P: OwnershipPolicy,
{
    fn release_slot(&self, index_in_page: usize) {
        let node = self.node(index_in_page);

        assert_eq!(
            node.header().reference_count(),
            0,
            "released node {index_in_page} that is still referenced, in pool of {}",
            type_name::<T>()
        );

        // The value is moved out and the slot recycled before the value is dropped, so the
        // pool is consistent again by the time user code in the destructor runs.
        let value = node.vacate();

        if !self.detached.get() {
            if let Some(core) = self.owner.upgrade() {
                core.recycle(self.id_of(index_in_page));
            }
        }

        drop(value);
    }

    fn sole_handle_count(&self) -> u32 {
        if self.holds_pool_references.get() {
            P::RETAINED_REFERENCES
                .checked_add(1)
                .expect("policies retain at most one reference")
        } else {
            1
        }
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T, const PAGE_SIZE: usize, P> fmt::Debug for Page<T, PAGE_SIZE, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(type_name::<Self>())
            .field("base_id", &self.base_id)
            .field("detached", &self.detached.get())
            .field("holds_pool_references", &self.holds_pool_references.get())
            .field("nodes", &self.nodes.len())
            .finish_non_exhaustive()
    }
}
