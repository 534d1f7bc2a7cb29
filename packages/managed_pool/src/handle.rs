use std::any::type_name;
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::ptr::NonNull;
use std::rc::Rc;

use crate::{Error, Node, RefCountedHeader, SlotOwner};

/// A shared single-threaded reference-counting handle to an item in a
/// [`ManagedPool`][crate::ManagedPool].
///
/// Every non-null handle contributes exactly one unit to the reference count of its item.
/// Cloning a handle adds a unit, dropping it removes one. When the count of an item drops to
/// zero the item is destroyed and its slot returns to the pool that created it, to be reused
/// by the next allocation. Items of a [`PoolOwned`][crate::PoolOwned] pool never reach zero
/// this way because the pool keeps a reference of its own.
///
/// A handle may also be null, pointing at nothing. [`Handle::default()`] and
/// [`Handle::null()`] create null handles. Dereferencing a null handle panics;
/// use [`Handle::try_get()`] for a fallible alternative.
///
/// Handles compare, order and hash by the address of the item they point to, never by the
/// item's value.
///
/// Like [`Rc`], the handle offers its own functionality as associated functions
/// (`Handle::is_valid(&handle)`) so they never shadow methods of the item type.
///
/// # Example
///
/// ```rust
/// use managed_pool::{Handle, ManagedPool};
///
/// let mut pool = ManagedPool::<String>::new();
///
/// let greeting = pool.insert("Hello".to_string()).unwrap();
/// let copy = greeting.clone();
///
/// assert_eq!(Handle::reference_count(&greeting), 2);
/// assert!(Handle::ptr_eq(&greeting, &copy));
/// assert_eq!(&*copy, "Hello");
///
/// drop(greeting);
/// drop(copy);
///
/// // The last handle is gone, so the item was destroyed.
/// assert!(pool.is_empty());
/// ```
///
/// # Thread safety
///
/// This type is single-threaded.
pub struct Handle<T> {
    target: Option<Target<T>>,
}

struct Target<T> {
    item: NonNull<T>,

    // Points into the node owned by `page`, which this target keeps alive.
    header: NonNull<RefCountedHeader>,

    id: u32,
    index_in_page: usize,

    page: Rc<dyn SlotOwner<T>>,
}

impl<T> Target<T> {
    fn header(&self) -> &RefCountedHeader {
        // SAFETY: The header lives inside a node of `page`, which we keep alive via `Rc`.
        // Pages never move or free their nodes while they are alive.
        unsafe { self.header.as_ref() }
    }
}

impl<T> Handle<T> {
    /// Creates a handle that points at nothing.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::Handle;
    ///
    /// let handle = Handle::<u32>::null();
    ///
    /// assert!(!Handle::is_valid(&handle));
    /// assert!(Handle::try_get(&handle).is_err());
    /// ```
    #[must_use]
    pub const fn null() -> Self {
        Self { target: None }
    }

    /// Registers a new reference to the live item in `node`.
    #[must_use]
    pub(crate) fn new(page: Rc<dyn SlotOwner<T>>, node: &Node<T>, id: u32) -> Self {
        node.header().add_ref();

        Self {
            target: Some(Target {
                item: node.item_ptr(),
                header: NonNull::from(node.header()),
                id,
                index_in_page: usize::try_from(node.index_in_page())
                    .expect("u32 always fits in usize on supported targets"),
                page,
            }),
        }
    }

    /// Whether the handle points to an item.
    #[must_use]
    #[inline]
    pub fn is_valid(this: &Self) -> bool {
        this.target.is_some()
    }

    /// Returns a reference to the item, or [`Error::NullDereference`] if the handle is null.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::{Handle, ManagedPool};
    ///
    /// let mut pool = ManagedPool::<u32>::new();
    /// let handle = pool.insert(7).unwrap();
    ///
    /// assert_eq!(*Handle::try_get(&handle).unwrap(), 7);
    /// assert!(Handle::try_get(&Handle::<u32>::null()).is_err());
    /// ```
    pub fn try_get(this: &Self) -> crate::Result<&T> {
        match &this.target {
            // SAFETY: We hold one unit of the reference count, so the item is alive and stays
            // alive for as long as the returned reference borrows this handle. Handles only
            // ever hand out shared references, except `get_mut()` which requires uniqueness.
            Some(target) => Ok(unsafe { target.item.as_ref() }),
            None => Err(Error::NullDereference {
                type_name: type_name::<T>(),
            }),
        }
    }

    /// Returns an exclusive reference to the item if this is the only handle to it.
    ///
    /// Returns `None` if the handle is null or if other handles to the same item exist.
    ///
    /// # Example
    ///
    /// ```rust
    /// use managed_pool::{Handle, ManagedPool};
    ///
    /// let mut pool = ManagedPool::<String>::new();
    /// let mut handle = pool.insert("abc".to_string()).unwrap();
    ///
    /// Handle::get_mut(&mut handle).unwrap().push_str("def");
    /// assert_eq!(&*handle, "abcdef");
    ///
    /// let copy = handle.clone();
    /// assert!(Handle::get_mut(&mut handle).is_none());
    /// # drop(copy);
    /// ```
    #[must_use]
    pub fn get_mut(this: &mut Self) -> Option<&mut T> {
        let target = this.target.as_mut()?;

        if target.header().reference_count() != target.page.sole_handle_count() {
            return None;
        }

        // SAFETY: The item is alive because we hold a reference. No other handle exists and the
        // pool never creates references to items, so no other reference to the item exists.
        // The exclusive borrow of this handle prevents new handles from being cloned from it.
        Some(unsafe { target.item.as_mut() })
    }

    /// A pointer to the item, or `None` if the handle is null.
    ///
    /// The pointer is not owning: it is only valid for as long as some handle keeps the item
    /// alive and must not be stored beyond the lifetime of this handle.
    #[must_use]
    #[inline]
    pub fn as_ptr(this: &Self) -> Option<NonNull<T>> {
        this.target.as_ref().map(|target| target.item)
    }

    /// Whether two handles point to the same item. Two null handles are equal.
    #[must_use]
    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        Self::as_ptr(this) == Self::as_ptr(other)
    }

    /// The current reference count of the item, or zero for a null handle.
    ///
    /// For items of a [`PoolOwned`][crate::PoolOwned] pool, the count includes the
    /// reference held by the pool itself.
    #[must_use]
    pub fn reference_count(this: &Self) -> u32 {
        this.target
            .as_ref()
            .map_or(0, |target| target.header().reference_count())
    }

    /// The ID of the slot the item lives in, as assigned by the pool that created it.
    #[must_use]
    pub(crate) fn slot_id(this: &Self) -> Option<u32> {
        this.target.as_ref().map(|target| target.id)
    }

    /// Address of the page that holds the item, for identifying the owning pool.
    #[must_use]
    pub(crate) fn page_ptr(this: &Self) -> Option<*const ()> {
        this.target
            .as_ref()
            .map(|target| Rc::as_ptr(&target.page).cast::<()>())
    }
}

impl<T> Default for Handle<T> {
    /// Creates a null handle.
    fn default() -> Self {
        Self::null()
    }
}

impl<T> Clone for Handle<T> {
    #[inline]
    fn clone(&self) -> Self {
        let Some(target) = &self.target else {
            return Self::null();
        };

        target.header().add_ref();

        Self {
            target: Some(Target {
                item: target.item,
                header: target.header,
                id: target.id,
                index_in_page: target.index_in_page,
                page: Rc::clone(&target.page),
            }),
        }
    }

    // The default `clone_from` already registers the new reference before releasing the old
    // one, which keeps self-assignment from destroying the item.
}

impl<T> Drop for Handle<T> {
    fn drop(&mut self) {
        let Some(target) = self.target.take() else {
            return;
        };

        let remaining = target
            .header()
            .release()
            .expect("a live handle always holds one unit of its item's reference count");

        if remaining == 0 {
            target.page.release_slot(target.index_in_page);
        }
    }
}

impl<T> Deref for Handle<T> {
    type Target = T;

    /// # Panics
    ///
    /// Panics if the handle is null.
    #[inline]
    #[cfg_attr(test, mutants::skip)] // Cargo-mutants does not understand this signature - every mutation is unviable waste of time.
    fn deref(&self) -> &Self::Target {
        match Self::try_get(self) {
            Ok(item) => item,
            Err(error) => panic!("{error}"),
        }
    }
}

impl<T> Borrow<T> for Handle<T> {
    #[inline]
    #[cfg_attr(test, mutants::skip)] // Cargo-mutants does not understand this signature - every mutation is unviable waste of time.
    fn borrow(&self) -> &T {
        self
    }
}

impl<T> AsRef<T> for Handle<T> {
    #[inline]
    #[cfg_attr(test, mutants::skip)] // Cargo-mutants does not understand this signature - every mutation is unviable waste of time.
    fn as_ref(&self) -> &T {
        self
    }
}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        Self::ptr_eq(self, other)
    }
}

impl<T> Eq for Handle<T> {}

impl<T> PartialOrd for Handle<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Handle<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        Self::as_ptr(self).cmp(&Self::as_ptr(other))
    }
}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Self::as_ptr(self).hash(state);
    }
}

#[cfg_attr(coverage_nightly, coverage(off))] // No API contract to test.
impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.target {
            Some(target) => f
                .debug_struct(type_name::<Self>())
                .field("item", &target.item)
                .field("id", &target.id)
                .field("reference_count", &target.header().reference_count())
                .finish_non_exhaustive(),
            None => f.debug_struct(type_name::<Self>()).field("item", &"null").finish(),
        }
    }
}
