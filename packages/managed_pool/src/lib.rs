#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! A paged, single-threaded object pool whose items are shared through intrusively
//! reference-counted handles.
//!
//! This crate provides [`ManagedPool`], which stores items of one type in fixed-size pages and
//! hands out [`Handle`]s to them. Every handle contributes one unit to the reference count
//! stored next to its item, so the pool always knows whether an item is still in use.
//!
//! This is part of the [Folo project](https://github.com/folo-rs/folo) that provides mechanisms for
//! high-performance hardware-aware programming in Rust.
//!
//! # Key Features
//!
//! - **Stable addresses**: items never move once placed; the pool grows by whole pages
//! - **LIFO slot reuse**: the most recently freed slot is the first to be reused
//! - **Allocation-ordered iteration**: live items are visited in the order they were allocated
//! - **Dense IDs**: every item has a `u32` ID that can be used to look it up again
//! - **Two ownership policies**: chosen at compile time, see below
//! - **Fallible growth**: running out of memory is reported as an [`Error`] and leaves the pool
//!   unchanged
//!
//! # Ownership policies
//!
//! The pool type has an [`OwnershipPolicy`] parameter:
//!
//! * [`Ephemeral`] (the default) destroys an item as soon as its last handle is dropped and
//!   recycles its slot.
//! * [`PoolOwned`] keeps every item alive until the pool is cleared or dropped, no matter how many
//!   handles come and go. This suits long-lived, de-duplicated objects that are looked up
//!   repeatedly.
//!
//! # Example
//!
//! ```rust
//! use managed_pool::{Handle, ManagedPool};
//!
//! #[derive(Default)]
//! struct Widget {
//!     clicks: u32,
//! }
//!
//! let mut pool = ManagedPool::<Widget, 4>::new();
//!
//! let mut button = pool.allocate().unwrap();
//! Handle::get_mut(&mut button).unwrap().clicks += 1;
//!
//! let same_button = button.clone();
//! assert_eq!(same_button.clicks, 1);
//! assert_eq!(pool.len(), 1);
//!
//! drop(button);
//! drop(same_button);
//!
//! // The last handle is gone, so the widget was destroyed and its slot recycled.
//! assert!(pool.is_empty());
//! ```
//!
//! # Thread safety
//!
//! Pools and handles are single-threaded: neither is `Send` nor `Sync`. Share a pool within a
//! thread by owning it in a context struct and passing references to whoever needs it.

mod builder;
mod coordinates;
mod drop_policy;
mod error;
mod handle;
mod header;
mod iter;
mod page;
mod policy;
mod pool;

pub use builder::*;
pub(crate) use coordinates::*;
pub use drop_policy::*;
pub use error::*;
pub use handle::*;
pub(crate) use header::*;
pub use iter::*;
pub(crate) use page::*;
pub use policy::*;
pub use pool::ManagedPool;
pub(crate) use pool::PoolCore;
