use std::collections::TryReserveError;

use thiserror::Error;

/// Errors that can occur when operating a [`ManagedPool`][crate::ManagedPool] or
/// accessing its items through a [`Handle`][crate::Handle].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Memory for a new page or for the page directory could not be reserved.
    ///
    /// The pool is left exactly as it was before the failed call.
    #[error("failed to allocate storage for a pool of {type_name}")]
    AllocationFailed {
        /// Name of the item type stored in the pool.
        type_name: &'static str,

        /// The underlying reservation failure.
        #[source]
        source: TryReserveError,
    },

    /// The pool cannot grow further without exceeding its configured item limit or the
    /// `u32` ID space.
    #[error("pool of {type_name} cannot hold more than {max_items} items")]
    CapacityExhausted {
        /// Name of the item type stored in the pool.
        type_name: &'static str,

        /// The largest number of items the pool may hold.
        max_items: usize,
    },

    /// A null handle was dereferenced.
    #[error("dereferenced a null handle to {type_name}")]
    NullDereference {
        /// Name of the item type the handle points to.
        type_name: &'static str,
    },

    /// An internal reference counting precondition did not hold.
    #[error("reference counting precondition violated: {detail}")]
    PreconditionViolated {
        /// A human-readable description of the violated precondition.
        detail: &'static str,
    },
}

/// A specialized `Result` type for pool operations, returning the crate's
/// [`Error`] type as the error value.
pub(crate) type Result<T> = std::result::Result<T, Error>;
