use std::cell::Cell;

use crate::{Error, Result};

/// Reference counting state embedded in every node of a pool page.
///
/// The header knows nothing about the pool. Whoever observes the count dropping to zero
/// through [`release()`][Self::release] is responsible for destroying the item and handing
/// its slot back to the owning page.
#[derive(Debug, Default)]
pub(crate) struct RefCountedHeader {
    reference_count: Cell<u32>,
}

impl RefCountedHeader {
    #[must_use]
    pub(crate) const fn new() -> Self {
        Self {
            reference_count: Cell::new(0),
        }
    }

    /// Installs the initial count of a freshly allocated item.
    ///
    /// # Panics
    ///
    /// Panics if the header still carries references from a previous occupant.
    pub(crate) fn seed(&self, reference_count: u32) {
        assert_eq!(
            self.reference_count.get(),
            0,
            "seeded a reference count header that still carries references"
        );

        self.reference_count.set(reference_count);
    }

    /// Increments the count and returns the new value.
    pub(crate) fn add_ref(&self) -> u32 {
        let count = self
            .reference_count
            .get()
            .checked_add(1)
            .expect("reference count overflow - more handles than addressable memory can hold");

        self.reference_count.set(count);
        count
    }

    /// Decrements the count and returns the new value.
    ///
    /// A return value of zero means the caller just released the last reference.
    pub(crate) fn release(&self) -> Result<u32> {
        let count = self
            .reference_count
            .get()
            .checked_sub(1)
            .ok_or(Error::PreconditionViolated {
                detail: "released a reference count that was already zero",
            })?;

        self.reference_count.set(count);
        Ok(count)
    }

    #[must_use]
    pub(crate) fn reference_count(&self) -> u32 {
        self.reference_count.get()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn add_ref_and_release_track_count() {
        let header = RefCountedHeader::new();

        assert_eq!(header.add_ref(), 1);
        assert_eq!(header.add_ref(), 2);
        assert_eq!(header.reference_count(), 2);

        assert_eq!(header.release().unwrap(), 1);
        assert_eq!(header.release().unwrap(), 0);
        assert_eq!(header.reference_count(), 0);
    }

    #[test]
    fn release_at_zero_is_precondition_violation() {
        let header = RefCountedHeader::new();

        let error = header.release().unwrap_err();
        assert!(matches!(error, Error::PreconditionViolated { .. }));

        // The failed release must not have wrapped the count around.
        assert_eq!(header.reference_count(), 0);
    }

    #[test]
    fn seed_sets_initial_count() {
        let header = RefCountedHeader::new();

        header.seed(1);
        assert_eq!(header.add_ref(), 2);
    }

    #[test]
    #[should_panic]
    fn seed_over_live_count_panics() {
        let header = RefCountedHeader::new();
        header.add_ref();

        header.seed(0);
    }
}
