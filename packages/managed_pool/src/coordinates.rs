use num_integer::Integer;

/// Location of a node in the pool: which page, and which slot within that page.
///
/// Coordinates convert losslessly to and from the dense `u32` item ID exposed by the pool,
/// `id = page_index * PAGE_SIZE + index_in_page`, which is also `base_id + index_in_page`
/// for the page that holds the node.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct ItemCoordinates {
    page_index: usize,
    index_in_page: usize,
}

impl ItemCoordinates {
    #[must_use]
    pub(crate) fn from_parts(page_index: usize, index_in_page: usize) -> Self {
        Self {
            page_index,
            index_in_page,
        }
    }

    #[must_use]
    pub(crate) fn from_id<const PAGE_SIZE: usize>(id: u32) -> Self {
        let id = usize::try_from(id).expect("u32 always fits in usize on supported targets");
        let (page_index, index_in_page) = id.div_rem(&PAGE_SIZE);

        Self {
            page_index,
            index_in_page,
        }
    }

    /// Returns `None` if the coordinates lie beyond the `u32` ID space.
    #[must_use]
    pub(crate) fn to_id<const PAGE_SIZE: usize>(self) -> Option<u32> {
        self.page_index
            .checked_mul(PAGE_SIZE)
            .and_then(|base| base.checked_add(self.index_in_page))
            .and_then(|id| u32::try_from(id).ok())
    }

    #[must_use]
    pub(crate) fn page_index(self) -> usize {
        self.page_index
    }

    #[must_use]
    pub(crate) fn index_in_page(self) -> usize {
        self.index_in_page
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn id_splits_into_page_and_slot() {
        let coordinates = ItemCoordinates::from_id::<4>(9);

        assert_eq!(coordinates.page_index(), 2);
        assert_eq!(coordinates.index_in_page(), 1);
        assert_eq!(coordinates.to_id::<4>(), Some(9));
    }

    #[test]
    fn first_slot_of_page_is_base_id() {
        let coordinates = ItemCoordinates::from_parts(3, 0);

        assert_eq!(coordinates.to_id::<64>(), Some(192));
    }

    #[test]
    fn beyond_id_space_is_none() {
        let coordinates = ItemCoordinates::from_parts(usize::try_from(u32::MAX).unwrap(), 5);

        assert_eq!(coordinates.to_id::<2>(), None);
    }
}
