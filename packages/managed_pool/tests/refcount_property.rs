//! Property tests for the reference counting of pooled items.
//!
//! For any sequence of handle clones and drops, the reference count of an item equals the
//! number of handles referencing it (plus the pool's own reference for retaining pools), and the
//! item is destroyed exactly when the last handle goes away.

use std::cell::Cell;
use std::rc::Rc;

use managed_pool::{Handle, ManagedPool, PoolOwned};
use proptest::prelude::*;

#[derive(Clone, Copy, Debug)]
enum Op {
    /// Clone the handle at this position (modulo the number of handles).
    Clone(usize),
    /// Drop the handle at this position (modulo the number of handles).
    Drop(usize),
    /// Overwrite the handle at the first position with a clone of the second.
    Assign(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..16_usize).prop_map(Op::Clone),
        (0..16_usize).prop_map(Op::Drop),
        (0..16_usize, 0..16_usize).prop_map(|(to, from)| Op::Assign(to, from)),
    ]
}

struct Flagged(Rc<Cell<bool>>);

impl Drop for Flagged {
    fn drop(&mut self) {
        self.0.set(true);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn count_tracks_live_handles(ops in proptest::collection::vec(op(), 1..64)) {
        let dropped = Rc::new(Cell::new(false));
        let mut pool = ManagedPool::<Flagged, 4>::new();

        let mut handles = vec![pool.insert(Flagged(Rc::clone(&dropped))).unwrap()];

        for op in ops {
            if handles.is_empty() {
                break;
            }

            match op {
                Op::Clone(index) => {
                    let copy = handles[index % handles.len()].clone();
                    handles.push(copy);
                }
                Op::Drop(index) => {
                    let index = index % handles.len();
                    drop(handles.swap_remove(index));
                }
                Op::Assign(to, from) => {
                    let to = to % handles.len();
                    let source = handles[from % handles.len()].clone();
                    handles[to].clone_from(&source);
                }
            }

            let expected = u32::try_from(handles.len()).unwrap();

            if let Some(any) = handles.first() {
                prop_assert_eq!(Handle::reference_count(any), expected);
                prop_assert!(!dropped.get());
                prop_assert_eq!(pool.len(), 1);
            } else {
                prop_assert!(dropped.get());
                prop_assert_eq!(pool.len(), 0);
            }
        }

        drop(handles);
        prop_assert!(dropped.get());
        prop_assert_eq!(pool.len(), 0);
    }

    #[test]
    fn pool_owned_count_includes_pool_reference(clones in 0..32_usize, drops in 0..32_usize) {
        let mut pool = ManagedPool::<u64, 4, PoolOwned>::new();

        let first = pool.insert(1).unwrap();
        let mut handles: Vec<_> = (0..clones).map(|_| first.clone()).collect();
        drop(first);

        let drops = drops.min(handles.len());
        handles.truncate(handles.len() - drops);

        let item = pool.get(0).unwrap();

        // Pool, the lookup handle and whatever clones remain.
        let expected = u32::try_from(handles.len() + 2).unwrap();
        prop_assert_eq!(Handle::reference_count(&item), expected);

        drop(item);
        drop(handles);
        prop_assert_eq!(pool.len(), 1);

        pool.clear();
        prop_assert_eq!(pool.len(), 0);
    }

    #[test]
    fn live_set_matches_surviving_items(keep in proptest::collection::vec(any::<bool>(), 1..40)) {
        let mut pool = ManagedPool::<usize, 4>::new();

        let handles: Vec<_> = (0..keep.len()).map(|value| pool.insert(value).unwrap()).collect();

        let kept: Vec<Handle<usize>> = handles
            .into_iter()
            .zip(&keep)
            .filter_map(|(handle, keep)| keep.then_some(handle))
            .collect();

        let expected: Vec<usize> = kept.iter().map(|handle| **handle).collect();
        let iterated: Vec<usize> = pool.iter().map(|handle| *handle).collect();

        prop_assert_eq!(pool.len(), kept.len());
        prop_assert_eq!(iterated, expected);
    }
}
