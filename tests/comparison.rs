//! Comparison tests between BlockList and std::Vec
//!
//! Random operation sequences are applied to both containers and the results
//! compared after every step. Small block capacities keep splits and unlinks
//! happening constantly.

use block_list::{BlockList, BlockListError, MIN_BLOCK_CAPACITY};
use proptest::prelude::*;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

// ============================================================================
// COMPARISON TESTING INFRASTRUCTURE
// ============================================================================

/// Operations that can be applied to a list for comparison testing.
#[derive(Debug, Clone)]
enum ListOp<T> {
    PushBack(T),
    PushFront(T),
    Insert(usize, T),
    Remove(usize),
    RemoveItem(T),
    RemoveLastItem(T),
    Set(usize, T),
    PopFront,
    PopBack,
    Clear,
    Extend(Vec<T>),
    Retain(T),
    Sort,
}

/// Apply an operation to both containers and compare results.
fn apply_op(std_vec: &mut Vec<i32>, list: &mut BlockList<i32>, op: &ListOp<i32>) {
    match op {
        ListOp::PushBack(v) => {
            std_vec.push(*v);
            list.push_back(*v);
        }
        ListOp::PushFront(v) => {
            std_vec.insert(0, *v);
            list.push_front(*v);
        }
        ListOp::Insert(idx, v) => {
            if *idx <= std_vec.len() {
                std_vec.insert(*idx, *v);
                assert_eq!(list.insert(*idx, *v), Ok(()), "insert() mismatch");
            } else {
                assert_eq!(
                    list.insert(*idx, *v),
                    Err(BlockListError::IndexOutOfRange {
                        index: *idx,
                        len: std_vec.len()
                    })
                );
            }
        }
        ListOp::Remove(idx) => {
            if *idx < std_vec.len() {
                let std_result = std_vec.remove(*idx);
                assert_eq!(list.remove(*idx), Ok(std_result), "remove() mismatch");
            } else {
                assert!(list.remove(*idx).is_err(), "remove() out of range");
            }
        }
        ListOp::RemoveItem(v) => {
            let std_result = match std_vec.iter().position(|x| x == v) {
                Some(pos) => {
                    std_vec.remove(pos);
                    true
                }
                None => false,
            };
            assert_eq!(list.remove_item(v), std_result, "remove_item() mismatch");
        }
        ListOp::RemoveLastItem(v) => {
            let std_result = match std_vec.iter().rposition(|x| x == v) {
                Some(pos) => {
                    std_vec.remove(pos);
                    true
                }
                None => false,
            };
            assert_eq!(
                list.remove_last_item(v),
                std_result,
                "remove_last_item() mismatch"
            );
        }
        ListOp::Set(idx, v) => {
            if *idx < std_vec.len() {
                let old = std::mem::replace(&mut std_vec[*idx], *v);
                assert_eq!(list.set(*idx, *v), Ok(old), "set() mismatch");
            } else {
                assert!(list.set(*idx, *v).is_err(), "set() out of range");
            }
        }
        ListOp::PopFront => {
            let std_result = if std_vec.is_empty() {
                None
            } else {
                Some(std_vec.remove(0))
            };
            assert_eq!(list.pop_front(), std_result, "pop_front() mismatch");
        }
        ListOp::PopBack => {
            assert_eq!(list.pop_back(), std_vec.pop(), "pop_back() mismatch");
        }
        ListOp::Clear => {
            std_vec.clear();
            list.clear();
        }
        ListOp::Extend(vals) => {
            std_vec.extend(vals.iter().copied());
            assert_eq!(list.append_all(vals.iter().copied()), !vals.is_empty());
        }
        ListOp::Retain(modulus) => {
            let modulus = modulus.rem_euclid(5) + 2;
            std_vec.retain(|v| v % modulus != 0);
            list.retain(|v| v % modulus != 0);
        }
        ListOp::Sort => {
            std_vec.sort();
            list.sort();
        }
    }
}

/// Verify that both containers hold the same content and the list's blocks
/// are consistent with its length.
fn assert_lists_equal(std_vec: &[i32], list: &BlockList<i32>) {
    assert_eq!(std_vec.len(), list.len(), "length mismatch");
    assert_eq!(std_vec.is_empty(), list.is_empty(), "is_empty mismatch");

    // Compare element by element, from both ends
    for (i, (std_elem, list_elem)) in std_vec.iter().zip(list.iter()).enumerate() {
        assert_eq!(std_elem, list_elem, "element mismatch at index {}", i);
    }
    assert!(
        std_vec.iter().rev().eq(list.iter().rev()),
        "reverse iteration mismatch"
    );

    assert_eq!(std_vec.first(), list.front(), "front() mismatch");
    assert_eq!(std_vec.last(), list.back(), "back() mismatch");

    for (i, value) in std_vec.iter().enumerate() {
        assert_eq!(list.get(i), Ok(value), "get({}) mismatch", i);
    }

    // Out of range is an error, never a panic
    assert!(list.get(std_vec.len()).is_err());
    assert!(list.get(usize::MAX).is_err());

    // Every linked block holds between 1 and capacity elements
    let blocks = list.block_count();
    assert!(blocks <= list.len(), "empty block left linked");
    assert!(
        list.len() <= blocks * list.block_capacity(),
        "more elements than slots"
    );
}

// ============================================================================
// PROPTEST STRATEGIES
// ============================================================================

/// Strategy for generating a single list operation.
fn list_op_strategy() -> impl Strategy<Value = ListOp<i32>> {
    prop_oneof![
        // Appends dominate so lists grow past a few blocks
        3 => (0i32..50).prop_map(ListOp::PushBack),
        1 => (0i32..50).prop_map(ListOp::PushFront),
        3 => (0usize..120, 0i32..50).prop_map(|(idx, v)| ListOp::Insert(idx, v)),
        2 => (0usize..120).prop_map(ListOp::Remove),
        1 => (0i32..50).prop_map(ListOp::RemoveItem),
        1 => (0i32..50).prop_map(ListOp::RemoveLastItem),
        1 => (0usize..120, 0i32..50).prop_map(|(idx, v)| ListOp::Set(idx, v)),
        1 => Just(ListOp::PopFront),
        1 => Just(ListOp::PopBack),
        1 => Just(ListOp::Clear),
        1 => prop::collection::vec(0i32..50, 0..30).prop_map(ListOp::Extend),
        1 => any::<i32>().prop_map(ListOp::Retain),
        1 => Just(ListOp::Sort),
    ]
}

/// Strategy for generating a sequence of operations.
fn ops_sequence_strategy() -> impl Strategy<Value = Vec<ListOp<i32>>> {
    prop::collection::vec(list_op_strategy(), 0..200)
}

/// Small block capacities so every path through split and unlink is hit.
fn capacity_strategy() -> impl Strategy<Value = isize> {
    (MIN_BLOCK_CAPACITY as isize)..=9
}

fn list_with(capacity: isize) -> BlockList<i32> {
    BlockList::with_block_capacity(capacity).unwrap()
}

// ============================================================================
// PROPTEST TESTS
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// Test that a random sequence of operations produces identical results.
    #[test]
    fn proptest_operations_match(capacity in capacity_strategy(), ops in ops_sequence_strategy()) {
        let mut std_vec: Vec<i32> = Vec::new();
        let mut list = list_with(capacity);

        for op in &ops {
            apply_op(&mut std_vec, &mut list, op);
            assert_lists_equal(&std_vec, &list);
        }
    }

    /// Test push followed by iteration.
    #[test]
    fn proptest_push_and_iter(
        capacity in capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..500),
    ) {
        let mut list = list_with(capacity);
        for v in &values {
            list.push_back(*v);
        }

        let collected: Vec<_> = list.iter().copied().collect();
        prop_assert_eq!(&collected, &values);

        let owned: Vec<_> = list.clone().into_iter().collect();
        prop_assert_eq!(&owned, &values);

        let reversed: Vec<_> = list.into_iter().rev().collect();
        let mut expected = values.clone();
        expected.reverse();
        prop_assert_eq!(reversed, expected);
    }

    /// Test that pushing past the tail packs blocks completely.
    #[test]
    fn proptest_appends_pack_blocks(
        capacity in capacity_strategy(),
        len in 0usize..300,
    ) {
        let mut list = list_with(capacity);
        list.append_all(0..len as i32);
        let capacity = capacity as usize;
        prop_assert_eq!(list.block_count(), len.div_ceil(capacity));
    }

    /// Test index_of / last_index_of / contains against Vec.
    #[test]
    fn proptest_search(
        capacity in capacity_strategy(),
        values in prop::collection::vec(0i32..20, 0..100),
        needle in 0i32..20,
    ) {
        let list: BlockList<i32> = {
            let mut list = list_with(capacity);
            list.append_all(values.iter().copied());
            list
        };
        prop_assert_eq!(list.index_of(&needle), values.iter().position(|v| *v == needle));
        prop_assert_eq!(list.last_index_of(&needle), values.iter().rposition(|v| *v == needle));
        prop_assert_eq!(list.contains(&needle), values.contains(&needle));
    }

    /// Test that sort produces the same result.
    #[test]
    fn proptest_sort(
        capacity in capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..200),
    ) {
        let mut std_vec = values.clone();
        let mut list = list_with(capacity);
        list.append_all(values);

        std_vec.sort();
        list.sort();
        prop_assert_eq!(list.to_vec(), std_vec);
    }

    /// Test remove_all / retain_all against Vec::retain.
    #[test]
    fn proptest_remove_all_retain_all(
        capacity in capacity_strategy(),
        values in prop::collection::vec(0i32..10, 0..100),
        items in prop::collection::vec(0i32..10, 0..4),
    ) {
        let mut list = list_with(capacity);
        list.append_all(values.iter().copied());
        let mut kept = values.clone();
        kept.retain(|v| !items.contains(v));
        prop_assert_eq!(list.remove_all(&items), kept.len() != values.len());
        prop_assert_eq!(list.to_vec(), kept);

        let mut list = list_with(capacity);
        list.append_all(values.iter().copied());
        let mut kept = values.clone();
        kept.retain(|v| items.contains(v));
        prop_assert_eq!(list.retain_all(&items), kept.len() != values.len());
        prop_assert_eq!(list.to_vec(), kept);
    }

    /// Test iter_mut modifications.
    #[test]
    fn proptest_iter_mut(
        capacity in capacity_strategy(),
        values in prop::collection::vec(-1000i32..1000, 0..100),
        front_removals in 0usize..10,
    ) {
        let mut std_vec = values.clone();
        let mut list = list_with(capacity);
        list.append_all(values);
        // Advance block heads so some blocks wrap.
        for _ in 0..front_removals.min(std_vec.len()) {
            std_vec.remove(0);
            list.pop_front();
            if let Some(v) = std_vec.first().copied() {
                std_vec.insert(0, v + 1);
                list.push_front(v + 1);
            }
        }

        for v in std_vec.iter_mut() {
            *v *= 3;
        }
        for v in list.iter_mut() {
            *v *= 3;
        }
        prop_assert_eq!(list.to_vec(), std_vec);
    }

    /// Test clone and equality.
    #[test]
    fn proptest_clone(values in prop::collection::vec(any::<i32>(), 0..100)) {
        let list: BlockList<i32> = values.iter().copied().collect();
        let cloned = list.clone();
        prop_assert_eq!(&list, &cloned);
        prop_assert_eq!(cloned.to_vec(), values);
    }

    /// Test ordering matches Vec ordering.
    #[test]
    fn proptest_ordering(
        a in prop::collection::vec(0i32..5, 0..10),
        b in prop::collection::vec(0i32..5, 0..10),
    ) {
        let list_a: BlockList<i32> = a.iter().copied().collect();
        let list_b: BlockList<i32> = b.iter().copied().collect();
        prop_assert_eq!(list_a.cmp(&list_b), a.cmp(&b));
        prop_assert_eq!(list_a == list_b, a == b);
    }

    /// Test that equal lists hash equally regardless of block layout.
    #[test]
    fn proptest_hash(
        capacity in capacity_strategy(),
        values in prop::collection::vec(any::<i32>(), 0..100),
    ) {
        fn hash_val<T: Hash>(val: &T) -> u64 {
            let mut hasher = DefaultHasher::new();
            val.hash(&mut hasher);
            hasher.finish()
        }

        let packed: BlockList<i32> = values.iter().copied().collect();
        let mut scattered = list_with(capacity);
        for v in values.iter().rev() {
            scattered.push_front(*v);
        }
        prop_assert_eq!(hash_val(&packed), hash_val(&scattered));
    }
}

// ============================================================================
// QUICKCHECK TESTS
// ============================================================================

#[cfg(test)]
mod quickcheck_tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[quickcheck]
    fn qc_push_pop_symmetry(values: Vec<i32>) -> bool {
        let mut list = list_with(4);
        for v in &values {
            list.push_back(*v);
        }

        let mut popped: Vec<i32> = Vec::new();
        while let Some(v) = list.pop_back() {
            popped.push(v);
        }

        popped.reverse();
        popped == values && list.block_count() == 0
    }

    #[quickcheck]
    fn qc_push_front_pop_front_symmetry(values: Vec<i32>) -> bool {
        let mut list = list_with(5);
        for v in &values {
            list.push_front(*v);
        }

        let mut popped: Vec<i32> = Vec::new();
        while let Some(v) = list.pop_front() {
            popped.push(v);
        }

        popped.reverse();
        popped == values
    }

    #[quickcheck]
    fn qc_len_after_push(values: Vec<i32>) -> bool {
        let mut list = list_with(6);
        for v in &values {
            list.push_back(*v);
        }
        list.len() == values.len()
    }

    #[quickcheck]
    fn qc_get_after_push(values: Vec<i32>) -> bool {
        let mut list = list_with(4);
        list.append_all(values.iter().copied());

        values
            .iter()
            .enumerate()
            .all(|(i, v)| list.get(i) == Ok(v))
    }

    #[quickcheck]
    fn qc_from_iter_round_trip(values: Vec<i32>) -> bool {
        let list: BlockList<i32> = values.iter().copied().collect();
        let back: Vec<i32> = list.into_iter().collect();
        back == values
    }

    #[quickcheck]
    fn qc_clear_empties(values: Vec<i32>) -> bool {
        let mut list: BlockList<i32> = values.into_iter().collect();
        list.clear();
        list.is_empty() && list.block_count() == 0
    }

    #[quickcheck]
    fn qc_sort_produces_sorted(values: Vec<i32>) -> bool {
        let mut list = list_with(7);
        list.append_all(values);
        list.sort();

        let sorted = list.to_vec();
        sorted.windows(2).all(|w| w[0] <= w[1])
    }
}

// ============================================================================
// EDGE CASE TESTS
// ============================================================================

#[cfg(test)]
mod edge_case_tests {
    use super::*;

    #[test]
    fn test_empty_operations() {
        let mut list = list_with(4);
        let mut std_vec: Vec<i32> = Vec::new();

        assert_eq!(list.pop_back(), std_vec.pop());
        assert_eq!(list.pop_front(), None);
        assert_eq!(list.front(), std_vec.first());
        assert_eq!(list.back(), std_vec.last());
        assert_eq!(
            list.get(0),
            Err(BlockListError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert!(!list.remove_item(&0));

        list.clear();
        std_vec.clear();
        assert_lists_equal(&std_vec, &list);
    }

    #[test]
    fn test_remove_by_value_scenario() {
        let mut list = list_with(5);
        list.append_all([10, 20, 30, 40, 50]);
        assert_eq!(list.len(), 5);

        for v in [10, 30, 50] {
            assert!(list.remove_item(&v));
        }
        assert_eq!(list.get(0), Ok(&20));
        assert_eq!(list.get(1), Ok(&40));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_append_then_bulk_append_scenario() {
        let mut list = list_with(5);
        for v in 0..13 {
            list.push_back(v);
        }
        assert_eq!(list.block_count(), 3);

        assert!(list.append_all(13..21));
        assert_eq!(list.len(), 21);
        assert_eq!(list.get(20), Ok(&20));
        assert_lists_equal(&(0..21).collect::<Vec<_>>(), &list);
    }

    #[test]
    fn test_insert_at_all_positions() {
        for capacity in 4..=9 {
            for len in 0..20 {
                for index in 0..=len {
                    let mut std_vec: Vec<i32> = (0..len as i32).collect();
                    let mut list = list_with(capacity);
                    list.append_all(std_vec.iter().copied());

                    std_vec.insert(index, -1);
                    list.insert(index, -1).unwrap();
                    assert_lists_equal(&std_vec, &list);
                }
            }
        }
    }

    #[test]
    fn test_remove_at_all_positions() {
        for capacity in 4..=9 {
            for len in 1..20 {
                for index in 0..len {
                    let mut std_vec: Vec<i32> = (0..len as i32).collect();
                    let mut list = list_with(capacity);
                    list.append_all(std_vec.iter().copied());

                    assert_eq!(list.remove(index), Ok(std_vec.remove(index)));
                    assert_lists_equal(&std_vec, &list);
                }
            }
        }
    }

    #[test]
    fn test_drain_everything_from_the_middle() {
        let mut list = list_with(4);
        let mut std_vec: Vec<i32> = (0..40).collect();
        list.append_all(std_vec.iter().copied());

        while !std_vec.is_empty() {
            let index = std_vec.len() / 2;
            assert_eq!(list.remove(index), Ok(std_vec.remove(index)));
            assert_lists_equal(&std_vec, &list);
        }
        assert_eq!(list.block_count(), 0);
    }

    #[test]
    fn test_option_elements() {
        let mut list: BlockList<Option<&str>> = BlockList::with_block_capacity(4).unwrap();
        list.append_all([Some("a"), None, Some("b"), None]);
        assert_eq!(list.index_of(&None), Some(1));
        assert_eq!(list.last_index_of(&None), Some(3));
        assert_eq!(list.index_of(&Some("b")), Some(2));
        assert!(list.remove_item(&None));
        assert_eq!(list.to_vec(), vec![Some("a"), Some("b"), None]);
    }

    #[test]
    fn test_cursor_walk_and_fail_fast() {
        let mut list = list_with(4);
        list.append_all(0..12);

        let mut cursor = list.cursor();
        while let Some(&value) = cursor.next(&list).unwrap() {
            if value % 4 == 0 {
                cursor.remove(&mut list).unwrap();
            } else if value % 4 == 1 {
                cursor.insert(&mut list, value * 100).unwrap();
            }
        }
        assert_eq!(
            list.to_vec(),
            vec![1, 100, 2, 3, 5, 500, 6, 7, 9, 900, 10, 11]
        );

        list.remove(0).unwrap();
        assert!(matches!(
            cursor.previous(&list),
            Err(BlockListError::ConcurrentModification { .. })
        ));
    }

    #[test]
    fn test_invalid_capacity() {
        assert!(BlockList::<i32>::with_block_capacity(MIN_BLOCK_CAPACITY as isize - 1).is_err());
        assert!(BlockList::<i32>::with_block_capacity(-7).is_err());
        let err = BlockList::<i32>::with_block_capacity(0).err().unwrap();
        assert_eq!(
            err.to_string(),
            "invalid configuration: block capacity is too small (0), must be at least 4"
        );
    }
}

// ============================================================================
// DROP COUNTING TESTS
// ============================================================================

#[cfg(test)]
mod drop_tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct DropCounter {
        count: Rc<RefCell<usize>>,
    }

    impl Drop for DropCounter {
        fn drop(&mut self) {
            *self.count.borrow_mut() += 1;
        }
    }

    fn counters(count: &Rc<RefCell<usize>>, n: usize) -> BlockList<DropCounter> {
        let mut list = BlockList::with_block_capacity(4).unwrap();
        for _ in 0..n {
            list.push_back(DropCounter {
                count: count.clone(),
            });
        }
        list
    }

    #[test]
    fn test_drop_on_clear() {
        let count = Rc::new(RefCell::new(0));
        let mut list = counters(&count, 10);
        assert_eq!(*count.borrow(), 0);
        list.clear();
        assert_eq!(*count.borrow(), 10);
    }

    #[test]
    fn test_drop_on_remove() {
        let count = Rc::new(RefCell::new(0));
        let mut list = counters(&count, 10);
        drop(list.remove(5));
        assert_eq!(*count.borrow(), 1);
        list.pop_front();
        list.pop_back();
        assert_eq!(*count.borrow(), 3);
    }

    #[test]
    fn test_drop_on_retain() {
        let count = Rc::new(RefCell::new(0));
        let mut list = counters(&count, 10);
        let mut seen = 0;
        list.retain(|_| {
            seen += 1;
            seen % 2 == 0
        });
        assert_eq!(*count.borrow(), 5);
        assert_eq!(list.len(), 5);
    }

    #[test]
    fn test_drop_on_set() {
        let count = Rc::new(RefCell::new(0));
        let mut list = counters(&count, 3);
        let old = list
            .set(
                1,
                DropCounter {
                    count: count.clone(),
                },
            )
            .ok();
        assert_eq!(*count.borrow(), 0);
        drop(old);
        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_drop_list() {
        let count = Rc::new(RefCell::new(0));
        let mut list = counters(&count, 17);
        list.insert(
            3,
            DropCounter {
                count: count.clone(),
            },
        )
        .unwrap();
        drop(list);
        assert_eq!(*count.borrow(), 18);
    }

    #[test]
    fn test_drop_partial_into_iter() {
        let count = Rc::new(RefCell::new(0));
        let list = counters(&count, 9);
        let mut iter = list.into_iter();
        iter.next();
        iter.next_back();
        assert_eq!(*count.borrow(), 2);
        drop(iter);
        assert_eq!(*count.borrow(), 9);
    }
}
