//! Sorting for `BlockList`.
//!
//! Elements are moved out into one contiguous buffer, sorted there with the
//! slice algorithms from `core`, and moved back into the blocks they came
//! from. Each block ends up with the same fill count it had before, so the
//! chain shape does not change.

use allocator_api2::alloc::Allocator;
use std::cmp::Ordering;

use crate::chain::BlockId;
use crate::BlockList;

/// Clears the list if dropped while armed, so a panicking comparator leaves
/// it empty instead of holding blocks whose elements were moved out.
struct ClearOnUnwind<'a, T, A: Allocator + Clone> {
    list: &'a mut BlockList<T, A>,
    armed: bool,
}

impl<T, A: Allocator + Clone> Drop for ClearOnUnwind<'_, T, A> {
    fn drop(&mut self) {
        if self.armed {
            self.list.clear();
        }
    }
}

impl<T, A: Allocator + Clone> BlockList<T, A> {
    /// Sorts the list with a stable sort.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let mut list: BlockList<i32> = [5, 1, 4, 2, 3].into_iter().collect();
    /// list.sort();
    /// assert_eq!(list.to_vec(), vec![1, 2, 3, 4, 5]);
    /// ```
    pub fn sort(&mut self)
    where
        T: Ord,
    {
        self.sort_with(|values| values.sort());
    }

    /// Sorts the list with a stable sort using a comparator function.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_with(|values| values.sort_by(compare));
    }

    /// Sorts the list with a stable sort using a key extraction function.
    pub fn sort_by_key<K, F>(&mut self, f: F)
    where
        F: FnMut(&T) -> K,
        K: Ord,
    {
        self.sort_with(|values| values.sort_by_key(f));
    }

    /// Sorts the list without preserving the order of equal elements.
    pub fn sort_unstable(&mut self)
    where
        T: Ord,
    {
        self.sort_with(|values| values.sort_unstable());
    }

    /// Sorts the list with an unstable sort using a comparator function.
    pub fn sort_unstable_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        self.sort_with(|values| values.sort_unstable_by(compare));
    }

    fn sort_with<F>(&mut self, sort: F)
    where
        F: FnOnce(&mut [T]),
    {
        if self.len < 2 {
            return;
        }

        let layout: Vec<(BlockId, usize)> = self
            .chain
            .ids()
            .map(|id| (id, self.chain.block(id).len()))
            .collect();
        let mut values = Vec::with_capacity(self.len);
        for &(id, _) in &layout {
            self.chain.block_mut(id).drain_into(&mut values);
        }

        let mut guard = ClearOnUnwind {
            list: self,
            armed: true,
        };
        sort(&mut values);

        let mut values = values.into_iter();
        for &(id, len) in &layout {
            let block = guard.list.chain.block_mut(id);
            for value in values.by_ref().take(len) {
                block.push_back(value);
            }
        }

        guard.armed = false;
        guard.list.bump();
    }
}
