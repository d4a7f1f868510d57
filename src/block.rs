//! Fixed-capacity circular buffer holding one contiguous run of a `BlockList`.
//!
//! A linked block never grows. Logical index `i` lives in slot `(head + i) % capacity`,
//! and every slot outside the logical range holds `None` so removed values
//! are dropped as soon as they leave the list.
//!
//! Callers above this module validate indices; the block only checks them
//! with `debug_assert!`.

use allocator_api2::alloc::{Allocator, Global};
use allocator_api2::vec::Vec;
use std::iter::{Chain, FilterMap};
use std::slice::IterMut as SlotIterMut;

use crate::chain::BlockId;

/// The occupied slots of one block, in logical order.
pub(crate) type ValuesMut<'a, T> = FilterMap<
    Chain<SlotIterMut<'a, Option<T>>, SlotIterMut<'a, Option<T>>>,
    fn(&mut Option<T>) -> Option<&mut T>,
>;

/// Euclidean modulo for shift targets that can go below zero before wrapping.
#[inline]
pub(crate) fn modulo(x: isize, n: usize) -> usize {
    x.rem_euclid(n as isize) as usize
}

pub(crate) struct Block<T, A: Allocator = Global> {
    /// Backing slots, always exactly `capacity` long
    slots: Vec<Option<T>, A>,
    /// Physical index of the logical first element
    head: usize,
    /// Number of occupied slots
    len: usize,
    pub(crate) prev: Option<BlockId>,
    pub(crate) next: Option<BlockId>,
}

impl<T, A: Allocator> Block<T, A> {
    pub(crate) fn new_in(capacity: usize, alloc: A) -> Self {
        let mut slots = Vec::with_capacity_in(capacity, alloc);
        for _ in 0..capacity {
            slots.push(None);
        }
        Self {
            slots,
            head: 0,
            len: 0,
            prev: None,
            next: None,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[cfg(test)]
    pub(crate) fn head(&self) -> usize {
        self.head
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    fn physical(&self, logical: usize) -> usize {
        (self.head + logical) % self.capacity()
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&T> {
        debug_assert!(index < self.len);
        self.slots[self.physical(index)].as_ref()
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        debug_assert!(index < self.len);
        let slot = self.physical(index);
        self.slots[slot].as_mut()
    }

    /// Stores `value` at `index`, returning what was there.
    #[inline]
    pub(crate) fn set(&mut self, index: usize, value: T) -> Option<T> {
        debug_assert!(index < self.len);
        let slot = self.physical(index);
        self.slots[slot].replace(value)
    }

    /// Borrows every element mutably, front to back.
    ///
    /// The logical run is at most two physical pieces: `head..` and the
    /// part that wrapped around to the start of the buffer.
    pub(crate) fn values_mut(&mut self) -> ValuesMut<'_, T> {
        let first_len = self.len.min(self.capacity() - self.head);
        let wrapped_len = self.len - first_len;
        let (wrapped, from_head) = self.slots.split_at_mut(self.head);
        from_head[..first_len]
            .iter_mut()
            .chain(wrapped[..wrapped_len].iter_mut())
            .filter_map(Option::as_mut as fn(&mut Option<T>) -> Option<&mut T>)
    }

    /// Moves `portion_len` elements that start at physical slot `start`
    /// `amount` slots toward lower indices, wrapping around the buffer.
    ///
    /// The run is walked from its low end so no element is overwritten
    /// before it has been moved.
    pub(crate) fn shift_left(&mut self, start: usize, portion_len: usize, amount: usize) {
        let capacity = self.capacity();
        for k in 0..portion_len {
            let source = (start + k) % capacity;
            let target = modulo(source as isize - amount as isize, capacity);
            let moved = self.slots[source].take();
            self.slots[target] = moved;
        }
    }

    /// Mirror of [`shift_left`](Self::shift_left): moves the run toward
    /// higher indices, walking it from its high end.
    pub(crate) fn shift_right(&mut self, start: usize, portion_len: usize, amount: usize) {
        let capacity = self.capacity();
        for k in (0..portion_len).rev() {
            let source = (start + k) % capacity;
            let target = (source + amount) % capacity;
            let moved = self.slots[source].take();
            self.slots[target] = moved;
        }
    }

    /// Removes the element at `index`, shifting whichever side of it is
    /// shorter.
    ///
    /// Removing from the front half closes the gap by moving the leading
    /// elements right and advancing `head`; otherwise the trailing elements
    /// move left and `head` stays put.
    pub(crate) fn remove_local(&mut self, index: usize) -> Option<T> {
        debug_assert!(index < self.len);
        let slot = self.physical(index);
        let removed = self.slots[slot].take();

        let on_left = index;
        let on_right = self.len - index - 1;

        if on_left < on_right {
            self.shift_right(self.head, on_left, 1);
            self.head = (self.head + 1) % self.capacity();
        } else {
            let start = self.physical(index + 1);
            self.shift_left(start, on_right, 1);
        }

        self.len -= 1;
        removed
    }

    /// Inserts `value` at `index`, opening the gap on the shorter side.
    pub(crate) fn insert_local(&mut self, index: usize, value: T) {
        debug_assert!(!self.is_full());
        debug_assert!(index <= self.len);

        let on_left = index;
        let on_right = self.len - index;

        if on_left < on_right {
            self.shift_left(self.head, on_left, 1);
            self.head = modulo(self.head as isize - 1, self.capacity());
        } else {
            let start = self.physical(index);
            self.shift_right(start, on_right, 1);
        }

        let slot = self.physical(index);
        self.slots[slot] = Some(value);
        self.len += 1;
    }

    #[inline]
    pub(crate) fn push_back(&mut self, value: T) {
        debug_assert!(!self.is_full());
        let slot = self.physical(self.len);
        self.slots[slot] = Some(value);
        self.len += 1;
    }

    /// Moves elements `at..len` onto the back of `other`.
    pub(crate) fn move_tail_into(&mut self, at: usize, other: &mut Block<T, A>) {
        debug_assert!(at <= self.len);
        debug_assert!(other.capacity() - other.len() >= self.len - at);
        for index in at..self.len {
            let slot = self.physical(index);
            if let Some(value) = self.slots[slot].take() {
                other.push_back(value);
            }
        }
        self.len = at;
    }

    /// Keeps only the elements matching `f`, packing survivors toward the
    /// logical front. Returns the number removed.
    ///
    /// If `f` panics, the element it was looking at and every element after
    /// it are kept, and the block is left packed.
    pub(crate) fn retain_local<F>(&mut self, f: &mut F) -> usize
    where
        F: FnMut(&T) -> bool,
    {
        let original_len = self.len;
        let mut guard = RetainGuard {
            block: self,
            visited: 0,
            kept: 0,
        };

        while guard.visited < original_len {
            let slot = guard.block.physical(guard.visited);
            let keep = guard.block.slots[slot].as_ref().is_some_and(&mut *f);
            guard.visited += 1;

            if keep {
                let target = guard.block.physical(guard.kept);
                if target != slot {
                    let moved = guard.block.slots[slot].take();
                    guard.block.slots[target] = moved;
                }
                guard.kept += 1;
            } else {
                drop(guard.block.slots[slot].take());
            }
        }

        drop(guard);
        original_len - self.len
    }

    /// Moves every element out, in logical order, leaving the block empty.
    pub(crate) fn drain_into(&mut self, out: &mut std::vec::Vec<T>) {
        for index in 0..self.len {
            let slot = self.physical(index);
            if let Some(value) = self.slots[slot].take() {
                out.push(value);
            }
        }
        self.len = 0;
        self.head = 0;
    }

    /// Empties the block and frees its slot storage.
    ///
    /// A released block has capacity 0 until [`restore`](Self::restore).
    pub(crate) fn release(&mut self) {
        self.reset();
        self.slots.clear();
        self.slots.shrink_to_fit();
    }

    /// Reallocates `capacity` empty slots for a released block.
    pub(crate) fn restore(&mut self, capacity: usize) {
        debug_assert!(self.is_empty());
        self.slots.reserve_exact(capacity.saturating_sub(self.slots.len()));
        while self.slots.len() < capacity {
            self.slots.push(None);
        }
    }

    /// Returns the block to its freshly allocated state.
    pub(crate) fn reset(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
        self.prev = None;
        self.next = None;
    }
}

/// Keeps a block packed when a `retain_local` predicate unwinds.
///
/// Elements from `visited` on were never judged; they slide down behind the
/// `kept` survivors.
struct RetainGuard<'a, T, A: Allocator> {
    block: &'a mut Block<T, A>,
    /// Logical index of the next element to judge
    visited: usize,
    /// Number of survivors packed at the logical front
    kept: usize,
}

impl<T, A: Allocator> Drop for RetainGuard<'_, T, A> {
    fn drop(&mut self) {
        let block = &mut *self.block;
        for index in self.visited..block.len {
            let source = block.physical(index);
            let target = block.physical(self.kept);
            if source != target {
                let moved = block.slots[source].take();
                block.slots[target] = moved;
            }
            self.kept += 1;
        }
        block.len = self.kept;
    }
}
