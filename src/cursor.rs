//! Bidirectional cursor over a `BlockList` that detects outside changes.
//!
//! A [`Cursor`] does not borrow the list. It holds a position and the
//! modification count it last saw, and each call that touches the list
//! first checks that count. Any structural change made through another path
//! makes the cursor fail with [`BlockListError::ConcurrentModification`].
//!
//! # Example
//!
//! ```
//! use block_list::{BlockList, BlockListError};
//!
//! let mut list: BlockList<i32> = (1..=6).collect();
//! let mut cursor = list.cursor();
//! while let Some(&value) = cursor.next(&list).unwrap() {
//!     if value % 2 == 0 {
//!         cursor.remove(&mut list).unwrap();
//!     }
//! }
//! assert_eq!(list.to_vec(), vec![1, 3, 5]);
//!
//! list.push_back(7);
//! assert!(matches!(
//!     cursor.previous(&list),
//!     Err(BlockListError::ConcurrentModification { .. })
//! ));
//! ```

use allocator_api2::alloc::Allocator;

use crate::error::{BlockListError, Result};
use crate::BlockList;

/// A position between two elements of a `BlockList`.
///
/// Created by [`BlockList::cursor`] or [`BlockList::cursor_at`].
#[derive(Clone, Debug)]
pub struct Cursor {
    /// Index of the element `next` would return
    next: usize,
    /// Index of the element last returned by `next` or `previous`
    last: Option<usize>,
    /// Modification count the cursor is in sync with
    expected: u64,
}

impl Cursor {
    pub(crate) fn new(index: usize, expected: u64) -> Self {
        Self {
            next: index,
            last: None,
            expected,
        }
    }

    fn check<T, A: Allocator + Clone>(&self, list: &BlockList<T, A>) -> Result<()> {
        let found = list.modification_count();
        if found != self.expected {
            return Err(BlockListError::ConcurrentModification {
                expected: self.expected,
                found,
            });
        }
        Ok(())
    }

    /// Returns `true` if `next` would return an element.
    pub fn has_next<T, A: Allocator + Clone>(&self, list: &BlockList<T, A>) -> Result<bool> {
        self.check(list)?;
        Ok(self.next < list.len())
    }

    /// Returns `true` if `previous` would return an element.
    #[inline]
    pub fn has_previous(&self) -> bool {
        self.next > 0
    }

    /// Index of the element the next call to `next` returns.
    #[inline]
    pub fn next_index(&self) -> usize {
        self.next
    }

    /// Index of the element the next call to `previous` returns.
    #[inline]
    pub fn previous_index(&self) -> Option<usize> {
        self.next.checked_sub(1)
    }

    /// Advances past the next element and returns it, or `None` at the end.
    #[allow(clippy::should_implement_trait)]
    pub fn next<'a, T, A: Allocator + Clone>(
        &mut self,
        list: &'a BlockList<T, A>,
    ) -> Result<Option<&'a T>> {
        self.check(list)?;
        if self.next >= list.len() {
            return Ok(None);
        }
        let value = list.get(self.next)?;
        self.last = Some(self.next);
        self.next += 1;
        Ok(Some(value))
    }

    /// Steps back over the previous element and returns it, or `None` at
    /// the start.
    pub fn previous<'a, T, A: Allocator + Clone>(
        &mut self,
        list: &'a BlockList<T, A>,
    ) -> Result<Option<&'a T>> {
        self.check(list)?;
        let Some(index) = self.next.checked_sub(1) else {
            return Ok(None);
        };
        let value = list.get(index)?;
        self.next = index;
        self.last = Some(index);
        Ok(Some(value))
    }

    /// Removes the element last returned by `next` or `previous`.
    ///
    /// Fails with `NoCurrentElement` if nothing was returned since the last
    /// `remove` or `insert`.
    pub fn remove<T, A: Allocator + Clone>(&mut self, list: &mut BlockList<T, A>) -> Result<T> {
        self.check(list)?;
        let index = self.last.take().ok_or(BlockListError::NoCurrentElement)?;
        let removed = list.remove(index)?;
        if index < self.next {
            self.next -= 1;
        }
        self.expected = list.modification_count();
        Ok(removed)
    }

    /// Replaces the element last returned by `next` or `previous`.
    pub fn set<T, A: Allocator + Clone>(
        &mut self,
        list: &mut BlockList<T, A>,
        value: T,
    ) -> Result<T> {
        self.check(list)?;
        let index = self.last.ok_or(BlockListError::NoCurrentElement)?;
        list.set(index, value)
    }

    /// Inserts `value` before the cursor, so a following `next` is
    /// unaffected and `previous` returns the new element.
    pub fn insert<T, A: Allocator + Clone>(
        &mut self,
        list: &mut BlockList<T, A>,
        value: T,
    ) -> Result<()> {
        self.check(list)?;
        list.insert(self.next, value)?;
        self.next += 1;
        self.last = None;
        self.expected = list.modification_count();
        Ok(())
    }
}
