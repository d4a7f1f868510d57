//! Maps a list-wide index to the block holding it.
//!
//! The walk starts from whichever end of the chain is nearer, so no lookup
//! visits more than about half of the blocks.

use allocator_api2::alloc::Allocator;

use crate::chain::{BlockChain, BlockId};

/// A resolved position: the block and the index within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Location {
    pub(crate) block: BlockId,
    pub(crate) offset: usize,
}

impl<T, A: Allocator + Clone> BlockChain<T, A> {
    /// Resolves `index` in a chain holding `len` elements.
    ///
    /// Returns `None` when `index >= len`.
    pub(crate) fn locate(&self, index: usize, len: usize) -> Option<Location> {
        if index >= len {
            return None;
        }
        if index < len - index {
            self.locate_from_head(index)
        } else {
            self.locate_from_tail(len - 1 - index)
        }
    }

    fn locate_from_head(&self, mut remaining: usize) -> Option<Location> {
        let mut current = self.head();
        while let Some(id) = current {
            let block = self.block(id);
            if remaining < block.len() {
                return Some(Location {
                    block: id,
                    offset: remaining,
                });
            }
            remaining -= block.len();
            current = block.next;
        }
        None
    }

    /// `from_end` counts back from the last element, which is 0.
    fn locate_from_tail(&self, mut from_end: usize) -> Option<Location> {
        let mut current = self.tail();
        while let Some(id) = current {
            let block = self.block(id);
            if from_end < block.len() {
                return Some(Location {
                    block: id,
                    offset: block.len() - 1 - from_end,
                });
            }
            from_end -= block.len();
            current = block.prev;
        }
        None
    }
}
