//! Owning iterator for `BlockList`.

use allocator_api2::alloc::{Allocator, Global};
use std::fmt;
use std::iter::FusedIterator;

use crate::BlockList;

/// An owning iterator over elements of a `BlockList`.
///
/// This struct is created by the `into_iter` method on `BlockList`
/// (provided by the [`IntoIterator`] trait). Each step pops from the
/// corresponding end, so blocks are released as soon as they are drained.
pub struct IntoIter<T, A: Allocator + Clone = Global> {
    list: BlockList<T, A>,
}

impl<T, A: Allocator + Clone> IntoIter<T, A> {
    #[inline]
    pub(crate) fn new(list: BlockList<T, A>) -> Self {
        Self { list }
    }
}

impl<T, A: Allocator + Clone> Iterator for IntoIter<T, A> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.list.pop_front()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.list.len();
        (remaining, Some(remaining))
    }

    #[inline]
    fn count(self) -> usize {
        self.list.len()
    }
}

impl<T, A: Allocator + Clone> DoubleEndedIterator for IntoIter<T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        self.list.pop_back()
    }
}

impl<T, A: Allocator + Clone> ExactSizeIterator for IntoIter<T, A> {}

impl<T, A: Allocator + Clone> FusedIterator for IntoIter<T, A> {}

impl<T: fmt::Debug, A: Allocator + Clone> fmt::Debug for IntoIter<T, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("IntoIter").field(&self.list).finish()
    }
}
