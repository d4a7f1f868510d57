//! Iterator implementations for `BlockList`.

use allocator_api2::alloc::{Allocator, Global};
use std::iter::{Flatten, FusedIterator};

use crate::block::ValuesMut;
use crate::chain::{BlockChain, BlockId};

/// An iterator over references to elements of a `BlockList`.
///
/// Walks the chain directly from both ends; creating one does not allocate.
pub struct Iter<'a, T, A: Allocator + Clone = Global> {
    chain: &'a BlockChain<T, A>,
    /// Block holding the next front element
    front: Option<BlockId>,
    /// Index within `front` of the next front element
    front_offset: usize,
    /// Block holding the next back element
    back: Option<BlockId>,
    /// Exclusive end within `back`
    back_end: usize,
    /// Elements not yet yielded from either end
    remaining: usize,
}

impl<'a, T, A: Allocator + Clone> Iter<'a, T, A> {
    pub(crate) fn new(chain: &'a BlockChain<T, A>, len: usize) -> Self {
        let back = chain.tail();
        Self {
            chain,
            front: chain.head(),
            front_offset: 0,
            back,
            back_end: back.map_or(0, |id| chain.block(id).len()),
            remaining: len,
        }
    }
}

impl<'a, T, A: Allocator + Clone> Iterator for Iter<'a, T, A> {
    type Item = &'a T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let chain: &'a BlockChain<T, A> = self.chain;
        let block = chain.block(self.front?);
        let item = block.get(self.front_offset);

        self.front_offset += 1;
        if self.front_offset == block.len() {
            self.front = block.next;
            self.front_offset = 0;
        }
        self.remaining -= 1;
        item
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T, A: Allocator + Clone> DoubleEndedIterator for Iter<'_, T, A> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let chain = self.chain;
        let block = chain.block(self.back?);

        self.back_end -= 1;
        let item = block.get(self.back_end);

        if self.back_end == 0 {
            self.back = block.prev;
            self.back_end = self.back.map_or(0, |id| chain.block(id).len());
        }
        self.remaining -= 1;
        item
    }
}

impl<T, A: Allocator + Clone> ExactSizeIterator for Iter<'_, T, A> {}

impl<T, A: Allocator + Clone> FusedIterator for Iter<'_, T, A> {}

impl<T, A: Allocator + Clone> Clone for Iter<'_, T, A> {
    fn clone(&self) -> Self {
        Self { ..*self }
    }
}

/// An iterator over mutable references to elements of a `BlockList`.
///
/// Borrows each block's occupied slots up front, so creating one allocates
/// a small vector with an entry per block.
pub struct IterMut<'a, T> {
    inner: Flatten<std::vec::IntoIter<ValuesMut<'a, T>>>,
    remaining: usize,
}

impl<'a, T> IterMut<'a, T> {
    pub(crate) fn new<A: Allocator + Clone>(chain: &'a mut BlockChain<T, A>, len: usize) -> Self {
        Self {
            inner: chain.values_mut().into_iter().flatten(),
            remaining: len,
        }
    }
}

impl<'a, T> Iterator for IterMut<'a, T> {
    type Item = &'a mut T;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let item = self.inner.next()?;
        self.remaining -= 1;
        Some(item)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> DoubleEndedIterator for IterMut<'_, T> {
    #[inline]
    fn next_back(&mut self) -> Option<Self::Item> {
        let item = self.inner.next_back()?;
        self.remaining -= 1;
        Some(item)
    }
}

impl<T> ExactSizeIterator for IterMut<'_, T> {}

impl<T> FusedIterator for IterMut<'_, T> {}
