//! The doubly-linked chain of blocks.
//!
//! Blocks live in an arena and refer to their neighbours by [`BlockId`].
//! Up to [`MAX_SPARE_BLOCKS`] unlinked blocks keep their slot storage for
//! the next `append_block` or `insert_after`. Any further unlinked block
//! releases its storage and is retired until an allocation revives it.

use allocator_api2::alloc::{Allocator, Global};
use tracing::trace;

use crate::block::{Block, ValuesMut};

/// Unlinked blocks that keep their slot storage.
const MAX_SPARE_BLOCKS: usize = 4;

/// Index of a block inside the chain's arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct BlockId(usize);

pub(crate) struct BlockChain<T, A: Allocator + Clone = Global> {
    blocks: Vec<Block<T, A>>,
    /// Unlinked blocks with slot storage, reused first
    spare: Vec<BlockId>,
    /// Unlinked blocks whose storage was released
    retired: Vec<BlockId>,
    head: Option<BlockId>,
    tail: Option<BlockId>,
    block_count: usize,
    block_capacity: usize,
    alloc: A,
}

impl<T, A: Allocator + Clone> BlockChain<T, A> {
    pub(crate) fn new_in(block_capacity: usize, alloc: A) -> Self {
        Self {
            blocks: Vec::new(),
            spare: Vec::new(),
            retired: Vec::new(),
            head: None,
            tail: None,
            block_count: 0,
            block_capacity,
            alloc,
        }
    }

    #[inline]
    pub(crate) fn head(&self) -> Option<BlockId> {
        self.head
    }

    #[inline]
    pub(crate) fn tail(&self) -> Option<BlockId> {
        self.tail
    }

    #[inline]
    pub(crate) fn block_count(&self) -> usize {
        self.block_count
    }

    #[inline]
    pub(crate) fn block_capacity(&self) -> usize {
        self.block_capacity
    }

    #[inline]
    pub(crate) fn allocator(&self) -> &A {
        &self.alloc
    }

    #[inline]
    pub(crate) fn block(&self, id: BlockId) -> &Block<T, A> {
        &self.blocks[id.0]
    }

    #[inline]
    pub(crate) fn block_mut(&mut self, id: BlockId) -> &mut Block<T, A> {
        &mut self.blocks[id.0]
    }

    /// Returns two distinct blocks mutably.
    fn pair_mut(&mut self, a: BlockId, b: BlockId) -> (&mut Block<T, A>, &mut Block<T, A>) {
        debug_assert_ne!(a, b);
        if a.0 < b.0 {
            let (low, high) = self.blocks.split_at_mut(b.0);
            (&mut low[a.0], &mut high[0])
        } else {
            let (low, high) = self.blocks.split_at_mut(a.0);
            (&mut high[0], &mut low[b.0])
        }
    }

    fn allocate(&mut self) -> BlockId {
        if let Some(id) = self.spare.pop() {
            trace!(block = id.0, "reusing spare block");
            return id;
        }
        if let Some(id) = self.retired.pop() {
            self.blocks[id.0].restore(self.block_capacity);
            trace!(block = id.0, "restored retired block");
            return id;
        }
        let id = BlockId(self.blocks.len());
        self.blocks
            .push(Block::new_in(self.block_capacity, self.alloc.clone()));
        trace!(
            block = id.0,
            capacity = self.block_capacity,
            "allocated block"
        );
        id
    }

    /// Links a new empty block after the tail and returns it.
    pub(crate) fn append_block(&mut self) -> BlockId {
        match self.tail {
            Some(tail) => self.insert_after(tail),
            None => {
                let id = self.allocate();
                self.head = Some(id);
                self.tail = Some(id);
                self.block_count = 1;
                id
            }
        }
    }

    /// Links a new empty block directly after `at` and returns it.
    pub(crate) fn insert_after(&mut self, at: BlockId) -> BlockId {
        let id = self.allocate();
        let next = self.blocks[at.0].next;

        {
            let block = &mut self.blocks[id.0];
            block.prev = Some(at);
            block.next = next;
        }
        self.blocks[at.0].next = Some(id);

        match next {
            Some(next) => self.blocks[next.0].prev = Some(id),
            None => self.tail = Some(id),
        }

        self.block_count += 1;
        id
    }

    /// Moves the elements of `from` starting at local index `at` into the
    /// empty block `to`.
    pub(crate) fn split_block(&mut self, from: BlockId, to: BlockId, at: usize) {
        let (source, target) = self.pair_mut(from, to);
        debug_assert!(target.is_empty());
        source.move_tail_into(at, target);
        trace!(from = from.0, to = to.0, at, "split block");
    }

    /// Removes an emptied block from the chain and keeps it for reuse.
    pub(crate) fn unlink(&mut self, id: BlockId) {
        let (prev, next) = {
            let block = &self.blocks[id.0];
            debug_assert!(block.is_empty());
            (block.prev, block.next)
        };

        match prev {
            Some(prev) => self.blocks[prev.0].next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.blocks[next.0].prev = prev,
            None => self.tail = prev,
        }

        if self.spare.len() < MAX_SPARE_BLOCKS {
            self.blocks[id.0].reset();
            self.spare.push(id);
        } else {
            self.blocks[id.0].release();
            self.retired.push(id);
            trace!(block = id.0, "released block storage");
        }
        self.block_count -= 1;
        trace!(block = id.0, remaining = self.block_count, "unlinked block");
    }

    /// Drops every block.
    pub(crate) fn clear(&mut self) {
        self.blocks.clear();
        self.spare.clear();
        self.retired.clear();
        self.head = None;
        self.tail = None;
        self.block_count = 0;
    }

    /// Borrows each linked block's elements mutably, in chain order.
    pub(crate) fn values_mut(&mut self) -> Vec<ValuesMut<'_, T>> {
        let mut by_id: Vec<Option<&mut Block<T, A>>> =
            self.blocks.iter_mut().map(Some).collect();
        let mut pieces = Vec::with_capacity(self.block_count);
        let mut current = self.head;
        while let Some(id) = current {
            let Some(block) = by_id[id.0].take() else {
                break;
            };
            current = block.next;
            pieces.push(block.values_mut());
        }
        pieces
    }

    /// Iterates block ids from head to tail.
    pub(crate) fn ids(&self) -> BlockIds<'_, T, A> {
        BlockIds {
            chain: self,
            next: self.head,
        }
    }
}

pub(crate) struct BlockIds<'a, T, A: Allocator + Clone> {
    chain: &'a BlockChain<T, A>,
    next: Option<BlockId>,
}

impl<T, A: Allocator + Clone> Iterator for BlockIds<'_, T, A> {
    type Item = BlockId;

    #[inline]
    fn next(&mut self) -> Option<BlockId> {
        let id = self.next?;
        self.next = self.chain.block(id).next;
        Some(id)
    }
}
