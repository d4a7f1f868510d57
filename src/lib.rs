//! An unrolled linked list built from fixed-capacity circular-buffer blocks.
//!
//! `BlockList` sits between `Vec` and `LinkedList`: elements live in blocks
//! of `block_capacity` slots, and the blocks form a doubly-linked chain.
//! Inserting or removing in the middle only shuffles elements inside one
//! block, and each block is a ring buffer so that shuffle always moves the
//! shorter side of the gap. Indexed access walks the chain from whichever
//! end is nearer.
//!
//! # Example
//!
//! ```
//! use block_list::BlockList;
//!
//! let mut list: BlockList<i32> = BlockList::with_block_capacity(5).unwrap();
//! for v in [10, 20, 30, 40, 50] {
//!     list.push_back(v);
//! }
//!
//! assert!(list.remove_item(&10));
//! assert!(list.remove_item(&30));
//! assert!(list.remove_item(&50));
//!
//! assert_eq!(list.get(0), Ok(&20));
//! assert_eq!(list.get(1), Ok(&40));
//! assert_eq!(list.len(), 2);
//! ```
//!
//! # Memory Layout
//!
//! Every block owns exactly `block_capacity` slots. A block is allocated
//! when an append finds the tail full, or when an insertion lands in a full
//! block and splits it. A block that a removal drains is unlinked at once;
//! blocks are never merged or rebalanced otherwise, so occupancy may drop
//! well below capacity after heavy removal.
//!
//! # Concurrent Modification
//!
//! Every size-changing operation bumps a modification counter, exposed as
//! [`BlockList::modification_count`]. A [`Cursor`] records the counter and
//! refuses to continue once the list has been changed through any other path.

mod block;
mod chain;
mod config;
mod cursor;
mod error;
mod into_iter;
mod iter;
mod resolve;
#[cfg(feature = "serde")]
mod serde_impl;
mod sort;

use allocator_api2::alloc::{Allocator, Global};
use std::cmp::Ordering;
use std::ops::{Index, IndexMut};
use tracing::trace;

pub use config::{BlockListConfig, DEFAULT_BLOCK_CAPACITY, MIN_BLOCK_CAPACITY};
pub use cursor::Cursor;
pub use error::{BlockListError, ConfigError, Result};
pub use into_iter::IntoIter;
pub use iter::{Iter, IterMut};

use chain::BlockChain;
use resolve::Location;

/// A sequence stored as a chain of fixed-capacity ring-buffer blocks.
///
/// See the [crate documentation](crate) for the layout.
pub struct BlockList<T, A: Allocator + Clone = Global> {
    /// The blocks, head to tail
    chain: BlockChain<T, A>,
    /// Sum of every block's fill count
    len: usize,
    /// Bumped by every structural change
    modifications: u64,
    config: BlockListConfig,
}

impl<T> BlockList<T> {
    /// Creates an empty list with the default block capacity.
    ///
    /// Does not allocate until the first element arrives.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::{BlockList, DEFAULT_BLOCK_CAPACITY};
    /// let list: BlockList<i32> = BlockList::new();
    /// assert!(list.is_empty());
    /// assert_eq!(list.block_capacity(), DEFAULT_BLOCK_CAPACITY);
    /// ```
    #[inline]
    pub fn new() -> Self {
        Self::with_config(BlockListConfig::default())
    }

    /// Creates an empty list whose blocks hold `capacity` elements each.
    ///
    /// Fails with [`BlockListError::InvalidConfiguration`] when `capacity`
    /// is negative or below [`MIN_BLOCK_CAPACITY`].
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// assert!(BlockList::<i32>::with_block_capacity(4).is_ok());
    /// assert!(BlockList::<i32>::with_block_capacity(3).is_err());
    /// assert!(BlockList::<i32>::with_block_capacity(-1).is_err());
    /// ```
    pub fn with_block_capacity(capacity: isize) -> Result<Self> {
        Ok(Self::with_config(BlockListConfig::with_block_capacity(
            capacity,
        )?))
    }

    /// Creates an empty list from a validated configuration.
    #[inline]
    pub fn with_config(config: BlockListConfig) -> Self {
        Self::with_config_in(config, Global)
    }
}

impl<T, A: Allocator + Clone> BlockList<T, A> {
    /// Creates an empty list whose blocks are allocated with `alloc`.
    #[inline]
    pub fn new_in(alloc: A) -> Self {
        Self::with_config_in(BlockListConfig::default(), alloc)
    }

    /// Creates an empty list from `config`, allocating blocks with `alloc`.
    pub fn with_config_in(config: BlockListConfig, alloc: A) -> Self {
        Self {
            chain: BlockChain::new_in(config.block_capacity(), alloc),
            len: 0,
            modifications: 0,
            config,
        }
    }

    /// Returns the number of elements in the list.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if the list contains no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns the number of blocks currently linked.
    #[inline]
    pub fn block_count(&self) -> usize {
        self.chain.block_count()
    }

    /// Returns the number of slots in each block.
    #[inline]
    pub fn block_capacity(&self) -> usize {
        self.config.block_capacity()
    }

    /// Returns the configuration the list was built with.
    #[inline]
    pub fn config(&self) -> BlockListConfig {
        self.config
    }

    /// Returns the structural modification counter.
    ///
    /// The value changes on every push, insert, removal, clear, retain that
    /// removed something, and sort. Replacing an element with
    /// [`set`](Self::set) does not change it.
    #[inline]
    pub fn modification_count(&self) -> u64 {
        self.modifications
    }

    #[inline]
    fn bump(&mut self) {
        self.modifications = self.modifications.wrapping_add(1);
    }

    #[inline]
    fn out_of_range(&self, index: usize) -> BlockListError {
        BlockListError::out_of_range(index, self.len)
    }

    /// Appends an element to the back of the list.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let mut list = BlockList::with_block_capacity(4).unwrap();
    /// for i in 0..9 {
    ///     list.push_back(i);
    /// }
    /// assert_eq!(list.len(), 9);
    /// assert_eq!(list.block_count(), 3);
    /// ```
    pub fn push_back(&mut self, value: T) {
        let tail = match self.chain.tail() {
            Some(tail) if !self.chain.block(tail).is_full() => tail,
            _ => self.chain.append_block(),
        };
        self.chain.block_mut(tail).push_back(value);
        self.len += 1;
        self.bump();
    }

    /// Prepends an element to the front of the list.
    ///
    /// Behaves as `insert(0, value)`: a full head block is split.
    pub fn push_front(&mut self, value: T) {
        match self.chain.head() {
            Some(head) => {
                self.insert_at(
                    Location {
                        block: head,
                        offset: 0,
                    },
                    value,
                );
                self.len += 1;
                self.bump();
            }
            None => self.push_back(value),
        }
    }

    /// Appends every element of `iter`, returning `false` if it was empty.
    ///
    /// The modification counter moves once for the whole batch.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let mut list = BlockList::new();
    /// assert!(!list.append_all(Vec::<i32>::new()));
    /// assert!(list.append_all(0..3));
    /// assert_eq!(list.to_vec(), vec![0, 1, 2]);
    /// ```
    pub fn append_all<I>(&mut self, iter: I) -> bool
    where
        I: IntoIterator<Item = T>,
    {
        let mut tail = self.chain.tail();
        let mut added = false;

        for value in iter {
            let id = match tail {
                Some(id) if !self.chain.block(id).is_full() => id,
                _ => self.chain.append_block(),
            };
            self.chain.block_mut(id).push_back(value);
            tail = Some(id);
            self.len += 1;
            added = true;
        }

        if added {
            self.bump();
        }
        added
    }

    /// Returns a reference to the element at `index`.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::{BlockList, BlockListError};
    /// let mut list = BlockList::new();
    /// list.push_back(7);
    /// assert_eq!(list.get(0), Ok(&7));
    /// assert_eq!(
    ///     list.get(1),
    ///     Err(BlockListError::IndexOutOfRange { index: 1, len: 1 })
    /// );
    /// ```
    #[inline]
    pub fn get(&self, index: usize) -> Result<&T> {
        self.chain
            .locate(index, self.len)
            .and_then(|loc| self.chain.block(loc.block).get(loc.offset))
            .ok_or_else(|| self.out_of_range(index))
    }

    /// Returns a mutable reference to the element at `index`.
    pub fn get_mut(&mut self, index: usize) -> Result<&mut T> {
        let len = self.len;
        let loc = self
            .chain
            .locate(index, len)
            .ok_or_else(|| self.out_of_range(index))?;
        self.chain
            .block_mut(loc.block)
            .get_mut(loc.offset)
            .ok_or_else(|| BlockListError::out_of_range(index, len))
    }

    /// Replaces the element at `index`, returning the old one.
    ///
    /// This is not a structural change.
    pub fn set(&mut self, index: usize, value: T) -> Result<T> {
        let len = self.len;
        let loc = self
            .chain
            .locate(index, len)
            .ok_or_else(|| self.out_of_range(index))?;
        self.chain
            .block_mut(loc.block)
            .set(loc.offset, value)
            .ok_or_else(|| BlockListError::out_of_range(index, len))
    }

    /// Returns the first element, or `None` if empty.
    #[inline]
    pub fn front(&self) -> Option<&T> {
        self.chain.block(self.chain.head()?).get(0)
    }

    /// Returns the first element mutably, or `None` if empty.
    #[inline]
    pub fn front_mut(&mut self) -> Option<&mut T> {
        let head = self.chain.head()?;
        self.chain.block_mut(head).get_mut(0)
    }

    /// Returns the last element, or `None` if empty.
    #[inline]
    pub fn back(&self) -> Option<&T> {
        let block = self.chain.block(self.chain.tail()?);
        block.get(block.len() - 1)
    }

    /// Returns the last element mutably, or `None` if empty.
    #[inline]
    pub fn back_mut(&mut self) -> Option<&mut T> {
        let block = self.chain.block_mut(self.chain.tail()?);
        let last = block.len() - 1;
        block.get_mut(last)
    }

    /// Inserts an element at `index`, shifting everything after it back by one.
    ///
    /// `index == len()` appends. Fails with `IndexOutOfRange` when
    /// `index > len()`.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let mut list: BlockList<i32> = (0..8).collect();
    /// list.insert(3, 100).unwrap();
    /// assert_eq!(list.get(3), Ok(&100));
    /// assert_eq!(list.get(4), Ok(&3));
    /// assert!(list.insert(10, 0).is_err());
    /// ```
    pub fn insert(&mut self, index: usize, value: T) -> Result<()> {
        if index > self.len {
            return Err(self.out_of_range(index));
        }
        if index == self.len {
            self.push_back(value);
            return Ok(());
        }

        let loc = self
            .chain
            .locate(index, self.len)
            .ok_or_else(|| self.out_of_range(index))?;
        self.insert_at(loc, value);
        self.len += 1;
        self.bump();
        Ok(())
    }

    /// Places `value` at a resolved location, splitting a full block.
    ///
    /// The block keeps its lower `ceil(capacity / 2)` elements and a new
    /// successor takes the rest, so the copy is never the larger half.
    /// Both halves then have room, so one overflow creates exactly one block.
    fn insert_at(&mut self, loc: Location, value: T) {
        if !self.chain.block(loc.block).is_full() {
            self.chain
                .block_mut(loc.block)
                .insert_local(loc.offset, value);
            return;
        }

        let keep = self.chain.block_capacity().div_ceil(2);
        let successor = self.chain.insert_after(loc.block);
        self.chain.split_block(loc.block, successor, keep);

        if loc.offset <= keep {
            self.chain
                .block_mut(loc.block)
                .insert_local(loc.offset, value);
        } else {
            self.chain
                .block_mut(successor)
                .insert_local(loc.offset - keep, value);
        }
    }

    /// Removes and returns the element at `index`.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let mut list: BlockList<i32> = (0..5).collect();
    /// assert_eq!(list.remove(1), Ok(1));
    /// assert_eq!(list.to_vec(), vec![0, 2, 3, 4]);
    /// assert!(list.remove(4).is_err());
    /// ```
    pub fn remove(&mut self, index: usize) -> Result<T> {
        let len = self.len;
        let loc = self
            .chain
            .locate(index, len)
            .ok_or_else(|| self.out_of_range(index))?;
        self.remove_at(loc)
            .ok_or_else(|| BlockListError::out_of_range(index, len))
    }

    /// Removes the element at a resolved location, unlinking its block if
    /// that drains it.
    fn remove_at(&mut self, loc: Location) -> Option<T> {
        let block = self.chain.block_mut(loc.block);
        let removed = block.remove_local(loc.offset);
        if block.is_empty() {
            self.chain.unlink(loc.block);
        }
        self.len -= 1;
        self.bump();
        removed
    }

    /// Removes the first element and returns it, or `None` if empty.
    pub fn pop_front(&mut self) -> Option<T> {
        let head = self.chain.head()?;
        self.remove_at(Location {
            block: head,
            offset: 0,
        })
    }

    /// Removes the last element and returns it, or `None` if empty.
    pub fn pop_back(&mut self) -> Option<T> {
        let tail = self.chain.tail()?;
        let offset = self.chain.block(tail).len() - 1;
        self.remove_at(Location {
            block: tail,
            offset,
        })
    }

    /// Clears the list, dropping every element and every block.
    pub fn clear(&mut self) {
        if self.chain.block_count() > 0 {
            trace!(
                blocks = self.chain.block_count(),
                len = self.len,
                "clearing block list"
            );
        }
        self.chain.clear();
        self.len = 0;
        self.bump();
    }

    /// Retains only the elements for which `f` returns `true`.
    ///
    /// Each block is compacted in place and drained blocks are unlinked;
    /// no block is allocated.
    ///
    /// If `f` panics, the elements it had not yet rejected stay in the list
    /// and the list remains usable.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&T) -> bool,
    {
        let mut guard = RecountOnDrop { list: self };
        let mut current = guard.list.chain.head();

        while let Some(id) = current {
            let block = guard.list.chain.block_mut(id);
            block.retain_local(&mut f);
            current = block.next;
        }
    }

    /// Removes every element equal to one in `items`.
    ///
    /// Returns `true` if anything was removed.
    pub fn remove_all(&mut self, items: &[T]) -> bool
    where
        T: PartialEq,
    {
        let before = self.len;
        self.retain(|value| !items.contains(value));
        self.len != before
    }

    /// Removes every element not equal to one in `items`.
    ///
    /// Returns `true` if anything was removed.
    pub fn retain_all(&mut self, items: &[T]) -> bool
    where
        T: PartialEq,
    {
        let before = self.len;
        self.retain(|value| items.contains(value));
        self.len != before
    }

    fn find_first(&self, value: &T) -> Option<(usize, Location)>
    where
        T: PartialEq,
    {
        let mut index = 0;
        for id in self.chain.ids() {
            let block = self.chain.block(id);
            for offset in 0..block.len() {
                if block.get(offset) == Some(value) {
                    return Some((index, Location { block: id, offset }));
                }
                index += 1;
            }
        }
        None
    }

    fn find_last(&self, value: &T) -> Option<(usize, Location)>
    where
        T: PartialEq,
    {
        let mut index = self.len;
        let mut current = self.chain.tail();
        while let Some(id) = current {
            let block = self.chain.block(id);
            for offset in (0..block.len()).rev() {
                index -= 1;
                if block.get(offset) == Some(value) {
                    return Some((index, Location { block: id, offset }));
                }
            }
            current = block.prev;
        }
        None
    }

    /// Returns the index of the first element equal to `value`.
    ///
    /// For `Option` elements a `None` query matches only `None` slots.
    ///
    /// # Example
    ///
    /// ```
    /// use block_list::BlockList;
    /// let list: BlockList<Option<i32>> = [Some(1), None, Some(1), None].into_iter().collect();
    /// assert_eq!(list.index_of(&None), Some(1));
    /// assert_eq!(list.last_index_of(&None), Some(3));
    /// assert_eq!(list.index_of(&Some(2)), None);
    /// ```
    pub fn index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_first(value).map(|(index, _)| index)
    }

    /// Returns the index of the last element equal to `value`.
    pub fn last_index_of(&self, value: &T) -> Option<usize>
    where
        T: PartialEq,
    {
        self.find_last(value).map(|(index, _)| index)
    }

    /// Returns `true` if the list contains an element equal to `value`.
    #[inline]
    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialEq,
    {
        self.find_first(value).is_some()
    }

    /// Removes the first element equal to `value`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove_item(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.find_first(value) {
            Some((_, loc)) => self.remove_at(loc).is_some(),
            None => false,
        }
    }

    /// Removes the last element equal to `value`.
    ///
    /// Returns `true` if an element was removed.
    pub fn remove_last_item(&mut self, value: &T) -> bool
    where
        T: PartialEq,
    {
        match self.find_last(value) {
            Some((_, loc)) => self.remove_at(loc).is_some(),
            None => false,
        }
    }

    /// Copies every element, in order, into a new `Vec`.
    pub fn to_vec(&self) -> Vec<T>
    where
        T: Clone,
    {
        self.iter().cloned().collect()
    }

    /// Returns an iterator over references to the elements.
    #[inline]
    pub fn iter(&self) -> Iter<'_, T, A> {
        Iter::new(&self.chain, self.len)
    }

    /// Returns an iterator over mutable references to the elements.
    #[inline]
    pub fn iter_mut(&mut self) -> IterMut<'_, T> {
        IterMut::new(&mut self.chain, self.len)
    }

    /// Returns a cursor positioned before the first element.
    #[inline]
    pub fn cursor(&self) -> Cursor {
        Cursor::new(0, self.modifications)
    }

    /// Returns a cursor positioned before the element at `index`.
    ///
    /// `index == len()` positions the cursor after the last element.
    pub fn cursor_at(&self, index: usize) -> Result<Cursor> {
        if index > self.len {
            return Err(self.out_of_range(index));
        }
        Ok(Cursor::new(index, self.modifications))
    }
}

/// Unlinks drained blocks and resyncs `len` after blocks were compacted in
/// place, including when the compaction unwinds.
struct RecountOnDrop<'a, T, A: Allocator + Clone> {
    list: &'a mut BlockList<T, A>,
}

impl<T, A: Allocator + Clone> Drop for RecountOnDrop<'_, T, A> {
    fn drop(&mut self) {
        let list = &mut *self.list;
        let mut len = 0;
        let mut current = list.chain.head();

        while let Some(id) = current {
            let block = list.chain.block(id);
            current = block.next;
            if block.is_empty() {
                list.chain.unlink(id);
            } else {
                len += block.len();
            }
        }

        if len != list.len {
            list.len = len;
            list.bump();
        }
    }
}

// Trait implementations
impl<T: Clone, A: Allocator + Clone> Clone for BlockList<T, A> {
    /// Clones into freshly packed blocks of the same capacity.
    fn clone(&self) -> Self {
        let alloc = self.chain.allocator().clone();
        let mut list = Self::with_config_in(self.config, alloc);
        list.append_all(self.iter().cloned());
        list
    }
}

impl<T: PartialEq, A: Allocator + Clone> PartialEq for BlockList<T, A> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<T: Eq, A: Allocator + Clone> Eq for BlockList<T, A> {}

impl<T: PartialOrd, A: Allocator + Clone> PartialOrd for BlockList<T, A> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<T: Ord, A: Allocator + Clone> Ord for BlockList<T, A> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<T: std::hash::Hash, A: Allocator + Clone> std::hash::Hash for BlockList<T, A> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: std::fmt::Debug, A: Allocator + Clone> std::fmt::Debug for BlockList<T, A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<T> Default for BlockList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, A: Allocator + Clone> Index<usize> for BlockList<T, A> {
    type Output = T;

    fn index(&self, index: usize) -> &Self::Output {
        match self.get(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, A: Allocator + Clone> IndexMut<usize> for BlockList<T, A> {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        match self.get_mut(index) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<T, A: Allocator + Clone> Extend<T> for BlockList<T, A> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        self.append_all(iter);
    }
}

impl<'a, T: Clone + 'a, A: Allocator + Clone> Extend<&'a T> for BlockList<T, A> {
    fn extend<I: IntoIterator<Item = &'a T>>(&mut self, iter: I) {
        self.append_all(iter.into_iter().cloned());
    }
}

impl<T> FromIterator<T> for BlockList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut list = Self::new();
        list.append_all(iter);
        list
    }
}

impl<T, A: Allocator + Clone> IntoIterator for BlockList<T, A> {
    type Item = T;
    type IntoIter = IntoIter<T, A>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter::new(self)
    }
}

impl<'a, T, A: Allocator + Clone> IntoIterator for &'a BlockList<T, A> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T, A: Allocator + Clone> IntoIterator for &'a mut BlockList<T, A> {
    type Item = &'a mut T;
    type IntoIter = IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
