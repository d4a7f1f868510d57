//! Serde support: a `BlockList` is a plain sequence on the wire.

use allocator_api2::alloc::Allocator;
use serde::de::{Deserialize, Deserializer, SeqAccess, Visitor};
use serde::ser::{Serialize, Serializer};
use std::fmt;
use std::marker::PhantomData;

use crate::BlockList;

impl<T: Serialize, A: Allocator + Clone> Serialize for BlockList<T, A> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

struct BlockListVisitor<T> {
    marker: PhantomData<fn() -> BlockList<T>>,
}

impl<'de, T: Deserialize<'de>> Visitor<'de> for BlockListVisitor<T> {
    type Value = BlockList<T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a sequence")
    }

    fn visit_seq<S: SeqAccess<'de>>(self, mut seq: S) -> Result<Self::Value, S::Error> {
        let mut list = BlockList::new();
        while let Some(value) = seq.next_element()? {
            list.push_back(value);
        }
        Ok(list)
    }
}

/// Deserializes into a list with the default block capacity.
impl<'de, T: Deserialize<'de>> Deserialize<'de> for BlockList<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_seq(BlockListVisitor {
            marker: PhantomData,
        })
    }
}
