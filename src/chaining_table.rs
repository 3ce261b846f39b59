use crate::{
    BucketList, Result,
    codec::{self, Persist},
    hash::polynomial_hash,
};
use std::io::{BufRead, Read, Write};

/// Number of buckets of a [`ChainingTable`]
pub const TABLE_SIZE: usize = 101;

/// A hash set of string keys resolving collisions by separate chaining.
///
/// Keys are hashed into one of [`TABLE_SIZE`] buckets, each a [`BucketList`]. Inserting always
/// appends, so a key inserted twice is stored twice and has to be removed twice.
///
/// Only keys are stored: the table has no values, which is also why its persisted formats
/// hold keys only.
#[derive(Debug)]
pub struct ChainingTable {
    /// One bucket per hash value
    buckets: Box<[BucketList]>,
    /// Number of stored keys, duplicates included
    size: usize,
}

impl Default for ChainingTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ChainingTable {
    /// Creates an empty table with [`TABLE_SIZE`] buckets
    #[must_use]
    pub fn new() -> Self {
        Self { buckets: (0..TABLE_SIZE).map(|_| BucketList::new()).collect(), size: 0 }
    }

    /// Returns the bucket `key` hashes to
    #[must_use]
    pub fn bucket_index(&self, key: &str) -> usize {
        polynomial_hash(key.as_bytes(), self.buckets.len())
    }

    /// Appends `key` to its bucket
    pub fn insert(&mut self, key: impl Into<String>) {
        let key = key.into();
        let index = self.bucket_index(&key);
        if let Some(bucket) = self.buckets.get_mut(index) {
            bucket.push_back(key);
            self.size = self.size.saturating_add(1);
        }
    }

    /// Returns true if `key` is stored in the table
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.buckets.get(self.bucket_index(key)).is_some_and(|bucket| bucket.contains(key))
    }

    /// Removes one occurrence of `key`.
    ///
    /// Returns false and leaves the count unchanged if the key is absent.
    pub fn remove(&mut self, key: &str) -> bool {
        let index = self.bucket_index(key);
        let removed = self.buckets.get_mut(index).is_some_and(|bucket| bucket.remove_value(key));
        if removed {
            self.size = self.size.saturating_sub(1);
        }
        removed
    }

    /// Empties every bucket
    pub fn clear(&mut self) {
        for bucket in self.buckets.iter_mut() {
            bucket.clear();
        }
        self.size = 0;
    }

    /// Returns the bucket at `index`, or `None` if `index >= TABLE_SIZE`
    #[must_use]
    pub fn bucket(&self, index: usize) -> Option<&BucketList> {
        self.buckets.get(index)
    }

    /// Returns the number of stored keys
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no keys
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns an iterator over the keys, bucket by bucket and in insertion order within a
    /// bucket
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.buckets.iter().flat_map(BucketList::iter)
    }
}

impl<S: Into<String>> Extend<S> for ChainingTable {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for ChainingTable {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut table = Self::new();
        table.extend(iter);
        table
    }
}

impl Persist for ChainingTable {
    fn element_count(&self) -> usize {
        self.size
    }

    fn encode_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_text_count(writer, self.iter().count())?;
        for key in self.iter() {
            codec::write_text_field(writer, key)?;
        }
        Ok(())
    }

    fn decode_text<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_text_count(reader)?;
        let mut staged = Self::new();
        for _ in 0..count {
            staged.insert(codec::read_text_field(reader)?);
        }
        log::trace!("Decoded {count} keys into chaining table");
        *self = staged;
        Ok(())
    }

    fn encode_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_binary_count(writer, self.iter().count())?;
        for key in self.iter() {
            codec::write_binary_field(writer, key)?;
        }
        Ok(())
    }

    fn decode_binary<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_binary_count(reader)?;
        let mut staged = Self::new();
        for _ in 0..count {
            staged.insert(codec::read_binary_field(reader)?);
        }
        log::trace!("Decoded {count} keys into chaining table");
        *self = staged;
        Ok(())
    }
}
