use crate::{
    Result,
    codec::{self, Persist},
};
use std::io::{BufRead, Read, Write};

/// A single entry of a bucket
#[derive(Debug)]
struct Node {
    /// The owned key
    key: String,
    /// The next entry in the bucket
    next: Option<Box<Node>>,
}

/// A singly linked list of owned keys.
///
/// Used as the bucket storage of [`ChainingTable`](crate::ChainingTable). Every entry is owned
/// exclusively by its list and dropped when removed or when the list is cleared.
#[derive(Debug, Default)]
pub struct BucketList {
    /// First entry of the list
    head: Option<Box<Node>>,
    /// Number of entries
    len: usize,
}

impl BucketList {
    /// Creates an empty list
    #[must_use]
    pub fn new() -> Self {
        Self { head: None, len: 0 }
    }

    /// Inserts `key` before the first entry
    pub fn push_front(&mut self, key: impl Into<String>) {
        let next = self.head.take();
        self.head = Some(Box::new(Node { key: key.into(), next }));
        self.len = self.len.saturating_add(1);
    }

    /// Appends `key` after the last entry, preserving insertion order
    pub fn push_back(&mut self, key: impl Into<String>) {
        let mut cursor = &mut self.head;
        while let Some(node) = cursor {
            cursor = &mut node.next;
        }
        *cursor = Some(Box::new(Node { key: key.into(), next: None }));
        self.len = self.len.saturating_add(1);
    }

    /// Removes the first entry and returns its key
    pub fn pop_front(&mut self) -> Option<String> {
        let node = self.head.take()?;
        let Node { key, next } = *node;
        self.head = next;
        self.len = self.len.saturating_sub(1);
        Some(key)
    }

    /// Returns the first entry equal to `key`
    #[must_use]
    pub fn find(&self, key: &str) -> Option<&str> {
        self.iter().find(|candidate| *candidate == key)
    }

    /// Returns true if some entry equals `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.find(key).is_some()
    }

    /// Removes the first entry equal to `key`.
    ///
    /// Returns false, leaving the list unchanged, if there is no such entry.
    pub fn remove_value(&mut self, key: &str) -> bool {
        let Some(position) = self.iter().position(|candidate| candidate == key) else {
            return false;
        };
        self.unlink(position).is_some()
    }

    /// Detaches the entry at `position` and relinks its successor
    fn unlink(&mut self, position: usize) -> Option<Box<Node>> {
        let mut cursor = &mut self.head;
        for _ in 0..position {
            cursor = &mut cursor.as_mut()?.next;
        }

        let mut node = cursor.take()?;
        *cursor = node.next.take();
        self.len = self.len.saturating_sub(1);
        Some(node)
    }

    /// Removes every entry
    pub fn clear(&mut self) {
        // Unlink one node at a time so long lists do not recurse on drop
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
        }
        self.len = 0;
    }

    /// Reverses the order of the entries in place
    pub fn reverse(&mut self) {
        let mut reversed = None;
        let mut cursor = self.head.take();
        while let Some(mut node) = cursor {
            cursor = node.next.take();
            node.next = reversed;
            reversed = Some(node);
        }
        self.head = reversed;
    }

    /// Returns the number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the list has no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    /// Returns an iterator over the keys from head to tail
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_> {
        Iter { next: self.head.as_deref() }
    }
}

impl Drop for BucketList {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<S: Into<String>> Extend<S> for BucketList {
    fn extend<T: IntoIterator<Item = S>>(&mut self, iter: T) {
        for key in iter {
            self.push_back(key);
        }
    }
}

impl<S: Into<String>> FromIterator<S> for BucketList {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut list = Self::new();
        list.extend(iter);
        list
    }
}

/// Iterator over the keys of a [`BucketList`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    /// The entry returned next
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.next?;
        self.next = node.next.as_deref();
        Some(&node.key)
    }
}

impl Persist for BucketList {
    fn element_count(&self) -> usize {
        self.len
    }

    fn encode_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_text_count(writer, self.len)?;
        for key in self.iter() {
            codec::write_text_field(writer, key)?;
        }
        Ok(())
    }

    fn decode_text<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_text_count(reader)?;
        let mut staged = Self::new();
        // Pushing at the front and reversing afterwards keeps decoding linear
        for _ in 0..count {
            staged.push_front(codec::read_text_field(reader)?);
        }
        staged.reverse();
        *self = staged;
        Ok(())
    }

    fn encode_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_binary_count(writer, self.len)?;
        for key in self.iter() {
            codec::write_binary_field(writer, key)?;
        }
        Ok(())
    }

    fn decode_binary<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_binary_count(reader)?;
        let mut staged = Self::new();
        for _ in 0..count {
            staged.push_front(codec::read_binary_field(reader)?);
        }
        staged.reverse();
        *self = staged;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &BucketList) -> Vec<&str> {
        list.iter().collect()
    }

    #[test]
    fn test_push_back_preserves_order() {
        let mut list = BucketList::new();
        list.push_back("a");
        list.push_back("b");
        list.push_back("c");

        assert_eq!(keys(&list), vec!["a", "b", "c"]);
        assert_eq!(list.len(), 3);
    }

    #[test]
    fn test_push_front_and_pop_front() {
        let mut list = BucketList::new();
        list.push_front("b");
        list.push_front("a");

        assert_eq!(list.pop_front().as_deref(), Some("a"));
        assert_eq!(list.pop_front().as_deref(), Some("b"));
        assert_eq!(list.pop_front(), None);
        assert!(list.is_empty());
    }

    #[test]
    fn test_find_returns_first_match() {
        let list: BucketList = ["x", "", "y"].into_iter().collect();

        assert_eq!(list.find("y"), Some("y"));
        assert_eq!(list.find(""), Some(""));
        assert_eq!(list.find("z"), None);
    }

    #[test]
    fn test_remove_value() {
        let mut list: BucketList = ["a", "b", "a", "c"].into_iter().collect();

        assert!(list.remove_value("a"));
        assert_eq!(keys(&list), vec!["b", "a", "c"]);

        assert!(list.remove_value("c"));
        assert_eq!(keys(&list), vec!["b", "a"]);

        assert!(!list.remove_value("missing"));
        assert_eq!(list.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut list: BucketList = (0..10).map(|i| i.to_string()).collect();
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);

        list.clear();
        assert!(list.is_empty());
    }

    #[test]
    fn test_reverse() {
        let mut list: BucketList = ["1", "2", "3"].into_iter().collect();
        list.reverse();
        assert_eq!(keys(&list), vec!["3", "2", "1"]);
    }

    #[test]
    fn test_long_list_drops_without_recursion() {
        let mut list = BucketList::new();
        for i in 0..200_000 {
            list.push_front(i.to_string());
        }
        assert_eq!(list.len(), 200_000);
        drop(list);
    }

    #[test]
    fn test_text_round_trip() -> Result<()> {
        let list: BucketList = ["first", " spaced ", ""].into_iter().collect();

        let mut buffer = Vec::new();
        list.encode_text(&mut buffer)?;
        assert_eq!(buffer, b"3\nfirst\n spaced \n\n");

        let mut loaded = BucketList::new();
        loaded.push_back("stale");
        loaded.decode_text(&mut buffer.as_slice())?;
        assert_eq!(keys(&loaded), vec!["first", " spaced ", ""]);
        Ok(())
    }

    #[test]
    fn test_binary_round_trip() -> Result<()> {
        let list: BucketList = ["alpha", "beta"].into_iter().collect();

        let mut buffer = Vec::new();
        list.encode_binary(&mut buffer)?;

        let mut loaded = BucketList::new();
        loaded.decode_binary(&mut buffer.as_slice())?;
        assert_eq!(keys(&loaded), vec!["alpha", "beta"]);
        assert_eq!(loaded.len(), 2);
        Ok(())
    }
}
