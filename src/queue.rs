use crate::{
    Result,
    codec::{self, Persist},
};
use std::{
    collections::VecDeque,
    io::{BufRead, Read, Write},
};

/// A first-in first-out queue of strings
///
/// Both persisted formats list the elements front first, the order they would be dequeued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    /// Elements, front first
    items: VecDeque<String>,
}

impl Queue {
    /// Creates an empty queue
    #[must_use]
    pub fn new() -> Self {
        Self { items: VecDeque::new() }
    }

    /// Appends `item` at the back
    pub fn enqueue(&mut self, item: impl Into<String>) {
        self.items.push_back(item.into());
    }

    /// Removes and returns the front element
    pub fn dequeue(&mut self) -> Option<String> {
        self.items.pop_front()
    }

    /// Returns the front element
    #[must_use]
    pub fn front(&self) -> Option<&str> {
        self.items.front().map(String::as_str)
    }

    /// Removes every element
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of elements
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if the queue is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the elements in dequeue order
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().map(String::as_str)
    }
}

impl Persist for Queue {
    fn element_count(&self) -> usize {
        self.len()
    }

    fn encode_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_text_count(writer, self.len())?;
        for item in self.iter() {
            codec::write_text_field(writer, item)?;
        }
        Ok(())
    }

    fn decode_text<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_text_count(reader)?;
        let mut staged = Self::new();
        for _ in 0..count {
            staged.enqueue(codec::read_text_field(reader)?);
        }
        *self = staged;
        Ok(())
    }

    fn encode_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_binary_count(writer, self.len())?;
        for item in self.iter() {
            codec::write_binary_field(writer, item)?;
        }
        Ok(())
    }

    fn decode_binary<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_binary_count(reader)?;
        let mut staged = Self::new();
        for _ in 0..count {
            staged.enqueue(codec::read_binary_field(reader)?);
        }
        *self = staged;
        Ok(())
    }
}
