use crate::{
    Result,
    codec::{self, Persist},
};
use std::io::{BufRead, Read, Write};

/// A last-in first-out stack of strings
///
/// Both persisted formats list the elements from the top down, i.e. in the order they would be
/// popped, and loading restores the same top.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Stack {
    /// Elements, bottom first
    items: Vec<String>,
}

impl Stack {
    /// Creates an empty stack
    #[must_use]
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Pushes `item` on top
    pub fn push(&mut self, item: impl Into<String>) {
        self.items.push(item.into());
    }

    /// Removes and returns the top element
    pub fn pop(&mut self) -> Option<String> {
        self.items.pop()
    }

    /// Returns the top element
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.items.last().map(String::as_str)
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

    /// Returns true if the stack is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Returns the elements in pop order, top first
    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.items.iter().rev().map(String::as_str)
    }

    /// Builds a stack from elements listed top first
    fn from_pop_order(mut top_first: Vec<String>) -> Self {
        top_first.reverse();
        Self { items: top_first }
    }
}

impl Persist for Stack {
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
        let mut staged = Vec::new();
        for _ in 0..count {
            staged.push(codec::read_text_field(reader)?);
        }
        *self = Self::from_pop_order(staged);
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
        let mut staged = Vec::new();
        for _ in 0..count {
            staged.push(codec::read_binary_field(reader)?);
        }
        *self = Self::from_pop_order(staged);
        Ok(())
    }
}
