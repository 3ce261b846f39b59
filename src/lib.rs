//! # Bucketry
//!
//! String hash tables with two collision-resolution strategies, and byte-exact persistence.
//!
//! This crate provides two hash tables:
//!
//! - `ChainingTable`: a key set of 101 buckets, each a singly linked `BucketList`
//! - `OpenTable`: a fixed-capacity key-value table using quadratic probing and tombstones
//!
//! Every container, including the `Stack` and `Queue` helpers, implements [`Persist`] and can
//! be saved to and restored from a line-oriented text format or a length-prefixed binary
//! format.
//!
//! ## Basic Usage
//!
//! ```rust
//! use bucketry::OpenTable;
//!
//! // Create a table with the default 101 slots
//! let mut table = OpenTable::new();
//!
//! // Insert values
//! table.insert("apple", "red")?;
//! table.insert("banana", "yellow")?;
//!
//! // Retrieve values
//! assert_eq!(table.get("apple"), Some("red"));
//!
//! // Removing leaves a tombstone, later keys stay reachable
//! table.remove("apple");
//! assert_eq!(table.get("apple"), None);
//! assert_eq!(table.get("banana"), Some("yellow"));
//! # Ok::<(), bucketry::Error>(())
//! ```
//!
//! ## Persistence
//!
//! ```rust
//! use bucketry::{ChainingTable, Persist};
//!
//! let mut table = ChainingTable::new();
//! for i in 0..200 {
//!     table.insert(i.to_string());
//! }
//!
//! let mut buffer = Vec::new();
//! table.encode_binary(&mut buffer)?;
//!
//! let mut restored = ChainingTable::new();
//! restored.decode_binary(&mut buffer.as_slice())?;
//! assert!(restored.contains("199"));
//! assert_eq!(restored.len(), 200);
//! # Ok::<(), bucketry::Error>(())
//! ```

/// Singly linked bucket list
mod bucket_list;
/// Hash table with separate chaining
mod chaining_table;
/// Text and binary persistence
mod codec;
/// Crate error type
mod error;
/// Rolling hash and probe sequence
mod hash;
/// Hash table with quadratic-probe open addressing
mod open_table;
/// FIFO queue
mod queue;
/// LIFO stack
mod stack;

pub use bucket_list::BucketList;
pub use chaining_table::{ChainingTable, TABLE_SIZE};
pub use codec::Persist;
pub use error::{Error, Result};
pub use hash::polynomial_hash;
pub use open_table::{DEFAULT_CAPACITY, LoadFactorWarning, OpenTable, SlotStatus};
pub use queue::Queue;
pub use stack::Stack;

/// Iterators returned by the containers
pub mod iter {
    pub use crate::bucket_list::Iter as BucketIter;
    pub use crate::open_table::Iter as OpenTableIter;
}
