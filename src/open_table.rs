use crate::{
    Error, Result,
    codec::{self, Persist},
    hash::{polynomial_hash, quadratic_probe},
};
use std::{
    fmt,
    collections::HashMap,
    io::{BufRead, Read, Write},
    mem,
    sync::Arc,
};

/// Capacity used by [`OpenTable::new`] and when a capacity of zero is requested
pub const DEFAULT_CAPACITY: usize = 101;

/// Occupancy, in percent of the capacity, at which inserts start reporting a high load
const DEFAULT_LOAD_FACTOR_THRESHOLD: usize = 70;

/// State of a slot of an [`OpenTable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SlotStatus {
    /// Never used since the last clear; ends every probe sequence
    #[default]
    Empty,
    /// Holds a live key-value pair
    Occupied,
    /// Held a pair that was removed; probing continues past it
    Tombstone,
}

/// A slot holding a key-value pair and its status
#[derive(Debug, Clone, Default)]
struct Slot {
    /// The key, empty unless occupied or tombstoned
    key: String,
    /// The value associated with the key
    value: String,
    /// Whether the slot is empty, occupied or a tombstone
    status: SlotStatus,
}

/// Advisory event raised when an insert starts on a heavily loaded table
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoadFactorWarning {
    /// Occupied slots at the time of the insert
    pub len: usize,
    /// Total number of slots
    pub capacity: usize,
    /// `len / capacity`
    pub load_factor: f64,
}

impl fmt::Display for LoadFactorWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "load factor high: {}/{} slots occupied ({:.2})",
            self.len, self.capacity, self.load_factor
        )
    }
}

/// Callback receiving load-factor warnings
type LoadObserver = Arc<dyn Fn(&LoadFactorWarning) + Send + Sync>;

/// Outcome of walking the probe sequence of a key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// The key is stored at this slot
    Found(usize),
    /// The key is absent and may be stored at this slot
    Vacant(usize),
    /// The key is absent and no free slot was reachable
    Exhausted,
}

/// A fixed-capacity hash table of string pairs using quadratic probing.
///
/// A key hashing to `h` is looked up at `(h + i²) mod capacity` for `i = 0, 1, 2, ...`, at most
/// `capacity` times. Removed pairs leave a tombstone so probe sequences running through the
/// slot keep reaching the keys stored behind it.
///
/// The table never grows. Quadratic probing does not visit every slot of a table whose
/// capacity is not prime, so an insert may fail with [`Error::TableFull`] even though some
/// slots are still free.
///
/// The table can be moved between threads but has no internal synchronization.
#[derive(Clone)]
pub struct OpenTable {
    /// The slots storing the key-value pairs
    slots: Box<[Slot]>,
    /// Number of occupied slots
    size: usize,
    /// Occupancy threshold for load-factor warnings, in percent (1-100)
    load_factor_threshold: usize,
    /// Receives load-factor warnings in addition to the log
    on_high_load: Option<LoadObserver>,
}

impl fmt::Debug for OpenTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenTable")
            .field("slots", &self.slots)
            .field("size", &self.size)
            .field("load_factor_threshold", &self.load_factor_threshold)
            .field("on_high_load", &self.on_high_load.is_some())
            .finish()
    }
}

impl Default for OpenTable {
    fn default() -> Self {
        Self::new()
    }
}

impl OpenTable {
    /// Creates a new `OpenTable` with [`DEFAULT_CAPACITY`] slots
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a new `OpenTable` with exactly `capacity` slots.
    ///
    /// A capacity of zero falls back to [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if capacity == 0 { DEFAULT_CAPACITY } else { capacity };

        Self {
            slots: vec![Slot::default(); capacity].into_boxed_slice(),
            size: 0,
            load_factor_threshold: DEFAULT_LOAD_FACTOR_THRESHOLD,
            on_high_load: None,
        }
    }

    /// Configures the occupancy, in percent, at which inserts report a high load factor
    pub fn set_load_factor_threshold(&mut self, threshold: usize) {
        self.load_factor_threshold = threshold.clamp(1, 100);
    }

    /// Registers a callback invoked with every load-factor warning
    pub fn on_high_load(
        &mut self,
        observer: impl Fn(&LoadFactorWarning) + Send + Sync + 'static,
    ) {
        self.on_high_load = Some(Arc::new(observer));
    }

    /// Returns the slot `key` hashes to, where its probe sequence starts
    #[must_use]
    pub fn home_index(&self, key: &str) -> usize {
        polynomial_hash(key.as_bytes(), self.slots.len())
    }

    /// Walks the probe sequence of `key`.
    ///
    /// Stops at the slot holding `key`, at the first empty slot, or after `capacity` probes.
    /// The first tombstone passed on the way is preferred as insertion point.
    fn probe(&self, key: &str) -> Probe {
        let capacity = self.slots.len();
        let home = self.home_index(key);
        let mut first_tombstone = None;

        for attempt in 0..capacity {
            let index = quadratic_probe(home, attempt, capacity);
            let Some(slot) = self.slots.get(index) else {
                break;
            };

            match slot.status {
                SlotStatus::Empty => return Probe::Vacant(first_tombstone.unwrap_or(index)),
                SlotStatus::Occupied if slot.key == key => return Probe::Found(index),
                SlotStatus::Occupied => {}
                SlotStatus::Tombstone => {
                    if first_tombstone.is_none() {
                        first_tombstone = Some(index);
                    }
                }
            }
        }

        first_tombstone.map_or(Probe::Exhausted, Probe::Vacant)
    }

    /// Reports a high load factor before an insert, never blocking it
    fn check_load(&self) {
        let capacity = self.slots.len();
        if self.size.saturating_mul(100) < capacity.saturating_mul(self.load_factor_threshold) {
            return;
        }

        let warning =
            LoadFactorWarning { len: self.size, capacity, load_factor: self.load_factor() };
        log::warn!("{warning}");
        if let Some(observer) = &self.on_high_load {
            observer(&warning);
        }
    }

    /// Inserts a key-value pair, or replaces the value of an existing key.
    ///
    /// Returns the previous value if the key was already present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TableFull`] if the key is new and no free slot is reachable within
    /// `capacity` probes; the table is left unchanged.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>> {
        self.check_load();

        let key = key.into();
        match self.probe(&key) {
            Probe::Found(index) => {
                let slot = self.slots.get_mut(index).ok_or(Error::TableFull)?;
                Ok(Some(mem::replace(&mut slot.value, value.into())))
            }
            Probe::Vacant(index) => {
                let slot = self.slots.get_mut(index).ok_or(Error::TableFull)?;
                *slot = Slot { key, value: value.into(), status: SlotStatus::Occupied };
                self.size = self.size.saturating_add(1);
                Ok(None)
            }
            Probe::Exhausted => {
                log::warn!("No free slot reachable for key {key:?} in {} slots", self.capacity());
                Err(Error::TableFull)
            }
        }
    }

    /// Retrieves the value stored for `key`
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        match self.probe(key) {
            Probe::Found(index) => self.slots.get(index).map(|slot| slot.value.as_str()),
            Probe::Vacant(_) | Probe::Exhausted => None,
        }
    }

    /// Returns true if `key` is stored in the table
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Removes `key`, leaving a tombstone in its slot, and returns its value
    pub fn remove(&mut self, key: &str) -> Option<String> {
        let Probe::Found(index) = self.probe(key) else {
            return None;
        };

        let slot = self.slots.get_mut(index)?;
        slot.status = SlotStatus::Tombstone;
        self.size = self.size.saturating_sub(1);
        Some(mem::take(&mut slot.value))
    }

    /// Resets every slot to empty, discarding tombstones as well
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = Slot::default();
        }
        self.size = 0;
    }

    /// Returns the keys of all occupied slots in slot order
    pub fn keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.iter().map(|(key, _)| key)
    }

    /// Returns an iterator over the key-value pairs in slot order
    #[must_use]
    #[allow(clippy::iter_without_into_iter)]
    pub fn iter(&self) -> Iter<'_> {
        Iter { slots: self.slots.iter() }
    }

    /// Returns the status of the slot at `index`, or `None` if out of range
    #[must_use]
    pub fn slot_status(&self, index: usize) -> Option<SlotStatus> {
        self.slots.get(index).map(|slot| slot.status)
    }

    /// Returns the number of occupied slots
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if no slot is occupied
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns occupied slots divided by capacity; tombstones do not count
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.slots.len() as f64
    }

    /// Creates an empty table with the same capacity and configuration
    fn empty_like(&self) -> Self {
        let mut table = Self::with_capacity(self.capacity());
        table.load_factor_threshold = self.load_factor_threshold;
        table.on_high_load.clone_from(&self.on_high_load);
        table
    }

    /// Returns the distinct slots visited by the probe sequence of `key`, in probe order
    fn probe_path(&self, key: &str) -> Vec<usize> {
        let capacity = self.capacity();
        let home = self.home_index(key);
        let mut seen = vec![false; capacity];

        (0..capacity)
            .map(|attempt| quadratic_probe(home, attempt, capacity))
            .filter(|&index| seen.get_mut(index).is_some_and(|flag| !mem::replace(flag, true)))
            .collect()
    }

    /// Builds a table of the same capacity and configuration holding `pairs`.
    ///
    /// The pairs are inserted in the given order first. Quadratic probing depends on the
    /// insertion order, so a layout reached through removals may not be reproducible that way;
    /// the pairs are then placed by [`Self::place`] instead.
    fn restore(&self, pairs: &[(String, String)]) -> Result<Self> {
        let mut staged = self.empty_like();
        for (key, value) in pairs {
            match staged.insert(key.as_str(), value.as_str()) {
                Ok(_) => {}
                Err(Error::TableFull) => {
                    log::debug!(
                        "Replaying {} pairs into {} slots failed, searching a placement",
                        pairs.len(),
                        self.capacity()
                    );
                    return self.place(pairs);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(staged)
    }

    /// Assigns every key a distinct slot on its own probe path.
    ///
    /// Finds the assignment by augmenting paths, trying the slots of each key in probe order.
    /// Empty slots probed before a key's slot become tombstones so every key stays reachable.
    /// Later duplicates of a key replace earlier ones, as repeated inserts would.
    fn place(&self, pairs: &[(String, String)]) -> Result<Self> {
        let mut position: HashMap<&str, usize> = HashMap::new();
        let mut unique: Vec<(&str, &str)> = Vec::new();
        for (key, value) in pairs {
            if let Some(entry) = position.get(key.as_str()).and_then(|&i| unique.get_mut(i)) {
                entry.1 = value.as_str();
            } else {
                position.insert(key.as_str(), unique.len());
                unique.push((key.as_str(), value.as_str()));
            }
        }

        let paths: Vec<Vec<usize>> = unique.iter().map(|(key, _)| self.probe_path(key)).collect();
        let mut owners: Vec<Option<usize>> = vec![None; self.capacity()];
        for key in 0..unique.len() {
            let mut visited = vec![false; self.capacity()];
            if !assign(key, &paths, &mut owners, &mut visited) {
                log::warn!("No placement of {} keys fits {} slots", unique.len(), self.capacity());
                return Err(Error::TableFull);
            }
        }

        let mut staged = self.empty_like();
        for (slot, owner) in staged.slots.iter_mut().zip(owners.iter().copied()) {
            if let Some((key, value)) = owner.and_then(|key| unique.get(key)) {
                *slot = Slot {
                    key: (*key).to_owned(),
                    value: (*value).to_owned(),
                    status: SlotStatus::Occupied,
                };
            }
        }
        staged.size = unique.len();

        for (key, path) in paths.iter().enumerate() {
            for &index in path {
                if owners.get(index).copied().flatten() == Some(key) {
                    break;
                }
                let slot = staged.slots.get_mut(index);
                if let Some(slot) = slot.filter(|slot| slot.status == SlotStatus::Empty) {
                    slot.status = SlotStatus::Tombstone;
                }
            }
        }

        Ok(staged)
    }
}

/// Tries to give `key` a slot of its path, moving the owners of taken slots to other slots of
/// their own paths
fn assign(
    key: usize,
    paths: &[Vec<usize>],
    owners: &mut [Option<usize>],
    visited: &mut [bool],
) -> bool {
    let Some(path) = paths.get(key) else {
        return false;
    };

    for &index in path {
        match visited.get_mut(index) {
            Some(seen) if !*seen => *seen = true,
            _ => continue,
        }

        let owner = owners.get(index).copied().flatten();
        let free = match owner {
            None => true,
            Some(other) => assign(other, paths, owners, visited),
        };
        if free {
            if let Some(slot) = owners.get_mut(index) {
                *slot = Some(key);
            }
            return true;
        }
    }

    false
}

/// Iterator over the key-value pairs of an [`OpenTable`]
#[derive(Debug, Clone)]
pub struct Iter<'a> {
    /// Remaining slots
    slots: std::slice::Iter<'a, Slot>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find(|slot| slot.status == SlotStatus::Occupied)
            .map(|slot| (slot.key.as_str(), slot.value.as_str()))
    }
}

impl Persist for OpenTable {
    fn element_count(&self) -> usize {
        self.size
    }

    fn encode_text<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_text_count(writer, self.size)?;
        for (key, value) in self.iter() {
            codec::write_text_field(writer, key)?;
            codec::write_text_field(writer, value)?;
        }
        Ok(())
    }

    fn decode_text<R: BufRead>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_text_count(reader)?;
        let mut pairs = Vec::new();
        for _ in 0..count {
            let key = codec::read_text_field(reader)?;
            let value = codec::read_text_field(reader)?;
            pairs.push((key, value));
        }
        *self = self.restore(&pairs)?;
        log::trace!("Decoded {count} pairs into open table of {} slots", self.capacity());
        Ok(())
    }

    fn encode_binary<W: Write>(&self, writer: &mut W) -> Result<()> {
        codec::write_binary_count(writer, self.size)?;
        for (key, value) in self.iter() {
            codec::write_binary_field(writer, key)?;
            codec::write_binary_field(writer, value)?;
        }
        Ok(())
    }

    fn decode_binary<R: Read>(&mut self, reader: &mut R) -> Result<()> {
        let count = codec::read_binary_count(reader)?;
        let mut pairs = Vec::new();
        for _ in 0..count {
            let key = codec::read_binary_field(reader)?;
            let value = codec::read_binary_field(reader)?;
            pairs.push((key, value));
        }
        *self = self.restore(&pairs)?;
        log::trace!("Decoded {count} pairs into open table of {} slots", self.capacity());
        Ok(())
    }
}
