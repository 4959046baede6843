//! Session-scoped name and type dictionaries

use std::borrow::Borrow;
use std::hash::Hash;

use ahash::AHashMap;
use whiteshark_format::{Result, SharkError};

/// Append-only list of first-seen entries addressed by u16 indices
///
/// Encoder and decoder push entries in the same order, so an index written by
/// one side resolves to the same entry on the other.
#[derive(Debug, Clone)]
pub struct Dictionary<T> {
    entries: Vec<T>,
    index: AHashMap<T, u16>,
    capacity: usize,
}

impl<T: Clone + Eq + Hash> Dictionary<T> {
    /// Empty dictionary holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: AHashMap::new(),
            capacity,
        }
    }

    /// Index of `entry`, if it was added before
    pub fn lookup<Q>(&self, entry: &Q) -> Option<u16>
    where
        T: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.index.get(entry).copied()
    }

    /// Append `entry` and return its index
    pub fn push(&mut self, entry: T) -> Result<u16> {
        if self.entries.len() >= self.capacity {
            return Err(SharkError::LimitExceeded(format!(
                "dictionary holds at most {} entries",
                self.capacity
            )));
        }
        let index = u16::try_from(self.entries.len()).map_err(|_| {
            SharkError::LimitExceeded("dictionary index does not fit u16".to_string())
        })?;
        self.index.entry(entry.clone()).or_insert(index);
        self.entries.push(entry);
        Ok(index)
    }

    /// Entry at `index`
    pub fn get(&self, index: u16) -> Result<&T> {
        self.entries
            .get(usize::from(index))
            .ok_or(SharkError::DictionaryIndexOutOfRange {
                index: usize::from(index),
                len: self.entries.len(),
            })
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was added
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
