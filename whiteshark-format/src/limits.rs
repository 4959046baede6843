//! Security limits and configuration

use serde::{Deserialize, Serialize};

use crate::constants::MAX_DICTIONARY_ENTRIES;
use crate::error::{Result, SharkError};

/// Upper bound on elements reserved up front for a container
///
/// Declared counts come from untrusted input, so capacity grows past this
/// only as children actually arrive.
pub const MAX_PREALLOCATED_ITEMS: usize = 1_024;

/// Security limits applied while decoding untrusted streams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Maximum container nesting depth (default: 256)
    pub max_depth: usize,
    /// Maximum declared element/field count of one container (default: 16 Mi)
    pub max_container_len: usize,
    /// Maximum string length in bytes (default: 16 MiB)
    pub max_string_len: usize,
    /// Maximum entries per dictionary (hard: 65,536)
    pub max_dictionary_entries: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 256,
            max_container_len: 16 * 1024 * 1024,
            max_string_len: 16 * 1024 * 1024,
            max_dictionary_entries: MAX_DICTIONARY_ENTRIES,
        }
    }
}

impl Limits {
    /// Reject a nesting depth above the configured maximum
    pub fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(SharkError::LimitExceeded(format!(
                "nesting depth {} exceeds {}",
                depth, self.max_depth
            )));
        }
        Ok(())
    }

    /// Reject a container count above the configured maximum
    pub fn check_container_len(&self, len: usize) -> Result<()> {
        if len > self.max_container_len {
            return Err(SharkError::LimitExceeded(format!(
                "container length {} exceeds {}",
                len, self.max_container_len
            )));
        }
        Ok(())
    }

    /// Reject a string length above the configured maximum
    pub fn check_string_len(&self, len: usize) -> Result<()> {
        if len > self.max_string_len {
            return Err(SharkError::LimitExceeded(format!(
                "string length {} exceeds {}",
                len, self.max_string_len
            )));
        }
        Ok(())
    }

    /// Effective dictionary capacity, never above what u16 indices address
    pub fn dictionary_capacity(&self) -> usize {
        self.max_dictionary_entries.min(MAX_DICTIONARY_ENTRIES)
    }
}
