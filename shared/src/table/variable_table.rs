use std::collections::HashMap;

use log::warn;

use crate::constants::{DEFAULT_MAX_VARIABLES, MAX_NAME_BYTES, SHUTDOWN_KEY};

use super::{error::TableError, record::Record};

/// Insertion-ordered set of named byte buffers mirrored from master to slaves.
///
/// Names are matched exactly (case-sensitive) and each name appears at most
/// once. The number of distinct names is bounded by a soft cap; exceeding it
/// yields `TableError::CapacityExceeded` rather than growing further.
/// `SHUTDOWN_KEY` is reserved and always fits, so a full table can still
/// carry the master's shutdown.
pub struct VariableTable {
    records: Vec<Record>,
    index: HashMap<String, usize>,
    max_variables: usize,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::with_max_variables(DEFAULT_MAX_VARIABLES)
    }

    pub fn with_max_variables(max_variables: usize) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            max_variables,
        }
    }

    /// Stores `bytes` under `name`, inserting the name if it is new.
    ///
    /// # Errors
    /// - `TableError::NameTooLong` / `TableError::InvalidName` if the name
    ///   cannot be carried on the wire
    /// - `TableError::ValueTooLarge` if `bytes` cannot be framed on the wire
    /// - `TableError::CapacityExceeded` if `name` is new and the table is full,
    ///   unless `name` is `SHUTDOWN_KEY`
    pub fn set(&mut self, name: &str, bytes: &[u8]) -> Result<(), TableError> {
        validate_name(name)?;
        if u32::try_from(bytes.len()).is_err() {
            return Err(TableError::ValueTooLarge {
                name: name.to_string(),
                size: bytes.len(),
            });
        }

        if let Some(position) = self.index.get(name) {
            self.records[*position].store(bytes);
            return Ok(());
        }

        if self.records.len() >= self.max_variables && name != SHUTDOWN_KEY {
            warn!(
                "cannot add variable '{}': table is full ({} variables)",
                name, self.max_variables
            );
            return Err(TableError::CapacityExceeded {
                name: name.to_string(),
                max: self.max_variables,
            });
        }

        self.index.insert(name.to_string(), self.records.len());
        self.records.push(Record::new(name, bytes));
        Ok(())
    }

    /// Copies the value stored under `name` into the front of `out`, returning
    /// the number of bytes copied. `out` is left untouched on error.
    pub fn get(&self, name: &str, out: &mut [u8]) -> Result<usize, TableError> {
        let Some(bytes) = self.get_bytes(name) else {
            return Err(TableError::NotFound {
                name: name.to_string(),
            });
        };

        if out.len() < bytes.len() {
            return Err(TableError::BufferTooSmall {
                name: name.to_string(),
                needed: bytes.len(),
                capacity: out.len(),
            });
        }

        out[..bytes.len()].copy_from_slice(bytes);
        Ok(bytes.len())
    }

    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.index
            .get(name)
            .map(|position| self.records[*position].bytes())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of variables currently stored
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn max_variables(&self) -> usize {
        self.max_variables
    }

    /// Records in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

impl Default for VariableTable {
    fn default() -> Self {
        Self::new()
    }
}

pub(crate) fn validate_name(name: &str) -> Result<(), TableError> {
    if name.len() > MAX_NAME_BYTES {
        return Err(TableError::NameTooLong {
            length: name.len(),
            max: MAX_NAME_BYTES,
        });
    }
    if name.is_empty() || name.as_bytes().contains(&0) {
        return Err(TableError::InvalidName {
            name: name.to_string(),
        });
    }
    Ok(())
}
