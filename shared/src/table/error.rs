use thiserror::Error;

/// Errors that can occur when reading or writing a `VariableTable`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    /// No variable with the requested name has been stored or received
    #[error("Variable '{name}' does not exist in the table")]
    NotFound { name: String },

    /// Destination buffer cannot hold the stored value. The buffer is left untouched
    #[error("Variable '{name}' holds {needed} bytes but the destination buffer only has room for {capacity}")]
    BufferTooSmall {
        name: String,
        needed: usize,
        capacity: usize,
    },

    /// Stored value and destination buffer differ in length
    #[error("Variable '{name}' holds {stored} bytes but {requested} bytes were requested")]
    SizeMismatch {
        name: String,
        stored: usize,
        requested: usize,
    },

    /// Inserting a new name would grow the table past its configured limit
    #[error("Cannot add variable '{name}': table already holds the maximum of {max} variables")]
    CapacityExceeded { name: String, max: usize },

    /// Variable name is longer than the wire format allows
    #[error("Variable name of {length} bytes exceeds the limit of {max} bytes")]
    NameTooLong { length: usize, max: usize },

    /// Value is too large for the 4-byte size field
    #[error("Variable '{name}' value of {size} bytes cannot be described by a 4-byte size field")]
    ValueTooLarge { name: String, size: usize },

    /// Variable name is empty or contains a NUL byte, so it cannot be framed on the wire
    #[error("Variable name '{name}' is empty or contains a NUL byte")]
    InvalidName { name: String },
}
