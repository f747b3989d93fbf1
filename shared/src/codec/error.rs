use thiserror::Error;

use crate::table::error::TableError;

/// Errors that can occur while decoding a received frame.
///
/// SECURITY: every variant describes untrusted network data. Decoding never
/// reads past the end of the packet and never panics on malformed input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Packet ended before the NUL terminating a variable name
    #[error("Variable name starting at offset {offset} is not NUL-terminated before the end of the packet")]
    UnterminatedName { offset: usize },

    /// Variable name runs past the name length limit (possible malformed or malicious packet)
    #[error("Variable name starting at offset {offset} exceeds {max} bytes (possible malformed or malicious packet)")]
    NameTooLong { offset: usize, max: usize },

    /// Variable name is empty or not valid UTF-8
    #[error("Variable name starting at offset {offset} is empty or not valid UTF-8")]
    InvalidName { offset: usize },

    /// Packet ended inside a record's 4-byte size field
    #[error("Packet ends inside the size field at offset {offset}")]
    TruncatedSize { offset: usize },

    /// Packet ended before the number of payload bytes announced by the size field
    #[error("Record payload at offset {offset} announces {expected} bytes but only {remaining} remain")]
    TruncatedPayload {
        offset: usize,
        expected: usize,
        remaining: usize,
    },

    /// Decoded record could not be stored in the table
    #[error("Table error: {0}")]
    Table(#[from] TableError),
}
