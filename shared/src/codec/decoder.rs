use std::str;

use crate::{
    codec::{error::CodecError, size_from_wire},
    constants::{MAX_NAME_BYTES, SIZE_FIELD_BYTES},
    table::variable_table::VariableTable,
};

/// Parses `frame` and upserts every record it carries into `table`,
/// returning the number of records applied.
///
/// SECURITY: `frame` is untrusted network data. The whole frame is validated
/// before anything is written, so a malformed frame leaves `table` untouched.
/// A well-formed frame that overflows the table's capacity is applied up to
/// the record that did not fit.
pub fn decode(frame: &[u8], table: &mut VariableTable) -> Result<usize, CodecError> {
    let records = parse(frame)?;

    for (name, payload) in &records {
        table.set(name, payload)?;
    }

    Ok(records.len())
}

/// Splits `frame` into `(name, payload)` pairs borrowed from the frame
pub fn parse(frame: &[u8]) -> Result<Vec<(&str, &[u8])>, CodecError> {
    let mut records = Vec::new();
    let mut cursor = 0;

    while cursor < frame.len() {
        let record_start = cursor;
        let remaining = &frame[cursor..];

        // bounded NUL search: never look further than the name limit allows
        let search_len = remaining.len().min(MAX_NAME_BYTES + 1);
        let Some(name_len) = remaining[..search_len].iter().position(|byte| *byte == 0) else {
            if search_len == remaining.len() {
                return Err(CodecError::UnterminatedName {
                    offset: record_start,
                });
            }
            return Err(CodecError::NameTooLong {
                offset: record_start,
                max: MAX_NAME_BYTES,
            });
        };

        let name = match str::from_utf8(&remaining[..name_len]) {
            Ok(name) if !name.is_empty() => name,
            _ => {
                return Err(CodecError::InvalidName {
                    offset: record_start,
                })
            }
        };
        cursor += name_len + 1;

        let size_end = cursor + SIZE_FIELD_BYTES;
        if size_end > frame.len() {
            return Err(CodecError::TruncatedSize { offset: cursor });
        }
        let mut size_bytes = [0u8; SIZE_FIELD_BYTES];
        size_bytes.copy_from_slice(&frame[cursor..size_end]);
        let size = size_from_wire(size_bytes) as usize;
        cursor = size_end;

        let available = frame.len() - cursor;
        if size > available {
            return Err(CodecError::TruncatedPayload {
                offset: cursor,
                expected: size,
                remaining: available,
            });
        }

        records.push((name, &frame[cursor..cursor + size]));
        cursor += size;
    }

    Ok(records)
}
