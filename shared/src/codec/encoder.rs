use crate::{codec::size_to_wire, constants::SIZE_FIELD_BYTES, table::variable_table::VariableTable};

/// Serializes every record of `table` into a new frame. An empty table
/// yields an empty frame, which callers must not transmit.
pub fn encode(table: &VariableTable) -> Vec<u8> {
    let mut frame = Vec::with_capacity(encoded_len(table));
    encode_into(table, &mut frame);
    frame
}

/// Serializes `table` into `frame`, replacing its contents. Lets the relay
/// reuse one allocation across frames.
pub fn encode_into(table: &VariableTable, frame: &mut Vec<u8>) {
    frame.clear();
    frame.reserve(encoded_len(table));

    for record in table.iter() {
        frame.extend_from_slice(record.name().as_bytes());
        frame.push(0);
        // the table refuses values whose length does not fit in u32
        frame.extend_from_slice(&size_to_wire(record.size() as u32));
        frame.extend_from_slice(record.bytes());
    }
}

/// Length in bytes of the frame `encode` would produce for `table`
pub fn encoded_len(table: &VariableTable) -> usize {
    table
        .iter()
        .map(|record| record.name().len() + 1 + SIZE_FIELD_BYTES + record.size())
        .sum()
}
