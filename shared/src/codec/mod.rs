//! Flat wire format for a `VariableTable`.
//!
//! A frame is the concatenation, for every record in insertion order, of the
//! variable name, a NUL byte, the payload length as a 4-byte unsigned integer
//! and the payload itself. There is no header and no trailer: the datagram
//! length delimits the frame.

pub mod decoder;
pub mod encoder;
pub mod error;

cfg_if! {
    if #[cfg(feature = "network_byte_order")]
    {
        pub(crate) fn size_to_wire(size: u32) -> [u8; 4] {
            size.to_be_bytes()
        }

        pub(crate) fn size_from_wire(bytes: [u8; 4]) -> u32 {
            u32::from_be_bytes(bytes)
        }
    }
    else
    {
        // Native order: every node of the cluster must share the master's endianness.
        pub(crate) fn size_to_wire(size: u32) -> [u8; 4] {
            size.to_ne_bytes()
        }

        pub(crate) fn size_from_wire(bytes: [u8; 4]) -> u32 {
            u32::from_ne_bytes(bytes)
        }
    }
}
