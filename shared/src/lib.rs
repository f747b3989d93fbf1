//! # DGR Shared
//! Variable table and wire codec shared by the master & slave sides of the
//! datagram relay.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

#[macro_use]
extern crate cfg_if;

mod codec;
mod config;
mod constants;
mod table;

pub use codec::{
    decoder::{decode, parse},
    encoder::{encode, encode_into, encoded_len},
    error::CodecError,
};
pub use config::ConfigLookup;
pub use constants::{
    DEFAULT_MAX_VARIABLES, MASTER_DEST_KEY, MAX_DATAGRAM_BYTES, MAX_NAME_BYTES, MODE_KEY,
    SHUTDOWN_KEY, SIZE_FIELD_BYTES, SLAVE_LISTEN_PORT_KEY,
};
pub use table::{error::TableError, record::Record, variable_table::VariableTable};
