// Wire & table limits

/// Longest variable name (in bytes, excluding the NUL terminator) that may be
/// stored in a table or accepted off the wire.
pub const MAX_NAME_BYTES: usize = 1023;

/// Width of the per-record size field on the wire.
pub const SIZE_FIELD_BYTES: usize = 4;

/// Largest payload a single UDP datagram can carry over IPv4.
pub const MAX_DATAGRAM_BYTES: usize = 65_507;

/// Default soft cap on the number of variables a table will hold.
pub const DEFAULT_MAX_VARIABLES: usize = 1024;

/// Reserved key a master sets when it terminates. Slaves that decode a frame
/// carrying this key with a nonzero value shut themselves down.
pub const SHUTDOWN_KEY: &str = "!!!dgr_died!!!";

// Configuration keys

pub const MODE_KEY: &str = "dgr.mode";
pub const MASTER_DEST_KEY: &str = "dgr.master.dest";
pub const SLAVE_LISTEN_PORT_KEY: &str = "dgr.slave.listenport";
