//! # DGR Relay
//! Mirrors a master rendering process's named variables onto the slave
//! processes of a display cluster, one UDP frame per rendered frame.
//!
//! The render loop drives a [`DgrContext`] from two fixed points: `update`
//! with `send` set right before the buffer swap and with `receive` set right
//! after it. Application code reads and writes shared state through
//! `setget`, which stores on the master and loads on slaves.

#![deny(
    trivial_casts,
    trivial_numeric_casts,
    unstable_features,
    unused_import_braces
)]

pub mod transport;
pub mod shared {
    pub use dgr_shared::{
        decode, encode, encoded_len, CodecError, ConfigLookup, Record, TableError,
        VariableTable, MASTER_DEST_KEY, MODE_KEY, SHUTDOWN_KEY, SLAVE_LISTEN_PORT_KEY,
    };
}

mod context;
mod error;
mod failure;
mod role;

pub use context::{DgrContext, RelayConfig, RelayStats};
pub use error::{ConfigError, DgrError, SetupError, TransmitError};
pub use failure::{poison_pill, shutdown_requested, StalenessDetector};
pub use role::{destinations_from_config, listen_port_from_config, RoleKind};
pub use transport::{PacketReceiver, PacketSender, RecvError, SendError, Transport, UdpTransport};
