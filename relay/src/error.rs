use std::{io, time::Duration};

use thiserror::Error;

use dgr_shared::{CodecError, TableError};

use crate::transport::{RecvError, SendError};

/// Errors in the cluster topology read from configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Master destination list is missing. The master keeps running without broadcasting
    #[error("Configuration key '{key}' is missing; master will not broadcast")]
    MissingDestinations { key: &'static str },

    /// Master destination list does not consist of host/port pairs
    #[error("Configuration key '{key}' must hold alternating host and port tokens, found {tokens} tokens")]
    OddDestinationTokens { key: &'static str, tokens: usize },

    /// A port token could not be parsed as a UDP port
    #[error("Configuration key '{key}' holds invalid port '{value}'")]
    InvalidPort { key: &'static str, value: String },

    /// Slave listen port is missing. A slave cannot run without one
    #[error("Configuration key '{key}' is missing; slave has nowhere to listen")]
    MissingListenPort { key: &'static str },
}

/// Errors opening the sockets a role needs. Always fatal
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    /// Host/port pair did not resolve to any socket address
    #[error("Failed to resolve destination {host}:{port}: {reason}")]
    AddressResolution {
        host: String,
        port: u16,
        reason: String,
    },

    /// The send socket could not be created
    #[error("Failed to create send socket: {reason}")]
    SocketCreation { kind: io::ErrorKind, reason: String },

    /// The receive socket could not be bound to its listen port
    #[error("Failed to bind receive socket to port {port}: {reason}")]
    Bind {
        port: u16,
        kind: io::ErrorKind,
        reason: String,
    },
}

/// Errors broadcasting a frame from the master. Always fatal: a frame that
/// reached only part of the cluster cannot be repaired
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransmitError {
    /// Frame does not fit in a single datagram
    #[error("Frame of {size} bytes exceeds the datagram limit of {max} bytes")]
    PacketTooLarge { size: usize, max: usize },

    /// Socket accepted fewer bytes than the frame holds
    #[error("Short write to {address}: sent {sent} of {expected} bytes")]
    ShortWrite {
        address: String,
        sent: usize,
        expected: usize,
    },

    /// Socket refused the frame
    #[error("Failed to send frame to {address}: {source}")]
    Socket {
        address: String,
        #[source]
        source: SendError,
    },
}

/// Top-level error returned by `DgrContext`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DgrError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Setup error
    #[error("Setup error: {0}")]
    Setup(#[from] SetupError),

    /// Transmit error
    #[error("Transmit error: {0}")]
    Transmit(#[from] TransmitError),

    /// Slave heard nothing from the master for too long; the master is presumed dead
    #[error("No frame received from master within {waited:?} (first receive: {first_receive})")]
    ReceiveTimeout {
        waited: Duration,
        first_receive: bool,
    },

    /// Receive socket error
    #[error("Receive error: {0}")]
    Receive(#[from] RecvError),

    /// Received frame was malformed
    #[error("Decode error: {0}")]
    Decode(#[from] CodecError),

    /// Variable table refused a write the relay itself made
    #[error("Table error: {0}")]
    Table(#[from] TableError),

    /// Master announced its own termination; the slave should exit successfully
    #[error("Master shut down the cluster")]
    MasterShutdown,
}

impl DgrError {
    /// Whether the process should stop. Only a malformed frame is survivable:
    /// the slave keeps its last-known table and waits for the next frame.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, DgrError::Decode(_))
    }

    /// Process exit status for an error that ends the process
    pub fn exit_code(&self) -> i32 {
        match self {
            DgrError::MasterShutdown => 0,
            _ => 1,
        }
    }
}
