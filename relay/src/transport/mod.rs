use std::{
    io,
    net::{SocketAddr, ToSocketAddrs},
    time::Duration,
};

use thiserror::Error;

use crate::error::SetupError;

mod udp;

pub use udp::{UdpPacketReceiver, UdpPacketSender, UdpTransport};

/// Error returned by a `PacketSender`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct SendError {
    pub kind: io::ErrorKind,
    pub reason: String,
}

impl From<io::Error> for SendError {
    fn from(error: io::Error) -> Self {
        Self {
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Error returned by a `PacketReceiver`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{reason}")]
pub struct RecvError {
    pub kind: io::ErrorKind,
    pub reason: String,
}

impl From<io::Error> for RecvError {
    fn from(error: io::Error) -> Self {
        Self {
            kind: error.kind(),
            reason: error.to_string(),
        }
    }
}

/// Opens the sockets a role needs
pub trait Transport: Send {
    /// Opens the single socket a master uses to reach every destination
    fn open_sender(&self) -> Result<Box<dyn PacketSender>, SetupError>;

    /// Binds the socket a slave listens on
    fn bind_receiver(&self, port: u16) -> Result<Box<dyn PacketReceiver>, SetupError>;

    /// Resolves a configured host/port pair, preferring an IPv4 address
    fn resolve(&self, host: &str, port: u16) -> Result<SocketAddr, SetupError> {
        let resolution_error = |reason: String| SetupError::AddressResolution {
            host: host.to_string(),
            port,
            reason,
        };

        let addresses: Vec<SocketAddr> = (host, port)
            .to_socket_addrs()
            .map_err(|error| resolution_error(error.to_string()))?
            .collect();

        addresses
            .iter()
            .find(|address| address.is_ipv4())
            .or_else(|| addresses.first())
            .copied()
            .ok_or_else(|| resolution_error("no addresses found".to_string()))
    }
}

/// Sends frames to slaves
pub trait PacketSender: Send {
    /// Sends `payload` as one datagram to `address`, returning how many bytes
    /// the socket accepted
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<usize, SendError>;
}

/// Receives frames from the master
pub trait PacketReceiver: Send {
    /// Blocks until a datagram is queued or `timeout` elapses, returning
    /// whether one is available. A zero timeout polls without blocking
    fn wait(&mut self, timeout: Duration) -> Result<bool, RecvError>;

    /// Pops the next queued datagram without blocking
    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError>;
}
