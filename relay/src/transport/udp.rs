use std::{
    io,
    net::{Ipv4Addr, SocketAddr, UdpSocket},
    time::{Duration, Instant},
};

use log::debug;

use crate::error::SetupError;

use super::{PacketReceiver, PacketSender, RecvError, SendError, Transport};

// one byte more than any datagram, so a full-size frame is never truncated
const RECEIVE_BUFFER_BYTES: usize = 65_536;

/// Transport over the operating system's UDP sockets
#[derive(Clone, Copy, Debug, Default)]
pub struct UdpTransport;

impl Transport for UdpTransport {
    fn open_sender(&self) -> Result<Box<dyn PacketSender>, SetupError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).map_err(|error| {
            SetupError::SocketCreation {
                kind: error.kind(),
                reason: error.to_string(),
            }
        })?;
        debug!("opened send socket on {:?}", socket.local_addr());

        Ok(Box::new(UdpPacketSender::new(socket)))
    }

    fn bind_receiver(&self, port: u16) -> Result<Box<dyn PacketReceiver>, SetupError> {
        let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, port)).map_err(|error| {
            SetupError::Bind {
                port,
                kind: error.kind(),
                reason: error.to_string(),
            }
        })?;
        debug!("bound receive socket on {:?}", socket.local_addr());

        Ok(Box::new(UdpPacketReceiver::new(socket)))
    }
}

pub struct UdpPacketSender {
    socket: UdpSocket,
}

impl UdpPacketSender {
    pub fn new(socket: UdpSocket) -> Self {
        Self { socket }
    }
}

impl PacketSender for UdpPacketSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<usize, SendError> {
        Ok(self.socket.send_to(payload, address)?)
    }
}

pub struct UdpPacketReceiver {
    socket: UdpSocket,
    buffer: Box<[u8]>,
    nonblocking: bool,
}

impl UdpPacketReceiver {
    pub fn new(socket: UdpSocket) -> Self {
        Self {
            socket,
            buffer: vec![0; RECEIVE_BUFFER_BYTES].into_boxed_slice(),
            nonblocking: false,
        }
    }

    fn set_nonblocking(&mut self, nonblocking: bool) -> io::Result<()> {
        if self.nonblocking != nonblocking {
            self.socket.set_nonblocking(nonblocking)?;
            self.nonblocking = nonblocking;
        }
        Ok(())
    }
}

impl PacketReceiver for UdpPacketReceiver {
    fn wait(&mut self, timeout: Duration) -> Result<bool, RecvError> {
        let deadline = Instant::now() + timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                self.set_nonblocking(true)?;
            } else {
                self.set_nonblocking(false)?;
                self.socket.set_read_timeout(Some(remaining))?;
            }

            match self.socket.peek(&mut self.buffer) {
                Ok(_) => return Ok(true),
                // a signal cut the wait short; keep waiting out the deadline
                Err(error) if error.kind() == io::ErrorKind::Interrupted => {
                    if remaining.is_zero() {
                        return Ok(false);
                    }
                }
                Err(error) if is_no_data(&error) => return Ok(false),
                Err(error) => return Err(error.into()),
            }
        }
    }

    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError> {
        self.set_nonblocking(true)?;

        loop {
            match self.socket.recv(&mut self.buffer) {
                Ok(length) => return Ok(Some(&self.buffer[..length])),
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) if is_no_data(&error) => return Ok(None),
                Err(error) => return Err(error.into()),
            }
        }
    }
}

fn is_no_data(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}
