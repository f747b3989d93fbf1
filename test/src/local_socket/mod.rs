/// In-memory transport for E2E testing
/// Routes frames between master and slave contexts without network I/O

use std::collections::{HashMap, HashSet, VecDeque};
use std::io;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant};

use dgr_relay::{PacketReceiver, PacketSender, RecvError, SendError, SetupError, Transport};

#[derive(Default)]
struct NetworkState {
    // datagrams queued per destination port; frames sent to a port nobody
    // has bound yet are held until it is bound
    queues: HashMap<u16, VecDeque<Vec<u8>>>,
    bound: HashSet<u16>,
    sent: Vec<(SocketAddr, usize)>,
    short_write: Option<usize>,
    refuse_sends: bool,
}

/// Shared in-memory "network" that any number of contexts can attach to
#[derive(Clone, Default)]
pub struct LocalNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl LocalNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport attached to this network, to hand to `DgrContext::with_transport`
    pub fn transport(&self) -> Box<dyn Transport> {
        Box::new(LocalTransport {
            network: self.clone(),
        })
    }

    /// Queues a raw datagram for whoever listens on `port`
    pub fn inject(&self, port: u16, payload: &[u8]) {
        self.lock()
            .queues
            .entry(port)
            .or_default()
            .push_back(payload.to_vec());
    }

    /// Number of datagrams waiting for `port`
    pub fn pending(&self, port: u16) -> usize {
        self.lock().queues.get(&port).map_or(0, VecDeque::len)
    }

    /// Copies of the datagrams waiting for `port`, oldest first
    pub fn peek_all(&self, port: u16) -> Vec<Vec<u8>> {
        self.lock()
            .queues
            .get(&port)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every send so far, as (destination, bytes requested)
    pub fn sent(&self) -> Vec<(SocketAddr, usize)> {
        self.lock().sent.clone()
    }

    /// Makes every subsequent send accept at most `limit` bytes
    pub fn set_short_write(&self, limit: Option<usize>) {
        self.lock().short_write = limit;
    }

    /// Makes every subsequent send fail
    pub fn set_refuse_sends(&self, refuse: bool) {
        self.lock().refuse_sends = refuse;
    }

    fn lock(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().unwrap()
    }
}

struct LocalTransport {
    network: LocalNetwork,
}

impl Transport for LocalTransport {
    fn open_sender(&self) -> Result<Box<dyn PacketSender>, SetupError> {
        Ok(Box::new(LocalSender {
            network: self.network.clone(),
        }))
    }

    fn bind_receiver(&self, port: u16) -> Result<Box<dyn PacketReceiver>, SetupError> {
        let mut state = self.network.lock();
        if !state.bound.insert(port) {
            return Err(SetupError::Bind {
                port,
                kind: io::ErrorKind::AddrInUse,
                reason: "port already bound on the local network".to_string(),
            });
        }
        state.queues.entry(port).or_default();

        Ok(Box::new(LocalReceiver {
            network: self.network.clone(),
            port,
            current_payload: None,
        }))
    }
}

struct LocalSender {
    network: LocalNetwork,
}

impl PacketSender for LocalSender {
    fn send(&self, address: &SocketAddr, payload: &[u8]) -> Result<usize, SendError> {
        let mut state = self.network.lock();
        if state.refuse_sends {
            return Err(SendError {
                kind: io::ErrorKind::ConnectionRefused,
                reason: "local network refused the datagram".to_string(),
            });
        }
        state.sent.push((*address, payload.len()));

        let accepted = state
            .short_write
            .map_or(payload.len(), |limit| limit.min(payload.len()));
        state
            .queues
            .entry(address.port())
            .or_default()
            .push_back(payload[..accepted].to_vec());
        Ok(accepted)
    }
}

struct LocalReceiver {
    network: LocalNetwork,
    port: u16,
    current_payload: Option<Vec<u8>>,
}

impl PacketReceiver for LocalReceiver {
    fn wait(&mut self, timeout: Duration) -> Result<bool, RecvError> {
        let deadline = Instant::now() + timeout;
        loop {
            if self.network.pending(self.port) > 0 {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            thread::sleep(Duration::from_millis(1));
        }
    }

    fn receive(&mut self) -> Result<Option<&[u8]>, RecvError> {
        let packet = self
            .network
            .lock()
            .queues
            .get_mut(&self.port)
            .and_then(VecDeque::pop_front);

        match packet {
            Some(payload) => {
                self.current_payload = Some(payload);
                Ok(self.current_payload.as_deref())
            }
            None => Ok(None),
        }
    }
}

impl Drop for LocalReceiver {
    fn drop(&mut self) {
        self.network.lock().bound.remove(&self.port);
    }
}
