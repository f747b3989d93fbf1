use std::{mem, net::SocketAddr, process};

use log::{debug, error, info, trace, warn};

use dgr_shared::{
    decode, encode_into, CodecError, ConfigLookup, TableError, VariableTable, SHUTDOWN_KEY,
};

use crate::{
    error::{DgrError, TransmitError},
    failure::{poison_pill, shutdown_requested, StalenessDetector},
    role::{destinations_from_config, listen_port_from_config, RoleKind},
    transport::{PacketReceiver, PacketSender, Transport, UdpTransport},
    RelayConfig, RelayStats,
};

/// One process's view of the relay: its role, its sockets and the variable
/// table it broadcasts or mirrors.
///
/// Every call takes `&mut self`, so a context is only ever driven from one
/// thread at a time, typically the render thread.
pub struct DgrContext {
    config: RelayConfig,
    transport: Box<dyn Transport>,
    table: VariableTable,
    role: Role,
    stats: RelayStats,
}

enum Role {
    Disabled,
    Master(MasterLink),
    Slave(SlaveLink),
}

struct MasterLink {
    // None when the destination list was unusable; the master then runs
    // without broadcasting
    sender: Option<Box<dyn PacketSender>>,
    destinations: Vec<SocketAddr>,
    frame: Vec<u8>,
}

struct SlaveLink {
    listen_port: u16,
    receiver: Box<dyn PacketReceiver>,
    detector: StalenessDetector,
    latest: Vec<u8>,
}

impl DgrContext {
    /// Create a new, disabled context that will use UDP sockets once
    /// initialized
    pub fn new(config: RelayConfig) -> Self {
        Self::with_transport(config, Box::new(UdpTransport))
    }

    /// Create a new, disabled context that opens its sockets through
    /// `transport`
    pub fn with_transport(config: RelayConfig, transport: Box<dyn Transport>) -> Self {
        let table = VariableTable::with_max_variables(config.max_variables);
        Self {
            config,
            transport,
            table,
            role: Role::Disabled,
            stats: RelayStats::default(),
        }
    }

    /// Reads the cluster topology from `config` and opens the sockets the
    /// configured role needs. May be called again to reconfigure: the table
    /// is cleared and previous sockets are closed.
    ///
    /// A slave blocks here until the master's first frame arrives or the
    /// initial timeout elapses.
    ///
    /// # Errors
    /// - `DgrError::Config` if a slave has no usable listen port
    /// - `DgrError::Setup` if a destination does not resolve or a socket
    ///   cannot be opened
    /// - any error of the slave's first receive
    pub fn init(&mut self, config: &dyn ConfigLookup) -> Result<(), DgrError> {
        self.role = Role::Disabled;
        self.table = VariableTable::with_max_variables(self.config.max_variables);
        self.stats = RelayStats::default();

        match RoleKind::from_config(config) {
            RoleKind::Disabled => {
                debug!("dgr disabled");
            }
            RoleKind::Master => {
                let link = self.open_master(config)?;
                self.role = Role::Master(link);
            }
            RoleKind::Slave => {
                let listen_port = listen_port_from_config(config).map_err(|config_error| {
                    error!("dgr slave cannot start: {}", config_error);
                    config_error
                })?;
                let receiver = self.transport.bind_receiver(listen_port)?;
                info!("dgr slave listening on port {}", listen_port);

                self.role = Role::Slave(SlaveLink {
                    listen_port,
                    receiver,
                    detector: StalenessDetector::new(
                        self.config.initial_timeout,
                        self.config.staleness_window,
                    ),
                    latest: Vec::new(),
                });

                // slaves that start after the master has begun must not
                // render their first frame with an empty table
                self.receive()?;
            }
        }

        Ok(())
    }

    fn open_master(&self, config: &dyn ConfigLookup) -> Result<MasterLink, DgrError> {
        let pairs = match destinations_from_config(config) {
            Ok(pairs) => pairs,
            Err(config_error) => {
                error!("dgr master will not broadcast: {}", config_error);
                return Ok(MasterLink {
                    sender: None,
                    destinations: Vec::new(),
                    frame: Vec::new(),
                });
            }
        };

        let mut destinations = Vec::with_capacity(pairs.len());
        for (host, port) in &pairs {
            let address = self.transport.resolve(host, *port)?;
            debug!("dgr destination {}:{} resolved to {}", host, port, address);
            destinations.push(address);
        }

        // one socket reaches every destination
        let sender = self.transport.open_sender()?;
        info!("dgr master broadcasting to {} slaves", destinations.len());

        Ok(MasterLink {
            sender: Some(sender),
            destinations,
            frame: Vec::new(),
        })
    }

    /// The frame-barrier hook. Call once per rendered frame with `send` set
    /// right before the buffer swap, and once with `receive` set right after
    /// it. A master broadcasts its table on `send`; a slave takes in the
    /// newest frame on `receive`. Does nothing when disabled.
    ///
    /// # Errors
    /// `DgrError::MasterShutdown` when the master announced its termination.
    /// Use `DgrError::is_fatal` to decide whether the process should stop.
    pub fn update(&mut self, send: bool, receive: bool) -> Result<(), DgrError> {
        if send {
            self.send()?;
        }
        if receive {
            self.receive()?;
        }
        Ok(())
    }

    /// `update(true, false)`, for the call site before the buffer swap
    pub fn pre_swap(&mut self) -> Result<(), DgrError> {
        self.update(true, false)
    }

    /// `update(false, true)`, for the call site after the buffer swap
    pub fn post_swap(&mut self) -> Result<(), DgrError> {
        self.update(false, true)
    }

    /// `update`, terminating the process on fatal errors: with status 0 when
    /// the master shut the cluster down, 1 otherwise. A master still
    /// broadcasts its shutdown frame on the way out. Survivable errors are
    /// logged and the frame continues.
    pub fn update_or_exit(&mut self, send: bool, receive: bool) {
        let Err(dgr_error) = self.update(send, receive) else {
            return;
        };

        if !dgr_error.is_fatal() {
            warn!("dgr: {}", dgr_error);
            return;
        }

        if dgr_error == DgrError::MasterShutdown {
            info!("dgr: master shut down the cluster, exiting");
        } else {
            error!("dgr: {}", dgr_error);
        }

        // process::exit skips Drop, so announce a dying master here
        if let Err(shutdown_error) = self.shutdown() {
            error!("dgr: failed to announce shutdown: {}", shutdown_error);
        }
        process::exit(dgr_error.exit_code());
    }

    fn send(&mut self) -> Result<(), DgrError> {
        let Role::Master(link) = &mut self.role else {
            return Ok(());
        };
        link.broadcast(&self.table, self.config.max_packet_size, &mut self.stats)?;
        Ok(())
    }

    fn receive(&mut self) -> Result<(), DgrError> {
        let Role::Slave(link) = &mut self.role else {
            return Ok(());
        };
        link.receive_frame(&mut self.table, &mut self.stats)
    }

    /// On a master, stores `buffer` under `name`. On a slave, overwrites
    /// `buffer` with the value most recently received for `name`. Does
    /// nothing when disabled.
    ///
    /// A slave leaves `buffer` untouched unless the received value has
    /// exactly `buffer.len()` bytes. Errors are logged before being returned.
    pub fn setget(&mut self, name: &str, buffer: &mut [u8]) -> Result<(), TableError> {
        let result = match &self.role {
            Role::Disabled => return Ok(()),
            Role::Master(_) => self.table.set(name, buffer),
            Role::Slave(_) => copy_exact(&self.table, name, buffer),
        };

        if let Err(table_error) = &result {
            warn!("dgr setget: {}", table_error);
        }
        result
    }

    /// Whether this process owns the authoritative state: true for a master
    /// and for a process with clustering disabled
    pub fn is_master(&self) -> bool {
        self.role().is_master()
    }

    /// Whether clustering is configured at all
    pub fn is_enabled(&self) -> bool {
        self.role().is_enabled()
    }

    pub fn role(&self) -> RoleKind {
        match self.role {
            Role::Disabled => RoleKind::Disabled,
            Role::Master(_) => RoleKind::Master,
            Role::Slave(_) => RoleKind::Slave,
        }
    }

    pub fn table(&self) -> &VariableTable {
        &self.table
    }

    pub fn stats(&self) -> RelayStats {
        self.stats
    }

    pub fn config(&self) -> &RelayConfig {
        &self.config
    }

    /// Addresses a master broadcasts to; empty for other roles
    pub fn destinations(&self) -> &[SocketAddr] {
        match &self.role {
            Role::Master(link) => &link.destinations,
            _ => &[],
        }
    }

    /// Port a slave listens on
    pub fn listen_port(&self) -> Option<u16> {
        match &self.role {
            Role::Slave(link) => Some(link.listen_port),
            _ => None,
        }
    }

    /// Logs every variable with its size and buffer address
    pub fn print_list(&self) {
        info!(
            "dgr {:?}: {} of {} variables",
            self.role(),
            self.table.len(),
            self.table.max_variables()
        );
        for (index, record) in self.table.iter().enumerate() {
            info!(
                "dgr {:4}: {} ({} bytes) at {:p}",
                index,
                record.name(),
                record.size(),
                record.bytes().as_ptr()
            );
        }
    }

    /// Ends this process's part in the cluster. A master clears its table and
    /// broadcasts a final frame carrying only `SHUTDOWN_KEY`, telling every
    /// slave to exit. The context is disabled afterwards, so calling this
    /// again does nothing. Also runs on drop.
    pub fn shutdown(&mut self) -> Result<(), DgrError> {
        let Role::Master(mut link) = mem::replace(&mut self.role, Role::Disabled) else {
            return Ok(());
        };

        self.table.clear();
        self.table.set(SHUTDOWN_KEY, &poison_pill())?;
        link.broadcast(&self.table, self.config.max_packet_size, &mut self.stats)?;
        info!(
            "dgr master sent shutdown to {} slaves",
            link.destinations.len()
        );
        Ok(())
    }
}

impl Drop for DgrContext {
    fn drop(&mut self) {
        if let Err(dgr_error) = self.shutdown() {
            error!("dgr: failed to announce shutdown: {}", dgr_error);
        }
    }
}

impl MasterLink {
    fn broadcast(
        &mut self,
        table: &VariableTable,
        max_packet_size: usize,
        stats: &mut RelayStats,
    ) -> Result<(), TransmitError> {
        let Some(sender) = &self.sender else {
            return Ok(());
        };

        encode_into(table, &mut self.frame);
        if self.frame.is_empty() {
            return Ok(());
        }
        if self.frame.len() > max_packet_size {
            return Err(TransmitError::PacketTooLarge {
                size: self.frame.len(),
                max: max_packet_size,
            });
        }

        for address in &self.destinations {
            let sent = sender
                .send(address, &self.frame)
                .map_err(|source| TransmitError::Socket {
                    address: address.to_string(),
                    source,
                })?;
            if sent != self.frame.len() {
                return Err(TransmitError::ShortWrite {
                    address: address.to_string(),
                    sent,
                    expected: self.frame.len(),
                });
            }
            stats.packets_sent += 1;
            stats.bytes_sent += sent as u64;
        }

        stats.frames_sent += 1;
        trace!(
            "dgr sent {} bytes ({} variables) to {} slaves",
            self.frame.len(),
            table.len(),
            self.destinations.len()
        );
        Ok(())
    }
}

impl SlaveLink {
    fn receive_frame(
        &mut self,
        table: &mut VariableTable,
        stats: &mut RelayStats,
    ) -> Result<(), DgrError> {
        if !self.receiver.wait(self.detector.poll_timeout())? {
            return self.detector.check_silence();
        }

        // keep only the newest datagram; older ones describe frames already rendered
        let mut drained: u64 = 0;
        while let Some(payload) = self.receiver.receive()? {
            self.latest.clear();
            self.latest.extend_from_slice(payload);
            drained += 1;
        }
        if drained == 0 {
            return self.detector.check_silence();
        }

        stats.packets_received += drained;
        stats.packets_discarded += drained - 1;
        if drained > 1 {
            debug!("dgr discarded {} superseded frames", drained - 1);
        }

        let decoded = decode(&self.latest, table);
        // a table overflow still came from a well-formed frame, so the master is alive
        if matches!(decoded, Ok(_) | Err(CodecError::Table(_))) {
            self.detector.record_receive();
        }
        if shutdown_requested(table) {
            return Err(DgrError::MasterShutdown);
        }

        let records = decoded?;
        stats.frames_applied += 1;
        trace!(
            "dgr applied {} variables from a {} byte frame",
            records,
            self.latest.len()
        );
        Ok(())
    }
}

fn copy_exact(table: &VariableTable, name: &str, buffer: &mut [u8]) -> Result<(), TableError> {
    let Some(stored) = table.get_bytes(name) else {
        return Err(TableError::NotFound {
            name: name.to_string(),
        });
    };

    if stored.len() > buffer.len() {
        return Err(TableError::BufferTooSmall {
            name: name.to_string(),
            needed: stored.len(),
            capacity: buffer.len(),
        });
    }
    if stored.len() != buffer.len() {
        return Err(TableError::SizeMismatch {
            name: name.to_string(),
            stored: stored.len(),
            requested: buffer.len(),
        });
    }

    buffer.copy_from_slice(stored);
    Ok(())
}
