use std::collections::HashMap;
use std::time::Duration;

use dgr_relay::{DgrContext, RelayConfig};

use crate::LocalNetwork;

/// Installs `env_logger` for the test binary; repeated calls are harmless
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Relay config with timeouts short enough for tests
pub fn fast_relay_config() -> RelayConfig {
    RelayConfig {
        initial_timeout: Duration::from_millis(200),
        staleness_window: Duration::from_millis(100),
        ..RelayConfig::default()
    }
}

/// `dgr.*` keys for a master broadcasting to `ports` on the loopback address
pub fn master_config(ports: &[u16]) -> HashMap<String, String> {
    let dest = ports
        .iter()
        .map(|port| format!("127.0.0.1 {}", port))
        .collect::<Vec<_>>()
        .join(" ");

    let mut config = HashMap::new();
    config.insert("dgr.mode".to_string(), "master".to_string());
    config.insert("dgr.master.dest".to_string(), dest);
    config
}

/// `dgr.*` keys for a slave listening on `port`
pub fn slave_config(port: u16) -> HashMap<String, String> {
    let mut config = HashMap::new();
    config.insert("dgr.mode".to_string(), "slave".to_string());
    config.insert("dgr.slave.listenport".to_string(), port.to_string());
    config
}

/// A master and its slaves wired together over a `LocalNetwork`
pub struct TestCluster {
    pub network: LocalNetwork,
    pub master: DgrContext,
    pub slaves: Vec<DgrContext>,
    pub ports: Vec<u16>,
}

impl TestCluster {
    /// Initializes a master broadcasting to `ports`. Slaves are added with
    /// `connect_slaves` once the master has sent a first frame, since a
    /// slave's `init` waits for one.
    pub fn new(ports: &[u16]) -> Self {
        init_logger();

        let network = LocalNetwork::new();
        let mut master = DgrContext::with_transport(fast_relay_config(), network.transport());
        master.init(&master_config(ports)).unwrap();

        Self {
            network,
            master,
            slaves: Vec::new(),
            ports: ports.to_vec(),
        }
    }

    /// Initializes one slave per configured port
    pub fn connect_slaves(&mut self) {
        for port in &self.ports {
            let mut slave =
                DgrContext::with_transport(fast_relay_config(), self.network.transport());
            slave.init(&slave_config(*port)).unwrap();
            self.slaves.push(slave);
        }
    }

    /// One frame: master sends before its swap, every slave receives after its own
    pub fn frame(&mut self) {
        self.master.pre_swap().unwrap();
        for slave in &mut self.slaves {
            slave.post_swap().unwrap();
        }
    }
}
