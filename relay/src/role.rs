use log::error;

use dgr_shared::{ConfigLookup, MASTER_DEST_KEY, MODE_KEY, SLAVE_LISTEN_PORT_KEY};

use crate::error::ConfigError;

/// The part a process plays in the cluster
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoleKind {
    /// Clustering is not configured; the process behaves as an unclustered master
    Disabled,
    /// Owns the authoritative table and broadcasts it every frame
    Master,
    /// Mirrors the master's table
    Slave,
}

impl RoleKind {
    /// Reads `dgr.mode`. Unknown modes are logged and treated as disabled
    pub fn from_config(config: &dyn ConfigLookup) -> Self {
        let Some(mode) = config.lookup(MODE_KEY) else {
            return RoleKind::Disabled;
        };

        match mode.trim() {
            "" => RoleKind::Disabled,
            "master" => RoleKind::Master,
            "slave" => RoleKind::Slave,
            other => {
                error!(
                    "unknown {} '{}', expected 'master' or 'slave'; clustering disabled",
                    MODE_KEY, other
                );
                RoleKind::Disabled
            }
        }
    }

    pub fn is_master(self) -> bool {
        matches!(self, RoleKind::Disabled | RoleKind::Master)
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, RoleKind::Master | RoleKind::Slave)
    }
}

/// Parses `dgr.master.dest` into host/port pairs
pub fn destinations_from_config(
    config: &dyn ConfigLookup,
) -> Result<Vec<(String, u16)>, ConfigError> {
    let Some(value) = config.lookup(MASTER_DEST_KEY) else {
        return Err(ConfigError::MissingDestinations {
            key: MASTER_DEST_KEY,
        });
    };

    let tokens: Vec<&str> = value.split_whitespace().collect();
    if tokens.is_empty() {
        return Err(ConfigError::MissingDestinations {
            key: MASTER_DEST_KEY,
        });
    }
    if tokens.len() % 2 != 0 {
        return Err(ConfigError::OddDestinationTokens {
            key: MASTER_DEST_KEY,
            tokens: tokens.len(),
        });
    }

    tokens
        .chunks_exact(2)
        .map(|pair| Ok((pair[0].to_string(), parse_port(MASTER_DEST_KEY, pair[1])?)))
        .collect()
}

/// Parses `dgr.slave.listenport`
pub fn listen_port_from_config(config: &dyn ConfigLookup) -> Result<u16, ConfigError> {
    let Some(value) = config.lookup(SLAVE_LISTEN_PORT_KEY) else {
        return Err(ConfigError::MissingListenPort {
            key: SLAVE_LISTEN_PORT_KEY,
        });
    };

    let value = value.trim();
    if value.is_empty() {
        return Err(ConfigError::MissingListenPort {
            key: SLAVE_LISTEN_PORT_KEY,
        });
    }
    parse_port(SLAVE_LISTEN_PORT_KEY, value)
}

fn parse_port(key: &'static str, value: &str) -> Result<u16, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidPort {
        key,
        value: value.to_string(),
    })
}
