use std::{default::Default, time::Duration};

use dgr_shared::{DEFAULT_MAX_VARIABLES, MAX_DATAGRAM_BYTES};

/// Contains Config properties which will be used by a `DgrContext`
#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Maximum number of distinct variables the table will hold
    pub max_variables: usize,
    /// How long a slave waits for its very first frame, so that slaves may
    /// start before a slow master
    pub initial_timeout: Duration,
    /// How long a slave tolerates silence from a master it has already heard
    /// from before declaring the master dead
    pub staleness_window: Duration,
    /// Largest frame a master will broadcast
    pub max_packet_size: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_variables: DEFAULT_MAX_VARIABLES,
            initial_timeout: Duration::from_secs(30),
            staleness_window: Duration::from_secs(15),
            max_packet_size: MAX_DATAGRAM_BYTES,
        }
    }
}
