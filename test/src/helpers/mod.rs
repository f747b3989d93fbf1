pub mod cluster;

pub use cluster::{fast_relay_config, init_logger, master_config, slave_config, TestCluster};
