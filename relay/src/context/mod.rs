mod dgr_context;
mod relay_config;
mod relay_stats;

pub use dgr_context::DgrContext;
pub use relay_config::RelayConfig;
pub use relay_stats::RelayStats;
