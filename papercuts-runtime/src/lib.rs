pub mod bridge;
pub mod client;
pub mod config_store;
pub mod dashboard;
pub mod fixtures;
pub mod live;
pub mod mock;

pub use client::{ApiClients, build_clients_from_config, build_clients_with_latency};
pub use config_store::{ConfigStore, resolve_config};
