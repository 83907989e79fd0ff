pub mod config;
pub mod dashboard;
pub mod metrics;
pub mod pdf;
pub mod settings;
pub mod types;

// Keep the public surface small and intentional.
pub use config::*;
pub use dashboard::*;
pub use metrics::*;
pub use pdf::*;
pub use settings::*;
pub use types::*;
