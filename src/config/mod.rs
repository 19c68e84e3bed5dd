mod loader;

pub use loader::{Config, LoggingConfig, NetworkConfig, SimulationConfig};
