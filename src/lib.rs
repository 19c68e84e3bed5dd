//! A simulated robotic-arm controller for exercising a vision controller.
//!
//! This library provides:
//! - A table-driven router from `(message_id, sub_id, status)` to actions
//! - A connection-aware state machine answering with PROCESSING / COMPLETED
//! - Deterministic synthetic poses for the calibration and charging flows
//! - A single-peer ZMQ transport and the binary frame codec it carries

pub mod cli;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod messaging;
pub mod pose;
pub mod router;
pub mod transport;

pub use config::Config;
pub use controller::{ArmController, ControllerConfig, DeviceState};
pub use error::{AppError, CodecError, Result, RouteError, TransportError};
pub use messaging::{EventState, Frame, MessageKey, MessageType};
pub use pose::{PoseItem, PoseSynthesizer};
pub use router::{RouteAction, RouteTable};
pub use transport::{PeerEventHandler, Transport, ZmqPeer};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the library
///
/// Sets up logging and announces the application start. Call once before
/// creating a controller.
///
/// # Arguments
///
/// * `verbosity` - 0 for info, 1 for debug, 2 or more for trace
/// * `log_file` - Optional path to a log file. If None, logs will only be output to stdout.
pub fn initialize(verbosity: u8, log_file: Option<&str>) -> anyhow::Result<()> {
    logging::setup_logging(verbosity, log_file)?;
    logging::log_app_start(VERSION);
    Ok(())
}
