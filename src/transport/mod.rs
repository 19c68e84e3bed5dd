//! Peer transport seam.
//!
//! The controller owns its transport outright. The transport only keeps a
//! `Weak` handle back to the event handler, so dropping the controller tears
//! the pair down without a reference cycle.

mod zmq;

use std::sync::Weak;

use crate::error::TransportError;

pub use self::zmq::{ZmqEndpointConfig, ZmqPeer};

/// Callbacks a transport delivers to its owner.
pub trait PeerEventHandler: Send + Sync {
    fn on_message(&self, remote_id: &str, data: &[u8]);
    fn on_connection(&self, remote_id: &str, connected: bool);
    fn on_error(&self, remote_id: &str, error_code: i32, error_message: &str);
}

pub trait Transport: Send + Sync {
    fn register_event_handler(&self, handler: Weak<dyn PeerEventHandler>);
    fn start(&self) -> Result<(), TransportError>;
    fn stop(&self);
    fn send(&self, frame: &[u8]) -> Result<(), TransportError>;
}
