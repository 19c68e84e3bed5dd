use std::fmt;

use crate::pose::{PoseItem, PoseSynthesizer};

/// High-level device status, driven by connection lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceState {
    #[default]
    Idle,
    Disconnected,
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceState::Idle => f.write_str("DEVICE_IDLE"),
            DeviceState::Disconnected => f.write_str("DEVICE_DISCONNECTED"),
        }
    }
}

/// Everything guarded by the controller's state lock.
#[derive(Debug, Default)]
pub(crate) struct SharedState {
    pub device_state: DeviceState,
    pub active_connection: Option<String>,
    pub last_pose: PoseItem,
    pub synthesizer: PoseSynthesizer,
}

impl SharedState {
    pub fn connect(&mut self, remote_id: &str) {
        self.active_connection = Some(remote_id.to_string());
        self.device_state = DeviceState::Idle;
    }

    /// Returns `false` when `remote_id` is not the active peer.
    pub fn disconnect(&mut self, remote_id: &str) -> bool {
        if self.active_connection.as_deref() != Some(remote_id) {
            return false;
        }
        self.active_connection = None;
        self.device_state = DeviceState::Disconnected;
        true
    }
}
