use serde::Serialize;
use std::fmt;

use super::ids::{message_ids, status, sub_ids};

/// Identity of a request: command family, step within the family, status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageKey {
    pub message_id: u16,
    pub sub_id: u8,
    pub status: u16,
}

impl MessageKey {
    pub fn new(message_id: u16, sub_id: u8, status: u16) -> Self {
        Self {
            message_id,
            sub_id,
            status,
        }
    }

    /// Key under which a step is registered in the route table.
    pub fn processing(message_id: u16, sub_id: u8) -> Self {
        Self::new(message_id, sub_id, status::PROCESSING)
    }

    pub fn event_state(&self) -> EventState {
        EventState::new(self.message_id, self.sub_id, status_byte(self.status))
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // EventState only keeps the low status byte.
        if self.status > 0xFF {
            write!(f, "{} (status 0x{:04X})", self.event_state(), self.status)
        } else {
            write!(f, "{}", self.event_state())
        }
    }
}

fn status_byte(code: u16) -> u8 {
    (code & 0x00FF) as u8
}

/// Packed `(message_id, sub_id, status)` label used for logging.
///
/// Layout: `message_id << 16 | sub_id << 8 | status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventState(u32);

impl EventState {
    pub fn new(message_id: u16, sub_id: u8, status: u8) -> Self {
        Self((u32::from(message_id) << 16) | (u32::from(sub_id) << 8) | u32::from(status))
    }

    pub fn for_status(message_id: u16, sub_id: u8, status: u16) -> Self {
        Self::new(message_id, sub_id, status_byte(status))
    }

    pub fn raw(&self) -> u32 {
        self.0
    }

    pub fn message_id(&self) -> u16 {
        (self.0 >> 16) as u16
    }

    pub fn sub_id(&self) -> u8 {
        ((self.0 >> 8) & 0xFF) as u8
    }

    pub fn status(&self) -> u8 {
        (self.0 & 0xFF) as u8
    }

    /// Human-readable `FAMILY/STEP/STATUS` label.
    pub fn describe(&self) -> String {
        let family = message_ids::name(self.message_id())
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{:04X}", self.message_id()));
        let step = sub_ids::name(self.sub_id())
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{:02X}", self.sub_id()));
        let status = status::name(u16::from(self.status()))
            .map(str::to_string)
            .unwrap_or_else(|| format!("0x{:02X}", self.status()));
        format!("{}/{}/{}", family, step, status)
    }
}

impl fmt::Display for EventState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
