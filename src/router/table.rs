use log::debug;
use serde::Serialize;
use std::collections::HashMap;

use crate::error::RouteError;
use crate::messaging::{message_ids, sub_ids, Frame, MessageKey};

/// What the controller does when a registered request arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteAction {
    /// Acknowledge with PROCESSING, act, then send COMPLETED with a pose.
    TwoPhase,
    /// Acknowledge with PROCESSING, then enter manual monitoring mode.
    ManualMonitor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    pub key: MessageKey,
    pub action: RouteAction,
}

/// Decoded request paired with the action registered for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutedMessage {
    pub frame: Frame,
    pub action: RouteAction,
}

impl RoutedMessage {
    pub fn key(&self) -> MessageKey {
        self.frame.key()
    }
}

struct Flow {
    message_id: u16,
    steps: &'static [u8],
    action: RouteAction,
}

const FLOWS: &[Flow] = &[
    Flow {
        message_id: message_ids::START_CHARGING,
        steps: &[
            sub_ids::DEVICE_SELF_CHECK,
            sub_ids::OPEN_COVER,
            sub_ids::ARM_MOVING_TO_INIT_POSITION,
            sub_ids::ARM_MOVING_TO_TARGET_POSITION,
            sub_ids::PATH_PLANNING,
            sub_ids::CHARGING_INSERTION,
            sub_ids::CONNECTION_VERIFICATION,
        ],
        action: RouteAction::TwoPhase,
    },
    Flow {
        message_id: message_ids::CALIBRATION,
        steps: &[
            sub_ids::DEVICE_SELF_CHECK,
            sub_ids::IDLE,
            sub_ids::OPEN_COVER,
            sub_ids::ARM_MOVING_TO_INIT_POSITION,
            sub_ids::ARM_MOVING_TO_CALIB_POSITION,
        ],
        action: RouteAction::TwoPhase,
    },
    Flow {
        message_id: message_ids::RESET,
        steps: &[
            sub_ids::IDLE,
            sub_ids::CHARGING_REMOVAL,
            sub_ids::ARM_MOVING_TO_RESET_POSITION,
            sub_ids::CLOSE_COVER,
        ],
        action: RouteAction::TwoPhase,
    },
    Flow {
        message_id: message_ids::EMERGENCY_STOP,
        steps: &[sub_ids::IDLE],
        action: RouteAction::TwoPhase,
    },
    Flow {
        message_id: message_ids::EMERGENCY_STOP_RECOVERY,
        steps: &[sub_ids::IDLE],
        action: RouteAction::TwoPhase,
    },
    Flow {
        message_id: message_ids::MANUAL_REMOTE_CONTROL,
        steps: &[sub_ids::IDLE],
        action: RouteAction::ManualMonitor,
    },
];

/// Immutable mapping from PROCESSING request keys to their action.
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: HashMap<MessageKey, RouteAction>,
}

impl RouteTable {
    pub fn build() -> Result<Self, RouteError> {
        let entries = FLOWS.iter().flat_map(|flow| {
            flow.steps.iter().map(move |&sub_id| RouteEntry {
                key: MessageKey::processing(flow.message_id, sub_id),
                action: flow.action,
            })
        });
        Self::from_entries(entries)
    }

    /// Builds a table from explicit entries, rejecting duplicate keys.
    pub fn from_entries<I>(entries: I) -> Result<Self, RouteError>
    where
        I: IntoIterator<Item = RouteEntry>,
    {
        let mut routes = HashMap::new();
        for entry in entries {
            if routes.insert(entry.key, entry.action).is_some() {
                return Err(RouteError::DuplicateRoute(entry.key));
            }
        }
        debug!("Route table built with {} entries", routes.len());
        Ok(Self { routes })
    }

    pub fn find(&self, key: &MessageKey) -> Option<RouteAction> {
        self.routes.get(key).copied()
    }

    /// Decodes a raw frame and looks up its route.
    pub fn resolve(&self, data: &[u8]) -> Result<RoutedMessage, RouteError> {
        let frame = Frame::decode(data)?;
        let key = frame.key();
        let action = self
            .find(&key)
            .ok_or_else(|| RouteError::NoRoute(key))?;
        Ok(RoutedMessage { frame, action })
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Entries ordered by key.
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut entries: Vec<RouteEntry> = self
            .routes
            .iter()
            .map(|(key, action)| RouteEntry {
                key: *key,
                action: *action,
            })
            .collect();
        entries.sort_by_key(|entry| entry.key);
        entries
    }
}
