//! Arm controller: routes requests, tracks connection state and answers with
//! staged PROCESSING / COMPLETED notifications.

mod state;

use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError, Weak};
use std::thread;
use std::time::Duration;

use crate::messaging::{message_ids, status, sub_ids, EventState, Frame, MessageKey};
use crate::pose::{PoseItem, POSE_PAYLOAD_SIZE};
use crate::router::{RouteAction, RouteTable, RoutedMessage};
use crate::transport::{PeerEventHandler, Transport, ZmqEndpointConfig, ZmqPeer};

pub use state::DeviceState;
use state::SharedState;

#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Simulated actuation time between PROCESSING and COMPLETED.
    pub action_delay: Duration,
    /// Device id stamped on every outbound notification.
    pub device_id: u8,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            action_delay: Duration::from_millis(1000),
            device_id: 1,
        }
    }
}

struct Wiring {
    transport: Box<dyn Transport>,
    routes: RouteTable,
}

struct Inner {
    config: ControllerConfig,
    wiring: OnceLock<Wiring>,
    running: Mutex<bool>,
    // Connection and device state are coupled, so one lock covers both
    // together with the simulated pose.
    shared: Mutex<SharedState>,
}

/// Simulated arm controller bound to a single peer.
///
/// Each inbound request runs to completion, including the simulated actuation
/// delay, on the transport's dispatch thread. The state lock is only held for
/// short reads and writes, never across the delay.
pub struct ArmController {
    inner: Arc<Inner>,
}

impl ArmController {
    pub fn new(config: ControllerConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                config,
                wiring: OnceLock::new(),
                running: Mutex::new(false),
                shared: Mutex::new(SharedState::default()),
            }),
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.inner.wiring.get().is_some()
    }

    /// Creates a ZMQ peer bound to `endpoint` with default transport settings.
    pub fn initialize(&self, endpoint: &str) -> bool {
        self.initialize_with_peer(ZmqEndpointConfig::new(endpoint))
    }

    pub fn initialize_with_peer(&self, peer_config: ZmqEndpointConfig) -> bool {
        if self.is_initialized() {
            return true;
        }

        match ZmqPeer::new(peer_config) {
            Ok(peer) => {
                debug!("Binding ZMQ peer to {}", peer.endpoint());
                self.initialize_with_transport(Box::new(peer))
            }
            Err(e) => {
                error!("Initialization failed: {}", e);
                false
            }
        }
    }

    /// Wires an already constructed transport. Nothing is kept on failure.
    pub fn initialize_with_transport(&self, transport: Box<dyn Transport>) -> bool {
        if self.is_initialized() {
            return true;
        }

        let routes = match RouteTable::build() {
            Ok(routes) => routes,
            Err(e) => {
                error!("Initialization failed: {}", e);
                return false;
            }
        };

        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let handler: Weak<dyn PeerEventHandler> = weak;
        transport.register_event_handler(handler);

        self.inner.lock_shared().device_state = DeviceState::Idle;

        if self.inner.wiring.set(Wiring { transport, routes }).is_err() {
            debug!("ArmController was initialized concurrently");
            return true;
        }

        info!("ArmController initialized");
        true
    }

    pub fn start(&self) -> bool {
        let mut running = self.inner.running.lock().unwrap_or_else(PoisonError::into_inner);
        if *running {
            return true;
        }
        let Some(wiring) = self.inner.wiring.get() else {
            warn!("ArmController started before initialization");
            return false;
        };

        if let Err(e) = wiring.transport.start() {
            error!("Failed to start transport: {}", e);
            return false;
        }

        *running = true;
        info!("ArmController started");
        true
    }

    pub fn stop(&self) {
        let mut running = self.inner.running.lock().unwrap_or_else(PoisonError::into_inner);
        if !*running {
            return;
        }
        *running = false;

        if let Some(wiring) = self.inner.wiring.get() {
            wiring.transport.stop();
        }
        info!("ArmController stopped");
    }

    pub fn is_running(&self) -> bool {
        *self.inner.running.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_peer_message(&self, remote_id: &str, data: &[u8]) {
        self.inner.on_message(remote_id, data);
    }

    pub fn on_peer_connection(&self, remote_id: &str, connected: bool) {
        self.inner.on_connection(remote_id, connected);
    }

    pub fn on_peer_error(&self, remote_id: &str, error_code: i32, error_message: &str) {
        self.inner.on_error(remote_id, error_code, error_message);
    }

    pub fn send_response(&self, message_id: u16, sub_id: u8, status_code: u16, payload: &[u8]) -> bool {
        self.inner.send_response(message_id, sub_id, status_code, payload)
    }

    pub fn execute_action(&self, key: &MessageKey) {
        self.inner.execute_action(key);
    }

    pub fn enter_manual_monitor_mode(&self) {
        self.inner.enter_manual_monitor_mode();
    }

    /// Sends an unsolicited PROCESSING notification, as if a wall button was
    /// pressed. Bypasses the route table.
    pub fn trigger_external_event(&self, message_id: u16) -> bool {
        info!(
            "Simulating wall trigger: {}",
            message_ids::name(message_id).unwrap_or("UNKNOWN")
        );
        self.inner
            .send_response(message_id, sub_ids::IDLE, status::PROCESSING, &[])
    }

    pub fn current_state(&self) -> DeviceState {
        self.inner.lock_shared().device_state
    }

    pub fn active_connection(&self) -> Option<String> {
        self.inner.lock_shared().active_connection.clone()
    }

    pub fn last_pose(&self) -> PoseItem {
        self.inner.lock_shared().last_pose
    }

    /// `(calibration_index, charging_index)`
    pub fn pose_indices(&self) -> (u32, u32) {
        let shared = self.inner.lock_shared();
        (
            shared.synthesizer.calibration_index(),
            shared.synthesizer.charging_index(),
        )
    }
}

impl Default for ArmController {
    fn default() -> Self {
        Self::new(ControllerConfig::default())
    }
}

impl Drop for ArmController {
    fn drop(&mut self) {
        self.stop();
    }
}

impl Inner {
    fn lock_shared(&self) -> MutexGuard<'_, SharedState> {
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn dispatch(&self, routed: RoutedMessage) {
        let key = routed.key();
        self.send_response(key.message_id, key.sub_id, status::PROCESSING, &[]);
        match routed.action {
            RouteAction::TwoPhase => self.execute_action(&key),
            RouteAction::ManualMonitor => self.enter_manual_monitor_mode(),
        }
    }

    fn send_response(&self, message_id: u16, sub_id: u8, status_code: u16, payload: &[u8]) -> bool {
        let shared = self.lock_shared();
        let Some(wiring) = self.wiring.get() else {
            warn!("Cannot send response: controller not initialized");
            return false;
        };
        if shared.active_connection.is_none() {
            warn!("Cannot send response: no active connection");
            return false;
        }

        let frame = Frame::notification(message_id, sub_id, self.config.device_id, status_code, payload);
        let bytes = match frame.encode() {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("Failed to create message: {}", e);
                return false;
            }
        };

        if let Err(e) = wiring.transport.send(&bytes) {
            warn!("Failed to send response: {}", e);
            return false;
        }

        let event_state = EventState::for_status(message_id, sub_id, status_code);
        let pose = if payload.len() == POSE_PAYLOAD_SIZE {
            PoseItem::from_payload(payload).ok()
        } else {
            None
        };
        match pose {
            Some(pose) => info!("Sent response: {} - {}", event_state, pose),
            None => info!("Sent response: {}", event_state),
        }
        true
    }

    fn execute_action(&self, key: &MessageKey) {
        debug!("Handling request: {}", key);

        let payload = {
            let mut shared = self.lock_shared();
            if sub_ids::is_motion(key.sub_id) {
                let pose = shared.synthesizer.synthesize(key);
                shared.last_pose = pose;
            }
            shared.last_pose.to_payload()
        };

        thread::sleep(self.config.action_delay);

        self.send_response(key.message_id, key.sub_id, status::COMPLETED, &payload);
    }

    fn enter_manual_monitor_mode(&self) {
        let key = MessageKey::processing(message_ids::MANUAL_REMOTE_CONTROL, sub_ids::IDLE);
        self.execute_action(&key);
        info!("Entered manual monitor mode");
    }
}

impl PeerEventHandler for Inner {
    fn on_message(&self, remote_id: &str, data: &[u8]) {
        debug!("Received message from {} ({} bytes)", remote_id, data.len());

        let Some(wiring) = self.wiring.get() else {
            error!("Route table not initialized");
            return;
        };

        match wiring.routes.resolve(data) {
            Ok(routed) => self.dispatch(routed),
            Err(e) => warn!("Message routing failed: {}", e),
        }
    }

    fn on_connection(&self, remote_id: &str, connected: bool) {
        let mut shared = self.lock_shared();
        if connected {
            shared.connect(remote_id);
            info!("Connection established: {} - state: {}", remote_id, shared.device_state);
        } else if shared.disconnect(remote_id) {
            warn!("Connection lost: {} - state: {}", remote_id, shared.device_state);
        } else {
            debug!("Ignoring disconnect from inactive peer {}", remote_id);
        }
    }

    fn on_error(&self, remote_id: &str, error_code: i32, error_message: &str) {
        error!("{} communication error ({}): {}", remote_id, error_code, error_message);
    }
}
