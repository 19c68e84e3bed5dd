//! In-memory transport used to drive the controller without sockets.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;

use arm_simulator::messaging::{status, Frame, MessageType};
use arm_simulator::{ArmController, ControllerConfig, PeerEventHandler, Transport, TransportError};

pub const TEST_DELAY: Duration = Duration::from_millis(20);

#[derive(Default)]
struct LoopbackState {
    handler: Mutex<Option<Weak<dyn PeerEventHandler>>>,
    sent: Mutex<Vec<Vec<u8>>>,
    started: AtomicBool,
    fail_start: AtomicBool,
    reject_sends: AtomicBool,
}

/// Records outbound frames and lets a test inject peer events through the
/// same `Weak` handle a real transport would use.
#[derive(Clone, Default)]
pub struct LoopbackTransport {
    state: Arc<LoopbackState>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start() -> Self {
        let transport = Self::default();
        transport.state.fail_start.store(true, Ordering::SeqCst);
        transport
    }

    pub fn reject_sends(&self, reject: bool) {
        self.state.reject_sends.store(reject, Ordering::SeqCst);
    }

    pub fn is_started(&self) -> bool {
        self.state.started.load(Ordering::SeqCst)
    }

    fn handler(&self) -> Arc<dyn PeerEventHandler> {
        self.state
            .handler
            .lock()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .expect("event handler registered")
    }

    pub fn has_live_handler(&self) -> bool {
        self.state
            .handler
            .lock()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .is_some()
    }

    pub fn connect(&self, remote_id: &str) {
        self.handler().on_connection(remote_id, true);
    }

    pub fn disconnect(&self, remote_id: &str) {
        self.handler().on_connection(remote_id, false);
    }

    pub fn error(&self, remote_id: &str, code: i32, message: &str) {
        self.handler().on_error(remote_id, code, message);
    }

    pub fn deliver(&self, remote_id: &str, data: &[u8]) {
        self.handler().on_message(remote_id, data);
    }

    pub fn deliver_request(&self, remote_id: &str, message_id: u16, sub_id: u8) {
        let frame = request(message_id, sub_id);
        self.deliver(remote_id, &frame.encode().unwrap());
    }

    pub fn sent_frames(&self) -> Vec<Frame> {
        self.state
            .sent
            .lock()
            .unwrap()
            .iter()
            .map(|bytes| Frame::decode(bytes).expect("controller emits valid frames"))
            .collect()
    }

    pub fn sent_bytes(&self) -> Vec<Vec<u8>> {
        self.state.sent.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.state.sent.lock().unwrap().clear();
    }
}

impl Transport for LoopbackTransport {
    fn register_event_handler(&self, handler: Weak<dyn PeerEventHandler>) {
        *self.state.handler.lock().unwrap() = Some(handler);
    }

    fn start(&self) -> Result<(), TransportError> {
        if self.state.fail_start.load(Ordering::SeqCst) {
            return Err(TransportError::NotRunning);
        }
        self.state.started.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn stop(&self) {
        self.state.started.store(false, Ordering::SeqCst);
    }

    fn send(&self, frame: &[u8]) -> Result<(), TransportError> {
        if self.state.reject_sends.load(Ordering::SeqCst) {
            return Err(TransportError::QueueClosed);
        }
        self.state.sent.lock().unwrap().push(frame.to_vec());
        Ok(())
    }
}

pub fn request(message_id: u16, sub_id: u8) -> Frame {
    Frame {
        message_type: MessageType::Request,
        message_id,
        sub_id,
        device_id: 1,
        status: status::PROCESSING,
        payload: Vec::new(),
    }
}

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

pub fn controller_with_delay(delay: Duration) -> (ArmController, LoopbackTransport) {
    init_logging();
    let controller = ArmController::new(ControllerConfig {
        action_delay: delay,
        ..ControllerConfig::default()
    });
    let transport = LoopbackTransport::new();
    assert!(controller.initialize_with_transport(Box::new(transport.clone())));
    assert!(controller.start());
    (controller, transport)
}

pub fn controller() -> (ArmController, LoopbackTransport) {
    controller_with_delay(TEST_DELAY)
}

pub fn assert_close(actual: [f32; 3], expected: [f64; 3]) {
    for (a, e) in actual.iter().zip(expected.iter()) {
        assert!(
            (f64::from(*a) - e).abs() < 1e-6,
            "{:?} != {:?}",
            actual,
            expected
        );
    }
}
