mod support;

use std::thread;
use std::time::{Duration, Instant};

use arm_simulator::messaging::{message_ids, status, sub_ids, Frame, MessageType};
use arm_simulator::pose::POSE_PAYLOAD_SIZE;
use arm_simulator::{ArmController, ControllerConfig, DeviceState, PoseItem};

use support::{assert_close, controller, controller_with_delay, request, LoopbackTransport, TEST_DELAY};

fn completed_pose(frame: &Frame) -> PoseItem {
    assert_eq!(frame.status, status::COMPLETED);
    PoseItem::from_payload(&frame.payload).expect("COMPLETED carries a pose")
}

#[test]
fn calibration_scenario() {
    let (controller, transport) = controller();
    transport.connect("P1");

    let started = Instant::now();
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    assert!(started.elapsed() >= TEST_DELAY, "actuation delay must be a real wait");

    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].message_type, MessageType::Notify);
    assert_eq!(frames[0].message_id, message_ids::CALIBRATION);
    assert_eq!(frames[0].sub_id, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    assert_eq!(frames[0].status, status::PROCESSING);
    assert!(frames[0].payload.is_empty());

    let pose = completed_pose(&frames[1]);
    assert_close(pose.position, [0.30, -0.10, 0.25]);
    assert_eq!(pose.rotation, [0.0; 3]);
    assert_eq!(controller.last_pose().confidence, 1.0);
    assert_eq!(controller.pose_indices(), (0, 0));

    transport.clear();
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_CALIB_POSITION);
    let pose = completed_pose(&transport.sent_frames()[1]);
    assert_close(pose.position, [0.30, -0.10, 0.25]);
    assert_eq!(pose.rotation, [0.0; 3]);
    assert_eq!(controller.pose_indices(), (1, 0));

    transport.clear();
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_CALIB_POSITION);
    let pose = completed_pose(&transport.sent_frames()[1]);
    assert_close(pose.position, [0.31, -0.095, 0.252]);
    assert_close(pose.rotation, [0.05, -0.03, 0.02]);
    assert_eq!(controller.pose_indices(), (2, 0));

    // A fresh init step restarts the waypoint sequence.
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    assert_eq!(controller.pose_indices(), (0, 0));
}

#[test]
fn charging_flow_runs_every_step() {
    let (controller, transport) = controller_with_delay(Duration::from_millis(1));
    transport.connect("P1");

    let steps = [
        sub_ids::DEVICE_SELF_CHECK,
        sub_ids::OPEN_COVER,
        sub_ids::ARM_MOVING_TO_INIT_POSITION,
        sub_ids::ARM_MOVING_TO_TARGET_POSITION,
        sub_ids::PATH_PLANNING,
        sub_ids::CHARGING_INSERTION,
        sub_ids::CONNECTION_VERIFICATION,
    ];
    for step in steps {
        transport.deliver_request("P1", message_ids::START_CHARGING, step);
    }

    let frames = transport.sent_frames();
    assert_eq!(frames.len(), steps.len() * 2);
    for (pair, step) in frames.chunks(2).zip(steps) {
        assert_eq!(pair[0].sub_id, step);
        assert_eq!(pair[0].status, status::PROCESSING);
        assert_eq!(pair[1].sub_id, step);
        assert_eq!(pair[1].status, status::COMPLETED);
        assert_eq!(pair[1].payload.len(), POSE_PAYLOAD_SIZE);
    }

    // Steps after the target move report the target pose unchanged.
    let target = &frames[7];
    assert_close(completed_pose(target).position, [0.42, 0.06, 0.29]);
    for pair in frames[8..].chunks(2) {
        assert_eq!(pair[1].payload, target.payload);
    }
    assert_eq!(controller.pose_indices(), (0, 1));
}

#[test]
fn charging_init_restarts_target_sequence() {
    let (controller, transport) = controller_with_delay(Duration::from_millis(1));
    transport.connect("P1");

    transport.deliver_request("P1", message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_TARGET_POSITION);
    transport.deliver_request("P1", message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_TARGET_POSITION);
    assert_eq!(controller.pose_indices(), (0, 2));

    transport.deliver_request("P1", message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    assert_eq!(controller.pose_indices(), (0, 0));

    transport.clear();
    transport.deliver_request("P1", message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_TARGET_POSITION);
    let pose = completed_pose(&transport.sent_frames()[1]);
    assert_close(pose.position, [0.42, 0.06, 0.29]);
    assert_eq!(pose.rotation, [0.0; 3]);
    assert_eq!(controller.pose_indices(), (0, 1));
}

#[test]
fn non_motion_steps_reuse_last_pose() {
    let (controller, transport) = controller();
    transport.connect("P1");

    // No motion yet: zero pose is reported.
    transport.deliver_request("P1", message_ids::EMERGENCY_STOP, sub_ids::IDLE);
    let frames = transport.sent_frames();
    assert_eq!(frames[1].payload, PoseItem::default().to_payload());
    assert_eq!(controller.last_pose().confidence, 0.0);

    transport.deliver_request("P1", message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    let moved = transport.sent_frames()[3].payload.clone();

    transport.clear();
    transport.deliver_request("P1", message_ids::RESET, sub_ids::CLOSE_COVER);
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[1].payload, moved);
    assert_eq!(controller.last_pose().to_payload(), moved);
}

#[test]
fn reset_position_overwrites_last_pose() {
    let (controller, transport) = controller();
    transport.connect("P1");

    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    transport.deliver_request("P1", message_ids::RESET, sub_ids::ARM_MOVING_TO_RESET_POSITION);

    let last = controller.last_pose();
    assert_eq!(last.position, [0.0; 3]);
    assert_eq!(last.confidence, 1.0);
}

#[test]
fn manual_remote_control_enters_monitor_mode() {
    let (controller, transport) = controller();
    transport.connect("P1");

    transport.deliver_request("P1", message_ids::MANUAL_REMOTE_CONTROL, sub_ids::IDLE);
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].message_id, message_ids::MANUAL_REMOTE_CONTROL);
    assert_eq!(frames[0].status, status::PROCESSING);
    assert_eq!(frames[1].message_id, message_ids::MANUAL_REMOTE_CONTROL);
    assert_eq!(frames[1].sub_id, sub_ids::IDLE);
    assert_eq!(frames[1].status, status::COMPLETED);
    assert_eq!(frames[1].payload, PoseItem::default().to_payload());
    assert_eq!(controller.pose_indices(), (0, 0));
}

#[test]
fn unroutable_messages_are_dropped() {
    let (controller, transport) = controller();
    transport.connect("P1");

    transport.deliver_request("P1", 0x0999, sub_ids::IDLE);
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_TARGET_POSITION);
    let mut completed = request(message_ids::RESET, sub_ids::IDLE);
    completed.status = status::COMPLETED;
    transport.deliver("P1", &completed.encode().unwrap());
    transport.deliver("P1", &[0xde, 0xad, 0xbe, 0xef]);
    transport.deliver("P1", &[]);

    assert!(transport.sent_frames().is_empty());
    assert_eq!(controller.current_state(), DeviceState::Idle);
    assert_eq!(controller.active_connection().as_deref(), Some("P1"));
    assert_eq!(controller.last_pose(), PoseItem::default());
    assert_eq!(controller.pose_indices(), (0, 0));
}

#[test]
fn sends_require_an_active_connection() {
    let (controller, transport) = controller();

    assert!(!controller.send_response(message_ids::RESET, sub_ids::IDLE, status::COMPLETED, &[]));
    assert!(!controller.trigger_external_event(message_ids::WALL_RESET));

    // A routed request without a peer still runs but nothing goes out.
    transport.deliver_request("P1", message_ids::EMERGENCY_STOP_RECOVERY, sub_ids::IDLE);
    assert!(transport.sent_frames().is_empty());
}

#[test]
fn disconnect_scenario() {
    let (controller, transport) = controller();
    transport.connect("P1");
    assert!(controller.trigger_external_event(message_ids::WALL_OPEN_COVER));

    transport.disconnect("P1");
    assert_eq!(controller.current_state(), DeviceState::Disconnected);
    assert_eq!(controller.active_connection(), None);
    assert!(!controller.send_response(message_ids::RESET, sub_ids::IDLE, status::PROCESSING, &[]));
    assert!(!controller.trigger_external_event(message_ids::WALL_CLOSE_COVER));
    assert_eq!(transport.sent_frames().len(), 1);

    transport.connect("P2");
    assert_eq!(controller.current_state(), DeviceState::Idle);
    assert!(controller.trigger_external_event(message_ids::WALL_CLOSE_COVER));
    assert_eq!(transport.sent_frames().len(), 2);
}

#[test]
fn disconnect_from_other_peer_is_ignored() {
    let (controller, transport) = controller();
    transport.connect("P1");
    transport.disconnect("P2");

    assert_eq!(controller.current_state(), DeviceState::Idle);
    assert_eq!(controller.active_connection().as_deref(), Some("P1"));

    // The newest connection wins; the stale peer's disconnect is ignored.
    transport.connect("P2");
    transport.disconnect("P1");
    assert_eq!(controller.active_connection().as_deref(), Some("P2"));
    assert_eq!(controller.current_state(), DeviceState::Idle);
}

#[test]
fn transport_errors_do_not_change_state() {
    let (controller, transport) = controller();
    transport.connect("P1");
    transport.error("P1", 11, "resource temporarily unavailable");

    assert_eq!(controller.current_state(), DeviceState::Idle);
    assert_eq!(controller.active_connection().as_deref(), Some("P1"));
}

#[test]
fn external_trigger_bypasses_route_table() {
    let (controller, transport) = controller();
    transport.connect("P1");

    assert!(controller.trigger_external_event(message_ids::WALL_EMERGENCY_STOP));
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].message_type, MessageType::Notify);
    assert_eq!(frames[0].message_id, message_ids::WALL_EMERGENCY_STOP);
    assert_eq!(frames[0].sub_id, sub_ids::IDLE);
    assert_eq!(frames[0].status, status::PROCESSING);
    assert_eq!(frames[0].device_id, 1);
    assert!(frames[0].payload.is_empty());
}

#[test]
fn rejected_send_reports_failure() {
    let (controller, transport) = controller();
    transport.connect("P1");
    transport.reject_sends(true);

    assert!(!controller.trigger_external_event(message_ids::WALL_RESET));
    transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION);
    assert!(transport.sent_frames().is_empty());
    // The action itself still ran.
    assert_eq!(controller.last_pose().confidence, 1.0);
}

#[test]
fn send_response_accepts_non_pose_payloads() {
    let (controller, transport) = controller();
    transport.connect("P1");

    assert!(controller.send_response(message_ids::RESET, sub_ids::IDLE, status::FAILED, &[1, 2, 3]));
    let frames = transport.sent_frames();
    assert_eq!(frames[0].payload, vec![1, 2, 3]);
    assert_eq!(frames[0].status, status::FAILED);
}

#[test]
fn connection_events_are_not_blocked_by_actuation() {
    let (controller, transport) = controller_with_delay(Duration::from_millis(400));
    transport.connect("P1");

    let worker = {
        let transport = transport.clone();
        thread::spawn(move || {
            transport.deliver_request("P1", message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION);
        })
    };

    thread::sleep(Duration::from_millis(100));
    let started = Instant::now();
    transport.disconnect("P1");
    assert!(started.elapsed() < Duration::from_millis(200));
    assert_eq!(controller.current_state(), DeviceState::Disconnected);

    worker.join().unwrap();
    // Only the acknowledgement made it out before the peer dropped.
    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 1);
    assert_eq!(frames[0].status, status::PROCESSING);
}

#[test]
fn lifecycle_is_idempotent() {
    support::init_logging();
    let controller = ArmController::new(ControllerConfig {
        action_delay: TEST_DELAY,
        ..ControllerConfig::default()
    });
    assert!(!controller.start());

    let transport = LoopbackTransport::new();
    assert!(controller.initialize_with_transport(Box::new(transport.clone())));
    assert!(controller.initialize_with_transport(Box::new(LoopbackTransport::new())));
    assert!(controller.initialize("ipc:///tmp/ignored-after-init.ipc"));

    assert!(controller.start());
    assert!(controller.start());
    assert!(transport.is_started());

    controller.stop();
    controller.stop();
    assert!(!controller.is_running());
    assert!(!transport.is_started());
}

#[test]
fn failed_transport_start_is_reported() {
    support::init_logging();
    let controller = ArmController::default();
    assert!(controller.initialize_with_transport(Box::new(LoopbackTransport::failing_start())));
    assert!(!controller.start());
    assert!(!controller.is_running());
}

#[test]
fn transport_holds_only_a_weak_handle() {
    let (controller, transport) = controller();
    assert!(transport.has_live_handler());
    drop(controller);
    assert!(!transport.has_live_handler());
    assert!(!transport.is_started());
}
