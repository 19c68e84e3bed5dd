use log::debug;

use super::types::PoseItem;
use crate::messaging::{message_ids, sub_ids, MessageKey};

/// Baseline height of the end effector above the mount, in metres.
const BASE_Z: f64 = 0.25;

const CALIBRATION_BASE: [f64; 3] = [0.30, -0.10, BASE_Z];
const CHARGING_BASE: [f64; 3] = [0.40, 0.05, BASE_Z + 0.05];

/// Generates deterministic waypoints for the calibration and charging flows.
///
/// Each flow keeps its own waypoint index. The index is reset to 0 by the
/// flow's init step and advances by one after every waypoint step.
#[derive(Debug, Clone, Default)]
pub struct PoseSynthesizer {
    calibration_index: u32,
    charging_index: u32,
}

impl PoseSynthesizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calibration_index(&self) -> u32 {
        self.calibration_index
    }

    pub fn charging_index(&self) -> u32 {
        self.charging_index
    }

    /// Produces the pose reached by a motion step. Always confidence 1.0.
    pub fn synthesize(&mut self, key: &MessageKey) -> PoseItem {
        let (position, rotation) = match (key.message_id, key.sub_id) {
            (message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_INIT_POSITION) => {
                self.calibration_index = 0;
                (CALIBRATION_BASE, [0.0; 3])
            }
            (message_ids::CALIBRATION, sub_ids::ARM_MOVING_TO_CALIB_POSITION) => {
                let index = f64::from(self.calibration_index);
                self.calibration_index += 1;
                calibration_waypoint(index)
            }
            (message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_INIT_POSITION) => {
                self.charging_index = 0;
                (CHARGING_BASE, [0.0; 3])
            }
            (message_ids::START_CHARGING, sub_ids::ARM_MOVING_TO_TARGET_POSITION) => {
                let index = f64::from(self.charging_index);
                self.charging_index += 1;
                charging_waypoint(index)
            }
            _ => ([0.0; 3], [0.0; 3]),
        };

        debug!(
            "Synthesized pose for {} (calibration_index={}, charging_index={})",
            key, self.calibration_index, self.charging_index
        );

        PoseItem::new(to_f32(position), to_f32(rotation), 1.0)
    }
}

fn calibration_waypoint(index: f64) -> ([f64; 3], [f64; 3]) {
    let offset = 0.01 * index;
    (
        [
            CALIBRATION_BASE[0] + offset,
            CALIBRATION_BASE[1] + offset * 0.5,
            BASE_Z + offset * 0.2,
        ],
        [0.05 * index, -0.03 * index, 0.02 * index],
    )
}

fn charging_waypoint(index: f64) -> ([f64; 3], [f64; 3]) {
    let offset = 0.015 * index;
    (
        [0.42 + offset, 0.06 - offset * 0.4, BASE_Z + 0.04 - offset * 0.1],
        [0.04 * index, 0.02 * index, -0.01 * index],
    )
}

fn to_f32(values: [f64; 3]) -> [f32; 3] {
    [values[0] as f32, values[1] as f32, values[2] as f32]
}
