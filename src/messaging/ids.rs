//! Numeric identifiers shared with the vision controller.
//!
//! Unknown values are legal on the wire; they simply have no route.

pub mod message_ids {
    pub const START_CHARGING: u16 = 0x0101;
    pub const CALIBRATION: u16 = 0x0102;
    pub const RESET: u16 = 0x0103;
    pub const EMERGENCY_STOP: u16 = 0x0104;
    pub const EMERGENCY_STOP_RECOVERY: u16 = 0x0105;
    pub const MANUAL_REMOTE_CONTROL: u16 = 0x0106;

    // Wall panel triggers, sent unsolicited by the arm side.
    pub const WALL_START_CHARGING: u16 = 0x0201;
    pub const WALL_RESET: u16 = 0x0202;
    pub const WALL_EMERGENCY_STOP: u16 = 0x0203;
    pub const WALL_EMERGENCY_STOP_RECOVERY: u16 = 0x0204;
    pub const WALL_OPEN_COVER: u16 = 0x0205;
    pub const WALL_CLOSE_COVER: u16 = 0x0206;
    pub const WALL_SWITCH_MODE: u16 = 0x0207;

    pub fn name(id: u16) -> Option<&'static str> {
        let name = match id {
            START_CHARGING => "START_CHARGING",
            CALIBRATION => "CALIBRATION",
            RESET => "RESET",
            EMERGENCY_STOP => "EMERGENCY_STOP",
            EMERGENCY_STOP_RECOVERY => "EMERGENCY_STOP_RECOVERY",
            MANUAL_REMOTE_CONTROL => "MANUAL_REMOTE_CONTROL",
            WALL_START_CHARGING => "WALL_START_CHARGING",
            WALL_RESET => "WALL_RESET",
            WALL_EMERGENCY_STOP => "WALL_EMERGENCY_STOP",
            WALL_EMERGENCY_STOP_RECOVERY => "WALL_EMERGENCY_STOP_RECOVERY",
            WALL_OPEN_COVER => "WALL_OPEN_COVER",
            WALL_CLOSE_COVER => "WALL_CLOSE_COVER",
            WALL_SWITCH_MODE => "WALL_SWITCH_MODE",
            _ => return None,
        };
        Some(name)
    }
}

pub mod sub_ids {
    pub const IDLE: u8 = 0x00;
    pub const DEVICE_SELF_CHECK: u8 = 0x01;
    pub const OPEN_COVER: u8 = 0x02;
    pub const ARM_MOVING_TO_INIT_POSITION: u8 = 0x03;
    pub const ARM_MOVING_TO_CALIB_POSITION: u8 = 0x04;
    pub const ARM_MOVING_TO_TARGET_POSITION: u8 = 0x05;
    pub const PATH_PLANNING: u8 = 0x06;
    pub const CHARGING_INSERTION: u8 = 0x07;
    pub const CONNECTION_VERIFICATION: u8 = 0x08;
    pub const CHARGING_REMOVAL: u8 = 0x09;
    pub const ARM_MOVING_TO_RESET_POSITION: u8 = 0x0A;
    pub const CLOSE_COVER: u8 = 0x0B;

    pub fn name(id: u8) -> Option<&'static str> {
        let name = match id {
            IDLE => "IDLE",
            DEVICE_SELF_CHECK => "DEVICE_SELF_CHECK",
            OPEN_COVER => "OPEN_COVER",
            ARM_MOVING_TO_INIT_POSITION => "ARM_MOVING_TO_INIT_POSITION",
            ARM_MOVING_TO_CALIB_POSITION => "ARM_MOVING_TO_CALIB_POSITION",
            ARM_MOVING_TO_TARGET_POSITION => "ARM_MOVING_TO_TARGET_POSITION",
            PATH_PLANNING => "PATH_PLANNING",
            CHARGING_INSERTION => "CHARGING_INSERTION",
            CONNECTION_VERIFICATION => "CONNECTION_VERIFICATION",
            CHARGING_REMOVAL => "CHARGING_REMOVAL",
            ARM_MOVING_TO_RESET_POSITION => "ARM_MOVING_TO_RESET_POSITION",
            CLOSE_COVER => "CLOSE_COVER",
            _ => return None,
        };
        Some(name)
    }

    /// Steps that physically move the arm and therefore produce a fresh pose.
    pub fn is_motion(id: u8) -> bool {
        matches!(
            id,
            ARM_MOVING_TO_INIT_POSITION
                | ARM_MOVING_TO_CALIB_POSITION
                | ARM_MOVING_TO_TARGET_POSITION
                | ARM_MOVING_TO_RESET_POSITION
        )
    }
}

/// Status codes. Every defined code fits in a single byte.
pub mod status {
    pub const PROCESSING: u16 = 0x01;
    pub const COMPLETED: u16 = 0x02;
    pub const FAILED: u16 = 0x03;

    pub fn name(code: u16) -> Option<&'static str> {
        match code {
            PROCESSING => Some("PROCESSING"),
            COMPLETED => Some("COMPLETED"),
            FAILED => Some("FAILED"),
            _ => None,
        }
    }
}
