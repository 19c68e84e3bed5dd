use serde::Serialize;
use std::fmt;

use crate::error::CodecError;

/// Six little-endian `f32`: position x,y,z then rotation x,y,z.
pub const POSE_PAYLOAD_SIZE: usize = 6 * std::mem::size_of::<f32>();

/// Synthetic end-effector pose.
///
/// A confidence of `0.0` means no valid pose has been produced yet. Confidence
/// is local bookkeeping and is not part of the wire payload.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PoseItem {
    pub position: [f32; 3],
    pub rotation: [f32; 3],
    pub confidence: f32,
}

impl PoseItem {
    pub fn new(position: [f32; 3], rotation: [f32; 3], confidence: f32) -> Self {
        Self {
            position,
            rotation,
            confidence,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.confidence > 0.0
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn to_payload(&self) -> Vec<u8> {
        self.position
            .iter()
            .chain(self.rotation.iter())
            .flat_map(|v| v.to_le_bytes())
            .collect()
    }

    /// Decodes a pose payload. The returned pose has confidence 0 since the
    /// payload does not carry it.
    pub fn from_payload(payload: &[u8]) -> Result<Self, CodecError> {
        if payload.len() != POSE_PAYLOAD_SIZE {
            return Err(CodecError::PosePayloadSize {
                expected: POSE_PAYLOAD_SIZE,
                got: payload.len(),
            });
        }

        let mut values = [0.0f32; 6];
        for (value, chunk) in values.iter_mut().zip(payload.chunks_exact(4)) {
            *value = f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
        }

        Ok(Self {
            position: [values[0], values[1], values[2]],
            rotation: [values[3], values[4], values[5]],
            confidence: 0.0,
        })
    }
}

impl fmt::Display for PoseItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pos=({:.3}, {:.3}, {:.3}) rot=({:.3}, {:.3}, {:.3})",
            self.position[0],
            self.position[1],
            self.position[2],
            self.rotation[0],
            self.rotation[1],
            self.rotation[2]
        )?;
        if self.confidence > 0.0 {
            write!(f, " conf={:.2}", self.confidence)?;
        }
        Ok(())
    }
}
