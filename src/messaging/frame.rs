//! Binary frame exchanged with the vision controller.
//!
//! ```text
//! 0      2    3    4          6      7      8        10       12
//! +------+----+----+----------+------+------+--------+--------+---------+
//! |magic |ver |type|message_id|sub_id|device| status |pay_len | payload |
//! +------+----+----+----------+------+------+--------+--------+---------+
//! ```
//!
//! All multi-byte fields are little-endian.

use crate::error::CodecError;

use super::key::MessageKey;

pub const FRAME_MAGIC: u16 = 0x5AA5;
pub const FRAME_VERSION: u8 = 1;
pub const HEADER_SIZE: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Request,
    Response,
    Notify,
}

impl MessageType {
    pub fn as_u8(self) -> u8 {
        match self {
            MessageType::Request => 1,
            MessageType::Response => 2,
            MessageType::Notify => 3,
        }
    }

    pub fn from_u8(raw: u8) -> Option<Self> {
        match raw {
            1 => Some(MessageType::Request),
            2 => Some(MessageType::Response),
            3 => Some(MessageType::Notify),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub message_type: MessageType,
    pub message_id: u16,
    pub sub_id: u8,
    pub device_id: u8,
    pub status: u16,
    pub payload: Vec<u8>,
}

impl Frame {
    /// Builds the notification frame the arm sends back to its peer.
    pub fn notification(
        message_id: u16,
        sub_id: u8,
        device_id: u8,
        status: u16,
        payload: &[u8],
    ) -> Self {
        Self {
            message_type: MessageType::Notify,
            message_id,
            sub_id,
            device_id,
            status,
            payload: payload.to_vec(),
        }
    }

    pub fn key(&self) -> MessageKey {
        MessageKey::new(self.message_id, self.sub_id, self.status)
    }

    pub fn encode(&self) -> Result<Vec<u8>, CodecError> {
        let payload_len = u16::try_from(self.payload.len())
            .map_err(|_| CodecError::PayloadTooLarge(self.payload.len()))?;

        let mut bytes = Vec::with_capacity(HEADER_SIZE + self.payload.len());
        bytes.extend_from_slice(&FRAME_MAGIC.to_le_bytes());
        bytes.push(FRAME_VERSION);
        bytes.push(self.message_type.as_u8());
        bytes.extend_from_slice(&self.message_id.to_le_bytes());
        bytes.push(self.sub_id);
        bytes.push(self.device_id);
        bytes.extend_from_slice(&self.status.to_le_bytes());
        bytes.extend_from_slice(&payload_len.to_le_bytes());
        bytes.extend_from_slice(&self.payload);
        Ok(bytes)
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, CodecError> {
        if bytes.len() < HEADER_SIZE {
            return Err(CodecError::Truncated {
                needed: HEADER_SIZE,
                got: bytes.len(),
            });
        }

        let magic = u16::from_le_bytes([bytes[0], bytes[1]]);
        if magic != FRAME_MAGIC {
            return Err(CodecError::BadMagic(magic));
        }
        if bytes[2] != FRAME_VERSION {
            return Err(CodecError::UnsupportedVersion(bytes[2]));
        }
        let message_type =
            MessageType::from_u8(bytes[3]).ok_or(CodecError::UnknownMessageType(bytes[3]))?;

        let message_id = u16::from_le_bytes([bytes[4], bytes[5]]);
        let sub_id = bytes[6];
        let device_id = bytes[7];
        let status = u16::from_le_bytes([bytes[8], bytes[9]]);
        let declared = usize::from(u16::from_le_bytes([bytes[10], bytes[11]]));

        let payload = &bytes[HEADER_SIZE..];
        if payload.len() != declared {
            return Err(CodecError::LengthMismatch {
                declared,
                actual: payload.len(),
            });
        }

        Ok(Self {
            message_type,
            message_id,
            sub_id,
            device_id,
            status,
            payload: payload.to_vec(),
        })
    }
}
