mod frame;
mod key;
pub mod ids;

pub use frame::{Frame, MessageType, FRAME_MAGIC, FRAME_VERSION, HEADER_SIZE};
pub use ids::{message_ids, status, sub_ids};
pub use key::{EventState, MessageKey};
