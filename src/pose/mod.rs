mod synthesizer;
mod types;

pub use synthesizer::PoseSynthesizer;
pub use types::{PoseItem, POSE_PAYLOAD_SIZE};
