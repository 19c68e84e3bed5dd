use thiserror::Error;

use crate::messaging::MessageKey;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("Routing error: {0}")]
    Route(#[from] RouteError),

    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("ZMQ communication error: {0}")]
    ZmqCommunication(#[from] zmq::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("buffer too short: need {needed} bytes, got {got}")]
    Truncated { needed: usize, got: usize },

    #[error("bad magic 0x{0:04X}")]
    BadMagic(u16),

    #[error("unsupported frame version {0}")]
    UnsupportedVersion(u8),

    #[error("unknown message type {0}")]
    UnknownMessageType(u8),

    #[error("payload length mismatch: header says {declared}, frame carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("payload of {0} bytes does not fit in a frame")]
    PayloadTooLarge(usize),

    #[error("pose payload must be {expected} bytes, got {got}")]
    PosePayloadSize { expected: usize, got: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    #[error("failed to decode message: {0}")]
    Decode(#[from] CodecError),

    #[error("no route registered for {0}")]
    NoRoute(MessageKey),

    #[error("duplicate route for {0}")]
    DuplicateRoute(MessageKey),
}

#[derive(Error, Debug)]
pub enum TransportError {
    #[error("invalid endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("transport is not running")]
    NotRunning,

    #[error("transport already running")]
    AlreadyRunning,

    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: zmq::Error,
    },

    #[error("ZMQ error: {0}")]
    Zmq(#[from] zmq::Error),

    #[error("outbound queue closed")]
    QueueClosed,

    #[error("failed to spawn transport thread: {0}")]
    Spawn(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, AppError>;

impl AppError {
    pub fn config(msg: impl Into<String>) -> Self {
        AppError::Config(msg.into())
    }
}

impl TransportError {
    pub fn invalid_endpoint(msg: impl Into<String>) -> Self {
        TransportError::InvalidEndpoint(msg.into())
    }

    pub fn bind(endpoint: impl Into<String>, source: zmq::Error) -> Self {
        TransportError::Bind {
            endpoint: endpoint.into(),
            source,
        }
    }
}
