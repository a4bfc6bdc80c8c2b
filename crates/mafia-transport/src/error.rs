use crate::frame::LinesCodecError;

/// Errors returned by the broker client.
///
/// Any of these on an established connection means the link to the broker
/// is unusable; callers treat them as fatal.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("failed to connect to broker at {addr}: {source}")]
    Connect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("send to broker failed: {0}")]
    Send(#[source] LinesCodecError),

    #[error("receive from broker failed: {0}")]
    Receive(#[source] LinesCodecError),

    #[error("envelope serialization failed: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("envelope deserialization failed: {0}")]
    Deserialization(#[source] serde_json::Error),

    #[error("frame too large: {size} bytes (max {max})")]
    FrameTooLarge { size: usize, max: usize },

    #[error("connection closed by broker")]
    Closed,
}
