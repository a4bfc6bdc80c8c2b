use serde::{Deserialize, Serialize};

/// Client → broker message.
///
/// Serialized with an internal `type` tag:
/// `{"type":"subscribe","topic":"mafia"}` or
/// `{"type":"publish","topic":"mafia","payload":"..."}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Envelope {
    /// Register the sending session for `topic`.
    Subscribe { topic: String },

    /// Fan `payload` out to every session subscribed to `topic`.
    ///
    /// The payload is opaque to the broker.
    Publish { topic: String, payload: String },
}

impl Envelope {
    pub fn subscribe(topic: impl Into<String>) -> Self {
        Self::Subscribe {
            topic: topic.into(),
        }
    }

    pub fn publish(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self::Publish {
            topic: topic.into(),
            payload: payload.into(),
        }
    }

    /// Topic this envelope targets.
    pub fn topic(&self) -> &str {
        match self {
            Self::Subscribe { topic } | Self::Publish { topic, .. } => topic,
        }
    }

    /// Serialize to a single JSON line (without the trailing newline).
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse one JSON line.
    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Broker → subscriber message: a publish, stamped with the sender's session id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub topic: String,
    pub payload: String,
    pub sender: String,
}

impl Delivery {
    pub fn to_line(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_line(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Haptic command for one wristband, carried JSON-encoded in a publish payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TapCommand {
    /// Wristband (player) number.
    pub id: u8,
    /// Number of taps to play.
    pub taps: u8,
}

impl TapCommand {
    /// Encode as the string payload of a publish envelope.
    pub fn to_payload(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(payload)
    }
}
