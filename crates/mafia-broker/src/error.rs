use mafia_transport::frame::LinesCodecError;

/// Errors raised by the broker.
///
/// Only [`Bind`](BrokerError::Bind) ever reaches the caller of the server;
/// the session-level variants end that one session and are logged.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed envelope from {session}: {reason}")]
    MalformedEnvelope { session: String, reason: String },

    #[error("read from {session} failed: {source}")]
    Read {
        session: String,
        #[source]
        source: std::io::Error,
    },
}

impl BrokerError {
    /// Classify a framing error on a session's read side.
    ///
    /// Oversized lines and invalid UTF-8 are the client's fault and count as
    /// malformed envelopes; anything else is a plain I/O failure.
    pub(crate) fn from_codec(session: &str, err: LinesCodecError) -> Self {
        match err {
            LinesCodecError::MaxLineLengthExceeded => Self::MalformedEnvelope {
                session: session.to_string(),
                reason: "line exceeds maximum frame length".into(),
            },
            LinesCodecError::Io(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                Self::MalformedEnvelope {
                    session: session.to_string(),
                    reason: format!("invalid data: {e}"),
                }
            }
            LinesCodecError::Io(source) => Self::Read {
                session: session.to_string(),
                source,
            },
        }
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedEnvelope { .. })
    }
}
