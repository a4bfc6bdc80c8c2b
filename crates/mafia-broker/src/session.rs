use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use futures_util::StreamExt;
use mafia_transport::frame::{LineReader, LineWriter};
use mafia_transport::Envelope;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::sync::Mutex;

use crate::broker::Broker;
use crate::error::BrokerError;

/// Write side of one client connection, shared between fan-outs.
pub(crate) type Outbox = Arc<Mutex<LineWriter<OwnedWriteHalf>>>;

/// Identity of one accepted connection.
///
/// Derived from the peer endpoint plus the broker's accept sequence number,
/// so a client reconnecting from the same port never collides with the
/// cleanup of its previous session.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId {
    seq: u64,
    peer: SocketAddr,
}

impl SessionId {
    pub fn new(seq: u64, peer: SocketAddr) -> Self {
        Self { seq, peer }
    }

    pub fn seq(&self) -> u64 {
        self.seq
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "client_{}#{}", self.peer.port(), self.seq)
    }
}

/// Per-connection task: read envelopes until EOF or error, then clean up.
///
/// `on_disconnect` runs on every exit path, including decode failures.
pub(crate) async fn run(broker: Arc<Broker>, id: SessionId, mut reader: LineReader<OwnedReadHalf>) {
    match read_loop(&broker, &id, &mut reader).await {
        Ok(()) => tracing::debug!("{id} closed its connection"),
        Err(e) if e.is_malformed() => {
            broker.stats().malformed_envelopes.inc();
            tracing::warn!("dropping session: {e}");
        }
        Err(e) => tracing::warn!("{e}"),
    }

    broker.on_disconnect(&id).await;
}

async fn read_loop(
    broker: &Broker,
    id: &SessionId,
    reader: &mut LineReader<OwnedReadHalf>,
) -> Result<(), BrokerError> {
    while let Some(frame) = reader.next().await {
        let line = frame.map_err(|e| BrokerError::from_codec(&id.to_string(), e))?;
        if line.trim().is_empty() {
            continue;
        }

        let envelope =
            Envelope::from_line(&line).map_err(|e| BrokerError::MalformedEnvelope {
                session: id.to_string(),
                reason: e.to_string(),
            })?;

        broker.on_message(id, envelope).await;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_peer_port_and_sequence() {
        let id = SessionId::new(7, "192.168.137.42:50312".parse().unwrap());
        assert_eq!(id.to_string(), "client_50312#7");
    }

    #[test]
    fn same_endpoint_different_sequence_differs() {
        let peer: SocketAddr = "10.0.0.2:4000".parse().unwrap();
        assert_ne!(SessionId::new(1, peer), SessionId::new(2, peer));
    }
}
