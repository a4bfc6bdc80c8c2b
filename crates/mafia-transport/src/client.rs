use crate::config::ClientConfig;
use crate::envelope::{Delivery, Envelope};
use crate::frame::{self, LineReader, LineWriter, LinesCodecError};
use crate::TransportError;

use futures_util::{SinkExt, StreamExt};
use tokio::io::AsyncWriteExt;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

/// A single outbound connection to the broker.
///
/// The client owns its socket exclusively: every call takes `&mut self`, so
/// there is never more than one writer. Dropping the client closes the
/// connection; [`close`](Self::close) additionally shuts the write side down
/// gracefully so the broker sees a clean EOF.
pub struct BrokerClient {
    addr: String,
    reader: LineReader<OwnedReadHalf>,
    writer: LineWriter<OwnedWriteHalf>,
    max_frame: usize,
}

impl BrokerClient {
    /// Connect to the broker at `config.addr()`.
    pub async fn connect(config: &ClientConfig) -> Result<Self, TransportError> {
        let addr = config.addr();
        let stream = TcpStream::connect(&addr)
            .await
            .map_err(|source| TransportError::Connect {
                addr: addr.clone(),
                source,
            })?;

        // Tap commands are tiny; don't let Nagle hold them back.
        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {addr}: {e}");
        }

        let (read_half, write_half) = stream.into_split();
        tracing::info!("connected to broker at {addr}");

        Ok(Self {
            addr,
            reader: frame::line_reader(read_half, config.max_frame),
            writer: frame::line_writer(write_half, config.max_frame),
            max_frame: config.max_frame,
        })
    }

    /// The `host:port` this client connected to.
    pub fn peer(&self) -> &str {
        &self.addr
    }

    /// Register this connection for deliveries on `topic`.
    pub async fn subscribe(&mut self, topic: &str) -> Result<(), TransportError> {
        self.send(&Envelope::subscribe(topic)).await
    }

    /// Publish `payload` on `topic`. Returns once the line has been flushed
    /// to the socket.
    pub async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        self.send(&Envelope::publish(topic, payload)).await
    }

    /// Send any envelope.
    pub async fn send(&mut self, envelope: &Envelope) -> Result<(), TransportError> {
        let line = envelope
            .to_line()
            .map_err(TransportError::Serialization)?;

        if line.len() > self.max_frame {
            return Err(TransportError::FrameTooLarge {
                size: line.len(),
                max: self.max_frame,
            });
        }

        self.writer.send(line).await.map_err(TransportError::Send)
    }

    /// Receive the next delivery. Blocks until one arrives.
    pub async fn recv(&mut self) -> Result<Delivery, TransportError> {
        loop {
            let line = match self.reader.next().await {
                Some(Ok(line)) => line,
                Some(Err(e)) => return Err(TransportError::Receive(e)),
                None => return Err(TransportError::Closed),
            };
            if line.trim().is_empty() {
                continue;
            }
            return Delivery::from_line(&line).map_err(TransportError::Deserialization);
        }
    }

    /// Flush and shut down the write side, then drop the connection.
    pub async fn close(mut self) -> Result<(), TransportError> {
        self.writer
            .get_mut()
            .shutdown()
            .await
            .map_err(|e| TransportError::Send(LinesCodecError::Io(e)))?;
        tracing::info!("disconnected from broker at {}", self.addr);
        Ok(())
    }
}
