use std::fmt;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures_util::{Sink, SinkExt};
use mafia_transport::{frame, Delivery, Envelope};
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Mutex;

use crate::config::BrokerConfig;
use crate::error::BrokerError;
use crate::registry::Registry;
use crate::session::{self, Outbox, SessionId};
use crate::stats::BrokerStats;

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Session bookkeeping and fan-out. Sole owner of the registry.
///
/// All sessions share one `Broker` through an `Arc`. Registry access is
/// serialized by a single mutex; writes to subscribers happen after the lock
/// is released, each under that subscriber's own write lock.
pub struct Broker {
    registry: Mutex<Registry<Outbox>>,
    next_seq: AtomicU64,
    max_frame: usize,
    stats: BrokerStats,
}

impl Broker {
    pub fn new(config: &BrokerConfig) -> Arc<Self> {
        Arc::new(Self {
            registry: Mutex::new(Registry::new()),
            next_seq: AtomicU64::new(0),
            max_frame: config.max_frame,
            stats: BrokerStats::default(),
        })
    }

    /// Register a new connection and spawn its read loop.
    pub async fn accept(self: &Arc<Self>, stream: TcpStream, peer: SocketAddr) -> SessionId {
        let seq = self.next_seq.fetch_add(1, Ordering::Relaxed) + 1;
        let id = SessionId::new(seq, peer);

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!("set_nodelay failed for {id}: {e}");
        }
        let (read_half, write_half) = stream.into_split();
        let outbox: Outbox = Arc::new(Mutex::new(frame::line_writer(write_half, self.max_frame)));

        self.registry.lock().await.insert_session(id.clone(), outbox);
        self.stats.sessions_accepted.inc();
        tracing::info!("new client connected: {id} ({peer})");

        tokio::spawn(session::run(
            self.clone(),
            id.clone(),
            frame::line_reader(read_half, self.max_frame),
        ));

        id
    }

    /// Handle one decoded envelope from `id`.
    pub async fn on_message(&self, id: &SessionId, envelope: Envelope) {
        match envelope {
            Envelope::Subscribe { topic } => {
                if self.registry.lock().await.subscribe(id, &topic) {
                    self.stats.subscriptions.inc();
                    tracing::info!("{id} subscribed to '{topic}'");
                } else {
                    tracing::debug!("{id} is no longer live, ignoring subscribe to '{topic}'");
                }
            }
            Envelope::Publish { topic, payload } => {
                self.stats.publishes.inc();
                tracing::info!("publishing to '{topic}' from {id}: {payload}");
                self.publish(id, topic, payload).await;
            }
        }
    }

    /// Write one delivery line to every live subscriber of `topic`.
    ///
    /// A failed write is logged and counted; it never stops delivery to the
    /// remaining subscribers. The sender receives its own publish if it is
    /// subscribed. Returns the number of successful writes.
    pub async fn publish(&self, sender: &SessionId, topic: String, payload: String) -> usize {
        let subscribers = self.registry.lock().await.subscribers(&topic);
        if subscribers.is_empty() {
            tracing::debug!("no subscribers for '{topic}', dropping publish from {sender}");
            return 0;
        }

        let delivery = Delivery {
            topic,
            payload,
            sender: sender.to_string(),
        };
        let line = match delivery.to_line() {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("failed to encode delivery from {sender}: {e}");
                return 0;
            }
        };

        // subscribers read with the same limit and would drop the session
        if line.len() > self.max_frame {
            tracing::warn!(
                "delivery from {sender} is {} bytes, over the {} byte frame limit; dropped",
                line.len(),
                self.max_frame
            );
            self.stats.failed_deliveries.add(subscribers.len() as u64);
            return 0;
        }

        fan_out(&self.stats, &line, subscribers).await
    }

    /// Remove `id` from every topic and close its write side.
    ///
    /// Safe to call for a session that is already gone.
    pub async fn on_disconnect(&self, id: &SessionId) {
        let removed = self.registry.lock().await.remove_session(id);
        let Some(outbox) = removed else {
            return;
        };

        self.stats.sessions_closed.inc();
        let mut writer = outbox.lock().await;
        if let Err(e) = writer.get_mut().shutdown().await {
            tracing::debug!("shutdown of {id} failed: {e}");
        }
        tracing::info!("client disconnected: {id}");
    }

    pub fn stats(&self) -> &BrokerStats {
        &self.stats
    }

    pub async fn session_count(&self) -> usize {
        self.registry.lock().await.session_count()
    }

    pub async fn subscriber_count(&self, topic: &str) -> usize {
        self.registry.lock().await.subscriber_count(topic)
    }
}

/// Send `line` to each subscriber in turn, counting successes and failures.
async fn fan_out<'l, K, S>(
    stats: &BrokerStats,
    line: &'l str,
    subscribers: Vec<(K, Arc<Mutex<S>>)>,
) -> usize
where
    K: fmt::Display,
    S: Sink<&'l str> + Unpin,
    S::Error: fmt::Display,
{
    let mut delivered = 0;
    for (id, outbox) in subscribers {
        let mut writer = outbox.lock().await;
        match writer.send(line).await {
            Ok(()) => {
                delivered += 1;
                stats.deliveries.inc();
            }
            Err(e) => {
                stats.failed_deliveries.inc();
                tracing::warn!("delivery to {id} failed: {e}");
            }
        }
    }
    delivered
}

/// A bound listener plus the broker it feeds.
pub struct BrokerServer {
    listener: TcpListener,
    broker: Arc<Broker>,
}

impl BrokerServer {
    pub async fn bind(config: BrokerConfig) -> Result<Self, BrokerError> {
        let listener =
            TcpListener::bind(config.addr())
                .await
                .map_err(|source| BrokerError::Bind {
                    addr: config.addr().to_string(),
                    source,
                })?;

        Ok(Self {
            listener,
            broker: Broker::new(&config),
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn broker(&self) -> Arc<Broker> {
        self.broker.clone()
    }

    /// Accept connections forever.
    pub async fn serve(self) {
        self.serve_until(std::future::pending()).await
    }

    /// Accept connections until `shutdown` resolves.
    pub async fn serve_until<F: Future<Output = ()>>(self, shutdown: F) {
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    tracing::info!("broker shutting down");
                    break;
                }
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        self.broker.accept(stream, peer).await;
                    }
                    Err(e) => {
                        tracing::warn!("accept failed: {e}");
                        tokio::time::sleep(ACCEPT_BACKOFF).await;
                    }
                },
            }
        }
    }
}
