//! Topic-based publish/subscribe broker for the wristband network.
//!
//! Clients connect over TCP and exchange newline-delimited JSON envelopes
//! (see [`mafia_transport::Envelope`]). A `subscribe` registers the session
//! for a topic; a `publish` is fanned out to every session subscribed to that
//! topic, including the sender, as a [`mafia_transport::Delivery`] line.
//!
//! Nothing is persisted and nothing is retried: a subscriber that joins late
//! misses earlier publishes, and a failed write is logged and skipped.
//!
//! ```rust,no_run
//! use mafia_broker::{BrokerConfig, BrokerServer};
//!
//! # async fn example() -> Result<(), mafia_broker::BrokerError> {
//! let server = BrokerServer::bind(BrokerConfig::new().bind_addr("0.0.0.0:1883")).await?;
//! server.serve().await;
//! # Ok(())
//! # }
//! ```

mod broker;
mod config;
mod error;
mod registry;
mod session;
mod stats;

pub use broker::{Broker, BrokerServer};
pub use config::BrokerConfig;
pub use error::BrokerError;
pub use registry::Registry;
pub use session::SessionId;
pub use stats::{BrokerStats, Counter, StatsSnapshot};
