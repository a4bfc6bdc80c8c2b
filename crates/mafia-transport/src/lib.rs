//! Wire protocol and client for the wristband broker.
//!
//! Every message is a single JSON object terminated by `\n`. Clients send
//! [`Envelope`]s (subscribe / publish), the broker answers subscribers with
//! [`Delivery`] lines. The game publishes [`TapCommand`]s as the payload.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use mafia_transport::{BrokerClient, ClientConfig, TapCommand};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut client = BrokerClient::connect(&ClientConfig::new().host("127.0.0.1")).await?;
//!
//! let payload = TapCommand { id: 3, taps: 2 }.to_payload()?;
//! client.publish("mafia", &payload).await?;
//!
//! client.close().await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod envelope;
mod error;
pub mod frame;

pub use client::BrokerClient;
pub use config::{ClientConfig, DEFAULT_BROKER_HOST, DEFAULT_BROKER_PORT};
pub use envelope::{Delivery, Envelope, TapCommand};
pub use error::TransportError;
pub use frame::DEFAULT_MAX_FRAME;
