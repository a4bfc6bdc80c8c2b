//! Broker statistics.
//!
//! Provides [`Counter`], an atomic monotonic counter that serializes as a
//! plain number, and [`BrokerStats`], the set of counters one broker keeps.
//! [`StatsSnapshot`] adds the derived gauges for logging.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// A monotonically increasing counter backed by [`AtomicU64`].
///
/// All operations use [`Ordering::Relaxed`]: these are statistics, not
/// synchronization.
#[derive(Default)]
pub struct Counter(AtomicU64);

impl Counter {
    pub fn new() -> Self {
        Self(AtomicU64::new(0))
    }

    pub fn inc(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add(&self, n: u64) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }
}

impl fmt::Debug for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Counter").field(&self.get()).finish()
    }
}

impl Serialize for Counter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.get().serialize(serializer)
    }
}

/// Counters for one broker instance.
#[derive(Debug, Default, Serialize)]
pub struct BrokerStats {
    pub sessions_accepted: Counter,
    pub sessions_closed: Counter,
    pub subscriptions: Counter,
    pub publishes: Counter,
    /// Delivery lines successfully written to subscribers.
    pub deliveries: Counter,
    /// Delivery writes that failed (subscriber went away mid-publish).
    pub failed_deliveries: Counter,
    /// Sessions dropped for sending something that is not an envelope.
    pub malformed_envelopes: Counter,
}

impl BrokerStats {
    /// Sessions accepted and not yet cleaned up.
    pub fn live_sessions(&self) -> u64 {
        self.sessions_accepted
            .get()
            .saturating_sub(self.sessions_closed.get())
    }

    pub fn snapshot(&self) -> StatsSnapshot<'_> {
        StatsSnapshot {
            counters: self,
            live_sessions: self.live_sessions(),
        }
    }
}

/// Serializable view of [`BrokerStats`] plus `live_sessions`.
#[derive(Debug, Serialize)]
pub struct StatsSnapshot<'a> {
    #[serde(flatten)]
    pub counters: &'a BrokerStats,
    pub live_sessions: u64,
}
