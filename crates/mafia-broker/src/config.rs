use mafia_transport::{DEFAULT_BROKER_PORT, DEFAULT_MAX_FRAME};

/// Configuration for a [`BrokerServer`](crate::BrokerServer).
///
/// ```rust
/// use mafia_broker::BrokerConfig;
///
/// let config = BrokerConfig::new()
///     .bind_addr("127.0.0.1:0")
///     .max_frame(4096);
/// assert_eq!(config.addr(), "127.0.0.1:0");
/// ```
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    /// Address the listener binds to.
    pub(crate) bind_addr: String,
    /// Maximum envelope line length; longer lines drop the session.
    pub(crate) max_frame: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl BrokerConfig {
    /// Create a config with defaults: all interfaces, port 1883.
    ///
    /// `MAFIA_BROKER_BIND` replaces the bind address when set.
    pub fn new() -> Self {
        let bind_addr = std::env::var("MAFIA_BROKER_BIND")
            .ok()
            .filter(|a| !a.trim().is_empty())
            .unwrap_or_else(|| format!("0.0.0.0:{DEFAULT_BROKER_PORT}"));

        Self {
            bind_addr,
            max_frame: DEFAULT_MAX_FRAME,
        }
    }

    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = addr.into();
        self
    }

    /// Set the maximum envelope line length (default: 64 KiB).
    pub fn max_frame(mut self, bytes: usize) -> Self {
        self.max_frame = bytes;
        self
    }

    pub fn addr(&self) -> &str {
        &self.bind_addr
    }
}
