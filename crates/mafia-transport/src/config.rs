use crate::frame::DEFAULT_MAX_FRAME;

/// Gateway address of the mobile hotspot the wristbands join during a game.
pub const DEFAULT_BROKER_HOST: &str = "192.168.137.1";

pub const DEFAULT_BROKER_PORT: u16 = 1883;

/// Configuration for a [`BrokerClient`](crate::BrokerClient).
///
/// ```rust
/// use mafia_transport::ClientConfig;
///
/// let config = ClientConfig::new()
///     .host("127.0.0.1")
///     .port(18830)
///     .max_frame(4096);
/// assert_eq!(config.addr(), "127.0.0.1:18830");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) host: String,
    pub(crate) port: u16,
    /// Maximum line length accepted in either direction.
    pub(crate) max_frame: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientConfig {
    /// Create a config with defaults.
    ///
    /// `MAFIA_BROKER_HOST` and `MAFIA_BROKER_PORT`, when set and valid,
    /// replace the built-in host and port. Builder calls override both.
    pub fn new() -> Self {
        let host = std::env::var("MAFIA_BROKER_HOST")
            .ok()
            .filter(|h| !h.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BROKER_HOST.to_string());
        let port = std::env::var("MAFIA_BROKER_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(DEFAULT_BROKER_PORT);

        Self {
            host,
            port,
            max_frame: DEFAULT_MAX_FRAME,
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the maximum line length (default: 64 KiB).
    pub fn max_frame(mut self, bytes: usize) -> Self {
        self.max_frame = bytes;
        self
    }

    /// `host:port` as passed to the socket connect.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
