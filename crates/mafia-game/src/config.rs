use std::time::Duration;

use crate::command::Mode;
use crate::dispatcher::GAME_TOPIC;
use crate::effect::Beat;

/// Real-time pauses between cues.
///
/// The spacing values keep wristband messages from colliding on the radio;
/// they are tuning, not correctness. Tests use [`Pacing::immediate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    /// Between taps to each living player.
    pub all_alive_spacing: Duration,
    /// Between role codes during distribution.
    pub distribution_spacing: Duration,
    pub nightfall: Duration,
    pub role_sleep: Duration,
    pub dawn: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            all_alive_spacing: Duration::from_millis(100),
            distribution_spacing: Duration::from_millis(800),
            nightfall: Duration::from_millis(500),
            role_sleep: Duration::from_millis(300),
            dawn: Duration::from_millis(500),
        }
    }
}

impl Pacing {
    /// No pauses at all.
    pub fn immediate() -> Self {
        Self {
            all_alive_spacing: Duration::ZERO,
            distribution_spacing: Duration::ZERO,
            nightfall: Duration::ZERO,
            role_sleep: Duration::ZERO,
            dawn: Duration::ZERO,
        }
    }

    pub fn beat(&self, beat: Beat) -> Duration {
        match beat {
            Beat::Nightfall => self.nightfall,
            Beat::RoleSleep => self.role_sleep,
            Beat::Dawn => self.dawn,
        }
    }
}

/// Configuration for an [`Orchestrator`](crate::Orchestrator).
///
/// ```rust
/// use mafia_game::{GameConfig, Mode, Pacing};
///
/// let config = GameConfig::new()
///     .mode(Mode::TapsOnly)
///     .pacing(Pacing::immediate())
///     .seed(42);
/// assert_eq!(config.topic, "mafia");
/// ```
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub mode: Mode,
    pub pacing: Pacing,
    /// Topic the wristbands subscribe to.
    pub topic: String,
    /// Fixed seed for role dealing; `None` seeds from the OS.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self {
            mode: Mode::All,
            pacing: Pacing::default(),
            topic: GAME_TOPIC.to_string(),
            seed: None,
        }
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn pacing(mut self, pacing: Pacing) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
