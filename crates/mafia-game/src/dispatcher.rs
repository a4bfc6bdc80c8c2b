use mafia_transport::{BrokerClient, TapCommand, TransportError};

use crate::config::Pacing;
use crate::types::{Player, PlayerId, Role};

/// Topic the wristbands subscribe to.
pub const GAME_TOPIC: &str = "mafia";

/// Outbound publish path for the dispatcher.
///
/// In production: implemented by [`BrokerClient`].
/// In tests: a recorder that keeps every publish for inspection.
#[async_trait::async_trait]
pub trait Publisher: Send {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError>;
}

// ── Impl for BrokerClient (production) ──────────────────────────────

#[async_trait::async_trait]
impl Publisher for BrokerClient {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        BrokerClient::publish(self, topic, payload).await
    }
}

/// Turns tap requests into `{id, taps}` publishes on the game topic.
///
/// When disabled, every send is skipped (including its spacing pause)
/// except a forced role distribution.
pub struct TapDispatcher<P> {
    publisher: P,
    topic: String,
    enabled: bool,
    pacing: Pacing,
}

impl<P: Publisher> TapDispatcher<P> {
    pub fn new(publisher: P, topic: impl Into<String>, pacing: Pacing) -> Self {
        Self {
            publisher,
            topic: topic.into(),
            enabled: true,
            pacing,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn publisher(&self) -> &P {
        &self.publisher
    }

    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Tap one wristband.
    pub async fn send(&mut self, player: PlayerId, taps: u8) -> Result<(), TransportError> {
        if !self.enabled {
            return Ok(());
        }
        self.publish_tap(player, taps).await
    }

    /// Tap every living player holding `role`.
    pub async fn send_to_role(
        &mut self,
        players: &[Player],
        role: Role,
        taps: u8,
    ) -> Result<(), TransportError> {
        for p in players.iter().filter(|p| p.alive && p.role == role) {
            self.send(p.id, taps).await?;
        }
        Ok(())
    }

    /// Tap every living player, pausing between wristbands.
    pub async fn send_to_all_alive(
        &mut self,
        players: &[Player],
        taps: u8,
    ) -> Result<(), TransportError> {
        if !self.enabled {
            return Ok(());
        }
        for p in players.iter().filter(|p| p.alive) {
            self.publish_tap(p.id, taps).await?;
            tokio::time::sleep(self.pacing.all_alive_spacing).await;
        }
        Ok(())
    }

    /// Send each player its role code, dead or alive.
    ///
    /// `forced` distributes even while taps are disabled, so a sounds-only
    /// game still tells every wristband its role.
    pub async fn distribute_roles(
        &mut self,
        players: &[Player],
        forced: bool,
    ) -> Result<(), TransportError> {
        if !self.enabled && !forced {
            return Ok(());
        }
        tracing::info!("distributing roles via taps");
        for p in players {
            self.publish_tap(p.id, p.role.tap_code()).await?;
            tokio::time::sleep(self.pacing.distribution_spacing).await;
        }
        Ok(())
    }

    async fn publish_tap(&mut self, player: PlayerId, taps: u8) -> Result<(), TransportError> {
        let payload = TapCommand { id: player, taps }
            .to_payload()
            .map_err(TransportError::Serialization)?;
        self.publisher.publish(&self.topic, &payload).await?;
        tracing::info!("sent {taps} tap(s) to wristband {player}");
        Ok(())
    }
}

// ── MockPublisher (tests) ───────────────────────────────────────────
