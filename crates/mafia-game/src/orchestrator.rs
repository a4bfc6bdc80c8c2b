//! Effect executor: the only part of the game that touches I/O.
//!
//! Owns the pure [`GameState`], turns operator [`Command`]s into effects and
//! runs them in order:
//! - `Play` -> sound board (failures logged, never fatal)
//! - `Tap*` / `DistributeRoles` -> tap dispatcher (failures are fatal)
//! - `Pause` -> `tokio::time::sleep`
//! - `Emit` -> operator event channel

use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

use mafia_transport::TransportError;

use crate::command::{Command, Mode};
use crate::config::{GameConfig, Pacing};
use crate::dispatcher::{Publisher, TapDispatcher};
use crate::effect::GameEffect;
use crate::error::GameError;
use crate::event::{GameEvent, Snapshot};
use crate::feedback::{FeedbackSink, SoundBoard};
use crate::state::GameState;
use crate::types::Roster;

/// Whether the command loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Orchestrator<P> {
    state: GameState,
    dispatcher: TapDispatcher<P>,
    sounds: SoundBoard,
    mode: Mode,
    pacing: Pacing,
    events: mpsc::Sender<GameEvent>,
    rng: StdRng,
}

impl<P: Publisher> Orchestrator<P> {
    /// Build an orchestrator. No roles are dealt until [`start`](Self::start).
    pub fn new(
        publisher: P,
        sink: Box<dyn FeedbackSink>,
        config: GameConfig,
        events: mpsc::Sender<GameEvent>,
    ) -> Self {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_rng(&mut rand::rng()),
        };
        let state = GameState::new(Roster::shuffled(&mut rng));

        let mut dispatcher = TapDispatcher::new(publisher, config.topic, config.pacing);
        dispatcher.set_enabled(config.mode.taps_enabled());

        Self {
            state,
            dispatcher,
            sounds: SoundBoard::new(sink, config.mode.sounds_enabled()),
            mode: config.mode,
            pacing: config.pacing,
            events,
            rng,
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn dispatcher(&self) -> &TapDispatcher<P> {
        &self.dispatcher
    }

    pub fn into_publisher(self) -> P {
        self.dispatcher.into_publisher()
    }

    /// Deal the first game and distribute roles.
    pub async fn start(&mut self) -> Result<(), GameError> {
        self.reset().await
    }

    /// Deal new roles and distribute them.
    pub async fn reset(&mut self) -> Result<(), GameError> {
        tracing::info!("resetting game");
        let effects = self.state.reset(&mut self.rng);
        self.execute(effects).await?;
        Ok(())
    }

    /// Start over with a fixed deal.
    pub async fn reset_with(&mut self, roster: Roster) -> Result<(), GameError> {
        let effects = self.state.reset_with(roster);
        self.execute(effects).await?;
        Ok(())
    }

    /// Reconfigure output channels, then reset.
    pub async fn switch_mode(&mut self, mode: Mode) -> Result<(), GameError> {
        self.mode = mode;
        self.dispatcher.set_enabled(mode.taps_enabled());
        self.sounds.set_enabled(mode.sounds_enabled());
        self.emit(GameEvent::ModeSwitched(mode)).await;
        self.reset().await
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.state.phase(),
            mode: self.mode,
            players: self.state.roster().snapshot(),
            pending_kill: self.state.pending_kill(),
            pending_save: self.state.pending_save(),
            winner: self.state.winner(),
        }
    }

    /// Run one operator command to completion.
    ///
    /// Rejected commands return an error and change nothing; only
    /// [`GameError::Connection`] means the session is over.
    pub async fn handle(&mut self, command: Command) -> Result<Flow, GameError> {
        tracing::debug!("command: {command:?} in {}", self.state.phase());

        let effects = match command {
            Command::Quit => return Ok(Flow::Quit),
            Command::Help => return Ok(Flow::Continue),
            Command::Reset => {
                self.reset().await?;
                return Ok(Flow::Continue);
            }
            Command::Switch(mode) => {
                self.switch_mode(mode).await?;
                return Ok(Flow::Continue);
            }
            Command::Status => vec![GameEffect::Emit(GameEvent::Status(self.snapshot()))],
            Command::Next => self.state.advance(),
            Command::Kill(id) => self.state.kill(id)?,
            Command::Save(id) => self.state.save(id)?,
            Command::Check(id) => self.state.check(id)?,
            Command::Repeat(id) => self.state.repeat_roles(id)?,
        };

        self.execute(effects).await?;
        Ok(Flow::Continue)
    }

    /// Execute effects in order. Stops at the first publish failure.
    pub async fn execute(&mut self, effects: Vec<GameEffect>) -> Result<(), TransportError> {
        for effect in effects {
            match effect {
                GameEffect::Play(cues) => self.sounds.play_sequence(&cues).await,
                GameEffect::TapPlayer { player, taps } => {
                    self.dispatcher.send(player, taps).await?;
                }
                GameEffect::TapRole {
                    role,
                    taps,
                    players,
                } => {
                    self.dispatcher.send_to_role(&players, role, taps).await?;
                }
                GameEffect::TapAllAlive { taps, players } => {
                    self.dispatcher.send_to_all_alive(&players, taps).await?;
                }
                GameEffect::DistributeRoles { players, forced } => {
                    self.dispatcher.distribute_roles(&players, forced).await?;
                }
                GameEffect::Pause(beat) => tokio::time::sleep(self.pacing.beat(beat)).await,
                GameEffect::Emit(event) => self.emit(event).await,
            }
        }
        Ok(())
    }

    async fn emit(&self, event: GameEvent) {
        if self.events.send(event).await.is_err() {
            tracing::debug!("event receiver dropped");
        }
    }
}
