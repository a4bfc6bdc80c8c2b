//! Game orchestration for a four-player Mafia table played on wristbands.
//!
//! The day/night cycle lives in [`GameState`], which is pure: every
//! operation returns a list of [`GameEffect`]s. The [`Orchestrator`] owns the
//! state and executes those effects, playing audio [`Cue`]s through a
//! [`FeedbackSink`] and publishing tap commands through a [`TapDispatcher`].
//!
//! ```rust,no_run
//! use mafia_game::{Command, GameConfig, Orchestrator, SilentSink};
//! use mafia_transport::{BrokerClient, ClientConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = BrokerClient::connect(&ClientConfig::new()).await?;
//! let (events_tx, mut events_rx) = tokio::sync::mpsc::channel(64);
//! tokio::spawn(async move {
//!     while let Some(event) = events_rx.recv().await {
//!         println!("{event}");
//!     }
//! });
//!
//! let mut game = Orchestrator::new(client, Box::new(SilentSink), GameConfig::new(), events_tx);
//! game.start().await?;
//! game.handle(Command::Next).await?;
//! # Ok(())
//! # }
//! ```

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod effect;
pub mod error;
pub mod event;
pub mod feedback;
pub mod orchestrator;
pub mod phase;
pub mod state;
pub mod types;

pub use command::{Command, Mode, HELP};
pub use config::{GameConfig, Pacing};
pub use dispatcher::{Publisher, TapDispatcher, GAME_TOPIC};
pub use effect::{Beat, GameEffect};
pub use error::GameError;
pub use event::{GameEvent, Snapshot, Winner};
pub use feedback::{CommandSink, Cue, FeedbackSink, SilentSink, SinkError, SoundBoard};
pub use orchestrator::{Flow, Orchestrator};
pub use phase::{Action, Phase};
pub use state::GameState;
pub use types::{Player, PlayerId, Role, Roster, PLAYER_COUNT};
