use mafia_transport::TransportError;

use crate::phase::{Action, Phase};
use crate::types::PlayerId;

/// Errors raised while handling an operator command.
///
/// Everything except [`Connection`](GameError::Connection) is a rejected
/// command: it is reported to the operator and the game state is unchanged.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("unknown command: {0}. Type 'help' for commands.")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("player {0} is not a valid target")]
    InvalidTarget(PlayerId),

    #[error("player {0} not found")]
    UnknownPlayer(PlayerId),

    #[error("'{action}' is not allowed during {phase}")]
    WrongPhase { action: Action, phase: Phase },

    #[error("unknown mode '{0}' (expected taps, sounds or all)")]
    UnknownMode(String),

    #[error("broker connection lost: {0}")]
    Connection(#[from] TransportError),
}

impl GameError {
    /// True if the session cannot continue.
    pub fn is_fatal(&self) -> bool {
        matches!(self, GameError::Connection(_))
    }
}
