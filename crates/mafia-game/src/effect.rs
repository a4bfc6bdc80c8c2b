use crate::event::GameEvent;
use crate::feedback::Cue;
use crate::types::{Player, PlayerId, Role};

/// Intention produced by the pure logic in [`GameState`](crate::GameState).
///
/// Every `GameState` operation returns `Vec<GameEffect>`; the
/// [`Orchestrator`](crate::Orchestrator) then executes them in order against
/// the sound board and the tap dispatcher. Tap effects carry the player
/// snapshot taken when they were produced, so a death resolved later in the
/// same batch does not change who an earlier tap goes to.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEffect {
    /// Play cues one after another.
    Play(Vec<Cue>),

    /// Tap one wristband, dead or alive.
    TapPlayer { player: PlayerId, taps: u8 },

    /// Tap every living player holding `role`.
    TapRole {
        role: Role,
        taps: u8,
        players: Vec<Player>,
    },

    /// Tap every living player, spaced out.
    TapAllAlive { taps: u8, players: Vec<Player> },

    /// Send each player its role code. `forced` sends even when taps are off.
    DistributeRoles { players: Vec<Player>, forced: bool },

    /// Real-time pause.
    Pause(Beat),

    /// Report something to the operator.
    Emit(GameEvent),
}

/// Named pauses; their lengths come from [`Pacing`](crate::Pacing).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    /// After everyone is told to sleep, before the mafia wakes.
    Nightfall,
    /// After a role is told to go back to sleep.
    RoleSleep,
    /// After night resolution, before the day starts.
    Dawn,
}
