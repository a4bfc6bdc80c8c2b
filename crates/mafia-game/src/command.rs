//! Operator console commands.

use std::fmt;
use std::str::FromStr;

use crate::error::GameError;
use crate::types::PlayerId;

/// Which output channels are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    TapsOnly,
    SoundsOnly,
    All,
}

impl Mode {
    /// Map the host's `--only-sound` / `--only-taps` flags.
    pub fn from_flags(only_sound: bool, only_taps: bool) -> Mode {
        match (only_sound, only_taps) {
            (true, false) => Mode::SoundsOnly,
            (false, true) => Mode::TapsOnly,
            _ => Mode::All,
        }
    }

    pub fn taps_enabled(self) -> bool {
        self != Mode::SoundsOnly
    }

    pub fn sounds_enabled(self) -> bool {
        self != Mode::TapsOnly
    }
}

impl FromStr for Mode {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "taps" => Ok(Mode::TapsOnly),
            "sounds" => Ok(Mode::SoundsOnly),
            "all" => Ok(Mode::All),
            other => Err(GameError::UnknownMode(other.to_string())),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::TapsOnly => "TAPS ONLY",
            Mode::SoundsOnly => "SOUNDS ONLY",
            Mode::All => "ALL (sounds + taps)",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Next,
    Kill(PlayerId),
    Save(PlayerId),
    Check(PlayerId),
    Repeat(Option<PlayerId>),
    Reset,
    Switch(Mode),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  next            advance to the next phase
  kill <id>       lynch (day) or pick the mafia's target (night)
  save <id>       doctor protects a player
  check <id>      detective investigates a player
  repeat [id]     re-send role taps to one or all players
  reset           deal new roles
  switch <mode>   taps | sounds | all (resets the game)
  status          show phase and players
  help            show this list
  quit            end the game";

impl Command {
    /// Parse one console line. Blank input is `Ok(None)`.
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    pub fn parse(line: &str) -> Result<Option<Command>, GameError> {
        let line = line.trim().to_ascii_lowercase();
        let mut parts = line.split_whitespace();
        let Some(word) = parts.next() else {
            return Ok(None);
        };
        let args: Vec<&str> = parts.collect();

        let command = match (word, args.as_slice()) {
            ("next", []) => Command::Next,
            ("kill", [id]) => Command::Kill(player_id(id, "kill <player_id>")?),
            ("kill", _) => return Err(GameError::Usage("kill <player_id>")),
            ("save", [id]) => Command::Save(player_id(id, "save <player_id>")?),
            ("save", _) => return Err(GameError::Usage("save <player_id>")),
            ("check", [id]) => Command::Check(player_id(id, "check <player_id>")?),
            ("check", _) => return Err(GameError::Usage("check <player_id>")),
            ("repeat", []) => Command::Repeat(None),
            ("repeat", [id]) => Command::Repeat(Some(player_id(id, "repeat [player_id]")?)),
            ("repeat", _) => return Err(GameError::Usage("repeat [player_id]")),
            ("reset", []) => Command::Reset,
            ("switch", [mode]) => Command::Switch(mode.parse()?),
            ("switch", _) => return Err(GameError::Usage("switch taps|sounds|all")),
            ("status", []) => Command::Status,
            ("help", []) => Command::Help,
            ("quit" | "exit", []) => Command::Quit,
            _ => return Err(GameError::UnknownCommand(word.to_string())),
        };
        Ok(Some(command))
    }
}

fn player_id(arg: &str, usage: &'static str) -> Result<PlayerId, GameError> {
    arg.parse().map_err(|_| GameError::Usage(usage))
}
