use std::fmt;

use crate::command::Mode;
use crate::phase::Phase;
use crate::types::{Player, PlayerId, Role};

/// Which side has won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winner {
    Town,
    Mafia,
}

impl fmt::Display for Winner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Winner::Town => f.write_str("TOWN WINS! All mafia have been eliminated!"),
            Winner::Mafia => f.write_str("MAFIA WINS! They have taken over the town!"),
        }
    }
}

/// Point-in-time view of the game for the `status` command.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub phase: Phase,
    pub mode: Mode,
    pub players: Vec<Player>,
    pub pending_kill: Option<PlayerId>,
    pub pending_save: Option<PlayerId>,
    pub winner: Option<Winner>,
}

/// Operator-facing notification, rendered by the host console.
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// New deal. Printed so the operator can run the table.
    RolesAssigned(Vec<(PlayerId, Role)>),
    RolesDistributed,
    /// `None` means every player.
    RolesRepeated(Option<PlayerId>),
    Nightfall,
    PhaseEntered(Phase),
    PhaseSkipped { phase: Phase, role: Role },
    RoleAsleep(Role),
    Lynched { player: PlayerId, role: Role },
    TargetChosen { player: PlayerId },
    Protecting { player: PlayerId },
    Investigated { player: PlayerId, role: Role },
    Killed { player: PlayerId, role: Role },
    Saved { player: PlayerId },
    QuietNight,
    GameOver(Winner),
    ModeSwitched(Mode),
    Status(Snapshot),
}

fn title(role: Role) -> &'static str {
    match role {
        Role::Townfolk => "Townfolk",
        Role::Mafia => "Mafia",
        Role::Doctor => "Doctor",
        Role::Detective => "Detective",
    }
}

impl fmt::Display for GameEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameEvent::RolesAssigned(assignments) => {
                for (id, role) in assignments {
                    writeln!(f, "Wristband {id}: {}", role.name().to_uppercase())?;
                }
                f.write_str(&"=".repeat(40))
            }
            GameEvent::RolesDistributed => {
                f.write_str("Roles distributed. Type 'next' to start the game.")
            }
            GameEvent::RolesRepeated(Some(id)) => write!(f, "Repeating role to player {id}..."),
            GameEvent::RolesRepeated(None) => f.write_str("Repeating roles to all players..."),
            GameEvent::Nightfall => f.write_str("Night phase"),
            GameEvent::PhaseEntered(Phase::Day) => f.write_str("Daytime"),
            GameEvent::PhaseEntered(Phase::NightMafia) => {
                f.write_str("Mafia wakes up. Use 'kill X' to pick a target.")
            }
            GameEvent::PhaseEntered(Phase::NightDoctor) => {
                f.write_str("Doctor wakes up. Use 'save X' to protect someone, or 'next'.")
            }
            GameEvent::PhaseEntered(Phase::NightDetective) => {
                f.write_str("Detective wakes up. Use 'check X' to investigate someone, or 'next'.")
            }
            GameEvent::PhaseSkipped { phase, role } => {
                write!(f, "{} is dead. Skipping {phase}.", title(*role))
            }
            GameEvent::RoleAsleep(role) => write!(f, "{} goes to sleep.", title(*role)),
            GameEvent::Lynched { player, role } => {
                write!(f, "Player {player} has been lynched. ")?;
                if *role == Role::Mafia {
                    f.write_str("They were the mafia!")
                } else {
                    write!(f, "They were the {role}.")
                }
            }
            GameEvent::TargetChosen { player } => write!(f, "Mafia targets player {player}."),
            GameEvent::Protecting { player } => write!(f, "Doctor will protect player {player}."),
            GameEvent::Investigated { player, role } => {
                if *role == Role::Mafia {
                    write!(f, "Player {player} is mafia.")
                } else {
                    write!(f, "Player {player} is not mafia ({role}).")
                }
            }
            GameEvent::Killed { player, role } => write!(f, "Player {player} ({role}) was killed."),
            GameEvent::Saved { player } => write!(f, "Player {player} was saved by the doctor."),
            GameEvent::QuietNight => f.write_str("Nobody was targeted tonight."),
            GameEvent::GameOver(winner) => write!(f, "{winner}"),
            GameEvent::ModeSwitched(mode) => write!(f, "Switched to {mode} mode."),
            GameEvent::Status(snapshot) => {
                write!(f, "Phase: {}  Mode: {}", snapshot.phase, snapshot.mode)?;
                for p in &snapshot.players {
                    let state = if p.alive { "alive" } else { "dead" };
                    write!(f, "\n  {}: {:<9} {state}", p.id, p.role)?;
                }
                if let Some(id) = snapshot.pending_kill {
                    write!(f, "\n  pending kill: {id}")?;
                }
                if let Some(id) = snapshot.pending_save {
                    write!(f, "\n  pending save: {id}")?;
                }
                if let Some(winner) = snapshot.winner {
                    write!(f, "\n{winner}")?;
                }
                Ok(())
            }
        }
    }
}
