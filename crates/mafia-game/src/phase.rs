//! Day/night cycle and the phases in which each action is legal.
//!
//! Both tables live here so phase gating is stated exactly once.

use std::fmt;

use crate::types::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Day,
    NightMafia,
    NightDoctor,
    NightDetective,
}

/// The strict cycle, in order. `next` wraps from the last entry to the first.
const CYCLE: [Phase; 4] = [
    Phase::Day,
    Phase::NightMafia,
    Phase::NightDoctor,
    Phase::NightDetective,
];

impl Phase {
    pub fn next(self) -> Phase {
        let idx = CYCLE.iter().position(|p| *p == self).unwrap_or(0);
        CYCLE[(idx + 1) % CYCLE.len()]
    }

    /// Role woken when this phase is entered. `None` for the day.
    pub fn waking_role(self) -> Option<Role> {
        match self {
            Phase::Day => None,
            Phase::NightMafia => Some(Role::Mafia),
            Phase::NightDoctor => Some(Role::Doctor),
            Phase::NightDetective => Some(Role::Detective),
        }
    }

    pub fn is_night(self) -> bool {
        self != Phase::Day
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Day => "DAY",
            Phase::NightMafia => "NIGHT_MAFIA",
            Phase::NightDoctor => "NIGHT_DOCTOR",
            Phase::NightDetective => "NIGHT_DETECTIVE",
        };
        f.write_str(name)
    }
}

/// Player-targeting operator actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Kill,
    Save,
    Check,
}

impl Action {
    pub fn legal_phases(self) -> &'static [Phase] {
        match self {
            // Day: lynch. Night: the mafia's pick.
            Action::Kill => &[Phase::Day, Phase::NightMafia],
            Action::Save => &[Phase::NightDoctor],
            Action::Check => &[Phase::NightDetective],
        }
    }

    pub fn is_legal_in(self, phase: Phase) -> bool {
        self.legal_phases().contains(&phase)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Action::Kill => "kill",
            Action::Save => "save",
            Action::Check => "check",
        })
    }
}
