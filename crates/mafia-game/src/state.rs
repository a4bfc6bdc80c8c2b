use rand::Rng;

use crate::effect::{Beat, GameEffect};
use crate::error::GameError;
use crate::event::{GameEvent, Winner};
use crate::feedback::Cue;
use crate::phase::{Action, Phase};
use crate::types::{PlayerId, Role, Roster, CONFIRM_TAPS, DEATH_TAPS, WAKE_TAPS};

/// Complete game state. Pure logic: no async, no I/O.
///
/// Every operation returns `Vec<GameEffect>` for the orchestrator to
/// execute. A rejected operation returns an error and leaves the state
/// untouched.
///
/// Invariant: `pending_kill` / `pending_save` are only set between the
/// start of a night and its resolution.
#[derive(Debug, Clone)]
pub struct GameState {
    roster: Roster,
    phase: Phase,
    pending_kill: Option<PlayerId>,
    pending_save: Option<PlayerId>,
}

impl GameState {
    /// A fresh game at `Day` with the given deal.
    pub fn new(roster: Roster) -> Self {
        Self {
            roster,
            phase: Phase::Day,
            pending_kill: None,
            pending_save: None,
        }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn pending_kill(&self) -> Option<PlayerId> {
        self.pending_kill
    }

    pub fn pending_save(&self) -> Option<PlayerId> {
        self.pending_save
    }

    // ── Reset / roles ───────────────────────────────────────────────

    /// Deal a uniformly random new set of roles.
    pub fn reset<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Vec<GameEffect> {
        self.reset_with(Roster::shuffled(rng))
    }

    /// Start over at `Day` with a given deal and distribute it.
    pub fn reset_with(&mut self, roster: Roster) -> Vec<GameEffect> {
        *self = Self::new(roster);
        vec![
            GameEffect::Emit(GameEvent::RolesAssigned(self.roster.assignments())),
            GameEffect::DistributeRoles {
                players: self.roster.snapshot(),
                forced: true,
            },
            GameEffect::Emit(GameEvent::RolesDistributed),
        ]
    }

    /// Re-send role codes to one player or to everyone. Legal in any phase.
    pub fn repeat_roles(&self, player: Option<PlayerId>) -> Result<Vec<GameEffect>, GameError> {
        match player {
            Some(id) => {
                let p = self.roster.get(id).ok_or(GameError::UnknownPlayer(id))?;
                Ok(vec![
                    GameEffect::Emit(GameEvent::RolesRepeated(Some(id))),
                    GameEffect::TapPlayer {
                        player: id,
                        taps: p.role.tap_code(),
                    },
                ])
            }
            None => Ok(vec![
                GameEffect::Emit(GameEvent::RolesRepeated(None)),
                GameEffect::DistributeRoles {
                    players: self.roster.snapshot(),
                    forced: false,
                },
            ]),
        }
    }

    // ── Phase cycle ─────────────────────────────────────────────────

    /// Leave the current phase and move forward, skipping any night phase
    /// whose role is dead, until a phase with a living role or `Day`.
    pub fn advance(&mut self) -> Vec<GameEffect> {
        let mut effects = Vec::new();
        loop {
            self.leave(&mut effects);
            self.phase = self.phase.next();

            match self.phase.waking_role() {
                Some(role) if !self.roster.is_role_alive(role) => {
                    effects.push(GameEffect::Emit(GameEvent::PhaseSkipped {
                        phase: self.phase,
                        role,
                    }));
                }
                _ => {
                    self.enter(&mut effects);
                    return effects;
                }
            }
        }
    }

    fn leave(&mut self, effects: &mut Vec<GameEffect>) {
        match self.phase {
            Phase::Day => {
                self.pending_kill = None;
                self.pending_save = None;
                effects.push(GameEffect::Emit(GameEvent::Nightfall));
                effects.push(GameEffect::Play(vec![Cue::Sleep, Cue::Everyone]));
                effects.push(GameEffect::TapAllAlive {
                    taps: WAKE_TAPS,
                    players: self.roster.snapshot(),
                });
                effects.push(GameEffect::Pause(Beat::Nightfall));
            }
            Phase::NightMafia | Phase::NightDoctor => self.put_to_sleep(effects),
            Phase::NightDetective => {
                self.put_to_sleep(effects);
                self.resolve_night(effects);
            }
        }
    }

    fn put_to_sleep(&self, effects: &mut Vec<GameEffect>) {
        let Some(role) = self.phase.waking_role() else {
            return;
        };
        if self.roster.is_role_alive(role) {
            effects.push(GameEffect::Emit(GameEvent::RoleAsleep(role)));
            effects.push(GameEffect::Play(vec![Cue::Sleep, role.cue()]));
            effects.push(GameEffect::Pause(Beat::RoleSleep));
        }
    }

    fn enter(&mut self, effects: &mut Vec<GameEffect>) {
        effects.push(GameEffect::Emit(GameEvent::PhaseEntered(self.phase)));
        match self.phase.waking_role() {
            Some(role) => {
                effects.push(GameEffect::Play(vec![Cue::Wake, role.cue()]));
                effects.push(GameEffect::TapRole {
                    role,
                    taps: WAKE_TAPS,
                    players: self.roster.snapshot(),
                });
            }
            None => {
                effects.push(GameEffect::Play(vec![Cue::Wake, Cue::Everyone]));
                effects.push(GameEffect::TapAllAlive {
                    taps: WAKE_TAPS,
                    players: self.roster.snapshot(),
                });
                self.push_winner(effects);
            }
        }
    }

    fn resolve_night(&mut self, effects: &mut Vec<GameEffect>) {
        match self.pending_kill.and_then(|id| self.roster.get_alive(id).copied()) {
            Some(victim) if self.pending_save == Some(victim.id) => {
                effects.push(GameEffect::Emit(GameEvent::Saved { player: victim.id }));
                effects.push(GameEffect::Play(vec![Cue::Protection]));
            }
            Some(victim) => {
                self.roster.mark_dead(victim.id);
                effects.push(GameEffect::Emit(GameEvent::Killed {
                    player: victim.id,
                    role: victim.role,
                }));
                effects.push(GameEffect::Play(vec![Cue::Lynch, Cue::Everyone]));
                effects.push(GameEffect::TapPlayer {
                    player: victim.id,
                    taps: DEATH_TAPS,
                });
            }
            None => effects.push(GameEffect::Emit(GameEvent::QuietNight)),
        }

        self.pending_kill = None;
        self.pending_save = None;
        effects.push(GameEffect::Pause(Beat::Dawn));
    }

    // ── Player actions ──────────────────────────────────────────────

    /// Phase first, then existence, then liveness.
    fn validate(&self, action: Action, id: PlayerId) -> Result<(), GameError> {
        if !action.is_legal_in(self.phase) {
            return Err(GameError::WrongPhase {
                action,
                phase: self.phase,
            });
        }
        let player = self.roster.get(id).ok_or(GameError::UnknownPlayer(id))?;
        if !player.alive {
            return Err(GameError::InvalidTarget(id));
        }
        Ok(())
    }

    /// Lynch at day, or record the mafia's target at night and hand over to
    /// the doctor.
    pub fn kill(&mut self, id: PlayerId) -> Result<Vec<GameEffect>, GameError> {
        self.validate(Action::Kill, id)?;

        if self.phase == Phase::Day {
            return Ok(self.lynch(id));
        }

        self.pending_kill = Some(id);
        let mut effects = vec![
            GameEffect::Emit(GameEvent::TargetChosen { player: id }),
            GameEffect::TapRole {
                role: Role::Mafia,
                taps: CONFIRM_TAPS,
                players: self.roster.snapshot(),
            },
        ];
        effects.extend(self.advance());
        Ok(effects)
    }

    fn lynch(&mut self, id: PlayerId) -> Vec<GameEffect> {
        let mut effects = Vec::new();
        if let Some(role) = self.roster.mark_dead(id) {
            effects.push(GameEffect::Emit(GameEvent::Lynched { player: id, role }));
            let reveal = if role == Role::Mafia {
                Cue::Mafia
            } else {
                Cue::Everyone
            };
            effects.push(GameEffect::Play(vec![Cue::Lynch, reveal]));
            self.push_winner(&mut effects);
        }
        effects
    }

    pub fn save(&mut self, id: PlayerId) -> Result<Vec<GameEffect>, GameError> {
        self.validate(Action::Save, id)?;

        self.pending_save = Some(id);
        let mut effects = vec![
            GameEffect::Emit(GameEvent::Protecting { player: id }),
            GameEffect::TapRole {
                role: Role::Doctor,
                taps: CONFIRM_TAPS,
                players: self.roster.snapshot(),
            },
        ];
        effects.extend(self.advance());
        Ok(effects)
    }

    pub fn check(&mut self, id: PlayerId) -> Result<Vec<GameEffect>, GameError> {
        self.validate(Action::Check, id)?;

        let role = self
            .roster
            .get(id)
            .map(|p| p.role)
            .ok_or(GameError::UnknownPlayer(id))?;
        let mut effects = vec![
            GameEffect::Play(vec![Cue::Hint]),
            GameEffect::Emit(GameEvent::Investigated { player: id, role }),
            GameEffect::TapRole {
                role: Role::Detective,
                taps: CONFIRM_TAPS,
                players: self.roster.snapshot(),
            },
        ];
        effects.extend(self.advance());
        Ok(effects)
    }

    // ── Win condition ───────────────────────────────────────────────

    pub fn winner(&self) -> Option<Winner> {
        let mafia = self.roster.mafia_alive();
        let town = self.roster.town_alive();
        if mafia == 0 {
            Some(Winner::Town)
        } else if mafia >= town {
            Some(Winner::Mafia)
        } else {
            None
        }
    }

    fn push_winner(&self, effects: &mut Vec<GameEffect>) {
        if let Some(winner) = self.winner() {
            effects.push(GameEffect::Emit(GameEvent::GameOver(winner)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 1: Mafia, 2: Doctor, 3: Detective, 4: Townfolk
    fn game() -> GameState {
        GameState::new(Roster::from_roles([
            Role::Mafia,
            Role::Doctor,
            Role::Detective,
            Role::Townfolk,
        ]))
    }

    fn events(effects: &[GameEffect]) -> Vec<GameEvent> {
        effects
            .iter()
            .filter_map(|e| match e {
                GameEffect::Emit(ev) => Some(ev.clone()),
                _ => None,
            })
            .collect()
    }

    fn cues(effects: &[GameEffect]) -> Vec<Cue> {
        effects
            .iter()
            .filter_map(|e| match e {
                GameEffect::Play(c) => Some(c.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn reset_starts_at_day_and_forces_distribution() {
        let mut g = game();
        g.phase = Phase::NightDoctor;
        g.pending_kill = Some(3);

        let effects = g.reset_with(g.roster().clone());

        assert_eq!(g.phase(), Phase::Day);
        assert_eq!(g.pending_kill(), None);
        assert!(effects
            .iter()
            .any(|e| matches!(e, GameEffect::DistributeRoles { forced: true, players } if players.len() == 4)));
    }

    #[test]
    fn next_from_day_wakes_mafia() {
        let mut g = game();
        let effects = g.advance();

        assert_eq!(g.phase(), Phase::NightMafia);
        assert_eq!(
            cues(&effects),
            vec![Cue::Sleep, Cue::Everyone, Cue::Wake, Cue::Mafia]
        );
        assert_eq!(
            events(&effects),
            vec![GameEvent::Nightfall, GameEvent::PhaseEntered(Phase::NightMafia)]
        );
        assert!(effects.contains(&GameEffect::Pause(Beat::Nightfall)));
    }

    #[test]
    fn night_kill_hands_over_to_doctor() {
        let mut g = game();
        g.advance();

        let effects = g.kill(3).unwrap();

        assert_eq!(g.phase(), Phase::NightDoctor);
        assert_eq!(g.pending_kill(), Some(3));
        assert_eq!(
            cues(&effects),
            vec![Cue::Sleep, Cue::Mafia, Cue::Wake, Cue::Doctor]
        );
        assert!(matches!(
            &effects[1],
            GameEffect::TapRole { role: Role::Mafia, taps: 2, .. }
        ));
    }

    #[test]
    fn dead_doctor_is_skipped() {
        let mut g = game();
        g.roster.mark_dead(2);
        g.advance();

        let effects = g.kill(4).unwrap();

        assert_eq!(g.phase(), Phase::NightDetective);
        assert!(events(&effects).contains(&GameEvent::PhaseSkipped {
            phase: Phase::NightDoctor,
            role: Role::Doctor,
        }));
        // no doctor sleep / wake cues
        assert!(!cues(&effects).contains(&Cue::Doctor));
    }

    #[test]
    fn dead_detective_goes_straight_to_resolution() {
        let mut g = game();
        g.roster.mark_dead(3);
        g.advance();
        g.kill(4).unwrap();

        let effects = g.save(2).unwrap();

        assert_eq!(g.phase(), Phase::Day);
        let evs = events(&effects);
        assert!(evs.contains(&GameEvent::PhaseSkipped {
            phase: Phase::NightDetective,
            role: Role::Detective,
        }));
        assert!(evs.contains(&GameEvent::Killed {
            player: 4,
            role: Role::Townfolk,
        }));
        assert!(!g.roster().get(4).unwrap().alive);
    }

    #[test]
    fn resolution_without_kill_is_quiet() {
        let mut g = game();
        g.advance();
        g.advance();
        g.advance();
        let effects = g.advance();

        assert_eq!(g.phase(), Phase::Day);
        assert!(events(&effects).contains(&GameEvent::QuietNight));
        assert_eq!(g.roster().alive().count(), 4);
    }

    #[test]
    fn save_matching_kill_protects() {
        let mut g = game();
        g.advance();
        g.kill(4).unwrap();
        g.save(4).unwrap();
        let effects = g.check(1).unwrap();

        assert!(g.roster().get(4).unwrap().alive);
        assert!(cues(&effects).contains(&Cue::Protection));
        assert!(events(&effects).contains(&GameEvent::Saved { player: 4 }));
        assert_eq!(g.pending_kill(), None);
        assert_eq!(g.pending_save(), None);
    }

    #[test]
    fn unprotected_victim_dies_with_death_tap() {
        let mut g = game();
        g.advance();
        g.kill(4).unwrap();
        g.save(2).unwrap();
        let effects = g.check(1).unwrap();

        assert!(!g.roster().get(4).unwrap().alive);
        assert!(effects.contains(&GameEffect::TapPlayer { player: 4, taps: 1 }));
        // confirm tap to the detective precedes the death
        let confirm = effects
            .iter()
            .position(|e| matches!(e, GameEffect::TapRole { role: Role::Detective, .. }))
            .unwrap();
        let death = effects
            .iter()
            .position(|e| matches!(e, GameEffect::TapPlayer { player: 4, .. }))
            .unwrap();
        assert!(confirm < death);
    }

    #[test]
    fn dawn_taps_exclude_the_victim() {
        let mut g = game();
        g.advance();
        g.kill(4).unwrap();
        g.save(2).unwrap();
        let effects = g.check(1).unwrap();

        let Some(GameEffect::TapAllAlive { players, .. }) = effects
            .iter()
            .rev()
            .find(|e| matches!(e, GameEffect::TapAllAlive { .. }))
        else {
            panic!("no dawn taps");
        };
        let alive: Vec<_> = players.iter().filter(|p| p.alive).map(|p| p.id).collect();
        assert_eq!(alive, vec![1, 2, 3]);
    }

    #[test]
    fn detective_killed_tonight_still_gets_confirm() {
        let mut g = game();
        g.advance();
        g.kill(3).unwrap();
        g.save(2).unwrap();
        let effects = g.check(1).unwrap();

        let Some(GameEffect::TapRole { players, .. }) = effects
            .iter()
            .find(|e| matches!(e, GameEffect::TapRole { role: Role::Detective, .. }))
        else {
            panic!("no confirm tap");
        };
        assert!(players.iter().any(|p| p.id == 3 && p.alive));
        assert!(!g.roster().get(3).unwrap().alive);
    }

    #[test]
    fn wrong_phase_rejected_without_mutation() {
        let mut g = game();
        assert!(matches!(g.save(1), Err(GameError::WrongPhase { .. })));
        assert!(matches!(g.check(1), Err(GameError::WrongPhase { .. })));

        g.advance();
        assert!(matches!(
            g.save(1),
            Err(GameError::WrongPhase {
                action: Action::Save,
                phase: Phase::NightMafia
            })
        ));
        assert_eq!(g.phase(), Phase::NightMafia);
        assert_eq!(g.pending_save(), None);
    }

    #[test]
    fn phase_checked_before_target() {
        let mut g = game();
        // player 9 does not exist, but the phase is wrong first
        assert!(matches!(g.save(9), Err(GameError::WrongPhase { .. })));
        assert!(matches!(g.kill(9), Err(GameError::UnknownPlayer(9))));
    }

    #[test]
    fn dead_target_rejected() {
        let mut g = game();
        g.kill(4).unwrap();
        assert!(matches!(g.kill(4), Err(GameError::InvalidTarget(4))));
    }

    #[test]
    fn lynching_mafia_wins_for_town() {
        let mut g = game();
        let effects = g.kill(1).unwrap();

        assert_eq!(g.phase(), Phase::Day);
        assert_eq!(cues(&effects), vec![Cue::Lynch, Cue::Mafia]);
        assert_eq!(
            events(&effects),
            vec![
                GameEvent::Lynched {
                    player: 1,
                    role: Role::Mafia
                },
                GameEvent::GameOver(Winner::Town),
            ]
        );
    }

    #[test]
    fn mafia_wins_at_parity() {
        let mut g = game();
        g.kill(4).unwrap();
        assert_eq!(g.winner(), None);
        let effects = g.kill(2).unwrap();
        assert_eq!(g.winner(), Some(Winner::Mafia));
        assert!(events(&effects).contains(&GameEvent::GameOver(Winner::Mafia)));
        assert_eq!(cues(&effects), vec![Cue::Lynch, Cue::Everyone]);
    }

    #[test]
    fn repeat_unknown_player_rejected() {
        let g = game();
        assert!(matches!(g.repeat_roles(Some(7)), Err(GameError::UnknownPlayer(7))));
    }

    #[test]
    fn repeat_reaches_dead_players() {
        let mut g = game();
        g.kill(2).unwrap();
        let effects = g.repeat_roles(Some(2)).unwrap();
        assert!(effects.contains(&GameEffect::TapPlayer { player: 2, taps: 3 }));

        let effects = g.repeat_roles(None).unwrap();
        assert!(effects
            .iter()
            .any(|e| matches!(e, GameEffect::DistributeRoles { forced: false, .. })));
    }
}
