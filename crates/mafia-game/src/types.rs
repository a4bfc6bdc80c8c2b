use std::collections::BTreeMap;
use std::fmt;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::feedback::Cue;

/// Wristband / player number, `1..=PLAYER_COUNT`.
pub type PlayerId = u8;

/// The game is played with exactly one player per role.
pub const PLAYER_COUNT: u8 = 4;

/// Taps that wake a role or the whole table.
pub const WAKE_TAPS: u8 = 2;
/// Taps that confirm a night action back to the acting role.
pub const CONFIRM_TAPS: u8 = 2;
/// Taps sent to a player killed during the night.
pub const DEATH_TAPS: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    Townfolk,
    Mafia,
    Doctor,
    Detective,
}

impl Role {
    /// The fixed role set dealt at every reset.
    pub const ALL: [Role; 4] = [Role::Mafia, Role::Doctor, Role::Detective, Role::Townfolk];

    /// Role-identifying tap count sent during role distribution.
    pub fn tap_code(self) -> u8 {
        match self {
            Role::Townfolk => 1,
            Role::Mafia => 2,
            Role::Doctor => 3,
            Role::Detective => 4,
        }
    }

    /// Cue that names this role out loud.
    pub fn cue(self) -> Cue {
        match self {
            Role::Townfolk => Cue::Everyone,
            Role::Mafia => Cue::Mafia,
            Role::Doctor => Cue::Doctor,
            Role::Detective => Cue::Detective,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Role::Townfolk => "townfolk",
            Role::Mafia => "mafia",
            Role::Doctor => "doctor",
            Role::Detective => "detective",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub role: Role,
    pub alive: bool,
}

/// All players of one game, keyed by id.
///
/// Players are never removed, only marked dead, so ids stay valid for the
/// whole game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    players: BTreeMap<PlayerId, Player>,
}

impl Roster {
    /// Deal `roles[i]` to player `i + 1`, everyone alive.
    pub fn from_roles(roles: [Role; PLAYER_COUNT as usize]) -> Self {
        let players = (1..=PLAYER_COUNT)
            .zip(roles)
            .map(|(id, role)| {
                (
                    id,
                    Player {
                        id,
                        role,
                        alive: true,
                    },
                )
            })
            .collect();
        Self { players }
    }

    /// Uniformly random bijection of [`Role::ALL`] onto the player ids.
    pub fn shuffled<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let mut roles = Role::ALL;
        roles.shuffle(rng);
        Self::from_roles(roles)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Player> {
        self.players.get(&id)
    }

    pub fn get_alive(&self, id: PlayerId) -> Option<&Player> {
        self.get(id).filter(|p| p.alive)
    }

    pub fn is_role_alive(&self, role: Role) -> bool {
        self.alive().any(|p| p.role == role)
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.players.values()
    }

    pub fn alive(&self) -> impl Iterator<Item = &Player> {
        self.players.values().filter(|p| p.alive)
    }

    /// Copy of every player, in id order.
    pub fn snapshot(&self) -> Vec<Player> {
        self.players.values().copied().collect()
    }

    pub fn assignments(&self) -> Vec<(PlayerId, Role)> {
        self.players.values().map(|p| (p.id, p.role)).collect()
    }

    /// Mark `id` dead. Returns its role, or `None` if unknown or already dead.
    pub fn mark_dead(&mut self, id: PlayerId) -> Option<Role> {
        let player = self.players.get_mut(&id).filter(|p| p.alive)?;
        player.alive = false;
        Some(player.role)
    }

    pub fn mafia_alive(&self) -> usize {
        self.alive().filter(|p| p.role == Role::Mafia).count()
    }

    pub fn town_alive(&self) -> usize {
        self.alive().filter(|p| p.role != Role::Mafia).count()
    }
}
