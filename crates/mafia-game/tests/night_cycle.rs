//! Whole-game scenarios driven through the public API.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use mafia_game::{
    Command, Cue, FeedbackSink, GameConfig, GameEffect, GameError, GameEvent, GameState, Mode,
    Orchestrator, Pacing, Phase, Publisher, Role, Roster, SinkError, Winner,
};
use mafia_transport::{TapCommand, TransportError};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[derive(Clone, Default)]
struct Wristbands {
    taps: Arc<Mutex<Vec<TapCommand>>>,
}

#[async_trait::async_trait]
impl Publisher for Wristbands {
    async fn publish(&mut self, topic: &str, payload: &str) -> Result<(), TransportError> {
        assert_eq!(topic, "mafia");
        let tap = TapCommand::from_payload(payload).map_err(TransportError::Deserialization)?;
        self.taps.lock().unwrap().push(tap);
        Ok(())
    }
}

#[derive(Clone, Default)]
struct Speaker {
    played: Arc<Mutex<Vec<Cue>>>,
}

#[async_trait::async_trait]
impl FeedbackSink for Speaker {
    async fn play(&mut self, cue: Cue) -> Result<(), SinkError> {
        self.played.lock().unwrap().push(cue);
        Ok(())
    }
}

struct Table {
    game: Orchestrator<Wristbands>,
    bands: Wristbands,
    speaker: Speaker,
    events: mpsc::Receiver<GameEvent>,
}

impl Table {
    async fn dealt(roles: [Role; 4]) -> Self {
        init_tracing();
        let bands = Wristbands::default();
        let speaker = Speaker::default();
        let (tx, events) = mpsc::channel(1024);
        let config = GameConfig::new().pacing(Pacing::immediate()).seed(9);
        let mut game = Orchestrator::new(bands.clone(), Box::new(speaker.clone()), config, tx);
        game.reset_with(Roster::from_roles(roles)).await.unwrap();

        let mut table = Self {
            game,
            bands,
            speaker,
            events,
        };
        table.forget();
        table
    }

    async fn run(&mut self, line: &str) -> Result<(), GameError> {
        let command = Command::parse(line)?.expect("non-blank command");
        self.game.handle(command).await.map(|_| ())
    }

    fn events(&mut self) -> Vec<GameEvent> {
        let mut out = Vec::new();
        while let Ok(ev) = self.events.try_recv() {
            out.push(ev);
        }
        out
    }

    fn taps(&self) -> Vec<(u8, u8)> {
        self.bands
            .taps
            .lock()
            .unwrap()
            .iter()
            .map(|t| (t.id, t.taps))
            .collect()
    }

    fn cues(&self) -> Vec<Cue> {
        self.speaker.played.lock().unwrap().clone()
    }

    fn forget(&mut self) {
        self.bands.taps.lock().unwrap().clear();
        self.speaker.played.lock().unwrap().clear();
        self.events();
    }
}

const DEAL: [Role; 4] = [Role::Mafia, Role::Doctor, Role::Detective, Role::Townfolk];

#[tokio::test]
async fn day_lynch_of_mafia_ends_in_town_win() {
    let mut t = Table::dealt(DEAL).await;

    t.run("kill 1").await.unwrap();

    let state = t.game.state();
    assert!(!state.roster().get(1).unwrap().alive);
    assert_eq!(state.phase(), Phase::Day);
    assert_eq!(state.winner(), Some(Winner::Town));
    assert_eq!(t.cues(), vec![Cue::Lynch, Cue::Mafia]);
    assert_eq!(
        t.events(),
        vec![
            GameEvent::Lynched {
                player: 1,
                role: Role::Mafia
            },
            GameEvent::GameOver(Winner::Town),
        ]
    );
    // a lynch sends no taps
    assert!(t.taps().is_empty());
}

#[tokio::test]
async fn saved_victim_survives_the_night() {
    let mut t = Table::dealt(DEAL).await;

    t.run("next").await.unwrap();
    assert_eq!(t.game.state().phase(), Phase::NightMafia);

    t.run("kill 3").await.unwrap();
    assert_eq!(t.game.state().pending_kill(), Some(3));
    assert_eq!(t.game.state().phase(), Phase::NightDoctor);

    t.run("save 3").await.unwrap();
    assert_eq!(t.game.state().pending_save(), Some(3));
    assert_eq!(t.game.state().phase(), Phase::NightDetective);

    t.forget();
    t.run("check 2").await.unwrap();

    let state = t.game.state();
    assert_eq!(state.phase(), Phase::Day);
    assert!(state.roster().get(3).unwrap().alive);
    assert_eq!(state.pending_kill(), None);
    assert_eq!(state.pending_save(), None);

    let events = t.events();
    assert!(events.contains(&GameEvent::Investigated {
        player: 2,
        role: Role::Doctor
    }));
    assert!(events.contains(&GameEvent::Saved { player: 3 }));
    assert_eq!(
        t.cues(),
        vec![
            Cue::Hint,
            Cue::Sleep,
            Cue::Detective,
            Cue::Protection,
            Cue::Wake,
            Cue::Everyone
        ]
    );
    // detective confirm, then dawn taps to all four
    assert_eq!(t.taps(), vec![(3, 2), (1, 2), (2, 2), (3, 2), (4, 2)]);
}

#[tokio::test]
async fn unprotected_victim_gets_death_tap() {
    let mut t = Table::dealt(DEAL).await;

    t.run("next").await.unwrap();
    t.run("kill 4").await.unwrap();
    t.run("save 2").await.unwrap();
    t.forget();
    t.run("check 1").await.unwrap();

    assert!(!t.game.state().roster().get(4).unwrap().alive);
    assert!(t.events().contains(&GameEvent::Investigated {
        player: 1,
        role: Role::Mafia
    }));
    let cues = t.cues();
    assert!(cues.windows(2).any(|w| w == [Cue::Lynch, Cue::Everyone]));
    assert_eq!(t.taps(), vec![(3, 2), (4, 1), (1, 2), (2, 2), (3, 2)]);
}

#[tokio::test]
async fn dead_roles_are_skipped_in_order() {
    let mut t = Table::dealt(DEAL).await;
    // lose the doctor and the detective by day
    t.run("kill 2").await.unwrap();
    t.run("kill 3").await.unwrap();
    t.forget();

    t.run("next").await.unwrap();
    assert_eq!(t.game.state().phase(), Phase::NightMafia);

    t.run("kill 4").await.unwrap();

    assert_eq!(t.game.state().phase(), Phase::Day);
    let skipped: Vec<_> = t
        .events()
        .into_iter()
        .filter_map(|e| match e {
            GameEvent::PhaseSkipped { phase, .. } => Some(phase),
            _ => None,
        })
        .collect();
    assert_eq!(skipped, vec![Phase::NightDoctor, Phase::NightDetective]);
    assert!(!t.game.state().roster().get(4).unwrap().alive);
}

#[tokio::test]
async fn actions_outside_their_phase_are_rejected() {
    let mut t = Table::dealt(DEAL).await;

    for line in ["save 1", "check 1"] {
        let err = t.run(line).await.unwrap_err();
        assert!(matches!(err, GameError::WrongPhase { .. }), "{line}: {err}");
    }

    t.run("next").await.unwrap();
    t.run("kill 4").await.unwrap();
    // at NIGHT_DOCTOR
    for line in ["kill 1", "check 1"] {
        assert!(matches!(
            t.run(line).await,
            Err(GameError::WrongPhase { .. })
        ));
    }
    assert_eq!(t.game.state().phase(), Phase::NightDoctor);
    assert_eq!(t.game.state().pending_kill(), Some(4));
    assert_eq!(t.game.state().pending_save(), None);
}

#[tokio::test]
async fn unknown_switch_mode_does_not_reset() {
    let mut t = Table::dealt(DEAL).await;
    t.run("next").await.unwrap();
    t.forget();

    let err = t.run("switch loud").await.unwrap_err();
    assert!(matches!(err, GameError::UnknownMode(_)));
    assert_eq!(t.game.state().phase(), Phase::NightMafia);
    assert!(t.taps().is_empty());

    t.run("switch taps").await.unwrap();
    assert_eq!(t.game.mode(), Mode::TapsOnly);
    assert_eq!(t.game.state().phase(), Phase::Day);
    assert_eq!(t.taps().len(), 4);
}

#[tokio::test]
async fn repeat_one_player() {
    let mut t = Table::dealt(DEAL).await;

    t.run("repeat 3").await.unwrap();
    assert_eq!(t.taps(), vec![(3, 4)]);

    assert!(matches!(
        t.run("repeat 8").await,
        Err(GameError::UnknownPlayer(8))
    ));
}

// ── Properties ──────────────────────────────────────────────────────

fn apply(state: &mut GameState, op: u8, target: u8) -> Result<Vec<GameEffect>, GameError> {
    match op % 4 {
        0 => Ok(state.advance()),
        1 => state.kill(target),
        2 => state.save(target),
        _ => state.check(target),
    }
}

/// Every phase reached by one operation, in order.
fn entered(effects: &[GameEffect]) -> Vec<Phase> {
    effects
        .iter()
        .filter_map(|e| match e {
            GameEffect::Emit(GameEvent::PhaseEntered(p)) => Some(*p),
            GameEffect::Emit(GameEvent::PhaseSkipped { phase, .. }) => Some(*phase),
            _ => None,
        })
        .collect()
}

proptest! {
    #[test]
    fn reset_deals_a_bijection(seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut state = GameState::new(Roster::from_roles(DEAL));
        state.reset(&mut rng);

        let ids: BTreeSet<u8> = state.roster().players().map(|p| p.id).collect();
        let roles: BTreeSet<Role> = state.roster().players().map(|p| p.role).collect();
        prop_assert_eq!(ids, BTreeSet::from([1, 2, 3, 4]));
        prop_assert_eq!(roles, BTreeSet::from(Role::ALL));
        prop_assert!(state.roster().players().all(|p| p.alive));
        prop_assert_eq!(state.phase(), Phase::Day);
    }

    /// Whatever the operator types, phases move along the cycle one step
    /// at a time, and a rejected action changes nothing.
    #[test]
    fn phases_follow_the_cycle(
        seed in any::<u64>(),
        ops in prop::collection::vec((0..4u8, 0..6u8), 0..40),
    ) {
        let mut state = GameState::new(Roster::shuffled(&mut StdRng::seed_from_u64(seed)));

        for (op, target) in ops {
            let before = state.clone();
            match apply(&mut state, op, target) {
                Ok(effects) => {
                    let mut phase = before.phase();
                    for next in entered(&effects) {
                        prop_assert_eq!(next, phase.next());
                        phase = next;
                    }
                    prop_assert_eq!(phase, state.phase());
                }
                Err(_) => {
                    prop_assert_eq!(state.phase(), before.phase());
                    prop_assert_eq!(state.roster(), before.roster());
                    prop_assert_eq!(state.pending_kill(), before.pending_kill());
                    prop_assert_eq!(state.pending_save(), before.pending_save());
                }
            }
            if state.phase() == Phase::Day || state.phase() == Phase::NightMafia {
                prop_assert_eq!(state.pending_save(), None);
            }
        }
    }
}
