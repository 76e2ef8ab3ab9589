use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::constants::ASTEROID_SLOTS_MAX;
use crate::error::RuleCode;
use crate::rng::SeededRng;
use crate::rules::{Hitbox, Rules};
use crate::tape::{decode_input_byte, FrameInput};

mod game;

use game::Game;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuKind {
    Start,
    Restart,
    Paused,
    GameOver,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    Playing,
    Menu(MenuKind),
}

impl GameMode {
    #[inline]
    pub fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    #[inline]
    pub fn menu(self) -> Option<MenuKind> {
        match self {
            Self::Playing => None,
            Self::Menu(kind) => Some(kind),
        }
    }
}

/// Size stage of an asteroid. Each hit advances it one stage; a hit on
/// `Tiny` removes the asteroid on its next move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Large,
    Medium,
    Small,
    Tiny,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Large, Phase::Medium, Phase::Small, Phase::Tiny];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::Large => 0,
            Self::Medium => 1,
            Self::Small => 2,
            Self::Tiny => 3,
        }
    }

    #[inline]
    pub fn shrink(self) -> Option<Phase> {
        match self {
            Self::Large => Some(Self::Medium),
            Self::Medium => Some(Self::Small),
            Self::Small => Some(Self::Tiny),
            Self::Tiny => None,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Ship {
    x: i32,
    y: i32,
}

#[derive(Clone, Copy, Debug)]
struct Bullet {
    active: bool,
    x: i32,
    y: i32,
}

#[derive(Clone, Copy, Debug)]
struct Asteroid {
    active: bool,
    x: i32,
    y: i32,
    phase: Phase,
    exploding: bool,
}

const EMPTY_ASTEROID: Asteroid = Asteroid {
    active: false,
    x: 0,
    y: 0,
    phase: Phase::Large,
    exploding: false,
};

/// What happened during one step, for logging and front-end effects.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepEvents {
    pub fired: bool,
    pub spawned: Option<usize>,
    pub hit: Option<usize>,
    pub destroyed: u8,
    pub lives_lost: u8,
    pub new_round: bool,
    pub mode_change: Option<GameMode>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub final_score: u32,
    pub final_rng_state: u32,
    pub frame_count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayCheckpoint {
    pub frame_count: u32,
    pub rng_state: u32,
    pub score: u32,
    pub lives: u8,
    pub mode: GameMode,
    pub round_step: u32,
    pub ship_x: i32,
    pub bullet_active: bool,
    pub bullet_x: i32,
    pub bullet_y: i32,
    pub active_asteroids: usize,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayViolation {
    pub frame_count: u32,
    pub rule: RuleCode,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShipSnapshot {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulletSnapshot {
    pub active: bool,
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsteroidSnapshot {
    pub slot: usize,
    pub active: bool,
    pub x: i32,
    pub y: i32,
    pub phase: Phase,
    pub exploding: bool,
    pub hitbox: Hitbox,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub frame_count: u32,
    pub mode: GameMode,
    pub score: u32,
    pub lives: u8,
    pub round_step: u32,
    pub rng_state: u32,
    pub ship: ShipSnapshot,
    pub bullet: BulletSnapshot,
    /// One entry per configured slot, active or not.
    pub asteroids: Vec<AsteroidSnapshot>,
}

impl WorldSnapshot {
    pub fn active_asteroids(&self) -> impl Iterator<Item = &AsteroidSnapshot> {
        self.asteroids.iter().filter(|asteroid| asteroid.active)
    }
}

/// Public handle over the simulation for front-ends and bots.
#[derive(Clone)]
pub struct LiveGame {
    game: Game,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct TransitionState {
    mode: GameMode,
    score: u32,
    ship_x: i32,
    round_step: u32,
}

pub fn replay(seed: u32, rules: &Rules, inputs: &[u8]) -> ReplayResult {
    let mut game = Game::new(seed, *rules);

    for input in inputs {
        game.step(*input);
    }

    game.result()
}

pub fn replay_strict(
    seed: u32,
    rules: &Rules,
    inputs: &[u8],
) -> Result<ReplayResult, ReplayViolation> {
    let mut game = Game::new(seed, *rules);
    game.validate_invariants().map_err(|rule| ReplayViolation {
        frame_count: game.frame_count(),
        rule,
    })?;

    for input in inputs {
        let before_step = game.transition_state();
        game.step(*input);
        let after_step = game.transition_state();

        validate_transition(rules, &before_step, &after_step).map_err(|rule| {
            ReplayViolation {
                frame_count: game.frame_count(),
                rule,
            }
        })?;

        game.validate_invariants().map_err(|rule| ReplayViolation {
            frame_count: game.frame_count(),
            rule,
        })?;
    }

    Ok(game.result())
}

pub fn replay_with_checkpoints(
    seed: u32,
    rules: &Rules,
    inputs: &[u8],
    sample_every: u32,
) -> Vec<ReplayCheckpoint> {
    let mut game = Game::new(seed, *rules);
    let stride = if sample_every == 0 { 1 } else { sample_every };
    let total_frames = inputs.len() as u32;
    let mut checkpoints = Vec::new();
    checkpoints.push(game.checkpoint());

    for (index, input) in inputs.iter().enumerate() {
        game.step(*input);
        let frame = (index + 1) as u32;
        if frame % stride == 0 || frame == total_frames {
            checkpoints.push(game.checkpoint());
        }
    }

    checkpoints
}

/// Step-to-step rules that per-state invariants cannot see: the score only
/// grows by one hit per playing step and only drops when a round restarts,
/// and the ship never jumps further than one step except back to spawn.
fn validate_transition(
    rules: &Rules,
    prev: &TransitionState,
    next: &TransitionState,
) -> Result<(), RuleCode> {
    let new_round = next.score == 0 && next.round_step == 0;

    if next.score < prev.score && !new_round {
        return Err(RuleCode::ScoreDelta);
    }
    if next.score > prev.score && (next.score - prev.score > 1 || !prev.mode.is_playing()) {
        return Err(RuleCode::ScoreDelta);
    }

    let ship_jump = (next.ship_x - prev.ship_x).abs();
    if ship_jump > rules.ship_step && !(new_round && next.ship_x == rules.ship_x) {
        return Err(RuleCode::ShipBounds);
    }

    Ok(())
}

impl LiveGame {
    pub fn new(seed: u32, rules: Rules) -> Self {
        Self {
            game: Game::new(seed, rules),
        }
    }

    #[inline]
    pub fn step(&mut self, input_byte: u8) -> StepEvents {
        self.game.step(input_byte)
    }

    #[inline]
    pub fn step_input(&mut self, input: FrameInput) -> StepEvents {
        self.game.step_decoded(input)
    }

    /// Steps a copy and reports whether the strict replay rules would
    /// accept `input_byte` from the current state.
    pub fn can_step_strict(&self, input_byte: u8) -> Result<(), RuleCode> {
        let before_step = self.game.transition_state();
        let mut next = self.game.clone();
        next.step_decoded(decode_input_byte(input_byte));
        let after_step = next.transition_state();
        validate_transition(self.game.rules(), &before_step, &after_step)?;
        next.validate_invariants()
    }

    #[inline]
    pub fn validate(&self) -> Result<(), RuleCode> {
        self.game.validate_invariants()
    }

    #[inline]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.game.world_snapshot()
    }

    #[inline]
    pub fn result(&self) -> ReplayResult {
        self.game.result()
    }

    #[inline]
    pub fn rules(&self) -> &Rules {
        self.game.rules()
    }

    #[inline]
    pub fn mode(&self) -> GameMode {
        self.game.mode()
    }

    #[inline]
    pub fn score(&self) -> u32 {
        self.game.score()
    }

    #[inline]
    pub fn lives(&self) -> u8 {
        self.game.lives()
    }

    #[inline]
    pub fn frame_count(&self) -> u32 {
        self.game.frame_count()
    }

    #[inline]
    pub fn rng_state(&self) -> u32 {
        self.game.rng_state()
    }
}
