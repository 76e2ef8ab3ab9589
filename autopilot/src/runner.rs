use crate::bots::{create_bot, AutopilotBot};
use anyhow::{anyhow, Context, Result};
use asteroids_core::constants::{INPUT_FIRE, INPUT_LEFT, INPUT_RIGHT};
use asteroids_core::tape::{encode_input_byte, serialize_tape};
use asteroids_core::{verify_tape, GameMode, Layout, LiveGame, MenuKind, Rules};
use serde::Serialize;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Serialize)]
pub struct RunMetrics {
    pub bot_id: String,
    pub seed: u32,
    pub layout: Layout,
    pub starting_lives: u8,
    pub asteroid_slots: u8,
    pub max_frames: u32,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_rng_state: u32,
    pub final_lives: u8,
    pub game_over: bool,
    pub tape_checksum: u32,
    pub action_frames: u32,
    pub move_frames: u32,
    pub fire_frames: u32,
}

#[derive(Clone, Debug)]
pub struct RunArtifact {
    pub metrics: RunMetrics,
    pub inputs: Vec<u8>,
    pub tape: Vec<u8>,
}

pub fn run_bot(bot_id: &str, seed: u32, rules: &Rules, max_frames: u32) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    let mut bot = create_bot(bot_id).ok_or_else(|| anyhow!("unknown bot '{bot_id}'"))?;
    run_bot_instance(bot.as_mut(), seed, rules, max_frames)
}

/// Plays `seed` until game over or `max_frames`, then serializes the inputs
/// and checks the tape through the strict verifier.
pub fn run_bot_instance(
    bot: &mut dyn AutopilotBot,
    seed: u32,
    rules: &Rules,
    max_frames: u32,
) -> Result<RunArtifact> {
    if max_frames == 0 {
        return Err(anyhow!("max_frames must be > 0"));
    }

    bot.reset(seed);

    let mut game = LiveGame::new(seed, *rules);
    game.validate()
        .map_err(|rule| anyhow!("initial invariant failure: {rule}"))?;

    let mut inputs = Vec::with_capacity(max_frames as usize);
    while game.frame_count() < max_frames && !is_game_over(game.mode()) {
        let snapshot = game.snapshot();
        let primary = encode_input_byte(bot.next_input(&snapshot, rules));
        let chosen = choose_strict_legal_input(&game, primary).ok_or_else(|| {
            anyhow!(
                "no strict-legal input found at frame {}",
                snapshot.frame_count
            )
        })?;
        inputs.push(chosen);
        game.step(chosen);
    }

    if inputs.is_empty() {
        return Err(anyhow!("bot '{}' produced no frames", bot.id()));
    }

    let result = game.result();
    let tape = serialize_tape(
        rules,
        seed,
        &inputs,
        result.final_score,
        result.final_rng_state,
    );
    let journal = verify_tape(&tape, max_frames)
        .map_err(|err| anyhow!("generated tape failed verification: {err}"))?;

    let mut action_frames = 0u32;
    let mut move_frames = 0u32;
    let mut fire_frames = 0u32;
    for byte in &inputs {
        if *byte != 0 {
            action_frames += 1;
        }
        if (*byte & (INPUT_LEFT | INPUT_RIGHT)) != 0 {
            move_frames += 1;
        }
        if (*byte & INPUT_FIRE) != 0 {
            fire_frames += 1;
        }
    }

    tracing::debug!(
        bot = bot.id(),
        seed = format_args!("0x{seed:08x}"),
        frames = result.frame_count,
        score = result.final_score,
        "run finished"
    );

    Ok(RunArtifact {
        metrics: RunMetrics {
            bot_id: bot.id().to_string(),
            seed,
            layout: rules.layout,
            starting_lives: rules.starting_lives,
            asteroid_slots: rules.asteroid_slots as u8,
            max_frames,
            frame_count: result.frame_count,
            final_score: result.final_score,
            final_rng_state: result.final_rng_state,
            final_lives: game.lives(),
            game_over: is_game_over(game.mode()),
            tape_checksum: journal.tape_checksum,
            action_frames,
            move_frames,
            fire_frames,
        },
        inputs,
        tape,
    })
}

pub fn write_tape(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, bytes).with_context(|| format!("failed writing {}", path.display()))
}

fn is_game_over(mode: GameMode) -> bool {
    mode == GameMode::Menu(MenuKind::GameOver)
}

fn choose_strict_legal_input(game: &LiveGame, primary: u8) -> Option<u8> {
    if game.can_step_strict(primary).is_ok() {
        return Some(primary);
    }

    const FALLBACKS: [u8; 4] = [0x00, INPUT_LEFT, INPUT_RIGHT, INPUT_FIRE];

    FALLBACKS
        .into_iter()
        .filter(|candidate| *candidate != primary)
        .find(|candidate| game.can_step_strict(*candidate).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use asteroids_core::tape::parse_tape;

    #[test]
    fn idle_bot_plays_until_game_over() {
        let rules = Rules::console();
        let artifact = run_bot("idle", 0xDEAD_BEEF, &rules, 20_000).unwrap();

        assert!(artifact.metrics.game_over);
        assert_eq!(artifact.metrics.final_lives, 0);
        assert_eq!(artifact.metrics.final_score, 0);
        assert!(artifact.metrics.frame_count < 20_000);
        assert_eq!(artifact.metrics.fire_frames, 0);
        assert_eq!(artifact.metrics.move_frames, 0);
    }

    #[test]
    fn frame_budget_caps_the_run() {
        let rules = Rules::pixel();
        let artifact = run_bot("sweeper", 5, &rules, 250).unwrap();

        assert_eq!(artifact.metrics.frame_count, 250);
        assert_eq!(artifact.inputs.len(), 250);
        assert!(!artifact.metrics.game_over);

        let tape = parse_tape(&artifact.tape, 250).unwrap();
        assert_eq!(tape.inputs, artifact.inputs.as_slice());
        assert_eq!(tape.header.seed, 5);
    }

    #[test]
    fn tracker_scores_on_both_layouts() {
        for rules in [Rules::console(), Rules::pixel()] {
            let artifact = run_bot("tracker", 0x1234_5678, &rules, 6_000).unwrap();
            assert!(
                artifact.metrics.final_score > 0,
                "layout={}",
                rules.layout
            );
            assert_eq!(artifact.metrics.layout, rules.layout);
        }
    }

    #[test]
    fn custom_rules_reach_the_tape_header() {
        let rules = Rules::customized(Layout::Console, 1, 6).unwrap();
        let artifact = run_bot("sweeper", 9, &rules, 400).unwrap();

        let tape = parse_tape(&artifact.tape, 400).unwrap();
        assert_eq!(tape.header.starting_lives, 1);
        assert_eq!(tape.header.asteroid_slots, 6);
        assert_eq!(artifact.metrics.asteroid_slots, 6);
    }

    #[test]
    fn unknown_bot_and_zero_budget_are_errors() {
        let rules = Rules::console();
        assert!(run_bot("nobody", 1, &rules, 100).is_err());
        assert!(run_bot("idle", 1, &rules, 0).is_err());
    }

    #[test]
    fn write_tape_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("run.tape");
        write_tape(&path, &[1, 2, 3]).unwrap();
        assert_eq!(fs::read(&path).unwrap(), vec![1, 2, 3]);
    }
}
