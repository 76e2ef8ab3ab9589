use crate::config::PlayConfig;
use crate::input::InputListener;
use crate::screen::TerminalGuard;
use anyhow::{anyhow, Context, Result};
use asteroids_core::render::render_frame;
use asteroids_core::tape::{encode_input_byte, serialize_tape};
use asteroids_core::{
    verify_tape, GameMode, Layout, LiveGame, StepEvents, VerificationJournal,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    FrameLimit,
}

#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub seed: u32,
    pub frames: u32,
    pub score: u32,
    pub lives: u8,
    pub mode: GameMode,
    pub end: SessionEnd,
    pub tape: Option<PathBuf>,
}

/// Fixed-period frame pacing. A late frame resets the schedule instead of
/// trying to catch up.
#[derive(Clone, Copy, Debug)]
pub struct FrameClock {
    period: Duration,
    next: Instant,
}

impl FrameClock {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period,
            next: start + period,
        }
    }

    /// How long to wait at `now` before the next frame is due.
    pub fn delay(&mut self, now: Instant) -> Option<Duration> {
        let delay = if self.next > now {
            Some(self.next - now)
        } else {
            self.next = now;
            None
        };
        self.next += self.period;
        delay
    }
}

pub fn run_session(config: &PlayConfig) -> Result<SessionSummary> {
    let mut game = LiveGame::new(config.seed, config.rules);
    let mut inputs = Vec::with_capacity(config.max_frames.min(1 << 16) as usize);
    info!(
        seed = format_args!("0x{:08x}", config.seed),
        layout = %config.rules.layout,
        lives = config.rules.starting_lives,
        asteroids = config.rules.asteroid_slots,
        frame_ms = config.frame_ms,
        "session started"
    );

    let end = {
        let mut screen = TerminalGuard::enter()?;
        let listener = InputListener::spawn()?;
        play_loop(&mut game, &mut screen, &listener, config, &mut inputs)?
    };

    let tape = match &config.record {
        Some(path) if inputs.is_empty() => {
            warn!(path = %path.display(), "no frames played, tape not written");
            None
        }
        Some(path) => {
            let journal = save_recording(path, &game, config.seed, &inputs)?;
            info!(
                path = %path.display(),
                frames = journal.frame_count,
                score = journal.final_score,
                "tape recorded"
            );
            Some(path.clone())
        }
        None => None,
    };

    info!(
        frames = game.frame_count(),
        score = game.score(),
        ?end,
        "session finished"
    );

    Ok(SessionSummary {
        seed: config.seed,
        frames: game.frame_count(),
        score: game.score(),
        lives: game.lives(),
        mode: game.mode(),
        end,
        tape,
    })
}

fn play_loop(
    game: &mut LiveGame,
    screen: &mut TerminalGuard,
    listener: &InputListener,
    config: &PlayConfig,
    inputs: &mut Vec<u8>,
) -> Result<SessionEnd> {
    let mut clock = FrameClock::new(Duration::from_millis(config.frame_ms), Instant::now());
    let (cols, rows) = screen.size();
    let rules = &config.rules;
    if rules.layout == Layout::Console
        && (cols < rules.width as usize || rows < rules.height as usize)
    {
        warn!(
            cols,
            rows,
            needed_cols = rules.width,
            needed_rows = rules.height,
            "terminal smaller than the console field, frames will be clipped"
        );
    }
    draw(game, screen)?;

    loop {
        let keys = listener.drain();
        if keys.quit {
            return Ok(SessionEnd::Quit);
        }
        if inputs.len() as u32 >= config.max_frames {
            warn!(max_frames = config.max_frames, "frame limit reached");
            return Ok(SessionEnd::FrameLimit);
        }

        let byte = encode_input_byte(keys.input);
        let events = game.step(byte);
        inputs.push(byte);
        log_events(game, &events);

        draw(game, screen)?;
        if let Some(delay) = clock.delay(Instant::now()) {
            thread::sleep(delay);
        }
    }
}

fn draw(game: &LiveGame, screen: &mut TerminalGuard) -> Result<()> {
    let (cols, rows) = screen.size();
    let frame = render_frame(&game.snapshot(), game.rules(), cols, rows);
    screen.draw(&frame)
}

fn log_events(game: &LiveGame, events: &StepEvents) {
    let frame = game.frame_count();
    if let Some(mode) = events.mode_change {
        info!(frame, ?mode, score = game.score(), lives = game.lives(), "mode changed");
    }
    if events.new_round {
        info!(frame, "round started");
    }
    if let Some(slot) = events.spawned {
        debug!(frame, slot, "asteroid spawned");
    }
    if let Some(slot) = events.hit {
        debug!(frame, slot, "asteroid hit");
    }
    if events.destroyed > 0 {
        debug!(frame, destroyed = events.destroyed, score = game.score(), "asteroid destroyed");
    }
    if events.lives_lost > 0 {
        info!(frame, lives = game.lives(), "asteroid reached the ground");
    }
}

/// Writes the recorded inputs as a tape and checks it replays to the same
/// result before reporting success.
pub fn save_recording(
    path: &Path,
    game: &LiveGame,
    seed: u32,
    inputs: &[u8],
) -> Result<VerificationJournal> {
    if inputs.is_empty() {
        return Err(anyhow!("cannot record a tape with no frames"));
    }
    let result = game.result();
    let tape = serialize_tape(
        game.rules(),
        seed,
        inputs,
        result.final_score,
        result.final_rng_state,
    );

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed creating directory {}", parent.display()))?;
    }
    fs::write(path, &tape).with_context(|| format!("failed writing {}", path.display()))?;

    verify_tape(&tape, inputs.len() as u32)
        .with_context(|| format!("recorded tape {} failed verification", path.display()))
}
