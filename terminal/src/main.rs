mod config;
mod input;
mod screen;
mod session;

use anyhow::{anyhow, Context, Result};
use asteroids_core::constants::MAX_FRAMES_DEFAULT;
use asteroids_core::render::render_frame;
use asteroids_core::tape::parse_tape;
use asteroids_core::{verify_tape, Layout, LiveGame};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::{EnvDefaults, PlayConfig, PlayOptions};
use session::{run_session, SessionEnd};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asteroids")]
#[command(about = "Falling-rock Asteroids in the terminal, with verifiable replay tapes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively (the default)
    Play(PlayArgs),
    /// Replay a tape and print the frame it reaches
    Replay {
        #[arg(long)]
        tape: PathBuf,
        /// Stop after this many frames instead of the whole tape
        #[arg(long)]
        frame: Option<u32>,
        #[arg(long, default_value_t = 128)]
        cols: usize,
        #[arg(long, default_value_t = 48)]
        rows: usize,
        #[arg(long)]
        max_frames: Option<u32>,
        /// Print the world snapshot as JSON instead of drawing it
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Strictly verify a tape and print its journal
    Verify {
        #[arg(long)]
        tape: PathBuf,
        #[arg(long)]
        max_frames: Option<u32>,
        #[arg(long)]
        journal_out: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct PlayArgs {
    #[arg(long, value_enum)]
    layout: Option<CliLayout>,
    /// Decimal or 0x-prefixed hex; defaults to the clock
    #[arg(long)]
    seed: Option<String>,
    #[arg(long)]
    lives: Option<u8>,
    /// Number of asteroid slots in play
    #[arg(long)]
    asteroids: Option<u8>,
    #[arg(long)]
    frame_ms: Option<u64>,
    #[arg(long)]
    max_frames: Option<u32>,
    /// Write the session to this tape on exit
    #[arg(long)]
    record: Option<PathBuf>,
    /// Log file; logs are dropped without one
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliLayout {
    Console,
    Pixel,
}

impl From<CliLayout> for Layout {
    fn from(value: CliLayout) -> Self {
        match value {
            CliLayout::Console => Layout::Console,
            CliLayout::Pixel => Layout::Pixel,
        }
    }
}

fn main() -> Result<()> {
    let Cli { command } = Cli::parse();

    match command.unwrap_or_else(|| Commands::Play(PlayArgs::default())) {
        Commands::Play(args) => play(args),
        Commands::Replay {
            tape,
            frame,
            cols,
            rows,
            max_frames,
            json,
        } => {
            init_stderr_tracing();
            replay(&tape, frame, cols, rows, resolve_max_frames(max_frames), json)
        }
        Commands::Verify {
            tape,
            max_frames,
            journal_out,
        } => {
            init_stderr_tracing();
            verify(&tape, resolve_max_frames(max_frames), journal_out.as_deref())
        }
    }
}

fn play(args: PlayArgs) -> Result<()> {
    if let Some(path) = &args.log_file {
        init_file_tracing(path)?;
    }

    let config = PlayConfig::resolve(
        PlayOptions {
            layout: args.layout.map(Layout::from),
            seed: args.seed,
            lives: args.lives,
            asteroids: args.asteroids,
            frame_ms: args.frame_ms,
            max_frames: args.max_frames,
            record: args.record,
        },
        EnvDefaults::from_env(),
    )?;

    let summary = run_session(&config)?;
    println!("seed=0x{:08x}", summary.seed);
    println!("layout={}", config.rules.layout);
    println!("frames={}", summary.frames);
    println!("score={}", summary.score);
    println!("lives={}", summary.lives);
    println!("mode={:?}", summary.mode);
    if summary.end == SessionEnd::FrameLimit {
        println!("stopped=frame_limit");
    }
    if let Some(path) = summary.tape {
        println!("tape={}", path.display());
    }
    Ok(())
}

fn replay(
    path: &Path,
    frame: Option<u32>,
    cols: usize,
    rows: usize,
    max_frames: u32,
    json: bool,
) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let tape = parse_tape(&bytes, max_frames)
        .with_context(|| format!("failed parsing {}", path.display()))?;
    let rules = tape.header.rules()?;

    let stop = frame
        .unwrap_or(tape.header.frame_count)
        .min(tape.header.frame_count);
    let mut game = LiveGame::new(tape.header.seed, rules);
    for byte in &tape.inputs[..stop as usize] {
        game.step(*byte);
    }
    tracing::info!(frames = stop, score = game.score(), "replayed");

    let snapshot = game.snapshot();
    if json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
        return Ok(());
    }

    let frame = render_frame(&snapshot, &rules, cols, rows);
    screen::print_frame(&mut io::stdout().lock(), &frame).context("failed printing frame")?;
    println!("layout={}", rules.layout);
    println!("seed=0x{:08x}", tape.header.seed);
    println!("frame={}/{}", game.frame_count(), tape.header.frame_count);
    println!("mode={:?}", game.mode());
    println!("score={}", game.score());
    println!("lives={}", game.lives());
    if stop == tape.header.frame_count {
        let claimed = tape.footer.final_score;
        if claimed != game.score() {
            return Err(anyhow!(
                "tape claims score {claimed} but replay reached {}",
                game.score()
            ));
        }
    }
    Ok(())
}

fn verify(path: &Path, max_frames: u32, journal_out: Option<&Path>) -> Result<()> {
    let bytes = fs::read(path).with_context(|| format!("failed reading {}", path.display()))?;
    let journal = verify_tape(&bytes, max_frames)
        .with_context(|| format!("tape {} failed verification", path.display()))?;

    println!("Verification succeeded");
    println!("seed: 0x{:08x}", journal.seed);
    println!("layout: {}", journal.layout);
    println!("starting lives: {}", journal.starting_lives);
    println!("asteroid slots: {}", journal.asteroid_slots);
    println!("frames: {}", journal.frame_count);
    println!("score: {}", journal.final_score);
    println!("rng: 0x{:08x}", journal.final_rng_state);
    println!("checksum: 0x{:08x}", journal.tape_checksum);

    if let Some(out) = journal_out {
        let encoded = serde_json::to_vec_pretty(&journal)?;
        if let Some(parent) = out.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed creating directory {}", parent.display()))?;
        }
        fs::write(out, encoded).with_context(|| format!("failed writing {}", out.display()))?;
        println!("journal: {}", out.display());
    }
    Ok(())
}

fn resolve_max_frames(cli: Option<u32>) -> u32 {
    cli.or_else(|| config::read_env_u32(config::ENV_MAX_FRAMES))
        .unwrap_or(MAX_FRAMES_DEFAULT)
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .init();
}

fn init_file_tracing(path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("failed creating log {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}
