use anyhow::{anyhow, Context, Result};
use asteroids_autopilot::benchmark::{resolve_bots, run_benchmark, BenchmarkConfig, Objective};
use asteroids_autopilot::bots::{bot_ids, create_bot, describe_bots};
use asteroids_autopilot::runner::{run_bot, write_tape};
use asteroids_autopilot::util::{
    parse_seed, parse_seed_csv, parse_seed_file, seed_sequence, seed_to_hex,
};
use asteroids_core::constants::{
    ASTEROID_SLOTS_DEFAULT, MAX_FRAMES_DEFAULT, STARTING_LIVES_DEFAULT,
};
use asteroids_core::tape::parse_tape;
use asteroids_core::{verify_tape, Layout, Rules};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "asteroids-autopilot")]
#[command(about = "Autopilot lab for deterministic falling-rock Asteroids tapes and benchmarks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List available bots
    ListBots,
    /// Generate a single verifiable tape
    Generate {
        #[arg(long)]
        bot: String,
        #[arg(long)]
        seed: String,
        #[command(flatten)]
        game: GameArgs,
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Verify an existing tape against the current rules
    VerifyTape {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value_t = MAX_FRAMES_DEFAULT)]
        max_frames: u32,
    },
    /// Run a multi-seed benchmark across one or more bots
    Benchmark {
        #[arg(long)]
        bots: Option<String>,
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_file: Option<PathBuf>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[command(flatten)]
        game: GameArgs,
        #[arg(long, default_value_t = 18_000)]
        max_frames: u32,
        #[arg(long, value_enum, default_value_t = CliObjective::Score)]
        objective: CliObjective,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 4)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

#[derive(Args, Debug)]
struct GameArgs {
    #[arg(long, value_enum, default_value_t = CliLayout::Console)]
    layout: CliLayout,
    #[arg(long, default_value_t = STARTING_LIVES_DEFAULT)]
    lives: u8,
    /// Number of asteroid slots in play
    #[arg(long, default_value_t = ASTEROID_SLOTS_DEFAULT as u8)]
    asteroids: u8,
}

impl GameArgs {
    fn rules(&self) -> Result<Rules> {
        Rules::customized(self.layout.into(), self.lives, self.asteroids)
            .context("invalid game options")
    }
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

#[derive(Clone, Copy, Debug, ValueEnum)]
enum CliObjective {
    Score,
    Survival,
    Hybrid,
}

impl From<CliObjective> for Objective {
    fn from(value: CliObjective) -> Self {
        match value {
            CliObjective::Score => Objective::Score,
            CliObjective::Survival => Objective::Survival,
            CliObjective::Hybrid => Objective::Hybrid,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let Cli { command } = Cli::parse();

    match command {
        Commands::ListBots => {
            for (id, description) in describe_bots() {
                println!("{id:12} {description}");
            }
        }
        Commands::Generate {
            bot,
            seed,
            game,
            max_frames,
            output,
        } => {
            if create_bot(&bot).is_none() {
                let available = bot_ids().join(", ");
                return Err(anyhow!("unknown bot '{bot}'. available: {available}"));
            }
            let seed = parse_seed(&seed)?;
            let rules = game.rules()?;
            let artifact = run_bot(&bot, seed, &rules, max_frames)?;
            let output_path = output.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "checkpoints/{}-{}-{}-score{}-frames{}.tape",
                    bot,
                    rules.layout,
                    seed_to_hex(seed).replace("0x", "seed"),
                    artifact.metrics.final_score,
                    artifact.metrics.frame_count
                ))
            });
            write_tape(&output_path, &artifact.tape)?;

            println!("bot={}", artifact.metrics.bot_id);
            println!("layout={}", artifact.metrics.layout);
            println!("seed={}", seed_to_hex(seed));
            println!("frames={}", artifact.metrics.frame_count);
            println!("score={}", artifact.metrics.final_score);
            println!("lives={}", artifact.metrics.final_lives);
            println!("game_over={}", artifact.metrics.game_over);
            println!("rng={:#010x}", artifact.metrics.final_rng_state);
            println!("checksum={:#010x}", artifact.metrics.tape_checksum);
            println!("output={}", output_path.display());
        }
        Commands::VerifyTape { input, max_frames } => {
            let bytes =
                fs::read(&input).with_context(|| format!("failed reading {}", input.display()))?;
            let tape = parse_tape(&bytes, max_frames)?;
            let journal = verify_tape(&bytes, max_frames)?;
            println!("input={}", input.display());
            println!("layout={}", journal.layout);
            println!("seed={}", seed_to_hex(tape.header.seed));
            println!("frame_count={}", tape.header.frame_count);
            println!("final_score={}", tape.footer.final_score);
            println!("final_rng_state={:#010x}", tape.footer.final_rng_state);
            println!("checksum={:#010x}", journal.tape_checksum);
        }
        Commands::Benchmark {
            bots,
            seeds,
            seed_file,
            seed_start,
            seed_count,
            game,
            max_frames,
            objective,
            out_dir,
            save_top,
            jobs,
        } => {
            let bots = resolve_bots(bots.as_deref())?;
            let seeds = resolve_seeds(
                seeds.as_deref(),
                seed_file.as_deref(),
                seed_start.as_deref(),
                seed_count,
            )?;
            let rules = game.rules()?;
            let objective: Objective = objective.into();

            let out_dir = out_dir.unwrap_or_else(|| {
                PathBuf::from(format!(
                    "benchmarks/{}-{}-{}",
                    rules.layout,
                    objective.as_str(),
                    timestamp_suffix()
                ))
            });

            let report = run_benchmark(BenchmarkConfig {
                bots,
                seeds,
                rules,
                max_frames,
                objective,
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("objective={}", objective.as_str());
            println!("layout={}", report.layout);
            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("out_dir={}", out_dir.display());
            println!("top bots:");
            for (idx, bot) in report.bot_rankings.iter().take(5).enumerate() {
                println!(
                    "  {}. {}  objective={:.2} avg_score={:.1} avg_frames={:.1} avg_moves={:.1} avg_fire={:.1} survival={:.0}%",
                    idx + 1,
                    bot.bot_id,
                    bot.objective_value,
                    bot.avg_score,
                    bot.avg_frames,
                    bot.avg_move_frames,
                    bot.avg_fire_frames,
                    bot.survival_rate * 100.0,
                );
            }

            println!("saved tapes:");
            for tape in report.saved_tapes.iter().take(10) {
                println!(
                    "  [{} #{:02}] {} {} score={} frames={} lives={}",
                    tape.metric,
                    tape.rank,
                    tape.bot_id,
                    tape.seed_hex,
                    tape.score,
                    tape.frames,
                    tape.lives,
                );
            }
        }
    }

    Ok(())
}

fn resolve_seeds(
    seeds: Option<&str>,
    seed_file: Option<&Path>,
    seed_start: Option<&str>,
    seed_count: u32,
) -> Result<Vec<u32>> {
    if let Some(path) = seed_file {
        return parse_seed_file(path);
    }

    if let Some(csv) = seeds {
        return parse_seed_csv(csv);
    }

    let start = match seed_start {
        Some(start) => parse_seed(start)?,
        None => 0xA57E_0001,
    };
    Ok(seed_sequence(start, seed_count))
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
