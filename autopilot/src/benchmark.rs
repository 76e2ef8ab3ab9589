use crate::bots::{bot_ids, create_bot};
use crate::runner::{run_bot, RunMetrics};
use crate::util::seed_to_hex;
use anyhow::{anyhow, Context, Result};
use asteroids_core::{Layout, Rules};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
    Score,
    Survival,
    Hybrid,
}

impl Objective {
    pub fn run_value(self, metrics: &RunMetrics) -> f64 {
        let score = metrics.final_score as f64;
        let frames = metrics.frame_count as f64;
        let lives = metrics.final_lives as f64;
        match self {
            Self::Score => score * 100.0 + frames * 0.01 + lives * 25.0,
            Self::Survival => frames + lives * 500.0 + score * 5.0,
            Self::Hybrid => score * 40.0 + frames * 0.5 + lives * 150.0,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Score => "score",
            Self::Survival => "survival",
            Self::Hybrid => "hybrid",
        }
    }
}

#[derive(Clone, Debug)]
pub struct BenchmarkConfig {
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub rules: Rules,
    pub max_frames: u32,
    pub objective: Objective,
    pub out_dir: PathBuf,
    pub save_top: usize,
    pub jobs: Option<usize>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RunRecord {
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub frame_count: u32,
    pub final_score: u32,
    pub final_lives: u8,
    pub game_over: bool,
    pub objective_value: f64,
    pub action_frames: u32,
    pub move_frames: u32,
    pub fire_frames: u32,
    pub tape_checksum: u32,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BotAggregate {
    pub bot_id: String,
    pub runs: usize,
    pub avg_score: f64,
    pub max_score: u32,
    pub avg_frames: f64,
    pub max_frames: u32,
    pub avg_lives: f64,
    pub min_lives: u8,
    pub survival_rate: f64,
    pub objective_value: f64,
    pub avg_action_frames: f64,
    pub avg_move_frames: f64,
    pub avg_fire_frames: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SavedTapeRecord {
    pub rank: usize,
    pub metric: String,
    pub bot_id: String,
    pub seed: u32,
    pub seed_hex: String,
    pub score: u32,
    pub frames: u32,
    pub lives: u8,
    pub path: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BenchmarkReport {
    pub generated_unix_s: u64,
    pub objective: Objective,
    pub layout: Layout,
    pub starting_lives: u8,
    pub asteroid_slots: u8,
    pub max_frames: u32,
    pub jobs: Option<usize>,
    pub bots: Vec<String>,
    pub seeds: Vec<u32>,
    pub run_count: usize,
    pub bot_rankings: Vec<BotAggregate>,
    pub runs: Vec<RunRecord>,
    pub saved_tapes: Vec<SavedTapeRecord>,
}

#[derive(Clone, Debug)]
struct InternalRun {
    metrics: RunMetrics,
    objective_value: f64,
    tape: Vec<u8>,
}

pub fn resolve_bots(input: Option<&str>) -> Result<Vec<String>> {
    match input {
        None => Ok(bot_ids().iter().map(|id| (*id).to_string()).collect()),
        Some(raw) => {
            let mut bots = Vec::new();
            for token in raw.split(',') {
                let token = token.trim();
                if token.is_empty() {
                    continue;
                }
                bots.push(token.to_string());
            }
            if bots.is_empty() {
                return Err(anyhow!("--bots resolved to empty list"));
            }
            Ok(bots)
        }
    }
}

pub fn run_benchmark(config: BenchmarkConfig) -> Result<BenchmarkReport> {
    if config.seeds.is_empty() {
        return Err(anyhow!("benchmark requires at least one seed"));
    }
    if config.bots.is_empty() {
        return Err(anyhow!("benchmark requires at least one bot"));
    }
    if let Some(unknown) = config.bots.iter().find(|bot| create_bot(bot).is_none()) {
        let available = bot_ids().join(", ");
        return Err(anyhow!("unknown bot '{unknown}'. available: {available}"));
    }
    fs::create_dir_all(&config.out_dir)
        .with_context(|| format!("failed creating {}", config.out_dir.display()))?;

    if let Some(jobs) = config.jobs {
        if jobs == 0 {
            return Err(anyhow!("benchmark --jobs must be >= 1 when provided"));
        }
    }

    let run_jobs: Vec<(String, u32)> = config
        .bots
        .iter()
        .flat_map(|bot| config.seeds.iter().map(move |seed| (bot.clone(), *seed)))
        .collect();

    let run_one = |(bot_id, seed): &(String, u32)| -> Result<InternalRun> {
        let artifact = run_bot(bot_id, *seed, &config.rules, config.max_frames)
            .with_context(|| format!("benchmark run failed for bot={bot_id} seed={seed:#x}"))?;
        let objective_value = config.objective.run_value(&artifact.metrics);
        Ok(InternalRun {
            metrics: artifact.metrics,
            objective_value,
            tape: artifact.tape,
        })
    };

    let run_results: Vec<Result<InternalRun>> = if let Some(jobs) = config.jobs {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .context("failed to build rayon threadpool")?;
        pool.install(|| run_jobs.par_iter().map(run_one).collect())
    } else {
        run_jobs.par_iter().map(run_one).collect()
    };

    let mut runs = Vec::with_capacity(run_results.len());
    for result in run_results {
        runs.push(result?);
    }
    tracing::info!(runs = runs.len(), "benchmark runs finished");

    let mut grouped: HashMap<String, Vec<&InternalRun>> = HashMap::new();
    for run in &runs {
        grouped
            .entry(run.metrics.bot_id.clone())
            .or_default()
            .push(run);
    }

    let mut rankings: Vec<BotAggregate> = grouped
        .into_iter()
        .map(|(bot_id, bot_runs)| aggregate(bot_id, &bot_runs, config.max_frames))
        .collect();

    rankings.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.avg_score.total_cmp(&a.avg_score))
            .then_with(|| b.avg_frames.total_cmp(&a.avg_frames))
            .then_with(|| a.bot_id.cmp(&b.bot_id))
    });

    let mut run_records: Vec<RunRecord> = runs
        .iter()
        .map(|run| RunRecord {
            bot_id: run.metrics.bot_id.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            frame_count: run.metrics.frame_count,
            final_score: run.metrics.final_score,
            final_lives: run.metrics.final_lives,
            game_over: run.metrics.game_over,
            objective_value: run.objective_value,
            action_frames: run.metrics.action_frames,
            move_frames: run.metrics.move_frames,
            fire_frames: run.metrics.fire_frames,
            tape_checksum: run.metrics.tape_checksum,
        })
        .collect();

    run_records.sort_by(|a, b| {
        b.objective_value
            .total_cmp(&a.objective_value)
            .then_with(|| b.final_score.cmp(&a.final_score))
            .then_with(|| b.frame_count.cmp(&a.frame_count))
    });

    let mut saved_tapes = Vec::new();
    if config.save_top > 0 {
        save_top_tapes(
            &config.out_dir,
            &runs,
            "objective",
            config.save_top,
            |run| run.objective_value,
            &mut saved_tapes,
        )?;
        save_top_tapes(
            &config.out_dir,
            &runs,
            "score",
            config.save_top,
            |run| run.metrics.final_score as f64,
            &mut saved_tapes,
        )?;
        save_top_tapes(
            &config.out_dir,
            &runs,
            "survival",
            config.save_top,
            |run| run.metrics.frame_count as f64,
            &mut saved_tapes,
        )?;
    }

    write_runs_csv(&config.out_dir.join("runs.csv"), &run_records)?;
    write_rankings_csv(&config.out_dir.join("rankings.csv"), &rankings)?;

    let report = BenchmarkReport {
        generated_unix_s: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        objective: config.objective,
        layout: config.rules.layout,
        starting_lives: config.rules.starting_lives,
        asteroid_slots: config.rules.asteroid_slots as u8,
        max_frames: config.max_frames,
        jobs: config.jobs,
        bots: config.bots,
        seeds: config.seeds,
        run_count: run_records.len(),
        bot_rankings: rankings,
        runs: run_records,
        saved_tapes,
    };

    let report_path = config.out_dir.join("summary.json");
    fs::write(
        &report_path,
        serde_json::to_vec_pretty(&report).context("failed to serialize summary json")?,
    )
    .with_context(|| format!("failed writing {}", report_path.display()))?;

    Ok(report)
}

fn aggregate(bot_id: String, bot_runs: &[&InternalRun], max_frames: u32) -> BotAggregate {
    let runs = bot_runs.len();
    let count = runs as f64;
    let mean = |value: fn(&RunMetrics) -> u64| -> f64 {
        bot_runs.iter().map(|run| value(&run.metrics)).sum::<u64>() as f64 / count
    };

    let survived = bot_runs
        .iter()
        .filter(|run| !run.metrics.game_over && run.metrics.frame_count >= max_frames)
        .count();

    BotAggregate {
        avg_score: mean(|m| m.final_score as u64),
        max_score: bot_runs
            .iter()
            .map(|run| run.metrics.final_score)
            .max()
            .unwrap_or_default(),
        avg_frames: mean(|m| m.frame_count as u64),
        max_frames: bot_runs
            .iter()
            .map(|run| run.metrics.frame_count)
            .max()
            .unwrap_or_default(),
        avg_lives: mean(|m| m.final_lives as u64),
        min_lives: bot_runs
            .iter()
            .map(|run| run.metrics.final_lives)
            .min()
            .unwrap_or_default(),
        survival_rate: survived as f64 / count,
        objective_value: bot_runs.iter().map(|run| run.objective_value).sum::<f64>() / count,
        avg_action_frames: mean(|m| m.action_frames as u64),
        avg_move_frames: mean(|m| m.move_frames as u64),
        avg_fire_frames: mean(|m| m.fire_frames as u64),
        bot_id,
        runs,
    }
}

fn save_top_tapes<F>(
    out_dir: &Path,
    runs: &[InternalRun],
    metric_name: &str,
    count: usize,
    metric: F,
    saved_tapes: &mut Vec<SavedTapeRecord>,
) -> Result<()>
where
    F: Fn(&InternalRun) -> f64,
{
    let mut order: Vec<&InternalRun> = runs.iter().collect();
    order.sort_by(|a, b| {
        metric(b)
            .total_cmp(&metric(a))
            .then_with(|| b.metrics.final_score.cmp(&a.metrics.final_score))
            .then_with(|| b.metrics.frame_count.cmp(&a.metrics.frame_count))
    });

    let save_dir = out_dir.join(format!("top-{metric_name}"));
    fs::create_dir_all(&save_dir)
        .with_context(|| format!("failed creating {}", save_dir.display()))?;

    for (idx, run) in order.into_iter().take(count).enumerate() {
        let rank = idx + 1;
        let base = format!(
            "rank{rank:02}-{}-seed{:08x}-score{}-frames{}",
            run.metrics.bot_id, run.metrics.seed, run.metrics.final_score, run.metrics.frame_count
        );
        let tape_path = save_dir.join(format!("{base}.tape"));
        fs::write(&tape_path, &run.tape)
            .with_context(|| format!("failed writing {}", tape_path.display()))?;

        let meta = serde_json::json!({
            "rank": rank,
            "metric": metric_name,
            "objective_value": run.objective_value,
            "seed_hex": seed_to_hex(run.metrics.seed),
            "run": run.metrics,
        });
        let meta_path = save_dir.join(format!("{base}.json"));
        fs::write(
            &meta_path,
            serde_json::to_vec_pretty(&meta).context("failed to serialize top tape metadata")?,
        )
        .with_context(|| format!("failed writing {}", meta_path.display()))?;

        saved_tapes.push(SavedTapeRecord {
            rank,
            metric: metric_name.to_string(),
            bot_id: run.metrics.bot_id.clone(),
            seed: run.metrics.seed,
            seed_hex: seed_to_hex(run.metrics.seed),
            score: run.metrics.final_score,
            frames: run.metrics.frame_count,
            lives: run.metrics.final_lives,
            path: tape_path.to_string_lossy().into_owned(),
        });
    }

    Ok(())
}

fn write_runs_csv(path: &Path, rows: &[RunRecord]) -> Result<()> {
    let mut csv = String::from(
        "bot_id,seed_hex,seed,frame_count,final_score,final_lives,game_over,objective_value,action_frames,move_frames,fire_frames,tape_checksum\n",
    );
    for row in rows {
        csv.push_str(&format!(
            "{},{},{},{},{},{},{},{},{},{},{},0x{:08x}\n",
            row.bot_id,
            row.seed_hex,
            row.seed,
            row.frame_count,
            row.final_score,
            row.final_lives,
            row.game_over,
            row.objective_value,
            row.action_frames,
            row.move_frames,
            row.fire_frames,
            row.tape_checksum
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}

fn write_rankings_csv(path: &Path, rows: &[BotAggregate]) -> Result<()> {
    let mut csv = String::from(
        "rank,bot_id,runs,avg_score,max_score,avg_frames,max_frames,avg_lives,min_lives,survival_rate,objective_value,avg_action_frames,avg_move_frames,avg_fire_frames\n",
    );
    for (idx, row) in rows.iter().enumerate() {
        csv.push_str(&format!(
            "{},{},{},{:.2},{},{:.2},{},{:.2},{},{:.4},{:.4},{:.2},{:.2},{:.2}\n",
            idx + 1,
            row.bot_id,
            row.runs,
            row.avg_score,
            row.max_score,
            row.avg_frames,
            row.max_frames,
            row.avg_lives,
            row.min_lives,
            row.survival_rate,
            row.objective_value,
            row.avg_action_frames,
            row.avg_move_frames,
            row.avg_fire_frames
        ));
    }
    fs::write(path, csv).with_context(|| format!("failed writing {}", path.display()))
}
