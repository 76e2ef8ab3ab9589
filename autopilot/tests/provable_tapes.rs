use anyhow::Result;
use asteroids_autopilot::bots::bot_ids;
use asteroids_autopilot::runner::run_bot;
use asteroids_core::constants::{TAPE_FOOTER_SIZE, TAPE_HEADER_SIZE};
use asteroids_core::{verify_tape, Layout, Rules};

#[test]
fn all_bots_generate_provable_tapes_on_smoke_seed() -> Result<()> {
    let seed = 0xDEAD_BEEF;
    for rules in [Rules::console(), Rules::pixel()] {
        for bot in bot_ids() {
            let artifact = run_bot(bot, seed, &rules, 300)?;
            assert!(artifact.metrics.frame_count > 0, "bot={bot}");
            assert_eq!(artifact.metrics.bot_id, bot, "bot id mismatch for {bot}");
            assert_eq!(
                artifact.tape.len(),
                TAPE_HEADER_SIZE + artifact.inputs.len() + TAPE_FOOTER_SIZE,
                "tape size for {bot}"
            );
        }
    }
    Ok(())
}

#[test]
fn tracker_tapes_verify_on_multiple_seeds() -> Result<()> {
    let seeds = [0xDEAD_BEEF, 0xC0FF_EE11, 0x1234_5678];
    let rules = Rules::customized(Layout::Pixel, 3, 5)?;

    for seed in seeds {
        let artifact = run_bot("tracker", seed, &rules, 3_000)?;
        let journal = verify_tape(&artifact.tape, 3_000)
            .map_err(|err| anyhow::anyhow!("seed={seed:#x}: {err}"))?;
        assert_eq!(journal.seed, seed);
        assert_eq!(journal.asteroid_slots, 5);
        assert_eq!(journal.final_score, artifact.metrics.final_score);
        assert_eq!(journal.frame_count, artifact.metrics.frame_count);
    }
    Ok(())
}

#[test]
fn tracker_outscores_idle() -> Result<()> {
    let rules = Rules::console();
    let seed = 0xC0FF_EE11;
    let idle = run_bot("idle", seed, &rules, 8_000)?;
    let tracker = run_bot("tracker", seed, &rules, 8_000)?;

    assert_eq!(idle.metrics.final_score, 0);
    assert!(tracker.metrics.final_score > idle.metrics.final_score);
    Ok(())
}

#[test]
fn benchmark_smoke_outputs_expected_metadata() -> Result<()> {
    use asteroids_autopilot::benchmark::{run_benchmark, BenchmarkConfig, Objective};

    let tmp = tempfile::tempdir()?;
    let report = run_benchmark(BenchmarkConfig {
        bots: vec!["tracker".to_string(), "sweeper".to_string()],
        seeds: vec![0xDEAD_BEEF, 0xC0FF_EE11],
        rules: Rules::console(),
        max_frames: 900,
        objective: Objective::Hybrid,
        out_dir: tmp.path().to_path_buf(),
        save_top: 1,
        jobs: Some(2),
    })?;

    assert_eq!(report.run_count, 4);
    assert_eq!(report.bot_rankings.len(), 2);
    assert_eq!(report.layout, Layout::Console);
    // One tape per metric directory.
    assert_eq!(report.saved_tapes.len(), 3);
    for saved in &report.saved_tapes {
        let bytes = std::fs::read(&saved.path)?;
        assert!(verify_tape(&bytes, 900).is_ok(), "{}", saved.path);
    }
    assert!(tmp.path().join("summary.json").exists());
    assert!(tmp.path().join("runs.csv").exists());
    assert!(tmp.path().join("rankings.csv").exists());

    let csv = std::fs::read_to_string(tmp.path().join("runs.csv"))?;
    assert_eq!(csv.lines().count(), 5);

    Ok(())
}
