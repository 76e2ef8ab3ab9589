use anyhow::{anyhow, Context, Result};
use asteroids_core::constants::{
    ASTEROID_SLOTS_DEFAULT, MAX_FRAMES_DEFAULT, STARTING_LIVES_DEFAULT,
};
use asteroids_core::rng::parse_seed;
use asteroids_core::{Layout, Rules};
use std::env;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

pub const ENV_FRAME_MS: &str = "ASTEROIDS_FRAME_MS";
pub const ENV_LAYOUT: &str = "ASTEROIDS_LAYOUT";
pub const ENV_MAX_FRAMES: &str = "ASTEROIDS_MAX_FRAMES";

/// Values picked up from the environment. Anything unset or unparsable is
/// left as `None` so the layout preset applies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnvDefaults {
    pub layout: Option<Layout>,
    pub frame_ms: Option<u64>,
    pub max_frames: Option<u32>,
}

impl EnvDefaults {
    pub fn from_env() -> Self {
        Self {
            layout: read_env_layout(ENV_LAYOUT),
            frame_ms: read_env_u64(ENV_FRAME_MS),
            max_frames: read_env_u32(ENV_MAX_FRAMES),
        }
    }
}

/// Command-line options for one play session.
#[derive(Clone, Debug, Default)]
pub struct PlayOptions {
    pub layout: Option<Layout>,
    pub seed: Option<String>,
    pub lives: Option<u8>,
    pub asteroids: Option<u8>,
    pub frame_ms: Option<u64>,
    pub max_frames: Option<u32>,
    pub record: Option<PathBuf>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PlayConfig {
    pub rules: Rules,
    pub seed: u32,
    pub frame_ms: u64,
    pub max_frames: u32,
    pub record: Option<PathBuf>,
}

impl PlayConfig {
    /// Command line first, then the environment, then the layout preset.
    pub fn resolve(options: PlayOptions, env: EnvDefaults) -> Result<Self> {
        let layout = options.layout.or(env.layout).unwrap_or(Layout::Console);
        let rules = Rules::customized(
            layout,
            options.lives.unwrap_or(STARTING_LIVES_DEFAULT),
            options.asteroids.unwrap_or(ASTEROID_SLOTS_DEFAULT as u8),
        )
        .context("invalid game options")?;

        let seed = match options.seed.as_deref() {
            Some(seed) => {
                parse_seed(seed).with_context(|| format!("invalid seed: {}", seed.trim()))?
            }
            None => clock_seed(),
        };

        let frame_ms = options
            .frame_ms
            .or(env.frame_ms)
            .unwrap_or(rules.frame_ms);
        if frame_ms == 0 {
            return Err(anyhow!("--frame-ms must be > 0"));
        }

        let max_frames = options
            .max_frames
            .or(env.max_frames)
            .unwrap_or(MAX_FRAMES_DEFAULT);
        if max_frames == 0 {
            return Err(anyhow!("--max-frames must be > 0"));
        }

        Ok(Self {
            rules,
            seed,
            frame_ms,
            max_frames,
            record: options.record,
        })
    }
}

pub fn parse_layout(value: &str) -> Option<Layout> {
    match value.trim().to_ascii_lowercase().as_str() {
        "console" => Some(Layout::Console),
        "pixel" => Some(Layout::Pixel),
        _ => None,
    }
}

fn clock_seed() -> u32 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs() as u32)
        .unwrap_or(0)
}

pub fn read_env_u32(name: &str) -> Option<u32> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u32>().ok())
        .filter(|value| *value > 0)
}

pub fn read_env_u64(name: &str) -> Option<u64> {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
}

fn read_env_layout(name: &str) -> Option<Layout> {
    let value = env::var(name).ok()?;
    let layout = parse_layout(&value);
    if layout.is_none() {
        tracing::warn!(%name, %value, "ignoring unknown layout");
    }
    layout
}
