//! Command-line arguments and session configuration loading.

use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_session::SessionConfig;

/// Headless maze chase simulation.
#[derive(Debug, Parser)]
#[command(name = "maze-chase", version, about = "Runs a headless maze chase session")]
pub(crate) struct CliArgs {
    /// TOML file with session settings; flags override its values.
    #[arg(short, long)]
    pub(crate) config: Option<PathBuf>,

    /// Number of maze columns.
    #[arg(long)]
    pub(crate) width: Option<u32>,

    /// Number of maze rows.
    #[arg(long)]
    pub(crate) height: Option<u32>,

    /// Seed for maze generation and spawn placement.
    #[arg(short, long)]
    pub(crate) seed: Option<u64>,

    /// Number of pursuers spawned at start.
    #[arg(short, long)]
    pub(crate) pursuers: Option<usize>,

    /// Number of ticks to simulate.
    #[arg(short, long, default_value_t = 3_600)]
    pub(crate) ticks: u64,

    /// Simulated milliseconds per tick.
    #[arg(long, default_value_t = 16)]
    pub(crate) tick_ms: u64,

    /// Print the summary as JSON.
    #[arg(long)]
    pub(crate) json: bool,

    /// Log debug output unless RUST_LOG says otherwise.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl CliArgs {
    /// Resolves the session configuration from the optional file and flags.
    pub(crate) fn session_config(&self) -> Result<SessionConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => SessionConfig::default(),
        };

        if let Some(width) = self.width {
            config.maze_width = width;
        }
        if let Some(height) = self.height {
            config.maze_height = height;
        }
        if let Some(seed) = self.seed {
            config.seed = seed;
        }
        if let Some(pursuers) = self.pursuers {
            config.pursuer_count = pursuers;
        }

        config
            .validate()
            .context("invalid session configuration")?;
        Ok(config)
    }

    /// Simulated time covered by one tick.
    pub(crate) fn tick_duration(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}

fn load_config(path: &Path) -> Result<SessionConfig> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read session config at {}", path.display()))?;
    parse_config(&contents)
        .with_context(|| format!("failed to parse session config at {}", path.display()))
}

fn parse_config(contents: &str) -> Result<SessionConfig> {
    toml::from_str(contents).context("session config is not valid toml")
}
