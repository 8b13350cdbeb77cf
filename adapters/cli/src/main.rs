#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Maze Chase session.

mod autopilot;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use maze_chase_session::{CellCoord, PursuerState, Session};
use serde::Serialize;

use crate::{autopilot::Autopilot, config::CliArgs};

/// Outcome of a headless run.
#[derive(Debug, Serialize)]
struct RunSummary {
    seed: u64,
    maze_width: u32,
    maze_height: u32,
    ticks: u64,
    simulated_seconds: f64,
    player_cell: CellCoord,
    goal_cell: CellCoord,
    goal_reached: bool,
    pursuers: usize,
    pursuing: usize,
    contacts: u64,
    flow_field_rebuilds: u64,
}

impl RunSummary {
    fn capture(session: &Session, autopilot: &Autopilot, simulated_seconds: f64) -> Self {
        let config = session.config();
        let pursuers = session.pursuers();
        let player_cell = session.player().cell;

        Self {
            seed: config.seed,
            maze_width: config.maze_width,
            maze_height: config.maze_height,
            ticks: session.tick_index(),
            simulated_seconds,
            player_cell,
            goal_cell: autopilot.goal(),
            goal_reached: player_cell == autopilot.goal(),
            pursuers: pursuers.len(),
            pursuing: pursuers
                .iter()
                .filter(|pursuer| pursuer.state == PursuerState::Pursuing)
                .count(),
            contacts: session.contacts(),
            flow_field_rebuilds: session.flow_field_rebuilds(),
        }
    }

    fn print_text(&self) {
        println!(
            "maze {}x{} (seed {:#x})",
            self.maze_width, self.maze_height, self.seed
        );
        println!(
            "ticks {} ({:.2}s simulated)",
            self.ticks, self.simulated_seconds
        );
        println!(
            "player at ({}, {}), goal ({}, {}){}",
            self.player_cell.column(),
            self.player_cell.row(),
            self.goal_cell.column(),
            self.goal_cell.row(),
            if self.goal_reached { " reached" } else { "" }
        );
        println!("pursuers {} ({} pursuing)", self.pursuers, self.pursuing);
        println!("contacts {}", self.contacts);
        println!("flow field rebuilds {}", self.flow_field_rebuilds);
    }
}

/// Entry point for the Maze Chase command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    let default_filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = args.session_config()?;
    let mut session = Session::new(config).context("failed to start session")?;
    let autopilot = Autopilot::toward_far_corner(&session);
    let dt = args.tick_duration();

    for _ in 0..args.ticks {
        let intent = autopilot.intent(&session, dt);
        let report = session.tick(dt, intent);
        if report.contacts() > 0 {
            log::debug!(
                "tick {}: {} contact(s), {} total",
                report.tick,
                report.contacts(),
                session.contacts()
            );
        }
    }

    let simulated_seconds = dt.as_secs_f64() * session.tick_index() as f64;
    let summary = RunSummary::capture(&session, &autopilot, simulated_seconds);
    if args.json {
        let json =
            serde_json::to_string_pretty(&summary).context("failed to serialise run summary")?;
        println!("{json}");
    } else {
        summary.print_text();
    }

    Ok(())
}
