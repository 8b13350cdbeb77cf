#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pursuit system that wakes pursuers and steers them along the flow field.

use std::time::Duration;

use glam::Vec2;
use maze_chase_core::{
    CellCoord, Command, Direction, Event, FlowFieldView, Maze, MazeGeometry, PlayerSnapshot,
    PursuerSnapshot, PursuerState, PursuerView,
};

/// Smallest distance used when normalising a chase direction.
const MIN_DISTANCE: f32 = 1.0e-4;

/// Neighbour order used by flow field descent; earlier entries win ties.
const DESCENT_ORDER: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::West,
    Direction::East,
];

/// Configuration parameters required to construct the pursuit system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    aggro_radius: f32,
}

impl Config {
    /// Creates a configuration waking pursuers within `aggro_radius` world units.
    #[must_use]
    pub const fn new(aggro_radius: f32) -> Self {
        Self { aggro_radius }
    }
}

/// World state the pursuit system reads on every tick.
#[derive(Clone, Copy, Debug)]
pub struct PursuitInputs<'a> {
    /// Shared maze topology.
    pub maze: &'a Maze,
    /// World-space embedding of the maze.
    pub geometry: &'a MazeGeometry,
    /// Current player state.
    pub player: &'a PlayerSnapshot,
    /// Current pursuer states.
    pub pursuers: &'a PursuerView,
    /// Flow field rooted at the player's cell.
    pub flow_field: &'a FlowFieldView<'a>,
}

/// Pure system that reacts to elapsed time and emits pursuer commands.
#[derive(Debug)]
pub struct Pursuit {
    aggro_radius: f32,
}

impl Pursuit {
    /// Creates a new pursuit system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            aggro_radius: config.aggro_radius,
        }
    }

    /// Consumes world events and immutable views to emit pursuer commands.
    ///
    /// Nothing is emitted unless the events contain a tick. Dormant pursuers
    /// within the aggro radius are woken on every tick, including zero-length
    /// ones; they start moving on the following tick. Pursuing agents are
    /// steered toward the next cell of the flow field, or straight at the
    /// player once they share its cell.
    pub fn handle(&mut self, events: &[Event], inputs: PursuitInputs<'_>, out: &mut Vec<Command>) {
        let mut elapsed = None;
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                elapsed = Some(elapsed.unwrap_or(Duration::ZERO).saturating_add(*dt));
            }
        }

        let Some(elapsed) = elapsed else {
            return;
        };

        let seconds = elapsed.as_secs_f32();
        for pursuer in inputs.pursuers.iter() {
            match pursuer.state {
                PursuerState::Dormant => {
                    if pursuer.position.distance(inputs.player.position) <= self.aggro_radius {
                        out.push(Command::WakePursuer {
                            pursuer: pursuer.id,
                        });
                    }
                }
                PursuerState::Pursuing if seconds > 0.0 => {
                    if let Some(displacement) = chase_displacement(pursuer, &inputs, seconds) {
                        out.push(Command::SteerPursuer {
                            pursuer: pursuer.id,
                            displacement,
                        });
                    }
                }
                PursuerState::Pursuing => {}
            }
        }
    }
}

/// Greedy descent over the flow field from `cell`.
///
/// Returns the open neighbour with the strictly smallest distance, checking
/// neighbours north, south, west, then east. When no neighbour improves on
/// `cell` (the root, or a stale field) the cell itself is returned.
#[must_use]
pub fn next_cell_from_flow(maze: &Maze, field: &FlowFieldView<'_>, cell: CellCoord) -> CellCoord {
    let Some(mut best_distance) = field.distance(cell) else {
        return cell;
    };
    let mut best = cell;

    for direction in DESCENT_ORDER {
        if !maze.is_open(cell, direction) {
            continue;
        }
        let Some(neighbor) = maze.neighbor(cell, direction) else {
            continue;
        };
        let Some(distance) = field.distance(neighbor) else {
            continue;
        };

        if distance < best_distance {
            best_distance = distance;
            best = neighbor;
        }
    }

    best
}

fn chase_displacement(
    pursuer: &PursuerSnapshot,
    inputs: &PursuitInputs<'_>,
    seconds: f32,
) -> Option<Vec2> {
    let cell = inputs
        .geometry
        .world_to_cell(pursuer.position)
        .filter(|cell| inputs.maze.cell(*cell).is_some())?;

    let target = if cell == inputs.player.cell {
        inputs.player.position
    } else {
        let next = next_cell_from_flow(inputs.maze, inputs.flow_field, cell);
        if next == cell {
            log::trace!("pursuer {} has no downhill neighbour", pursuer.id.get());
            return None;
        }
        inputs.geometry.cell_center(next)
    };

    steer_toward(pursuer.position, target, pursuer.speed * seconds)
}

/// Displacement of at most `reach` from `from` toward `target`, never overshooting it.
fn steer_toward(from: Vec2, target: Vec2, reach: f32) -> Option<Vec2> {
    let offset = target - from;
    let distance = offset.length();
    if !distance.is_finite() || distance <= 0.0 || reach <= 0.0 {
        return None;
    }

    let direction = offset / distance.max(MIN_DISTANCE);
    Some(direction * reach.min(distance))
}
