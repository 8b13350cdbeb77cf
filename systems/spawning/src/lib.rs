#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawning system responsible for placing and recycling pursuers.
//!
//! Spawn cells are drawn uniformly at random and rejected when they collide
//! with a cell already chosen in the same batch, sit on the player's cell, or
//! lie closer to the player than the minimum spawn distance. Selections inside
//! a batch are sequential, so every draw sees the cells chosen before it.

use std::collections::HashSet;

use glam::Vec2;
use maze_chase_core::{
    CellCoord, Command, Event, Maze, MazeGeometry, PlayerSnapshot, PursuerState, SessionConfig,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Placement constraints applied to every spawn batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnRules {
    /// Minimum Euclidean distance, in cells, between the player and a spawn cell.
    pub min_distance: u32,
    /// Random draws attempted before falling back to a deterministic offset.
    pub max_attempts: u32,
}

impl SpawnRules {
    /// Rules derived from a session configuration.
    #[must_use]
    pub const fn from_config(config: &SessionConfig) -> Self {
        Self {
            min_distance: config.min_spawn_distance,
            max_attempts: config.max_spawn_attempts,
        }
    }

    fn accepts(&self, cell: CellCoord, player: CellCoord, used: &HashSet<CellCoord>) -> bool {
        let min_distance = u64::from(self.min_distance);
        cell != player
            && !used.contains(&cell)
            && cell.distance_squared(player) >= min_distance * min_distance
    }
}

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    rules: SpawnRules,
    rng_seed: u64,
}

impl Config {
    /// Creates a new configuration using the provided placement rules and seed.
    #[must_use]
    pub const fn new(rules: SpawnRules, rng_seed: u64) -> Self {
        Self { rules, rng_seed }
    }
}

/// Initial state of a pursuer produced by [`spawn_agents`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuerSeed {
    /// Cell chosen for the pursuer.
    pub cell: CellCoord,
    /// Centre of the chosen cell in world units.
    pub position: Vec2,
    /// Collision radius of the pursuer.
    pub radius: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Activity state, always dormant for fresh pursuers.
    pub state: PursuerState,
}

/// Pure system that places new pursuers and relocates pursuers after contact.
#[derive(Debug)]
pub struct Spawning {
    rules: SpawnRules,
    rng: ChaCha8Rng,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            rules: config.rules,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        }
    }

    /// Emits one spawn batch of `count` new pursuers.
    pub fn spawn_batch(
        &mut self,
        maze: &Maze,
        player: &PlayerSnapshot,
        count: usize,
        out: &mut Vec<Command>,
    ) {
        let cells = select_spawn_cells(
            maze.width(),
            maze.height(),
            player.cell,
            count,
            self.rules,
            &mut self.rng,
        );
        out.extend(cells.into_iter().map(|cell| Command::SpawnPursuer { cell }));
    }

    /// Answers the contacts reported in `events` with relocation commands.
    ///
    /// Every contact in one call belongs to the same spawn batch.
    pub fn handle(
        &mut self,
        events: &[Event],
        maze: &Maze,
        player: &PlayerSnapshot,
        out: &mut Vec<Command>,
    ) {
        let contacts: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                Event::PursuerContact { pursuer } => Some(*pursuer),
                _ => None,
            })
            .collect();

        if contacts.is_empty() {
            return;
        }

        let cells = select_spawn_cells(
            maze.width(),
            maze.height(),
            player.cell,
            contacts.len(),
            self.rules,
            &mut self.rng,
        );
        for (pursuer, cell) in contacts.into_iter().zip(cells) {
            out.push(Command::RelocatePursuer { pursuer, cell });
        }
    }
}

/// Chooses `count` spawn cells as one batch.
///
/// Returns an empty batch for a grid without cells.
pub fn select_spawn_cells<R>(
    width: u32,
    height: u32,
    player: CellCoord,
    count: usize,
    rules: SpawnRules,
    rng: &mut R,
) -> Vec<CellCoord>
where
    R: Rng + ?Sized,
{
    if width == 0 || height == 0 {
        return Vec::new();
    }

    let mut used = HashSet::with_capacity(count);
    let mut cells = Vec::with_capacity(count);
    for _ in 0..count {
        let cell = choose_cell(width, height, player, rules, &used, rng);
        let _ = used.insert(cell);
        cells.push(cell);
    }
    cells
}

/// Builds dormant pursuer seeds for one spawn batch around `player_position`.
pub fn spawn_agents<R>(
    maze: &Maze,
    geometry: &MazeGeometry,
    config: &SessionConfig,
    player_position: Vec2,
    count: usize,
    rng: &mut R,
) -> Vec<PursuerSeed>
where
    R: Rng + ?Sized,
{
    let player = geometry
        .world_to_cell(player_position)
        .unwrap_or(CellCoord::new(0, 0));

    select_spawn_cells(
        maze.width(),
        maze.height(),
        player,
        count,
        SpawnRules::from_config(config),
        rng,
    )
    .into_iter()
    .map(|cell| PursuerSeed {
        cell,
        position: geometry.cell_center(cell),
        radius: config.pursuer_radius,
        speed: config.pursuer_speed,
        state: PursuerState::Dormant,
    })
    .collect()
}

fn choose_cell<R>(
    width: u32,
    height: u32,
    player: CellCoord,
    rules: SpawnRules,
    used: &HashSet<CellCoord>,
    rng: &mut R,
) -> CellCoord
where
    R: Rng + ?Sized,
{
    for _ in 0..rules.max_attempts {
        let candidate = CellCoord::new(rng.gen_range(0..width), rng.gen_range(0..height));
        if rules.accepts(candidate, player, used) {
            return candidate;
        }
    }

    fallback_cell(width, height, player, rules, used)
}

/// Scans row-major from a fixed offset east of the player.
///
/// Prefers cells honouring every rule, then any free cell other than the
/// player's, and finally the offset cell itself when the grid is saturated.
fn fallback_cell(
    width: u32,
    height: u32,
    player: CellCoord,
    rules: SpawnRules,
    used: &HashSet<CellCoord>,
) -> CellCoord {
    let offset = CellCoord::new(
        ((u64::from(player.column()) + u64::from(rules.min_distance)) % u64::from(width)) as u32,
        player.row() % height,
    );
    let total = u64::from(width) * u64::from(height);
    let start = u64::from(offset.row()) * u64::from(width) + u64::from(offset.column());
    let scan = || {
        (0..total).map(move |step| {
            let index = (start + step) % total;
            CellCoord::new((index % u64::from(width)) as u32, (index / u64::from(width)) as u32)
        })
    };

    let chosen = scan()
        .find(|cell| rules.accepts(*cell, player, used))
        .or_else(|| scan().find(|cell| *cell != player && !used.contains(cell)))
        .unwrap_or(offset);
    log::info!(
        "spawn sampling exhausted {} attempts, falling back to {chosen:?}",
        rules.max_attempts
    );
    chosen
}
