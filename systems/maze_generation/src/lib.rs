#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Randomized depth-first maze carving.
//!
//! Carving starts at the top-left cell, visits neighbours in a freshly
//! shuffled order per cell and backtracks once every direction is exhausted.
//! The walk keeps its frames on an explicit stack and visits cells in the
//! same order as the recursive walk would.

use maze_chase_core::{CellCoord, Direction, Maze, MazeBuilder};
use rand::{seq::SliceRandom, Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Generates a maze using a deterministic generator seeded with `seed`.
#[must_use]
pub fn generate_from_seed(width: u32, height: u32, seed: u64) -> Maze {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    generate(width, height, &mut rng)
}

/// Generates a spanning-tree maze over a `width` by `height` grid.
///
/// The random source is owned by the caller; the same generator state always
/// yields the same maze. A grid without cells produces an empty maze.
pub fn generate<R>(width: u32, height: u32, rng: &mut R) -> Maze
where
    R: Rng + ?Sized,
{
    let mut builder = MazeBuilder::new(width, height);
    let origin = CellCoord::new(0, 0);
    let Some(origin_index) = builder.index(origin) else {
        return builder.finish();
    };

    let cell_count = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
    let mut visited = vec![false; cell_count];
    let mut stack = Vec::new();
    let mut carved = 0_usize;

    visited[origin_index] = true;
    stack.push(Frame::enter(origin, rng));

    while let Some(frame) = stack.last_mut() {
        let Some(direction) = frame.next_direction() else {
            let _ = stack.pop();
            continue;
        };
        let cell = frame.cell;

        let Some(neighbor) = builder.neighbor(cell, direction) else {
            continue;
        };
        let Some(neighbor_index) = builder.index(neighbor) else {
            continue;
        };
        if visited[neighbor_index] {
            continue;
        }

        if builder.carve(cell, direction) {
            carved += 1;
        }
        visited[neighbor_index] = true;
        stack.push(Frame::enter(neighbor, rng));
    }

    log::debug!("carved {width}x{height} maze with {carved} open edges");
    builder.finish()
}

/// Pending work for one cell on the carving stack.
#[derive(Debug)]
struct Frame {
    cell: CellCoord,
    directions: [Direction; 4],
    cursor: usize,
}

impl Frame {
    fn enter<R>(cell: CellCoord, rng: &mut R) -> Self
    where
        R: Rng + ?Sized,
    {
        let mut directions = Direction::ALL;
        directions.shuffle(rng);
        Self {
            cell,
            directions,
            cursor: 0,
        }
    }

    fn next_direction(&mut self) -> Option<Direction> {
        let direction = self.directions.get(self.cursor).copied()?;
        self.cursor += 1;
        Some(direction)
    }
}
