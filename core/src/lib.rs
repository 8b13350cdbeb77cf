#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Maze Chase engine.
//!
//! This crate defines the grid model and the message surface that connects
//! adapters, the authoritative world, and pure systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable views, and respond exclusively with new command batches.

use std::{borrow::Cow, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

mod config;
mod maze;

pub use config::{ConfigError, SessionConfig, DEFAULT_SUBSTEP_LENGTH, PLAYER_RADIUS, PLAYER_SPEED};
pub use maze::{
    Cell, Direction, Maze, MazeBuilder, MazeGeometry, Walls, DEFAULT_CELL_SIZE,
    DEFAULT_WALL_THICKNESS,
};

/// Sentinel distance stored for cells the flow field cannot reach.
pub const UNREACHABLE: u32 = u32::MAX;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player move by the provided displacement.
    MovePlayer {
        /// Desired displacement in world units, already scaled by the shell.
        displacement: Vec2,
    },
    /// Requests that a new dormant pursuer appear at the centre of a cell.
    SpawnPursuer {
        /// Cell hosting the new pursuer.
        cell: CellCoord,
    },
    /// Requests that a dormant pursuer start chasing the player.
    WakePursuer {
        /// Identifier of the pursuer to activate.
        pursuer: PursuerId,
    },
    /// Requests that a pursuing agent move by the provided displacement.
    SteerPursuer {
        /// Identifier of the pursuer to move.
        pursuer: PursuerId,
        /// Desired displacement in world units.
        displacement: Vec2,
    },
    /// Requests that a pursuer be recycled at the centre of a new cell.
    RelocatePursuer {
        /// Identifier of the pursuer to relocate.
        pursuer: PursuerId,
        /// Cell chosen for the pursuer.
        cell: CellCoord,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms the player's resolved position after a move request.
    PlayerMoved {
        /// Position before the move.
        from: Vec2,
        /// Position after collision resolution.
        to: Vec2,
    },
    /// Announces that the player entered a different cell.
    PlayerCellChanged {
        /// Cell the player occupied before moving.
        from: CellCoord,
        /// Cell the player occupies now.
        to: CellCoord,
    },
    /// Announces that the flow field was replaced by one rooted at `root`.
    FlowFieldRebuilt {
        /// Cell the new field measures distances to.
        root: CellCoord,
    },
    /// Confirms that a pursuer was created.
    PursuerSpawned {
        /// Identifier assigned to the new pursuer.
        pursuer: PursuerId,
        /// Cell the pursuer was placed in.
        cell: CellCoord,
    },
    /// Announces that a dormant pursuer started chasing.
    PursuerAwoke {
        /// Identifier of the activated pursuer.
        pursuer: PursuerId,
    },
    /// Confirms a pursuer's resolved position after a steer request.
    PursuerMoved {
        /// Identifier of the pursuer that moved.
        pursuer: PursuerId,
        /// Position before the move.
        from: Vec2,
        /// Position after collision resolution.
        to: Vec2,
    },
    /// Reports that a pursuer touched the player and went dormant.
    PursuerContact {
        /// Identifier of the pursuer that touched the player.
        pursuer: PursuerId,
    },
    /// Confirms that a pursuer was recycled into a new cell.
    PursuerRelocated {
        /// Identifier of the relocated pursuer.
        pursuer: PursuerId,
        /// Cell the pursuer now occupies.
        cell: CellCoord,
    },
}

/// Unique identifier assigned to a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Activity state of a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PursuerState {
    /// Stationary and ignoring the flow field until the player comes close.
    Dormant,
    /// Following the flow field toward the player.
    Pursuing,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Squared Euclidean distance between two cells measured in whole cells.
    #[must_use]
    pub fn distance_squared(self, other: CellCoord) -> u64 {
        let columns = u64::from(self.column.abs_diff(other.column));
        let rows = u64::from(self.row.abs_diff(other.row));
        columns * columns + rows * rows
    }
}

/// Immutable representation of the player's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerSnapshot {
    /// Continuous position in world units.
    pub position: Vec2,
    /// Collision radius in world units.
    pub radius: f32,
    /// Cell the player occupied after its latest move.
    pub cell: CellCoord,
}

/// Immutable representation of a single pursuer's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuerSnapshot {
    /// Unique identifier assigned to the pursuer.
    pub id: PursuerId,
    /// Continuous position in world units.
    pub position: Vec2,
    /// Collision radius in world units.
    pub radius: f32,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Current activity state.
    pub state: PursuerState,
}

/// Read-only snapshot describing all pursuers within the maze.
#[derive(Clone, Debug, Default)]
pub struct PursuerView {
    snapshots: Vec<PursuerSnapshot>,
}

impl PursuerView {
    /// Creates a new pursuer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PursuerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured pursuer snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &PursuerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of captured pursuers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view holds no pursuers.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<PursuerSnapshot> {
        self.snapshots
    }
}

/// Read-only view of a breadth-first distance field.
///
/// Distances are stored in row-major order and count open-edge hops to the
/// root cell. Cells the search never reached hold [`UNREACHABLE`].
#[derive(Clone, Debug)]
pub struct FlowFieldView<'a> {
    distances: Cow<'a, [u32]>,
    width: u32,
    height: u32,
    root: CellCoord,
}

impl<'a> FlowFieldView<'a> {
    /// Captures a view backed by borrowed distances.
    #[must_use]
    pub fn new(distances: &'a [u32], width: u32, height: u32, root: CellCoord) -> Self {
        Self {
            distances: Cow::Borrowed(distances),
            width,
            height,
            root,
        }
    }

    /// Captures a view that owns its distances.
    #[must_use]
    pub fn from_owned(distances: Vec<u32>, width: u32, height: u32, root: CellCoord) -> Self {
        Self {
            distances: Cow::Owned(distances),
            width,
            height,
            root,
        }
    }

    /// Cell the distances are measured to.
    #[must_use]
    pub const fn root(&self) -> CellCoord {
        self.root
    }

    /// Distance recorded for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        if cell.column() >= self.width || cell.row() >= self.height {
            return None;
        }

        let width = usize::try_from(self.width).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let row = usize::try_from(cell.row()).ok()?;
        let index = row.checked_mul(width)?.checked_add(column)?;
        self.distances.get(index).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_squared_is_symmetric() {
        let origin = CellCoord::new(1, 1);
        let destination = CellCoord::new(4, 5);
        assert_eq!(origin.distance_squared(destination), 25);
        assert_eq!(destination.distance_squared(origin), 25);
    }

    #[test]
    fn pursuer_view_orders_by_identifier() {
        let snapshot = |id| PursuerSnapshot {
            id: PursuerId::new(id),
            position: Vec2::ZERO,
            radius: 1.0,
            speed: 1.0,
            state: PursuerState::Dormant,
        };
        let view = PursuerView::from_snapshots(vec![snapshot(3), snapshot(1), snapshot(2)]);

        let ids: Vec<u32> = view.iter().map(|pursuer| pursuer.id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(view.len(), 3);
    }

    #[test]
    fn flow_field_view_rejects_out_of_range_cells() {
        let view = FlowFieldView::from_owned(vec![0, 1, 2, 3], 2, 2, CellCoord::new(0, 0));

        assert_eq!(view.distance(CellCoord::new(1, 1)), Some(3));
        assert_eq!(view.distance(CellCoord::new(2, 0)), None);
        assert_eq!(view.distance(CellCoord::new(0, 2)), None);
    }
}
