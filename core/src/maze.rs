//! Static maze topology and its embedding in world space.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::CellCoord;

/// Default side length of a maze cell expressed in world units.
pub const DEFAULT_CELL_SIZE: f32 = 320.0;

/// Default thickness of a wall segment expressed in world units.
pub const DEFAULT_WALL_THICKNESS: f32 = 8.0;

/// Cardinal directions that key the wall flags of a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing row indices.
    North,
    /// Toward increasing column indices.
    East,
    /// Toward increasing row indices.
    South,
    /// Toward decreasing column indices.
    West,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Direction pointing the opposite way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::East => Self::West,
            Self::South => Self::North,
            Self::West => Self::East,
        }
    }

    /// Column and row deltas covered by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::North => (0, -1),
            Self::East => (1, 0),
            Self::South => (0, 1),
            Self::West => (-1, 0),
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Self::North => 0b0001,
            Self::East => 0b0010,
            Self::South => 0b0100,
            Self::West => 0b1000,
        }
    }
}

/// Set of wall flags surrounding a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Walls(u8);

impl Walls {
    /// Walls on every side, the state of a cell before carving.
    pub const ALL: Walls = Walls(0b1111);

    /// Reports whether a wall blocks the provided side.
    #[must_use]
    pub const fn contains(self, direction: Direction) -> bool {
        self.0 & direction.bit() != 0
    }

    /// Iterator over the sides that still carry a wall.
    pub fn iter(self) -> impl Iterator<Item = Direction> {
        Direction::ALL
            .into_iter()
            .filter(move |direction| self.contains(*direction))
    }

    const fn without(self, direction: Direction) -> Self {
        Self(self.0 & !direction.bit())
    }
}

/// Single lattice unit of the maze.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Cell {
    coord: CellCoord,
    walls: Walls,
}

impl Cell {
    /// Coordinate of the cell within the grid.
    #[must_use]
    pub const fn coord(&self) -> CellCoord {
        self.coord
    }

    /// Wall flags attached to the cell.
    #[must_use]
    pub const fn walls(&self) -> Walls {
        self.walls
    }

    /// Reports whether a wall blocks the provided side of the cell.
    #[must_use]
    pub const fn has_wall(&self, direction: Direction) -> bool {
        self.walls.contains(direction)
    }
}

/// Immutable grid model produced once by the maze generator.
///
/// Cells are stored in row-major order. The type offers no mutating
/// operations, so a finished maze can be shared freely between the world and
/// every system that reads it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Maze {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Maze {
    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Dense row-major cell storage.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Row-major index of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        index_within(self.width, self.height, cell)
    }

    /// Cell stored at the provided coordinate, or `None` when out of range.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.index(cell).and_then(|index| self.cells.get(index))
    }

    /// Signed lookup used by neighbourhood scans that may step past the edges.
    #[must_use]
    pub fn cell_at(&self, column: i64, row: i64) -> Option<&Cell> {
        let column = u32::try_from(column).ok()?;
        let row = u32::try_from(row).ok()?;
        self.cell(CellCoord::new(column, row))
    }

    /// Wall state on one side of a cell, or `None` when the cell is out of range.
    #[must_use]
    pub fn has_wall(&self, cell: CellCoord, direction: Direction) -> Option<bool> {
        self.cell(cell).map(|cell| cell.has_wall(direction))
    }

    /// Adjacent cell in the provided direction, if it lies within the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        neighbor_within(self.width, self.height, cell, direction)
    }

    /// Reports whether an agent can pass from `cell` to its neighbour in `direction`.
    #[must_use]
    pub fn is_open(&self, cell: CellCoord, direction: Direction) -> bool {
        self.neighbor(cell, direction).is_some() && self.has_wall(cell, direction) == Some(false)
    }

    /// Neighbours reachable from `cell` through open edges, in clockwise order.
    pub fn open_neighbors(
        &self,
        cell: CellCoord,
    ) -> impl Iterator<Item = (Direction, CellCoord)> + '_ {
        Direction::ALL.into_iter().filter_map(move |direction| {
            if self.is_open(cell, direction) {
                self.neighbor(cell, direction)
                    .map(|neighbor| (direction, neighbor))
            } else {
                None
            }
        })
    }

    /// Number of open edges, counting each shared edge once.
    #[must_use]
    pub fn open_edge_count(&self) -> usize {
        self.cells
            .iter()
            .map(|cell| {
                [Direction::East, Direction::South]
                    .into_iter()
                    .filter(|direction| self.is_open(cell.coord, *direction))
                    .count()
            })
            .sum()
    }
}

/// Single writer used while generating a maze.
///
/// The builder starts with every wall present and only ever removes walls in
/// pairs, so the two sides of a shared edge always agree.
#[derive(Debug)]
pub struct MazeBuilder {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl MazeBuilder {
    /// Creates a fully walled grid with the provided dimensions.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        let capacity = usize::try_from(u64::from(width) * u64::from(height)).unwrap_or(0);
        let mut cells = Vec::with_capacity(capacity);
        for row in 0..height {
            for column in 0..width {
                cells.push(Cell {
                    coord: CellCoord::new(column, row),
                    walls: Walls::ALL,
                });
            }
        }

        Self {
            width,
            height,
            cells,
        }
    }

    /// Number of columns in the grid under construction.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid under construction.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Row-major index of the provided cell, if it lies within the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        index_within(self.width, self.height, cell)
    }

    /// Adjacent cell in the provided direction, if it lies within the grid.
    #[must_use]
    pub fn neighbor(&self, cell: CellCoord, direction: Direction) -> Option<CellCoord> {
        neighbor_within(self.width, self.height, cell, direction)
    }

    /// Removes the wall between `cell` and its neighbour on both sides.
    ///
    /// Returns `false` without touching the grid when the neighbour does not
    /// exist.
    pub fn carve(&mut self, cell: CellCoord, direction: Direction) -> bool {
        let Some(neighbor) = self.neighbor(cell, direction) else {
            return false;
        };
        let (Some(from), Some(to)) = (self.index(cell), self.index(neighbor)) else {
            return false;
        };

        self.cells[from].walls = self.cells[from].walls.without(direction);
        self.cells[to].walls = self.cells[to].walls.without(direction.opposite());
        true
    }

    /// Seals the grid into an immutable [`Maze`].
    #[must_use]
    pub fn finish(self) -> Maze {
        Maze {
            width: self.width,
            height: self.height,
            cells: self.cells,
        }
    }
}

/// World-space embedding of the maze lattice.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MazeGeometry {
    cell_size: f32,
    wall_thickness: f32,
}

impl MazeGeometry {
    /// Creates a geometry description from a cell size and wall thickness.
    #[must_use]
    pub const fn new(cell_size: f32, wall_thickness: f32) -> Self {
        Self {
            cell_size,
            wall_thickness,
        }
    }

    /// Side length of a single square cell in world units.
    #[must_use]
    pub const fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Thickness of every wall segment in world units.
    #[must_use]
    pub const fn wall_thickness(&self) -> f32 {
        self.wall_thickness
    }

    /// Cell containing the provided world-space point.
    ///
    /// Points left of or above the origin have no cell. Callers still need to
    /// check the result against the maze dimensions.
    #[must_use]
    pub fn world_to_cell(&self, point: Vec2) -> Option<CellCoord> {
        if !point.is_finite() || self.cell_size <= 0.0 {
            return None;
        }

        let column = (point.x / self.cell_size).floor();
        let row = (point.y / self.cell_size).floor();
        if column < 0.0 || row < 0.0 || column > u32::MAX as f32 || row > u32::MAX as f32 {
            return None;
        }

        Some(CellCoord::new(column as u32, row as u32))
    }

    /// World-space centre of the provided cell.
    #[must_use]
    pub fn cell_center(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(
            (cell.column() as f32 + 0.5) * self.cell_size,
            (cell.row() as f32 + 0.5) * self.cell_size,
        )
    }
}

impl Default for MazeGeometry {
    fn default() -> Self {
        Self::new(DEFAULT_CELL_SIZE, DEFAULT_WALL_THICKNESS)
    }
}

fn index_within(width: u32, height: u32, cell: CellCoord) -> Option<usize> {
    if cell.column() >= width || cell.row() >= height {
        return None;
    }

    let width = usize::try_from(width).ok()?;
    let column = usize::try_from(cell.column()).ok()?;
    let row = usize::try_from(cell.row()).ok()?;
    row.checked_mul(width)?.checked_add(column)
}

fn neighbor_within(
    width: u32,
    height: u32,
    cell: CellCoord,
    direction: Direction,
) -> Option<CellCoord> {
    if cell.column() >= width || cell.row() >= height {
        return None;
    }

    let (column_delta, row_delta) = direction.offset();
    let column = u32::try_from(i64::from(cell.column()) + column_delta).ok()?;
    let row = u32::try_from(i64::from(cell.row()) + row_delta).ok()?;
    if column >= width || row >= height {
        return None;
    }

    Some(CellCoord::new(column, row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carve_clears_both_sides_of_the_edge() {
        let mut builder = MazeBuilder::new(3, 2);
        assert!(builder.carve(CellCoord::new(1, 0), Direction::South));
        let maze = builder.finish();

        assert_eq!(maze.has_wall(CellCoord::new(1, 0), Direction::South), Some(false));
        assert_eq!(maze.has_wall(CellCoord::new(1, 1), Direction::North), Some(false));
        assert_eq!(maze.has_wall(CellCoord::new(1, 1), Direction::East), Some(true));
        assert_eq!(maze.open_edge_count(), 1);
    }

    #[test]
    fn carve_refuses_edges_leaving_the_grid() {
        let mut builder = MazeBuilder::new(2, 2);
        assert!(!builder.carve(CellCoord::new(0, 0), Direction::North));
        assert!(!builder.carve(CellCoord::new(1, 1), Direction::East));
        assert_eq!(builder.finish().open_edge_count(), 0);
    }

    #[test]
    fn out_of_range_queries_report_no_cell() {
        let maze = MazeBuilder::new(4, 3).finish();

        assert!(maze.cell(CellCoord::new(4, 0)).is_none());
        assert!(maze.cell(CellCoord::new(0, 3)).is_none());
        assert!(maze.cell_at(-1, 0).is_none());
        assert!(maze.cell_at(0, -1).is_none());
        assert_eq!(maze.has_wall(CellCoord::new(9, 9), Direction::North), None);
        assert_eq!(maze.neighbor(CellCoord::new(3, 2), Direction::East), None);
        assert_eq!(
            maze.cell_at(3, 2).map(Cell::coord),
            Some(CellCoord::new(3, 2))
        );
    }

    #[test]
    fn cells_are_stored_row_major() {
        let maze = MazeBuilder::new(5, 4).finish();

        assert_eq!(maze.cell_count(), 20);
        assert_eq!(maze.index(CellCoord::new(2, 3)), Some(17));
        assert_eq!(maze.cells()[17].coord(), CellCoord::new(2, 3));
    }

    #[test]
    fn open_neighbors_follow_carved_edges() {
        let mut builder = MazeBuilder::new(3, 3);
        let center = CellCoord::new(1, 1);
        assert!(builder.carve(center, Direction::West));
        assert!(builder.carve(center, Direction::South));
        let maze = builder.finish();

        let neighbors: Vec<_> = maze.open_neighbors(center).collect();
        assert_eq!(
            neighbors,
            vec![
                (Direction::South, CellCoord::new(1, 2)),
                (Direction::West, CellCoord::new(0, 1)),
            ]
        );
    }

    #[test]
    fn world_to_cell_floors_and_rejects_negative_points() {
        let geometry = MazeGeometry::new(10.0, 1.0);

        assert_eq!(
            geometry.world_to_cell(Vec2::new(25.0, 9.99)),
            Some(CellCoord::new(2, 0))
        );
        assert_eq!(geometry.world_to_cell(Vec2::new(-0.5, 3.0)), None);
        assert_eq!(geometry.world_to_cell(Vec2::new(f32::NAN, 3.0)), None);
        assert_eq!(geometry.cell_center(CellCoord::new(2, 0)), Vec2::new(25.0, 5.0));
    }
}
