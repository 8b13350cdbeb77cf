//! Breadth-first flow field rooted at the player's cell.

use std::collections::VecDeque;

use maze_chase_core::{CellCoord, FlowFieldView, Maze, UNREACHABLE};

/// Dense hop-count grid measuring the distance of every cell to a root cell.
///
/// Distances only grow through open edges, so the values follow the maze's
/// corridors rather than straight lines. Cells the search cannot reach keep
/// [`UNREACHABLE`]. A field is never patched in place: a new root produces a
/// new field that replaces the old one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FlowField {
    width: u32,
    height: u32,
    root: CellCoord,
    distances: Vec<u32>,
}

impl FlowField {
    /// Runs a breadth-first search from `root` over the maze's open edges.
    ///
    /// A root outside the maze yields a field in which every cell is
    /// unreachable.
    #[must_use]
    pub fn build(maze: &Maze, root: CellCoord) -> Self {
        let mut distances = vec![UNREACHABLE; maze.cell_count()];
        let mut queue = VecDeque::new();

        if let Some(index) = maze.index(root) {
            distances[index] = 0;
            queue.push_back(root);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = maze.index(cell) else {
                continue;
            };
            let next_distance = distances[current_index].saturating_add(1);

            for (_, neighbor) in maze.open_neighbors(cell) {
                let Some(neighbor_index) = maze.index(neighbor) else {
                    continue;
                };

                if distances[neighbor_index] != UNREACHABLE {
                    continue;
                }

                distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Self {
            width: maze.width(),
            height: maze.height(),
            root,
            distances,
        }
    }

    /// Cell the distances are measured to.
    #[must_use]
    pub const fn root(&self) -> CellCoord {
        self.root
    }

    /// Width of the field in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the field in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Dense distances stored in row-major order.
    #[must_use]
    pub fn cells(&self) -> &[u32] {
        &self.distances
    }

    /// Distance recorded for the provided cell, if it lies within the field.
    #[must_use]
    pub fn distance(&self, cell: CellCoord) -> Option<u32> {
        self.view().distance(cell)
    }

    /// Borrowed read-only view handed to systems.
    #[must_use]
    pub fn view(&self) -> FlowFieldView<'_> {
        FlowFieldView::new(&self.distances, self.width, self.height, self.root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_core::{Direction, MazeBuilder};

    fn corridor(length: u32) -> Maze {
        let mut builder = MazeBuilder::new(length, 1);
        for column in 0..length.saturating_sub(1) {
            assert!(builder.carve(CellCoord::new(column, 0), Direction::East));
        }
        builder.finish()
    }

    #[test]
    fn build_sets_root_to_zero_and_counts_hops() {
        let field = FlowField::build(&corridor(5), CellCoord::new(1, 0));

        assert_eq!(field.cells(), &[1, 0, 1, 2, 3]);
        assert_eq!(field.root(), CellCoord::new(1, 0));
    }

    #[test]
    fn build_respects_walls() {
        let mut builder = MazeBuilder::new(3, 1);
        assert!(builder.carve(CellCoord::new(0, 0), Direction::East));
        let field = FlowField::build(&builder.finish(), CellCoord::new(0, 0));

        assert_eq!(field.distance(CellCoord::new(1, 0)), Some(1));
        assert_eq!(field.distance(CellCoord::new(2, 0)), Some(UNREACHABLE));
    }

    #[test]
    fn out_of_range_root_leaves_every_cell_unreachable() {
        let field = FlowField::build(&corridor(4), CellCoord::new(9, 0));

        assert!(field.cells().iter().all(|distance| *distance == UNREACHABLE));
        assert_eq!(field.distance(CellCoord::new(9, 0)), None);
    }
}
