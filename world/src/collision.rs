//! Circle-versus-wall collision resolution.
//!
//! Walls are axis-aligned rectangles centred on cell edges and extended by
//! half a thickness past each end, so neighbouring segments close their
//! corners. A move is resolved one axis at a time against the walls of the
//! 3×3 cell neighbourhood around the candidate position. The approximation
//! assumes each resolved displacement is well below one cell; larger moves go
//! through [`move_circle_substepped`].

use glam::Vec2;
use maze_chase_core::{
    CellCoord, Direction, Maze, MazeGeometry, DEFAULT_SUBSTEP_LENGTH, PLAYER_RADIUS,
};

/// Smallest separation used when deriving a push-out normal.
const MIN_DISTANCE: f32 = 1.0e-4;

/// Net movement below which a sub-step counts as blocked.
const STALL_DISTANCE_SQUARED: f32 = 1.0e-10;

/// Upper bound on the number of sub-steps a single move is split into.
const MAX_SUBSTEPS: u32 = 4_096;

/// Push-out passes over the neighbourhood per axis.
const RESOLVE_PASSES: usize = 4;

/// Axis-aligned rectangle occupied by one wall segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallRect {
    /// Corner with the smallest coordinates.
    pub min: Vec2,
    /// Corner with the largest coordinates.
    pub max: Vec2,
}

impl WallRect {
    /// Rectangle covering the wall on `direction` side of `cell`.
    #[must_use]
    pub fn for_edge(geometry: &MazeGeometry, cell: CellCoord, direction: Direction) -> Self {
        let size = geometry.cell_size();
        let half = geometry.wall_thickness() * 0.5;
        let left = cell.column() as f32 * size;
        let top = cell.row() as f32 * size;
        let right = left + size;
        let bottom = top + size;

        let (min, max) = match direction {
            Direction::North => (
                Vec2::new(left - half, top - half),
                Vec2::new(right + half, top + half),
            ),
            Direction::South => (
                Vec2::new(left - half, bottom - half),
                Vec2::new(right + half, bottom + half),
            ),
            Direction::West => (
                Vec2::new(left - half, top - half),
                Vec2::new(left + half, bottom + half),
            ),
            Direction::East => (
                Vec2::new(right - half, top - half),
                Vec2::new(right + half, bottom + half),
            ),
        };

        Self { min, max }
    }

    /// Point of the rectangle nearest to `point`.
    #[must_use]
    pub fn closest_point(&self, point: Vec2) -> Vec2 {
        point.clamp(self.min, self.max)
    }

    /// Distance from `point` to the rectangle, zero when inside.
    #[must_use]
    pub fn distance_to(&self, point: Vec2) -> f32 {
        point.distance(self.closest_point(point))
    }
}

/// Visits every wall rectangle of the 3×3 neighbourhood around `position`.
///
/// A wall shared by two cells of the neighbourhood is visited once per side.
pub fn for_each_nearby_wall<F>(maze: &Maze, geometry: &MazeGeometry, position: Vec2, mut visit: F)
where
    F: FnMut(WallRect),
{
    let size = geometry.cell_size();
    if size <= 0.0 {
        return;
    }

    let column = (position.x / size).floor() as i64;
    let row = (position.y / size).floor() as i64;

    for row_offset in -1..=1 {
        for column_offset in -1..=1 {
            let Some(cell) = maze.cell_at(column + column_offset, row + row_offset) else {
                continue;
            };
            for direction in cell.walls().iter() {
                visit(WallRect::for_edge(geometry, cell.coord(), direction));
            }
        }
    }
}

/// Moves a circle by `displacement`, resolving X and then Y against nearby walls.
#[must_use]
pub fn move_circle(
    maze: &Maze,
    geometry: &MazeGeometry,
    position: Vec2,
    radius: f32,
    displacement: Vec2,
) -> Vec2 {
    let after_x = resolve(
        maze,
        geometry,
        Vec2::new(position.x + displacement.x, position.y),
        radius,
    );
    resolve(
        maze,
        geometry,
        Vec2::new(after_x.x, after_x.y + displacement.y),
        radius,
    )
}

/// Moves a circle in segments no longer than `max_step`.
///
/// Each segment is resolved with [`move_circle`]. Motion stops at the first
/// segment that produces no net movement. Segments never exceed `max_step`;
/// a move needing more than `MAX_SUBSTEPS` segments is shortened instead.
#[must_use]
pub fn move_circle_substepped(
    maze: &Maze,
    geometry: &MazeGeometry,
    position: Vec2,
    radius: f32,
    displacement: Vec2,
    max_step: f32,
) -> Vec2 {
    let distance = displacement.length();
    if !distance.is_finite() || distance <= 0.0 {
        return position;
    }

    let max_step = if max_step.is_finite() && max_step > 0.0 {
        max_step
    } else {
        distance
    };
    let wanted = (distance / max_step).ceil();
    let (steps, step) = if wanted > MAX_SUBSTEPS as f32 {
        log::debug!("truncating a {distance} unit move to {MAX_SUBSTEPS} sub-steps");
        (MAX_SUBSTEPS, displacement / distance * max_step)
    } else {
        let steps = (wanted as u32).max(1);
        (steps, displacement / steps as f32)
    };

    let mut current = position;
    for _ in 0..steps {
        let next = move_circle(maze, geometry, current, radius, step);
        if next.distance_squared(current) <= STALL_DISTANCE_SQUARED {
            break;
        }
        current = next;
    }

    current
}

/// Moves the player using the fixed player radius and default sub-step.
#[must_use]
pub fn move_player(
    maze: &Maze,
    geometry: &MazeGeometry,
    position: Vec2,
    displacement: Vec2,
) -> Vec2 {
    move_circle_substepped(
        maze,
        geometry,
        position,
        PLAYER_RADIUS,
        displacement,
        DEFAULT_SUBSTEP_LENGTH,
    )
}

fn resolve(maze: &Maze, geometry: &MazeGeometry, candidate: Vec2, radius: f32) -> Vec2 {
    let mut position = candidate;

    for _ in 0..RESOLVE_PASSES {
        let mut pushed = false;
        for_each_nearby_wall(maze, geometry, candidate, |wall| {
            if let Some(corrected) = push_out(wall, position, radius) {
                position = corrected;
                pushed = true;
            }
        });
        if !pushed {
            break;
        }
    }

    position
}

fn push_out(wall: WallRect, center: Vec2, radius: f32) -> Option<Vec2> {
    let closest = wall.closest_point(center);
    let offset = center - closest;
    let distance = offset.length();

    if distance >= radius {
        return None;
    }

    if offset == Vec2::ZERO {
        return Some(escape_interior(wall, center, radius));
    }

    let normal = offset / distance.max(MIN_DISTANCE);
    Some(center + normal * (radius - distance))
}

/// Pushes a centre lying inside or on a rectangle out across its nearest side.
fn escape_interior(wall: WallRect, center: Vec2, radius: f32) -> Vec2 {
    let exits = [
        (center.x - wall.min.x, Vec2::new(wall.min.x - radius, center.y)),
        (wall.max.x - center.x, Vec2::new(wall.max.x + radius, center.y)),
        (center.y - wall.min.y, Vec2::new(center.x, wall.min.y - radius)),
        (wall.max.y - center.y, Vec2::new(center.x, wall.max.y + radius)),
    ];

    let mut best = exits[0];
    for exit in &exits[1..] {
        if exit.0 < best.0 {
            best = *exit;
        }
    }
    best.1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wall() -> WallRect {
        WallRect {
            min: Vec2::new(0.0, 0.0),
            max: Vec2::new(10.0, 2.0),
        }
    }

    #[test]
    fn push_out_moves_along_the_contact_normal() {
        let corrected = push_out(wall(), Vec2::new(5.0, 4.0), 3.0).expect("overlap");
        assert!((corrected - Vec2::new(5.0, 5.0)).length() < 1.0e-5);
    }

    #[test]
    fn push_out_ignores_separated_circles() {
        assert!(push_out(wall(), Vec2::new(5.0, 6.0), 3.0).is_none());
    }

    #[test]
    fn centre_on_boundary_escapes_without_dividing_by_zero() {
        let corrected = push_out(wall(), Vec2::new(5.0, 2.0), 3.0).expect("overlap");
        assert!(corrected.is_finite());
        assert!((corrected - Vec2::new(5.0, 5.0)).length() < 1.0e-5);
    }

    #[test]
    fn centre_inside_escapes_through_the_nearest_side() {
        let corrected = push_out(wall(), Vec2::new(9.5, 1.0), 1.0).expect("overlap");
        assert!((corrected - Vec2::new(11.0, 1.0)).length() < 1.0e-5);
    }

    #[test]
    fn edge_rectangles_are_centred_on_cell_edges() {
        let geometry = MazeGeometry::new(100.0, 10.0);
        let rect = WallRect::for_edge(&geometry, CellCoord::new(1, 2), Direction::East);

        assert_eq!(rect.min, Vec2::new(195.0, 195.0));
        assert_eq!(rect.max, Vec2::new(205.0, 305.0));
    }
}
