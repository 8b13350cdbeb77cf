//! Scripted player intent that walks the maze toward its far corner.

use std::time::Duration;

use glam::Vec2;
use maze_chase_session::{build_flow_field, next_cell_from_flow, CellCoord, FlowField, Session};

/// Distance to a target below which the player counts as arrived.
const ARRIVAL_DISTANCE: f32 = 1.0e-3;

/// Follows a flow field rooted at the cell opposite the player's start.
#[derive(Debug)]
pub(crate) struct Autopilot {
    goal: CellCoord,
    field: FlowField,
}

impl Autopilot {
    /// Plans a route to the bottom-right cell of the session's maze.
    pub(crate) fn toward_far_corner(session: &Session) -> Self {
        let maze = session.maze();
        let goal = CellCoord::new(
            maze.width().saturating_sub(1),
            maze.height().saturating_sub(1),
        );
        Self {
            goal,
            field: build_flow_field(maze, goal),
        }
    }

    /// Cell the autopilot is heading for.
    pub(crate) const fn goal(&self) -> CellCoord {
        self.goal
    }

    /// Displacement for the next tick, at most `player_speed * dt` long.
    ///
    /// Heads for the centre of the next downhill cell and stops at the
    /// centre of the goal.
    pub(crate) fn intent(&self, session: &Session, dt: Duration) -> Vec2 {
        let player = session.player();
        let geometry = session.geometry();
        let next = next_cell_from_flow(session.maze(), &self.field.view(), player.cell);
        let target = geometry.cell_center(next);

        let offset = target - player.position;
        let reach = session.config().player_speed * dt.as_secs_f32();
        let distance = offset.length();
        if distance <= ARRIVAL_DISTANCE {
            return Vec2::ZERO;
        }
        offset / distance * reach.min(distance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use maze_chase_session::SessionConfig;

    const FRAME: Duration = Duration::from_millis(16);

    #[test]
    fn walks_to_the_far_corner() {
        let mut session = Session::new(SessionConfig {
            maze_width: 5,
            maze_height: 5,
            pursuer_count: 0,
            ..SessionConfig::default()
        })
        .expect("valid config");
        let autopilot = Autopilot::toward_far_corner(&session);

        for _ in 0..10_000 {
            let intent = autopilot.intent(&session, FRAME);
            if intent == Vec2::ZERO {
                break;
            }
            let _ = session.tick(FRAME, intent);
        }

        assert_eq!(session.player().cell, autopilot.goal());
    }

    #[test]
    fn intent_is_capped_by_player_speed() {
        let session = Session::new(SessionConfig {
            maze_width: 4,
            maze_height: 4,
            pursuer_count: 0,
            ..SessionConfig::default()
        })
        .expect("valid config");
        let autopilot = Autopilot::toward_far_corner(&session);

        let intent = autopilot.intent(&session, FRAME);
        let reach = session.config().player_speed * FRAME.as_secs_f32();
        assert!((intent.length() - reach).abs() < 1.0e-4);
    }
}
