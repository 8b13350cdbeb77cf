#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Maze Chase.

use std::sync::Arc;

use glam::Vec2;
use maze_chase_core::{
    CellCoord, Command, Event, Maze, MazeGeometry, PursuerId, PursuerState, SessionConfig,
};

pub mod collision;
pub mod navigation;

use collision::move_circle_substepped;
use navigation::FlowField;

/// Represents the authoritative Maze Chase world state.
#[derive(Debug)]
pub struct World {
    maze: Arc<Maze>,
    geometry: MazeGeometry,
    substep_length: f32,
    player: Player,
    pursuer_template: PursuerTemplate,
    pursuers: Vec<Pursuer>,
    next_pursuer_id: u32,
    flow_field: FlowField,
    flow_field_rebuilds: u64,
    tick_index: u64,
}

impl World {
    /// Creates a world around an already generated maze.
    ///
    /// The player starts at the centre of the top-left cell and the flow field
    /// is rooted there. Pursuers are added through [`Command::SpawnPursuer`].
    #[must_use]
    pub fn new(maze: Arc<Maze>, config: &SessionConfig) -> Self {
        let geometry = config.geometry();
        let start = CellCoord::new(0, 0);
        let flow_field = FlowField::build(&maze, start);

        Self {
            player: Player {
                position: geometry.cell_center(start),
                radius: config.player_radius,
                cell: start,
            },
            pursuer_template: PursuerTemplate {
                radius: config.pursuer_radius,
                speed: config.pursuer_speed,
            },
            pursuers: Vec::new(),
            next_pursuer_id: 0,
            substep_length: config.substep_length,
            flow_field,
            flow_field_rebuilds: 0,
            tick_index: 0,
            geometry,
            maze,
        }
    }

    fn pursuer_mut(&mut self, pursuer: PursuerId) -> Option<&mut Pursuer> {
        self.pursuers.iter_mut().find(|candidate| candidate.id == pursuer)
    }

    fn move_player(&mut self, displacement: Vec2, out_events: &mut Vec<Event>) {
        let from = self.player.position;
        let to = move_circle_substepped(
            &self.maze,
            &self.geometry,
            from,
            self.player.radius,
            displacement,
            self.substep_length,
        );
        self.player.position = to;
        out_events.push(Event::PlayerMoved { from, to });

        let Some(cell) = self
            .geometry
            .world_to_cell(to)
            .filter(|cell| self.maze.cell(*cell).is_some())
        else {
            return;
        };

        if cell == self.player.cell {
            return;
        }

        let previous = self.player.cell;
        self.player.cell = cell;
        out_events.push(Event::PlayerCellChanged {
            from: previous,
            to: cell,
        });
        self.rebuild_flow_field(out_events);
    }

    fn rebuild_flow_field(&mut self, out_events: &mut Vec<Event>) {
        let root = self.player.cell;
        self.flow_field = FlowField::build(&self.maze, root);
        self.flow_field_rebuilds = self.flow_field_rebuilds.saturating_add(1);
        log::debug!("rebuilt flow field rooted at {root:?}");
        out_events.push(Event::FlowFieldRebuilt { root });
    }

    fn steer_pursuer(&mut self, pursuer: PursuerId, displacement: Vec2, out_events: &mut Vec<Event>) {
        let player_position = self.player.position;
        let player_radius = self.player.radius;
        let substep_length = self.substep_length;
        let maze = Arc::clone(&self.maze);
        let geometry = self.geometry;

        let Some(agent) = self.pursuer_mut(pursuer) else {
            return;
        };
        if agent.state != PursuerState::Pursuing {
            return;
        }

        let from = agent.position;
        let to = move_circle_substepped(
            &maze,
            &geometry,
            from,
            agent.radius,
            displacement,
            substep_length,
        );
        agent.position = to;
        out_events.push(Event::PursuerMoved { pursuer, from, to });

        if to.distance(player_position) <= player_radius + agent.radius {
            agent.state = PursuerState::Dormant;
            log::info!("pursuer {} reached the player", pursuer.get());
            out_events.push(Event::PursuerContact { pursuer });
        }
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
        }
        Command::MovePlayer { displacement } => {
            world.move_player(displacement, out_events);
        }
        Command::SpawnPursuer { cell } => {
            if world.maze.cell(cell).is_none() {
                log::warn!("ignoring pursuer spawn outside the maze at {cell:?}");
                return;
            }

            let pursuer = PursuerId::new(world.next_pursuer_id);
            world.next_pursuer_id = world.next_pursuer_id.saturating_add(1);
            world.pursuers.push(Pursuer {
                id: pursuer,
                position: world.geometry.cell_center(cell),
                radius: world.pursuer_template.radius,
                speed: world.pursuer_template.speed,
                state: PursuerState::Dormant,
            });
            out_events.push(Event::PursuerSpawned { pursuer, cell });
        }
        Command::WakePursuer { pursuer } => {
            if let Some(agent) = world.pursuer_mut(pursuer) {
                if agent.state == PursuerState::Dormant {
                    agent.state = PursuerState::Pursuing;
                    log::trace!("pursuer {} woke up", pursuer.get());
                    out_events.push(Event::PursuerAwoke { pursuer });
                }
            }
        }
        Command::SteerPursuer {
            pursuer,
            displacement,
        } => {
            world.steer_pursuer(pursuer, displacement, out_events);
        }
        Command::RelocatePursuer { pursuer, cell } => {
            if world.maze.cell(cell).is_none() {
                log::warn!("ignoring relocation of pursuer {} outside the maze", pursuer.get());
                return;
            }

            let center = world.geometry.cell_center(cell);
            if let Some(agent) = world.pursuer_mut(pursuer) {
                agent.position = center;
                agent.state = PursuerState::Dormant;
                log::info!("pursuer {} relocated to {cell:?}", pursuer.get());
                out_events.push(Event::PursuerRelocated { pursuer, cell });
            }
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use super::{FlowField, World};
    use maze_chase_core::{
        FlowFieldView, Maze, MazeGeometry, PlayerSnapshot, PursuerSnapshot, PursuerView,
    };

    /// Provides read-only access to the maze.
    #[must_use]
    pub fn maze(world: &World) -> &Maze {
        &world.maze
    }

    /// Hands out another reference to the shared maze.
    #[must_use]
    pub fn shared_maze(world: &World) -> Arc<Maze> {
        Arc::clone(&world.maze)
    }

    /// World-space embedding of the maze.
    #[must_use]
    pub fn geometry(world: &World) -> MazeGeometry {
        world.geometry
    }

    /// Captures the player's current state.
    #[must_use]
    pub fn player(world: &World) -> PlayerSnapshot {
        PlayerSnapshot {
            position: world.player.position,
            radius: world.player.radius,
            cell: world.player.cell,
        }
    }

    /// Captures a read-only view of the pursuers inhabiting the maze.
    #[must_use]
    pub fn pursuer_view(world: &World) -> PursuerView {
        PursuerView::from_snapshots(
            world
                .pursuers
                .iter()
                .map(|pursuer| PursuerSnapshot {
                    id: pursuer.id,
                    position: pursuer.position,
                    radius: pursuer.radius,
                    speed: pursuer.speed,
                    state: pursuer.state,
                })
                .collect(),
        )
    }

    /// Provides the current flow field.
    #[must_use]
    pub fn flow_field(world: &World) -> &FlowField {
        &world.flow_field
    }

    /// Borrowed view of the current flow field for systems.
    #[must_use]
    pub fn flow_field_view(world: &World) -> FlowFieldView<'_> {
        world.flow_field.view()
    }

    /// Number of times the flow field was rebuilt since the world was created.
    #[must_use]
    pub fn flow_field_rebuilds(world: &World) -> u64 {
        world.flow_field_rebuilds
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }
}

#[derive(Clone, Copy, Debug)]
struct Player {
    position: Vec2,
    radius: f32,
    cell: CellCoord,
}

#[derive(Clone, Copy, Debug)]
struct PursuerTemplate {
    radius: f32,
    speed: f32,
}

#[derive(Clone, Debug)]
struct Pursuer {
    id: PursuerId,
    position: Vec2,
    radius: f32,
    speed: f32,
    state: PursuerState,
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use maze_chase_core::{Direction, MazeBuilder};

    fn open_world(width: u32, height: u32) -> World {
        let mut builder = MazeBuilder::new(width, height);
        for row in 0..height {
            for column in 0..width {
                let cell = CellCoord::new(column, row);
                let _ = builder.carve(cell, Direction::East);
                let _ = builder.carve(cell, Direction::South);
            }
        }
        World::new(Arc::new(builder.finish()), &SessionConfig::default())
    }

    #[test]
    fn tick_advances_clock() {
        let mut world = open_world(2, 2);
        let mut events = Vec::new();
        let dt = Duration::from_millis(16);

        apply(&mut world, Command::Tick { dt }, &mut events);

        assert_eq!(events, vec![Event::TimeAdvanced { dt }]);
        assert_eq!(query::tick_index(&world), 1);
    }

    #[test]
    fn moving_within_a_cell_keeps_the_flow_field() {
        let mut world = open_world(3, 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                displacement: Vec2::new(20.0, 0.0),
            },
            &mut events,
        );

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::PlayerMoved { .. }));
        assert_eq!(query::flow_field_rebuilds(&world), 0);
    }

    #[test]
    fn crossing_into_a_new_cell_rebuilds_the_flow_field() {
        let mut world = open_world(3, 3);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                displacement: Vec2::new(200.0, 0.0),
            },
            &mut events,
        );

        let target = CellCoord::new(1, 0);
        assert!(events.contains(&Event::PlayerCellChanged {
            from: CellCoord::new(0, 0),
            to: target,
        }));
        assert!(events.contains(&Event::FlowFieldRebuilt { root: target }));
        assert_eq!(query::player(&world).cell, target);
        assert_eq!(query::flow_field(&world).root(), target);
        assert_eq!(query::flow_field_rebuilds(&world), 1);
    }

    #[test]
    fn spawn_outside_the_maze_is_ignored() {
        let mut world = open_world(2, 2);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::SpawnPursuer {
                cell: CellCoord::new(5, 5),
            },
            &mut events,
        );

        assert!(events.is_empty());
        assert!(query::pursuer_view(&world).is_empty());
    }

    #[test]
    fn dormant_pursuers_ignore_steering() {
        let mut world = open_world(3, 3);
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::SpawnPursuer {
                cell: CellCoord::new(2, 2),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut world,
            Command::SteerPursuer {
                pursuer: PursuerId::new(0),
                displacement: Vec2::new(-10.0, 0.0),
            },
            &mut events,
        );

        assert!(events.is_empty());
        let pursuer = query::pursuer_view(&world).into_vec()[0];
        assert_eq!(pursuer.position, Vec2::new(800.0, 800.0));
    }
}
