#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session driver that wires the world and the pure systems into one tick loop.
//!
//! A [`Session`] owns the authoritative [`World`] together with the pursuit
//! and spawning systems. Each call to [`Session::tick`] advances the clock,
//! moves the player by the supplied intent, lets the pursuit system wake and
//! steer pursuers, and finally lets the spawning system relocate every
//! pursuer that reached the player during the tick.

use std::{sync::Arc, time::Duration};

use glam::Vec2;
use maze_chase_core::{Command, Maze};
use maze_chase_system_pursuit::{Pursuit, PursuitInputs};
use maze_chase_system_spawning::{SpawnRules, Spawning};
use maze_chase_world::{self as world, query, World};

pub use maze_chase_core::{
    CellCoord, ConfigError, Direction, Event, FlowFieldView, MazeGeometry, PlayerSnapshot,
    PursuerId, PursuerSnapshot, PursuerState, PursuerView, SessionConfig, UNREACHABLE,
};
pub use maze_chase_system_maze_generation::generate_from_seed as generate_maze;
pub use maze_chase_system_pursuit::next_cell_from_flow;
pub use maze_chase_system_spawning::{spawn_agents, PursuerSeed};
pub use maze_chase_world::collision::{move_circle as move_circle_with_collision, move_player};
pub use maze_chase_world::navigation::FlowField;

/// Mixed into the session seed so spawn placement draws from its own stream.
const SPAWN_STREAM: u64 = 0x9e37_79b9_7f4a_7c15;

/// Builds a breadth-first flow field rooted at `target`.
#[must_use]
pub fn build_flow_field(maze: &Maze, target: CellCoord) -> FlowField {
    FlowField::build(maze, target)
}

/// Maps a world-space point to the cell containing it.
#[must_use]
pub fn world_to_cell(geometry: &MazeGeometry, point: Vec2) -> Option<CellCoord> {
    geometry.world_to_cell(point)
}

/// Outcome of a single [`Session::tick`].
#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Index of the tick that produced this report, starting at one.
    pub tick: u64,
    /// Every event the world emitted during the tick, in emission order.
    pub events: Vec<Event>,
}

impl TickReport {
    /// Number of pursuers that reached the player during the tick.
    #[must_use]
    pub fn contacts(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::PursuerContact { .. }))
            .count()
    }

    /// Number of dormant pursuers that started chasing during the tick.
    #[must_use]
    pub fn awakened(&self) -> usize {
        self.events
            .iter()
            .filter(|event| matches!(event, Event::PursuerAwoke { .. }))
            .count()
    }

    /// Reports whether the player's move rebuilt the flow field.
    #[must_use]
    pub fn flow_field_rebuilt(&self) -> bool {
        self.events
            .iter()
            .any(|event| matches!(event, Event::FlowFieldRebuilt { .. }))
    }
}

/// A running chase: one maze, one player and a fixed population of pursuers.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    world: World,
    pursuit: Pursuit,
    spawning: Spawning,
    contacts: u64,
}

impl Session {
    /// Validates `config`, generates the maze and spawns the initial pursuers.
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let maze = Arc::new(generate_maze(
            config.maze_width,
            config.maze_height,
            config.seed,
        ));
        let mut world = World::new(maze, &config);
        let pursuit = Pursuit::new(maze_chase_system_pursuit::Config::new(config.aggro_radius));
        let mut spawning = Spawning::new(maze_chase_system_spawning::Config::new(
            SpawnRules::from_config(&config),
            config.seed ^ SPAWN_STREAM,
        ));

        let mut commands = Vec::new();
        spawning.spawn_batch(
            query::maze(&world),
            &query::player(&world),
            config.pursuer_count,
            &mut commands,
        );
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut world, command, &mut events);
        }

        log::info!(
            "session started on a {}x{} maze with {} pursuers",
            config.maze_width,
            config.maze_height,
            query::pursuer_view(&world).len()
        );

        Ok(Self {
            config,
            world,
            pursuit,
            spawning,
            contacts: 0,
        })
    }

    /// Advances the session by `dt`, moving the player by `intent` world units.
    pub fn tick(&mut self, dt: Duration, intent: Vec2) -> TickReport {
        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        world::apply(
            &mut self.world,
            Command::MovePlayer {
                displacement: intent,
            },
            &mut events,
        );

        let mut commands = Vec::new();
        {
            let player = query::player(&self.world);
            let pursuers = query::pursuer_view(&self.world);
            let geometry = query::geometry(&self.world);
            let flow_field = query::flow_field_view(&self.world);
            self.pursuit.handle(
                &events,
                PursuitInputs {
                    maze: query::maze(&self.world),
                    geometry: &geometry,
                    player: &player,
                    pursuers: &pursuers,
                    flow_field: &flow_field,
                },
                &mut commands,
            );
        }

        let mut pursuit_events = Vec::new();
        for command in commands.drain(..) {
            world::apply(&mut self.world, command, &mut pursuit_events);
        }

        self.spawning.handle(
            &pursuit_events,
            query::maze(&self.world),
            &query::player(&self.world),
            &mut commands,
        );
        events.append(&mut pursuit_events);
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        let report = TickReport {
            tick: query::tick_index(&self.world),
            events,
        };
        self.contacts = self.contacts.saturating_add(report.contacts() as u64);
        report
    }

    /// Configuration the session was created with.
    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Maze the chase takes place in.
    #[must_use]
    pub fn maze(&self) -> &Maze {
        query::maze(&self.world)
    }

    /// Shared handle to the maze for consumers outliving a borrow of the session.
    #[must_use]
    pub fn shared_maze(&self) -> Arc<Maze> {
        query::shared_maze(&self.world)
    }

    /// World-space embedding of the maze.
    #[must_use]
    pub fn geometry(&self) -> MazeGeometry {
        query::geometry(&self.world)
    }

    /// Current player state.
    #[must_use]
    pub fn player(&self) -> PlayerSnapshot {
        query::player(&self.world)
    }

    /// Current pursuer states ordered by identifier.
    #[must_use]
    pub fn pursuers(&self) -> PursuerView {
        query::pursuer_view(&self.world)
    }

    /// Flow field rooted at the player's current cell.
    #[must_use]
    pub fn flow_field(&self) -> &FlowField {
        query::flow_field(&self.world)
    }

    /// Number of flow field rebuilds since the session started.
    #[must_use]
    pub fn flow_field_rebuilds(&self) -> u64 {
        query::flow_field_rebuilds(&self.world)
    }

    /// Number of ticks processed so far.
    #[must_use]
    pub fn tick_index(&self) -> u64 {
        query::tick_index(&self.world)
    }

    /// Total contacts between pursuers and the player.
    #[must_use]
    pub const fn contacts(&self) -> u64 {
        self.contacts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_is_rejected() {
        let config = SessionConfig {
            maze_width: 0,
            ..SessionConfig::default()
        };

        assert_eq!(
            Session::new(config).err(),
            Some(ConfigError::EmptyMaze {
                width: 0,
                height: 30
            })
        );
    }

    #[test]
    fn report_counts_events_by_kind() {
        let pursuer = PursuerId::new(3);
        let report = TickReport {
            tick: 1,
            events: vec![
                Event::PursuerAwoke { pursuer },
                Event::PursuerContact { pursuer },
                Event::FlowFieldRebuilt {
                    root: CellCoord::new(1, 0),
                },
            ],
        };

        assert_eq!(report.awakened(), 1);
        assert_eq!(report.contacts(), 1);
        assert!(report.flow_field_rebuilt());
    }
}
