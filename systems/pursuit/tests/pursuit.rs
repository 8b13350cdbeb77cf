use std::{sync::Arc, time::Duration};

use glam::Vec2;
use maze_chase_core::{
    CellCoord, Command, Direction, Event, MazeBuilder, PursuerId, PursuerState, SessionConfig,
};
use maze_chase_system_maze_generation::generate_from_seed;
use maze_chase_system_pursuit::{Config, Pursuit, PursuitInputs};
use maze_chase_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(16);

#[test]
fn dormant_pursuer_waits_until_player_enters_aggro_radius() {
    let config = SessionConfig::default();
    let mut world = corridor_world(8, &config);
    let mut pursuit = Pursuit::new(Config::new(config.aggro_radius));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPursuer {
            cell: CellCoord::new(5, 0),
        },
        &mut events,
    );
    let spawn_position = pursuer(&world).position;

    for _ in 0..30 {
        tick(&mut world, &mut pursuit, Vec2::ZERO);
        let snapshot = pursuer(&world);
        assert_eq!(snapshot.state, PursuerState::Dormant);
        assert_eq!(snapshot.position, spawn_position);
    }

    let player = query::player(&world).position;
    assert!(player.distance(spawn_position) > config.aggro_radius);

    let approach = spawn_position.x - player.x - config.aggro_radius + 10.0;
    let events = tick(&mut world, &mut pursuit, Vec2::new(approach, 0.0));
    assert!(query::player(&world).position.distance(spawn_position) <= config.aggro_radius);
    assert!(events.contains(&Event::PursuerAwoke {
        pursuer: PursuerId::new(0)
    }));
    assert_eq!(pursuer(&world).state, PursuerState::Pursuing);
    assert_eq!(pursuer(&world).position, spawn_position);
}

#[test]
fn pursuing_agent_follows_the_maze_to_the_player() {
    let config = SessionConfig {
        maze_width: 6,
        maze_height: 6,
        ..SessionConfig::default()
    };
    let maze = Arc::new(generate_from_seed(6, 6, 77));
    let mut world = World::new(maze, &config);
    let mut pursuit = Pursuit::new(Config::new(config.aggro_radius));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPursuer {
            cell: CellCoord::new(5, 5),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::WakePursuer {
            pursuer: PursuerId::new(0),
        },
        &mut events,
    );

    let mut contact = false;
    for _ in 0..20_000 {
        let events = tick(&mut world, &mut pursuit, Vec2::ZERO);
        if events.contains(&Event::PursuerContact {
            pursuer: PursuerId::new(0),
        }) {
            contact = true;
            break;
        }
    }

    assert!(contact, "pursuer never reached the player");
    assert_eq!(pursuer(&world).state, PursuerState::Dormant);
    let player = query::player(&world);
    assert!(
        pursuer(&world).position.distance(player.position)
            <= player.radius + config.pursuer_radius
    );
}

#[test]
fn shared_cell_targets_the_player_directly() {
    let config = SessionConfig::default();
    let mut world = corridor_world(3, &config);
    let mut pursuit = Pursuit::new(Config::new(config.aggro_radius));
    let mut events = Vec::new();
    world::apply(
        &mut world,
        Command::SpawnPursuer {
            cell: CellCoord::new(0, 0),
        },
        &mut events,
    );
    world::apply(
        &mut world,
        Command::WakePursuer {
            pursuer: PursuerId::new(0),
        },
        &mut events,
    );
    let _ = tick(&mut world, &mut pursuit, Vec2::new(60.0, 40.0));

    let player = query::player(&world);
    let view = query::pursuer_view(&world);
    let field = query::flow_field_view(&world);
    let mut commands = Vec::new();
    pursuit.handle(
        &[Event::TimeAdvanced { dt: FRAME }],
        PursuitInputs {
            maze: query::maze(&world),
            geometry: &query::geometry(&world),
            player: &player,
            pursuers: &view,
            flow_field: &field,
        },
        &mut commands,
    );

    let [Command::SteerPursuer { displacement, .. }] = commands.as_slice() else {
        panic!("expected a single steer command, got {commands:?}");
    };
    let toward_player = (player.position - pursuer(&world).position).normalize();
    assert!(displacement.normalize().dot(toward_player) > 0.999);
}

fn corridor_world(length: u32, config: &SessionConfig) -> World {
    let mut builder = MazeBuilder::new(length, 1);
    for column in 0..length - 1 {
        assert!(builder.carve(CellCoord::new(column, 0), Direction::East));
    }
    World::new(Arc::new(builder.finish()), config)
}

fn pursuer(world: &World) -> maze_chase_core::PursuerSnapshot {
    query::pursuer_view(world).into_vec()[0]
}

fn tick(world: &mut World, pursuit: &mut Pursuit, intent: Vec2) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, Command::Tick { dt: FRAME }, &mut events);
    world::apply(
        world,
        Command::MovePlayer {
            displacement: intent,
        },
        &mut events,
    );

    let player = query::player(world);
    let view = query::pursuer_view(world);
    let mut commands = Vec::new();
    {
        let field = query::flow_field_view(world);
        pursuit.handle(
            &events,
            PursuitInputs {
                maze: query::maze(world),
                geometry: &query::geometry(world),
                player: &player,
                pursuers: &view,
                flow_field: &field,
            },
            &mut commands,
        );
    }

    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}
