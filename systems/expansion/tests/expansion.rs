use std::time::Duration;

use driftlands_core::{
    CellClass, CellCoord, CellRect, CellRectSize, Event, GenerationParams, GridConfig, GrowthEdge,
};
use driftlands_system_autotile::Autotiler;
use driftlands_system_expansion::{Config, Expansion};
use driftlands_system_generation::ChunkGenerator;
use driftlands_world::{
    query, CameraRig, Grid, MovementPattern, Position, SpawnShape, Spawner, World,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const INTERVAL: Duration = Duration::from_millis(200);

fn world_with(config: &GridConfig, player_at: Vec2) -> World {
    let mut world = World::new();
    let generator = ChunkGenerator::new(config.seed, GenerationParams::default());
    let mut grid = Grid::new(config);
    let bounds = grid.bounds();
    let _ = generator.generate_region(&mut grid, bounds);

    let store = world.store_mut();
    let grid_entity = store.create();
    store.add(grid_entity, grid);
    let player = store.create();
    store.add(player, Position(player_at));
    world.handles_mut().grid = Some(grid_entity);
    world.handles_mut().player = Some(player);
    world
}

fn expansion(config: &GridConfig) -> Expansion {
    Expansion::new(
        Config::new(INTERVAL),
        ChunkGenerator::new(config.seed, GenerationParams::default()),
        Autotiler::default(),
    )
}

fn grid_config(max_columns: u32, max_rows: u32) -> GridConfig {
    GridConfig {
        columns: 40,
        rows: 40,
        max_columns,
        max_rows,
        ..GridConfig::default()
    }
}

fn set_player(world: &mut World, position: Vec2) {
    let player = query::player(world).expect("player recorded");
    world
        .store_mut()
        .get_mut::<Position>(player)
        .expect("player has a position")
        .0 = position;
}

fn expansions(events: &[Event]) -> Vec<GrowthEdge> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::GridExpanded { edge, .. } => Some(*edge),
            _ => None,
        })
        .collect()
}

#[test]
fn right_edge_grows_once_and_retiles_the_seam() {
    let config = grid_config(60, 40);
    let mut world = world_with(&config, Vec2::new(1930.0, 1000.0));
    let mut expansion = expansion(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(1);
    let mut events = Vec::new();

    expansion.run(&mut world, Duration::from_millis(16), &mut rng, &mut events);

    let grid = query::grid(&world).expect("grid present");
    assert_eq!(grid.columns(), 60);
    assert_eq!(grid.cells().len(), 60 * 40);
    let expanded: Vec<_> = events
        .iter()
        .filter(|event| matches!(event, Event::GridExpanded { .. }))
        .collect();
    assert_eq!(
        expanded,
        vec![&Event::GridExpanded {
            edge: GrowthEdge::Right,
            columns: 60,
            rows: 40,
            generated: CellRect::from_origin_and_size(
                CellCoord::new(40, 0),
                CellRectSize::new(20, 40),
            ),
            retiled: CellRect::from_origin_and_size(
                CellCoord::new(39, 0),
                CellRectSize::new(21, 40),
            ),
        }]
    );
    assert_eq!(
        query::player_position(&world),
        Some(Vec2::new(1930.0, 1000.0)),
        "right growth never rebases"
    );

    events.clear();
    set_player(&mut world, Vec2::new(3500.0, 1000.0));
    expansion.run(&mut world, INTERVAL, &mut rng, &mut events);
    assert!(expansions(&events).is_empty(), "maximum width reached");
}

#[test]
fn checks_are_throttled() {
    let config = grid_config(200, 40);
    let mut world = world_with(&config, Vec2::new(1930.0, 1000.0));
    let mut expansion = expansion(&config);
    let mut rng = ChaCha8Rng::seed_from_u64(2);
    let mut events = Vec::new();

    expansion.run(&mut world, Duration::from_millis(16), &mut rng, &mut events);
    assert_eq!(expansions(&events), vec![GrowthEdge::Right]);

    events.clear();
    set_player(&mut world, Vec2::new(3300.0, 1000.0));
    expansion.run(&mut world, Duration::from_millis(100), &mut rng, &mut events);
    assert!(events.is_empty(), "cooldown still running");

    expansion.run(&mut world, Duration::from_millis(100), &mut rng, &mut events);
    assert_eq!(expansions(&events), vec![GrowthEdge::Right]);
    assert_eq!(query::grid(&world).map(Grid::columns), Some(80));
}

#[test]
fn left_growth_rebases_world_anchored_state() {
    let config = grid_config(60, 40);
    let mut world = world_with(&config, Vec2::new(100.0, 1000.0));
    let store = world.store_mut();
    let orbiter = store.create();
    store.add(
        orbiter,
        MovementPattern::Circular {
            center: Vec2::new(5.0, 5.0),
            radius: 10.0,
            angular_speed: 1.0,
            angle: 0.0,
            orbit: Some(orbiter),
        },
    );
    let circler = store.create();
    store.add(
        circler,
        MovementPattern::Circular {
            center: Vec2::new(400.0, 300.0),
            radius: 150.0,
            angular_speed: 1.5,
            angle: 0.0,
            orbit: None,
        },
    );
    let patroller = store.create();
    store.add(
        patroller,
        MovementPattern::Patrol {
            waypoints: vec![Vec2::new(100.0, 500.0), Vec2::new(300.0, 600.0)],
            current: 0,
            looping: true,
            arrival_threshold: 10.0,
            speed: 120.0,
            finished: false,
        },
    );
    let spawner = store.create();
    store.add(
        spawner,
        Spawner {
            shape: SpawnShape::Ring { radius: 120.0 },
            center: Vec2::new(800.0, 400.0),
            interval: 12.0,
            min_batch: 4,
            max_batch: 6,
            activation_radius: 600.0,
            timer: 0.0,
        },
    );
    let camera = store.create();
    store.add(
        camera,
        CameraRig {
            offset: Vec2::new(480.0, 480.0),
            target: Vec2::new(100.0, 1000.0),
            zoom: 1.0,
            follow: None,
            smoothing: 0.1,
        },
    );

    let mut events = Vec::new();
    expansion(&config).run(
        &mut world,
        Duration::from_millis(16),
        &mut ChaCha8Rng::seed_from_u64(3),
        &mut events,
    );

    let shift = Vec2::new(20.0 * 64.0, 0.0);
    assert_eq!(expansions(&events), vec![GrowthEdge::Left]);
    assert!(events.contains(&Event::WorldRebased { offset: shift }));

    let store = world.store();
    assert_eq!(
        query::player_position(&world),
        Some(Vec2::new(100.0, 1000.0) + shift)
    );
    match store.get::<MovementPattern>(circler) {
        Some(MovementPattern::Circular { center, .. }) => {
            assert_eq!(*center, Vec2::new(400.0, 300.0) + shift)
        }
        other => panic!("unexpected pattern {other:?}"),
    }
    match store.get::<MovementPattern>(orbiter) {
        Some(MovementPattern::Circular { center, .. }) => {
            assert_eq!(*center, Vec2::new(5.0, 5.0), "orbit centres follow their target")
        }
        other => panic!("unexpected pattern {other:?}"),
    }
    match store.get::<MovementPattern>(patroller) {
        Some(MovementPattern::Patrol { waypoints, .. }) => assert_eq!(
            waypoints,
            &vec![Vec2::new(100.0, 500.0) + shift, Vec2::new(300.0, 600.0) + shift]
        ),
        other => panic!("unexpected pattern {other:?}"),
    }
    assert_eq!(
        store.get::<Spawner>(spawner).map(|spawner| spawner.center),
        Some(Vec2::new(800.0, 400.0) + shift)
    );
    assert_eq!(
        store.get::<CameraRig>(camera).map(|camera| camera.target),
        Some(Vec2::new(100.0, 1000.0) + shift)
    );
}

#[test]
fn negative_edge_growth_preserves_visible_content() {
    let config = grid_config(60, 60);
    let mut world = world_with(&config, Vec2::new(100.0, 100.0));
    let samples: Vec<Vec2> = (0..40)
        .map(|step| Vec2::new(step as f32 * 61.0 + 3.0, step as f32 * 47.0 + 5.0))
        .collect();
    let before: Vec<_> = {
        let grid = query::grid(&world).expect("grid present");
        samples
            .iter()
            .map(|sample| grid.cell_at(*sample).and_then(|cell| grid.class_at(cell)))
            .collect()
    };

    let mut events = Vec::new();
    expansion(&config).run(
        &mut world,
        Duration::from_millis(16),
        &mut ChaCha8Rng::seed_from_u64(4),
        &mut events,
    );
    assert_eq!(expansions(&events), vec![GrowthEdge::Left, GrowthEdge::Top]);

    let offset: Vec2 = events
        .iter()
        .filter_map(|event| match event {
            Event::WorldRebased { offset } => Some(*offset),
            _ => None,
        })
        .sum();
    assert_eq!(offset, Vec2::new(1280.0, 1280.0));

    let grid = query::grid(&world).expect("grid present");
    assert_eq!(grid.cells().len(), 60 * 60);
    for (sample, class) in samples.iter().zip(before) {
        let moved = grid
            .cell_at(*sample + offset)
            .and_then(|cell| grid.class_at(cell));
        assert_eq!(moved, class, "content under {sample:?} changed");
    }
}

#[test]
fn regenerated_front_follows_global_noise() {
    let config = grid_config(80, 40);
    let mut world = world_with(&config, Vec2::new(100.0, 1000.0));
    let mut events = Vec::new();
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let expansion = expansion(&config);
    assert!(expansion.expand(&mut world, GrowthEdge::Left, &mut rng, &mut events));
    assert!(expansion.expand(&mut world, GrowthEdge::Left, &mut rng, &mut events));

    let grid = query::grid(&world).expect("grid present");
    assert_eq!(grid.origin().x, -40);
    let generator = ChunkGenerator::new(config.seed, GenerationParams::default());
    let front = CellRect::from_origin_and_size(CellCoord::new(0, 0), CellRectSize::new(40, 40));
    for cell in front.cells() {
        let expected = generator.classify(grid.global(cell));
        let actual = match grid.class_at(cell) {
            Some(CellClass::Pickup) => CellClass::Walkable,
            Some(class) => class,
            None => panic!("cell {cell:?} outside grid"),
        };
        assert_eq!(actual, expected, "cell {cell:?} ignores its global coordinate");
    }
}

#[test]
fn missing_player_position_or_grid_skips_the_tick() {
    let config = grid_config(60, 60);
    let mut world = world_with(&config, Vec2::new(100.0, 100.0));
    let player = query::player(&world).expect("player recorded");
    let _ = world.store_mut().remove::<Position>(player);

    let mut events = Vec::new();
    let mut expansion = expansion(&config);
    expansion.run(
        &mut world,
        Duration::from_millis(16),
        &mut ChaCha8Rng::seed_from_u64(6),
        &mut events,
    );
    assert!(events.is_empty());

    let mut world = World::new();
    let store = world.store_mut();
    let player = store.create();
    store.add(player, Position(Vec2::ZERO));
    world.handles_mut().player = Some(player);
    expansion.check(&mut world, &mut ChaCha8Rng::seed_from_u64(6), &mut events);
    assert!(events.is_empty());
}
