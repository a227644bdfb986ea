use std::time::Duration;

use driftlands_core::{Event, ImageHandle};
use driftlands_system_spawning::{Config, Spawning};
use driftlands_world::{
    query, Animation, AnimationState, Appearance, Hostile, MovementPattern, Position, SpawnShape,
    Spawner, SpriteFrame, World,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const ENEMY_IMAGE: ImageHandle = ImageHandle::new(7, 16, 16);

fn world_with_spawner(player_at: Vec2, spawner: Spawner) -> World {
    let mut world = World::new();
    let store = world.store_mut();
    let player = store.create();
    store.add(player, Position(player_at));
    let entity = store.create();
    store.add(entity, spawner);
    world.handles_mut().player = Some(player);
    world
}

fn line_spawner() -> Spawner {
    Spawner {
        shape: SpawnShape::HorizontalLine { spacing: 60.0 },
        center: Vec2::new(200.0, 200.0),
        interval: 8.0,
        min_batch: 3,
        max_batch: 4,
        activation_radius: 500.0,
        timer: 0.0,
    }
}

fn spawning() -> Spawning {
    Spawning::new(Config::new(Some(ENEMY_IMAGE), Vec2::splat(64.0)))
}

fn spawned(events: &[Event]) -> usize {
    events
        .iter()
        .filter(|event| matches!(event, Event::EnemySpawned { .. }))
        .count()
}

#[test]
fn burst_fires_once_the_interval_elapses() {
    let mut world = world_with_spawner(Vec2::new(100.0, 100.0), line_spawner());
    let mut rng = ChaCha8Rng::seed_from_u64(11);
    let mut events = Vec::new();
    let system = spawning();

    system.run(&mut world, Duration::from_secs(7), &mut rng, &mut events);
    assert!(events.is_empty(), "interval not yet elapsed");

    system.run(&mut world, Duration::from_secs(1), &mut rng, &mut events);
    let count = spawned(&events);
    assert!((3..=4).contains(&count), "burst of {count}");

    let (_, spawner) = world
        .store()
        .iter::<Spawner>()
        .next()
        .expect("spawner present");
    assert_eq!(spawner.timer, 0.0, "timer resets after a burst");

    for event in &events {
        let Event::EnemySpawned {
            enemy, position, ..
        } = event
        else {
            continue;
        };
        let store = world.store();
        assert_eq!(query::position(&world, *enemy), Some(*position));
        assert!(store.has::<Hostile>(*enemy));
        assert!(store.has::<MovementPattern>(*enemy));
        let appearance = store.get::<Appearance>(*enemy).expect("enemy is drawable");
        assert_eq!(appearance.image, Some(ENEMY_IMAGE));
        assert!(appearance.tint.red() >= 100);
        assert_eq!(position.y, 200.0);
    }
}

#[test]
fn distant_player_freezes_the_timer() {
    let mut world = world_with_spawner(Vec2::new(2000.0, 2000.0), line_spawner());
    let mut rng = ChaCha8Rng::seed_from_u64(12);
    let mut events = Vec::new();

    spawning().run(&mut world, Duration::from_secs(60), &mut rng, &mut events);

    assert!(events.is_empty());
    let (_, spawner) = world
        .store()
        .iter::<Spawner>()
        .next()
        .expect("spawner present");
    assert_eq!(spawner.timer, 0.0);
}

#[test]
fn zero_radius_spawners_are_always_active() {
    let spawner = Spawner {
        activation_radius: 0.0,
        min_batch: 2,
        max_batch: 2,
        ..line_spawner()
    };
    let mut world = world_with_spawner(Vec2::new(9000.0, 9000.0), spawner);
    let mut events = Vec::new();

    spawning().run(
        &mut world,
        Duration::from_secs(8),
        &mut ChaCha8Rng::seed_from_u64(13),
        &mut events,
    );

    assert_eq!(spawned(&events), 2);
    assert_eq!(query::entity_count(&world), 4);
}

#[test]
fn spawning_requires_a_positioned_player() {
    let mut world = World::new();
    let entity = world.store_mut().create();
    world.store_mut().add(entity, line_spawner());
    let mut events = Vec::new();

    spawning().run(
        &mut world,
        Duration::from_secs(30),
        &mut ChaCha8Rng::seed_from_u64(14),
        &mut events,
    );

    assert!(events.is_empty());
}

#[test]
fn tracking_enemies_chase_the_player() {
    let spawner = Spawner {
        min_batch: 30,
        max_batch: 30,
        ..line_spawner()
    };
    let mut world = world_with_spawner(Vec2::new(100.0, 100.0), spawner);
    let player = query::player(&world).expect("player recorded");
    let mut events = Vec::new();

    spawning().run(
        &mut world,
        Duration::from_secs(8),
        &mut ChaCha8Rng::seed_from_u64(15),
        &mut events,
    );

    let trackers: Vec<_> = world
        .store()
        .iter::<MovementPattern>()
        .filter_map(|(_, pattern)| match pattern {
            MovementPattern::Tracking { target, .. } => Some(*target),
            _ => None,
        })
        .collect();
    assert!(!trackers.is_empty(), "thirty draws include a tracker");
    assert!(trackers.iter().all(|target| *target == Some(player)));
}

#[test]
fn enemies_copy_the_player_animation() {
    let mut world = world_with_spawner(Vec2::new(100.0, 100.0), line_spawner());
    let player = query::player(&world).expect("player recorded");
    let animation = Animation::new(0.15).with_frames(
        AnimationState::Idle,
        vec![SpriteFrame {
            image: ENEMY_IMAGE,
            region: None,
        }],
    );
    world.store_mut().add(player, animation.clone());
    let mut events = Vec::new();

    spawning().run(
        &mut world,
        Duration::from_secs(8),
        &mut ChaCha8Rng::seed_from_u64(13),
        &mut events,
    );

    assert!(spawned(&events) >= 3);
    for enemy in world.store().entities_with::<Hostile>() {
        assert_eq!(world.store().get::<Animation>(enemy), Some(&animation));
    }
}
