use driftlands_core::{CellClass, GameConfig, ImageHandle, ImageKey, ImageSet};
use driftlands_system_autotile::Autotiler;
use driftlands_system_bootstrap::Bootstrap;
use driftlands_system_generation::ChunkGenerator;
use driftlands_world::{
    query, Animation, AnimationState, Appearance, Hostile, InputControlled, MovementPattern,
    Spawner, World,
};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const VIEWPORT: Vec2 = Vec2::new(960.0, 720.0);
const HAZARD: ImageHandle = ImageHandle::new(3, 16, 16);
const PLAYER: ImageHandle = ImageHandle::new(5, 16, 16);
const ACTORS: ImageHandle = ImageHandle::new(6, 64, 48);

fn build(config: &GameConfig, images: ImageSet) -> World {
    let generator = ChunkGenerator::new(config.grid.seed, config.generation);
    let mut events = Vec::new();
    Bootstrap::new(config, images).world(
        &generator,
        &Autotiler::default(),
        VIEWPORT,
        &mut ChaCha8Rng::seed_from_u64(1),
        &mut events,
    )
}

#[test]
fn setup_records_player_grid_and_camera() {
    let config = GameConfig::default();
    let world = build(&config, ImageSet::empty().with(ImageKey::Player, PLAYER));

    let player = query::player(&world).expect("player recorded");
    assert!(world.store().has::<InputControlled>(player));
    assert_eq!(query::player_position(&world), Some(Vec2::new(100.0, 100.0)));
    assert_eq!(query::player_health(&world), Some(100.0));
    assert_eq!(query::player_score(&world), Some(0));
    assert_eq!(
        world.store().get::<Appearance>(player).and_then(|look| look.image),
        Some(PLAYER)
    );

    let grid = query::grid(&world).expect("grid recorded");
    assert_eq!((grid.columns(), grid.rows()), (40, 40));
    assert_eq!(grid.cells().len(), 1600);

    let camera = query::camera(&world).expect("camera recorded");
    assert_eq!(camera.follow, Some(player));
    assert_eq!(camera.offset, VIEWPORT / 2.0);
    assert_eq!(camera.target, Vec2::new(100.0, 100.0));
}

#[test]
fn initial_grid_is_autotiled_with_special_images() {
    let config = GameConfig::default();
    let world = build(&config, ImageSet::empty().with(ImageKey::Hazard, HAZARD));

    let grid = query::grid(&world).expect("grid recorded");
    for cell in grid.cells() {
        match cell.class {
            CellClass::Hazard => assert_eq!(cell.special, Some(HAZARD)),
            _ => assert_ne!(cell.special, Some(HAZARD)),
        }
    }
}

#[test]
fn demo_enemies_and_spawners_are_placed() {
    let world = build(&GameConfig::default(), ImageSet::empty());
    let store = world.store();

    let hostiles = store.entities_with::<Hostile>();
    assert_eq!(hostiles.len(), 3);
    let patterns: Vec<_> = hostiles
        .iter()
        .filter_map(|enemy| store.get::<MovementPattern>(*enemy))
        .collect();
    assert!(matches!(patterns[0], MovementPattern::Tracking { .. }));
    assert!(matches!(patterns[1], MovementPattern::Circular { .. }));
    assert!(matches!(patterns[2], MovementPattern::Patrol { .. }));
    assert_eq!(
        query::position(&world, hostiles[1]),
        Some(Vec2::new(550.0, 300.0)),
        "circler starts on its circle"
    );

    let centres: Vec<_> = store.iter::<Spawner>().map(|(_, spawner)| spawner.center).collect();
    assert_eq!(
        centres,
        vec![
            Vec2::new(200.0, 200.0),
            Vec2::new(800.0, 400.0),
            Vec2::new(500.0, 700.0),
        ]
    );
}

#[test]
fn identical_configuration_builds_identical_terrain() {
    let config = GameConfig::default();
    let first = build(&config, ImageSet::empty());
    let second = build(&config, ImageSet::empty());

    assert_eq!(
        query::grid(&first).map(|grid| grid.cells().to_vec()),
        query::grid(&second).map(|grid| grid.cells().to_vec())
    );
}

#[test]
fn actor_sheet_animates_player_and_demo_enemies() {
    let world = build(
        &GameConfig::default(),
        ImageSet::empty().with(ImageKey::ActorSheet, ACTORS),
    );
    let store = world.store();

    let player = query::player(&world).expect("player recorded");
    let animation = store.get::<Animation>(player).expect("player animated");
    assert_eq!(animation.state(), AnimationState::Idle);
    assert_eq!(animation.frames(AnimationState::Idle).len(), 4);
    assert_eq!(animation.frames(AnimationState::WalkLeft).len(), 2);
    let right = animation.frames(AnimationState::WalkRight);
    assert_eq!(
        right
            .first()
            .and_then(|frame| frame.region)
            .map(|region| (region.origin.y(), region.width)),
        Some((32, 16))
    );

    for enemy in store.entities_with::<Hostile>() {
        assert_eq!(store.get::<Animation>(enemy), Some(animation));
    }
}

#[test]
fn actors_stay_static_without_a_sheet() {
    let world = build(&GameConfig::default(), ImageSet::empty());
    assert!(world.store().entities_with::<Animation>().is_empty());
}
