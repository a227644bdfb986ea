use std::time::Duration;

use driftlands_core::{Entity, ImageHandle};
use driftlands_system_animation::AnimationUpdate;
use driftlands_world::{
    Animation, AnimationState, InputControlled, MovementPattern, Velocity, World,
};
use glam::Vec2;

const SHEET: ImageHandle = ImageHandle::new(1, 64, 48);
const FRAME: Duration = Duration::from_millis(100);

fn animation() -> Animation {
    Animation::new(0.15)
        .with_frames(AnimationState::Idle, Animation::sheet_row(SHEET, 0, 16, 4))
        .with_frames(AnimationState::WalkLeft, Animation::sheet_row(SHEET, 1, 16, 2))
        .with_frames(AnimationState::WalkRight, Animation::sheet_row(SHEET, 2, 16, 2))
}

fn animated(world: &mut World, velocity: Vec2) -> Entity {
    let store = world.store_mut();
    let entity = store.create();
    store.add(entity, Velocity(velocity));
    store.add(entity, animation());
    entity
}

fn animation_of(world: &World, entity: Entity) -> &Animation {
    world
        .store()
        .get::<Animation>(entity)
        .expect("entity is animated")
}

fn set_velocity(world: &mut World, entity: Entity, velocity: Vec2) {
    world.store_mut().add(entity, Velocity(velocity));
}

#[test]
fn player_switches_between_idle_and_walking() {
    let mut world = World::new();
    let player = animated(&mut world, Vec2::ZERO);
    world.store_mut().add(player, InputControlled);

    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, player).state(), AnimationState::Idle);

    set_velocity(&mut world, player, Vec2::new(200.0, 200.0));
    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, player).state(), AnimationState::WalkRight);

    set_velocity(&mut world, player, Vec2::new(-200.0, 0.0));
    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, player).state(), AnimationState::WalkLeft);

    set_velocity(&mut world, player, Vec2::new(0.0, -200.0));
    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, player).state(), AnimationState::Idle);
}

#[test]
fn walking_frames_cycle_and_wrap() {
    let mut world = World::new();
    let walker = animated(&mut world, Vec2::new(120.0, 0.0));

    let mut seen = Vec::new();
    for _ in 0..8 {
        AnimationUpdate.run(&mut world, FRAME);
        seen.push(animation_of(&world, walker).frame_index());
    }

    // 0.15 s per frame at 0.1 s steps: the timer trips every second update.
    assert_eq!(seen, vec![0, 1, 1, 0, 0, 1, 1, 0]);
    let region = animation_of(&world, walker)
        .current()
        .and_then(|frame| frame.region)
        .expect("walking frame present");
    assert_eq!(region.origin.y(), 32);
}

#[test]
fn tracking_enemy_idles_when_moving_mostly_vertically() {
    let mut world = World::new();
    let chaser = animated(&mut world, Vec2::new(20.0, 140.0));
    world.store_mut().add(
        chaser,
        MovementPattern::Tracking {
            target: None,
            speed: 150.0,
            pursuit_radius: 400.0,
            smoothing: 0.05,
        },
    );

    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, chaser).state(), AnimationState::Idle);

    set_velocity(&mut world, chaser, Vec2::new(-140.0, 20.0));
    AnimationUpdate.run(&mut world, FRAME);
    assert_eq!(animation_of(&world, chaser).state(), AnimationState::WalkLeft);
}

#[test]
fn animations_without_velocity_stay_idle() {
    let mut world = World::new();
    let statue = world.store_mut().create();
    world.store_mut().add(statue, animation());

    for _ in 0..3 {
        AnimationUpdate.run(&mut world, FRAME);
    }

    let playback = animation_of(&world, statue);
    assert_eq!(playback.state(), AnimationState::Idle);
    assert_eq!(playback.frame_index(), 1);
}
