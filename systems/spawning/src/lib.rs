#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawning system responsible for periodic enemy bursts.
//!
//! Each [`Spawner`] accumulates time only while the player is within its
//! activation radius. Once its interval elapses it emits a burst of randomly
//! sized and randomly patterned hostile entities arranged by its shape.
//! Spawned enemies copy the player's animation, when it has one.

use std::{f32::consts::TAU, time::Duration};

use driftlands_core::{Entity, Event, ImageHandle, Tint};
use driftlands_world::{
    query, Animation, Appearance, Hostile, MovementPattern, Position, SpawnShape, Spawner, Store,
    Velocity, World,
};
use glam::Vec2;
use rand::Rng;

const TRACKING_SPEED: f32 = 150.0;
const TRACKING_PURSUIT_RADIUS: f32 = 400.0;
const TRACKING_SMOOTHING: f32 = 0.05;
const CIRCLE_JITTER: f32 = 100.0;
const CIRCLE_RADIUS: f32 = 150.0;
const CIRCLE_ANGULAR_SPEED: f32 = 1.5;
const PATROL_SPEED: f32 = 120.0;
const PATROL_ARRIVAL_THRESHOLD: f32 = 10.0;
const PATROL_NEAR: f32 = 50.0;
const PATROL_FAR: f32 = 200.0;
const TINT_FLOOR: u8 = 100;

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    enemy_image: Option<ImageHandle>,
    enemy_size: Vec2,
}

impl Config {
    /// Creates a configuration drawing enemies with `enemy_image` at `enemy_size`.
    #[must_use]
    pub const fn new(enemy_image: Option<ImageHandle>, enemy_size: Vec2) -> Self {
        Self {
            enemy_image,
            enemy_size,
        }
    }
}

/// System that advances spawner timers and creates enemy bursts.
#[derive(Debug)]
pub struct Spawning {
    enemy_image: Option<ImageHandle>,
    enemy_size: Vec2,
}

impl Spawning {
    /// Creates a new spawning system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            enemy_image: config.enemy_image,
            enemy_size: config.enemy_size,
        }
    }

    /// Advances every spawner by `dt` and spawns the bursts that came due.
    pub fn run<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        dt: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        let (Some(player), Some(player_position)) =
            (query::player(world), query::player_position(world))
        else {
            tracing::debug!("spawning skipped: player has no position");
            return;
        };
        let dt = dt.as_secs_f32();
        let store = world.store_mut();

        for spawner_entity in store.entities_with::<Spawner>() {
            let Some(spawner) = store.get_mut::<Spawner>(spawner_entity) else {
                continue;
            };
            if spawner.activation_radius > 0.0
                && spawner.center.distance(player_position) > spawner.activation_radius
            {
                continue;
            }
            spawner.timer += dt;
            if spawner.timer < spawner.interval {
                continue;
            }
            spawner.timer = 0.0;
            let spawner = *spawner;

            let count = rng.gen_range(spawner.min_batch.min(spawner.max_batch)..=spawner.max_batch);
            let positions = burst_positions(spawner.shape, spawner.center, count, rng);
            tracing::debug!(
                spawner = spawner_entity.get(),
                count,
                x = spawner.center.x,
                y = spawner.center.y,
                "spawn burst"
            );
            for position in positions {
                let enemy = self.spawn_enemy(store, position, player, rng);
                out.push(Event::EnemySpawned {
                    spawner: spawner_entity,
                    enemy,
                    position,
                });
            }
        }
    }

    fn spawn_enemy<R: Rng + ?Sized>(
        &self,
        store: &mut Store,
        position: Vec2,
        player: Entity,
        rng: &mut R,
    ) -> Entity {
        let tint = Tint::from_rgb(
            rng.gen_range(TINT_FLOOR..=u8::MAX),
            rng.gen_range(TINT_FLOOR..=u8::MAX),
            rng.gen_range(TINT_FLOOR..=u8::MAX),
        );
        let pattern = enemy_pattern(position, player, rng);
        let animation = store.get::<Animation>(player).cloned();

        let enemy = store.create();
        store.add(enemy, Position(position));
        store.add(enemy, Velocity(Vec2::ZERO));
        store.add(enemy, Hostile);
        store.add(
            enemy,
            Appearance {
                image: self.enemy_image,
                size: self.enemy_size,
                tint,
            },
        );
        store.add(enemy, pattern);
        if let Some(animation) = animation {
            store.add(enemy, animation);
        }
        enemy
    }
}

/// Positions of a burst of `count` enemies arranged by `shape` around `center`.
///
/// Lines are centred on the spawner, rings are evenly spaced by angle and
/// areas are sampled uniformly.
pub fn burst_positions<R: Rng + ?Sized>(
    shape: SpawnShape,
    center: Vec2,
    count: u32,
    rng: &mut R,
) -> Vec<Vec2> {
    let span = count.saturating_sub(1) as f32;
    (0..count)
        .map(|index| {
            let index = index as f32;
            match shape {
                SpawnShape::HorizontalLine { spacing } => {
                    center + Vec2::new(-span * spacing / 2.0 + index * spacing, 0.0)
                }
                SpawnShape::VerticalLine { spacing } => {
                    center + Vec2::new(0.0, -span * spacing / 2.0 + index * spacing)
                }
                SpawnShape::Ring { radius } => {
                    let angle = index * TAU / count as f32;
                    center + Vec2::new(angle.cos(), angle.sin()) * radius
                }
                SpawnShape::Area { size } => {
                    let half = size.abs() / 2.0;
                    center
                        + Vec2::new(
                            rng.gen_range(-half.x..=half.x),
                            rng.gen_range(-half.y..=half.y),
                        )
                }
            }
        })
        .collect()
}

/// Picks one of the three enemy movement templates uniformly.
pub fn enemy_pattern<R: Rng + ?Sized>(
    position: Vec2,
    player: Entity,
    rng: &mut R,
) -> MovementPattern {
    match rng.gen_range(0..3) {
        0 => MovementPattern::Tracking {
            target: Some(player),
            speed: TRACKING_SPEED,
            pursuit_radius: TRACKING_PURSUIT_RADIUS,
            smoothing: TRACKING_SMOOTHING,
        },
        1 => MovementPattern::Circular {
            center: position
                + Vec2::new(
                    rng.gen_range(-CIRCLE_JITTER..=CIRCLE_JITTER),
                    rng.gen_range(-CIRCLE_JITTER..=CIRCLE_JITTER),
                ),
            radius: CIRCLE_RADIUS,
            angular_speed: CIRCLE_ANGULAR_SPEED,
            angle: 0.0,
            orbit: None,
        },
        _ => {
            let ahead = Vec2::new(
                rng.gen_range(PATROL_NEAR..=PATROL_FAR),
                rng.gen_range(PATROL_NEAR..=PATROL_FAR),
            );
            let behind = Vec2::new(
                rng.gen_range(-PATROL_FAR..=-PATROL_NEAR),
                rng.gen_range(-PATROL_FAR..=-PATROL_NEAR),
            );
            MovementPattern::Patrol {
                waypoints: vec![position, position + ahead, position + behind],
                current: 0,
                looping: true,
                arrival_threshold: PATROL_ARRIVAL_THRESHOLD,
                speed: PATROL_SPEED,
                finished: false,
            }
        }
    }
}
