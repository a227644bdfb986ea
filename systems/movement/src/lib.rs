#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-frame motion: input steering, scripted movement patterns and
//! grid-constrained integration.
//!
//! The systems run in that order each frame. Steering and patterns only write
//! velocities (circular motion is the exception and places entities
//! directly); [`GridMovement`] then integrates velocities and rejects any
//! step that would land in a solid or out-of-bounds cell.

use std::time::Duration;

use driftlands_core::{Entity, HeldDirections};
use driftlands_world::{Grid, InputControlled, MovementPattern, Position, Velocity, World};
use glam::Vec2;

/// Converts held directional input into velocity for input-controlled entities.
#[derive(Clone, Copy, Debug)]
pub struct PlayerControl {
    speed: f32,
}

impl PlayerControl {
    /// Creates the steering system moving at `speed` world units per second.
    #[must_use]
    pub const fn new(speed: f32) -> Self {
        Self { speed }
    }

    /// Writes the velocity requested by `held` onto every input-controlled entity.
    ///
    /// Within each axis the second key of the pair wins when both are held:
    /// left over right, up over down.
    pub fn handle(&self, world: &mut World, held: HeldDirections) {
        let mut velocity = Vec2::ZERO;
        if held.right {
            velocity.x = self.speed;
        }
        if held.left {
            velocity.x = -self.speed;
        }
        if held.down {
            velocity.y = self.speed;
        }
        if held.up {
            velocity.y = -self.speed;
        }

        let store = world.store_mut();
        for entity in store.entities_with::<InputControlled>() {
            store.add(entity, Velocity(velocity));
        }
    }
}

/// Outcome of advancing a movement pattern by one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatternStep {
    /// Velocity the entity should carry into integration.
    pub velocity: Vec2,
    /// Position the entity is placed at directly, bypassing integration.
    pub placement: Option<Vec2>,
}

impl PatternStep {
    const HALT: Self = Self {
        velocity: Vec2::ZERO,
        placement: None,
    };

    const fn steer(velocity: Vec2) -> Self {
        Self {
            velocity,
            placement: None,
        }
    }
}

/// Advances a movement pattern by `dt` seconds.
///
/// `target` is the live position of the pattern's tracked or orbited entity,
/// or `None` when the pattern has no target or the target is gone.
pub fn advance_pattern(
    pattern: &mut MovementPattern,
    position: Vec2,
    velocity: Vec2,
    target: Option<Vec2>,
    dt: f32,
) -> PatternStep {
    match pattern {
        MovementPattern::None => PatternStep::steer(velocity),
        MovementPattern::Tracking {
            speed,
            pursuit_radius,
            smoothing,
            ..
        } => {
            let Some(target) = target else {
                return PatternStep::HALT;
            };
            let offset = target - position;
            let distance = offset.length();
            if distance > *pursuit_radius || distance <= f32::EPSILON {
                return PatternStep::HALT;
            }
            let desired = offset / distance * *speed;
            PatternStep::steer(velocity + (desired - velocity) * *smoothing)
        }
        MovementPattern::Circular {
            center,
            radius,
            angular_speed,
            angle,
            ..
        } => {
            *angle += *angular_speed * dt;
            let pivot = target.unwrap_or(*center);
            PatternStep {
                velocity: Vec2::ZERO,
                placement: Some(pivot + Vec2::new(angle.cos(), angle.sin()) * *radius),
            }
        }
        MovementPattern::Patrol {
            waypoints,
            current,
            looping,
            arrival_threshold,
            speed,
            finished,
        } => {
            if *finished {
                return PatternStep::HALT;
            }
            let Some(waypoint) = waypoints.get(*current).copied() else {
                return PatternStep::HALT;
            };
            let offset = waypoint - position;
            if offset.length() < *arrival_threshold {
                *current += 1;
                if *current >= waypoints.len() {
                    if *looping {
                        *current = 0;
                    } else {
                        *current = waypoints.len() - 1;
                        *finished = true;
                    }
                }
                return PatternStep::HALT;
            }
            PatternStep::steer(offset.normalize_or_zero() * *speed)
        }
    }
}

/// Drives every entity carrying a [`MovementPattern`].
#[derive(Clone, Copy, Debug, Default)]
pub struct PatternMotion;

impl PatternMotion {
    /// Advances all patterns by `dt`.
    pub fn run(&self, world: &mut World, dt: Duration) {
        let dt = dt.as_secs_f32();
        let store = world.store_mut();
        for entity in store.entities_with::<MovementPattern>() {
            let Some(position) = store.get::<Position>(entity).map(|position| position.0) else {
                tracing::debug!(entity = entity.get(), "patterned entity has no position");
                continue;
            };
            let target = match store.get::<MovementPattern>(entity) {
                Some(MovementPattern::Tracking { target, .. }) => *target,
                Some(MovementPattern::Circular { orbit, .. }) => *orbit,
                _ => None,
            };
            let target_position = target
                .and_then(|target: Entity| store.get::<Position>(target))
                .map(|position| position.0);
            let velocity = store
                .get::<Velocity>(entity)
                .map_or(Vec2::ZERO, |velocity| velocity.0);

            let Some(pattern) = store.get_mut::<MovementPattern>(entity) else {
                continue;
            };
            let step = advance_pattern(pattern, position, velocity, target_position, dt);

            store.add(entity, Velocity(step.velocity));
            if let Some(placement) = step.placement {
                store.add(entity, Position(placement));
            }
        }
    }
}

/// Integrates velocities against every grid in the world.
#[derive(Clone, Copy, Debug, Default)]
pub struct GridMovement;

impl GridMovement {
    /// Moves each entity with a position and velocity by `velocity * dt`.
    ///
    /// A step whose destination cell is outside a grid or solid in any grid is
    /// rejected: the entity stays put and its velocity is zeroed.
    pub fn run(&self, world: &mut World, dt: Duration) {
        let dt = dt.as_secs_f32();
        let store = world.store();
        let moves: Vec<(Entity, Option<Vec2>)> = store
            .iter::<Velocity>()
            .filter(|(_, velocity)| velocity.0 != Vec2::ZERO)
            .filter_map(|(entity, velocity)| {
                let position = store.get::<Position>(entity)?.0;
                let next = position + velocity.0 * dt;
                let blocked = store.iter::<Grid>().any(|(_, grid)| blocks(grid, next));
                Some((entity, (!blocked).then_some(next)))
            })
            .collect();

        let store = world.store_mut();
        for (entity, next) in moves {
            match next {
                Some(next) => store.add(entity, Position(next)),
                None => store.add(entity, Velocity(Vec2::ZERO)),
            }
        }
    }
}

/// Reports whether an entity placed at `position` would stand in a forbidden cell.
#[must_use]
pub fn blocks(grid: &Grid, position: Vec2) -> bool {
    grid.cell_under(position)
        .and_then(|cell| grid.class_at(cell))
        .map_or(true, |class| !class.is_walkable())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracking_halts_beyond_pursuit_radius() {
        let mut pattern = MovementPattern::Tracking {
            target: None,
            speed: 150.0,
            pursuit_radius: 400.0,
            smoothing: 0.05,
        };
        let step = advance_pattern(
            &mut pattern,
            Vec2::ZERO,
            Vec2::new(10.0, 0.0),
            Some(Vec2::new(500.0, 0.0)),
            0.016,
        );
        assert_eq!(step, PatternStep::HALT);

        let step = advance_pattern(&mut pattern, Vec2::ZERO, Vec2::new(10.0, 0.0), None, 0.016);
        assert_eq!(step, PatternStep::HALT, "missing target disengages");
    }

    #[test]
    fn tracking_smooths_toward_desired_velocity() {
        let mut pattern = MovementPattern::Tracking {
            target: None,
            speed: 100.0,
            pursuit_radius: 400.0,
            smoothing: 0.5,
        };
        let step = advance_pattern(
            &mut pattern,
            Vec2::ZERO,
            Vec2::ZERO,
            Some(Vec2::new(0.0, 50.0)),
            0.016,
        );
        assert_eq!(step.velocity, Vec2::new(0.0, 50.0));
        assert!(step.placement.is_none());
    }

    #[test]
    fn circle_follows_live_orbit_target() {
        let mut pattern = MovementPattern::Circular {
            center: Vec2::ZERO,
            radius: 10.0,
            angular_speed: 0.0,
            angle: 0.0,
            orbit: None,
        };
        let step = advance_pattern(
            &mut pattern,
            Vec2::ZERO,
            Vec2::ZERO,
            Some(Vec2::new(100.0, 100.0)),
            1.0,
        );
        assert_eq!(step.placement, Some(Vec2::new(110.0, 100.0)));
    }

    #[test]
    fn one_way_patrol_halts_at_the_end() {
        let mut pattern = MovementPattern::Patrol {
            waypoints: vec![Vec2::ZERO, Vec2::new(100.0, 0.0)],
            current: 1,
            looping: false,
            arrival_threshold: 5.0,
            speed: 120.0,
            finished: false,
        };
        let step = advance_pattern(&mut pattern, Vec2::new(98.0, 0.0), Vec2::ZERO, None, 0.016);
        assert_eq!(step, PatternStep::HALT);
        assert!(matches!(
            pattern,
            MovementPattern::Patrol {
                finished: true,
                current: 1,
                ..
            }
        ));

        let step = advance_pattern(&mut pattern, Vec2::new(0.0, 0.0), Vec2::ZERO, None, 0.016);
        assert_eq!(step, PatternStep::HALT, "finished patrols stay put");
    }
}
