#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Animation system that keeps sprite frames in step with movement.
//!
//! It runs after grid movement, so a step the grid rejected (velocity zeroed)
//! already reads as idle. Each animated entity picks its state from its
//! velocity, then advances its frame timer.

use std::time::Duration;

use driftlands_core::Entity;
use driftlands_world::{
    Animation, AnimationState, InputControlled, MovementPattern, Store, Velocity, World,
};
use glam::Vec2;

/// How an entity's velocity maps onto an animation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facing {
    /// Any horizontal motion walks; purely vertical motion idles.
    Horizontal,
    /// Walks only while horizontal speed exceeds vertical speed.
    Dominant,
    /// Always idle, whatever the velocity.
    Still,
}

impl Facing {
    /// Rule used for an entity given its pattern and whether input steers it.
    ///
    /// Input-controlled entities and patrols face by horizontal sign. Circling
    /// entities are placed directly and stay idle. Everything else, chasers
    /// included, walks only along a dominant horizontal axis.
    #[must_use]
    pub fn of(pattern: Option<&MovementPattern>, controlled: bool) -> Self {
        if controlled {
            return Self::Horizontal;
        }
        match pattern {
            Some(MovementPattern::Patrol { .. }) => Self::Horizontal,
            Some(MovementPattern::Circular { .. }) => Self::Still,
            Some(MovementPattern::Tracking { .. } | MovementPattern::None) | None => {
                Self::Dominant
            }
        }
    }

    /// State selected for `velocity`.
    #[must_use]
    pub fn state(self, velocity: Vec2) -> AnimationState {
        let horizontal = match self {
            Self::Horizontal => true,
            Self::Dominant => velocity.x.abs() > velocity.y.abs(),
            Self::Still => false,
        };
        if !horizontal {
            return AnimationState::Idle;
        }
        if velocity.x > 0.0 {
            AnimationState::WalkRight
        } else if velocity.x < 0.0 {
            AnimationState::WalkLeft
        } else {
            AnimationState::Idle
        }
    }
}

/// Selects animation states from velocity and advances frame timers.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnimationUpdate;

impl AnimationUpdate {
    /// Updates every entity carrying an [`Animation`].
    ///
    /// Entities without a velocity count as standing still.
    pub fn run(&self, world: &mut World, dt: Duration) {
        let dt = dt.as_secs_f32();
        let store = world.store();
        let states: Vec<(Entity, AnimationState)> = store
            .iter::<Animation>()
            .map(|(entity, _)| (entity, desired_state(store, entity)))
            .collect();

        let store = world.store_mut();
        for (entity, state) in states {
            let Some(animation) = store.get_mut::<Animation>(entity) else {
                continue;
            };
            if animation.set_state(state) {
                tracing::trace!(entity = entity.get(), ?state, "animation state changed");
            }
            let _ = animation.advance(dt);
        }
    }
}

fn desired_state(store: &Store, entity: Entity) -> AnimationState {
    let velocity = store
        .get::<Velocity>(entity)
        .map_or(Vec2::ZERO, |velocity| velocity.0);
    let facing = Facing::of(
        store.get::<MovementPattern>(entity),
        store.has::<InputControlled>(entity),
    );
    facing.state(velocity)
}
