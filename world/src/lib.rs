#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for Driftlands.
//!
//! The world couples the component [`Store`] with the handful of entity
//! handles recorded at setup (player, grid, camera). Systems mutate it through
//! [`World::store_mut`]; adapters and tests read it through [`query`].

mod animation;
mod components;
mod grid;
mod store;

pub use animation::{Animation, AnimationState, FrameRegion, SpriteFrame};
pub use components::{
    Appearance, CameraRig, Health, Hostile, InputControlled, MovementPattern, Position, Score,
    SpawnShape, Spawner, Velocity,
};
pub use grid::{world_to_cell, Cell, Grid, TileImages};
pub use store::{Component, ComponentReadout, Store};

use driftlands_core::Entity;

/// Entities recorded at setup and read every frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Handles {
    /// Input-controlled entity the expansion coordinator tracks.
    pub player: Option<Entity>,
    /// Entity holding the tile grid.
    pub grid: Option<Entity>,
    /// Entity holding the camera rig.
    pub camera: Option<Entity>,
}

/// Represents the authoritative Driftlands world state.
#[derive(Debug, Default)]
pub struct World {
    store: Store,
    handles: Handles,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read access to the component store.
    #[must_use]
    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Mutable access to the component store.
    pub fn store_mut(&mut self) -> &mut Store {
        &mut self.store
    }

    /// Entity handles recorded at setup.
    #[must_use]
    pub fn handles(&self) -> Handles {
        self.handles
    }

    /// Mutable access to the entity handles.
    pub fn handles_mut(&mut self) -> &mut Handles {
        &mut self.handles
    }

    /// Mutable access to the tracked grid.
    pub fn grid_mut(&mut self) -> Option<&mut Grid> {
        let entity = self.handles.grid?;
        self.store.get_mut::<Grid>(entity)
    }
}

/// Read-only entry points used by external debug tooling.
pub trait Inspect {
    /// Live entities in ascending order.
    fn entities(&self) -> Vec<Entity>;

    /// Component readouts of one entity.
    fn describe(&self, entity: Entity) -> Vec<ComponentReadout>;
}

impl Inspect for World {
    fn entities(&self) -> Vec<Entity> {
        self.store.all()
    }

    fn describe(&self, entity: Entity) -> Vec<ComponentReadout> {
        self.store.describe(entity)
    }
}

/// Query helpers that expose read-only world views.
pub mod query {
    use glam::Vec2;

    use super::{CameraRig, Grid, Health, Position, Score, World};
    use driftlands_core::Entity;

    /// Input-controlled entity recorded at setup.
    #[must_use]
    pub fn player(world: &World) -> Option<Entity> {
        world.handles.player
    }

    /// Current position of the input-controlled entity.
    #[must_use]
    pub fn player_position(world: &World) -> Option<Vec2> {
        position(world, world.handles.player?)
    }

    /// Current position of any entity.
    #[must_use]
    pub fn position(world: &World, entity: Entity) -> Option<Vec2> {
        world.store.get::<Position>(entity).map(|position| position.0)
    }

    /// Health of the input-controlled entity.
    #[must_use]
    pub fn player_health(world: &World) -> Option<f32> {
        let player = world.handles.player?;
        world.store.get::<Health>(player).map(|health| health.0)
    }

    /// Score of the input-controlled entity.
    #[must_use]
    pub fn player_score(world: &World) -> Option<u32> {
        let player = world.handles.player?;
        world.store.get::<Score>(player).map(|score| score.0)
    }

    /// Grid recorded at setup.
    #[must_use]
    pub fn grid(world: &World) -> Option<&Grid> {
        world.store.get::<Grid>(world.handles.grid?)
    }

    /// Every grid present in the world.
    pub fn grids(world: &World) -> impl Iterator<Item = &Grid> {
        world.store.iter::<Grid>().map(|(_, grid)| grid)
    }

    /// Camera rig recorded at setup.
    #[must_use]
    pub fn camera(world: &World) -> Option<&CameraRig> {
        world.store.get::<CameraRig>(world.handles.camera?)
    }

    /// Number of live entities.
    #[must_use]
    pub fn entity_count(world: &World) -> usize {
        world.store.all().len()
    }
}
