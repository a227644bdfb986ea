#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tile interactions for the input-controlled entity.
//!
//! Standing on a hazard drains health continuously; stepping onto a pickup
//! awards a flat bonus once and turns the cell back into ground.

use std::time::Duration;

use driftlands_core::{CellClass, CellCoord, Entity, Event};
use driftlands_world::{Grid, Health, InputControlled, Position, Score, Store, World};
use glam::Vec2;

/// Configuration parameters required to construct the interaction system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    damage_per_second: f32,
    pickup_score: u32,
}

impl Config {
    /// Creates a configuration from the hazard drain rate and the pickup bonus.
    #[must_use]
    pub const fn new(damage_per_second: f32, pickup_score: u32) -> Self {
        Self {
            damage_per_second,
            pickup_score,
        }
    }
}

/// System applying hazard damage and pickup collection.
#[derive(Debug)]
pub struct TileInteractions {
    damage_per_second: f32,
    pickup_score: u32,
}

impl TileInteractions {
    /// Creates the system using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            damage_per_second: config.damage_per_second,
            pickup_score: config.pickup_score,
        }
    }

    /// Resolves the cell under every input-controlled entity in every grid.
    ///
    /// Entities missing a position, health or score are skipped.
    pub fn run(&self, world: &mut World, dt: Duration, out: &mut Vec<Event>) {
        let dt = dt.as_secs_f32();
        let store = world.store_mut();
        let grids = store.entities_with::<Grid>();

        for entity in store.entities_with::<InputControlled>() {
            let Some(position) = interacting_position(store, entity) else {
                continue;
            };
            for grid in &grids {
                let Some((cell, class)) = store
                    .get::<Grid>(*grid)
                    .and_then(|grid| grid.cell_under(position).map(|cell| (cell, grid)))
                    .and_then(|(cell, grid)| grid.class_at(cell).map(|class| (cell, class)))
                else {
                    continue;
                };
                match class {
                    CellClass::Hazard => self.damage(store, entity, dt, out),
                    CellClass::Pickup => self.collect(store, entity, *grid, cell, out),
                    CellClass::Walkable | CellClass::NonWalkable => {}
                }
            }
        }
    }

    fn damage(&self, store: &mut Store, entity: Entity, dt: f32, out: &mut Vec<Event>) {
        let Some(health) = store.get_mut::<Health>(entity) else {
            return;
        };
        if health.0 <= 0.0 {
            return;
        }
        let amount = self.damage_per_second * dt;
        health.0 = (health.0 - amount).max(0.0);
        let remaining = health.0;
        tracing::debug!(entity = entity.get(), amount, remaining, "hazard damage");
        out.push(Event::HazardDamage {
            entity,
            amount,
            remaining,
        });
        if remaining <= 0.0 {
            tracing::warn!(entity = entity.get(), "player defeated");
            out.push(Event::PlayerDefeated { entity });
        }
    }

    fn collect(
        &self,
        store: &mut Store,
        entity: Entity,
        grid: Entity,
        cell: CellCoord,
        out: &mut Vec<Event>,
    ) {
        if let Some(slot) = store
            .get_mut::<Grid>(grid)
            .and_then(|grid| grid.cell_mut(cell))
        {
            slot.class = CellClass::Walkable;
            slot.special = None;
            slot.needs_autotile = false;
        }
        let Some(score) = store.get_mut::<Score>(entity) else {
            return;
        };
        score.0 = score.0.saturating_add(self.pickup_score);
        let score = score.0;
        tracing::debug!(
            entity = entity.get(),
            column = cell.column(),
            row = cell.row(),
            score,
            "pickup collected"
        );
        out.push(Event::PickupCollected {
            entity,
            cell,
            score,
        });
    }
}

fn interacting_position(store: &Store, entity: Entity) -> Option<Vec2> {
    let Some(position) = store.get::<Position>(entity) else {
        tracing::debug!(entity = entity.get(), "controlled entity has no position");
        return None;
    };
    if !store.has::<Health>(entity) || !store.has::<Score>(entity) {
        tracing::debug!(entity = entity.get(), "controlled entity lacks health or score");
        return None;
    }
    Some(position.0)
}
