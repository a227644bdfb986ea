#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Grid expansion coordinator.
//!
//! At a throttled cadence the coordinator compares the player's position with
//! the four grid edges. An edge closer than half a chunk grows by one chunk:
//! storage is resized (and shifted for the left and top edges), the fresh
//! cells are generated, the seam is re-autotiled, and for the left and top
//! edges every world-anchored coordinate is rebased so nothing visibly moves.

use std::time::Duration;

use driftlands_core::{CellCoord, CellRect, CellRectSize, Event, GrowthEdge};
use driftlands_system_autotile::Autotiler;
use driftlands_system_generation::ChunkGenerator;
use driftlands_world::{
    query, CameraRig, MovementPattern, Position, Spawner, Store, World,
};
use glam::Vec2;
use rand::Rng;

/// Configuration parameters required to construct the expansion system.
#[derive(Clone, Copy, Debug)]
pub struct Config {
    interval: Duration,
}

impl Config {
    /// Creates a configuration checking edges every `interval` of simulated time.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

/// System that grows the grid as the player nears its edges.
#[derive(Debug)]
pub struct Expansion {
    interval: Duration,
    cooldown: Duration,
    generator: ChunkGenerator,
    autotiler: Autotiler,
}

impl Expansion {
    /// Creates the coordinator with the generator and autotiler used for new chunks.
    #[must_use]
    pub fn new(config: Config, generator: ChunkGenerator, autotiler: Autotiler) -> Self {
        Self {
            interval: config.interval,
            cooldown: Duration::ZERO,
            generator,
            autotiler,
        }
    }

    /// Advances the check timer and, when it elapses, checks all four edges.
    pub fn run<R: Rng + ?Sized>(
        &mut self,
        world: &mut World,
        dt: Duration,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) {
        self.cooldown = self.cooldown.saturating_sub(dt);
        if !self.cooldown.is_zero() {
            return;
        }
        self.cooldown = self.interval;
        self.check(world, rng, out);
    }

    /// Checks every edge in order against the player's live position.
    pub fn check<R: Rng + ?Sized>(&self, world: &mut World, rng: &mut R, out: &mut Vec<Event>) {
        for edge in GrowthEdge::CHECK_ORDER {
            let Some(position) = query::player_position(world) else {
                tracing::debug!("expansion skipped: player has no position");
                return;
            };
            let Some(grid) = query::grid(world) else {
                tracing::debug!("expansion skipped: no grid");
                return;
            };

            let threshold = grid.chunk_size() as f32 * grid.cell_extent() / 2.0;
            let wants_growth = match edge {
                GrowthEdge::Right => {
                    position.x > grid.width() - threshold && grid.columns() < grid.max_columns()
                }
                GrowthEdge::Bottom => {
                    position.y > grid.height() - threshold && grid.rows() < grid.max_rows()
                }
                GrowthEdge::Left => position.x < threshold && grid.columns() < grid.max_columns(),
                GrowthEdge::Top => position.y < threshold && grid.rows() < grid.max_rows(),
            };
            if wants_growth {
                let _ = self.expand(world, edge, rng, out);
            }
        }
    }

    /// Grows the grid by up to one chunk along `edge`, returning whether it grew.
    pub fn expand<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        edge: GrowthEdge,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> bool {
        let Some(grid) = world.grid_mut() else {
            return false;
        };
        let chunk = grid.chunk_size();
        let old_columns = grid.columns();
        let old_rows = grid.rows();
        let added = match edge {
            GrowthEdge::Right => grid.append_columns(chunk),
            GrowthEdge::Bottom => grid.append_rows(chunk),
            GrowthEdge::Left => grid.prepend_columns(chunk),
            GrowthEdge::Top => grid.prepend_rows(chunk),
        };
        if added == 0 {
            return false;
        }

        let columns = grid.columns();
        let rows = grid.rows();
        let (generated, retiled) = match edge {
            GrowthEdge::Right => (
                column_band(old_columns, columns, rows),
                column_band(old_columns.saturating_sub(1), columns, rows),
            ),
            GrowthEdge::Bottom => (
                row_band(old_rows, rows, columns),
                row_band(old_rows.saturating_sub(1), rows, columns),
            ),
            GrowthEdge::Left => (
                column_band(0, added, rows),
                column_band(0, (added + 1).min(columns), rows),
            ),
            GrowthEdge::Top => (
                row_band(0, added, columns),
                row_band(0, (added + 1).min(rows), columns),
            ),
        };

        let _ = self.generator.generate_region(grid, generated);
        let _ = self.autotiler.resolve(grid, retiled, rng, out);
        let extent = grid.cell_extent();

        tracing::info!(?edge, columns, rows, added, "grid expanded");
        out.push(Event::GridExpanded {
            edge,
            columns,
            rows,
            generated,
            retiled,
        });

        let offset = match edge {
            GrowthEdge::Left => Vec2::new(added as f32 * extent, 0.0),
            GrowthEdge::Top => Vec2::new(0.0, added as f32 * extent),
            GrowthEdge::Right | GrowthEdge::Bottom => return true,
        };
        rebase(world.store_mut(), offset);
        tracing::info!(x = offset.x, y = offset.y, "world rebased");
        out.push(Event::WorldRebased { offset });
        true
    }
}

/// Translates every world-anchored coordinate by `offset`.
///
/// Covers positions, patrol waypoints, fixed circle centres, spawner centres
/// and camera targets. Circles orbiting a live entity follow that entity and
/// are left alone.
pub fn rebase(store: &mut Store, offset: Vec2) {
    for (_, position) in store.iter_mut::<Position>() {
        position.0 += offset;
    }
    for (_, pattern) in store.iter_mut::<MovementPattern>() {
        match pattern {
            MovementPattern::Patrol { waypoints, .. } => {
                for waypoint in waypoints.iter_mut() {
                    *waypoint += offset;
                }
            }
            MovementPattern::Circular {
                center,
                orbit: None,
                ..
            } => *center += offset,
            MovementPattern::Circular { .. }
            | MovementPattern::Tracking { .. }
            | MovementPattern::None => {}
        }
    }
    for (_, spawner) in store.iter_mut::<Spawner>() {
        spawner.center += offset;
    }
    for (_, camera) in store.iter_mut::<CameraRig>() {
        camera.target += offset;
    }
}

fn column_band(first: u32, end: u32, rows: u32) -> CellRect {
    CellRect::from_origin_and_size(
        CellCoord::new(first, 0),
        CellRectSize::new(end.saturating_sub(first), rows),
    )
}

fn row_band(first: u32, end: u32, columns: u32) -> CellRect {
    CellRect::from_origin_and_size(
        CellCoord::new(0, first),
        CellRectSize::new(columns, end.saturating_sub(first)),
    )
}
