#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scenes drive the per-frame simulation and describe what to draw.
//!
//! [`Adventure`] is the exploration scene: it owns the world and every system,
//! runs them in a fixed order each frame and renders the visible part of the
//! grid, the entities and a HUD into a [`DrawList`]. Debug tooling reaches
//! scene-specific state through the optional capabilities of [`Scene`]
//! instead of inspecting concrete scene types.

mod render;

use std::time::Duration;

use driftlands_core::{CellCoord, CellRect, ConfigError, Event, GameConfig, ImageKey, ImageSet};
use driftlands_rendering::{DrawList, FrameInput};
use driftlands_system_animation::AnimationUpdate;
use driftlands_system_autotile::Autotiler;
use driftlands_system_bootstrap::Bootstrap;
use driftlands_system_camera::CameraFollow;
use driftlands_system_expansion::{self as expansion, Expansion};
use driftlands_system_generation::ChunkGenerator;
use driftlands_system_interaction::{self as interaction, TileInteractions};
use driftlands_system_movement::{GridMovement, PatternMotion, PlayerControl};
use driftlands_system_spawning::{self as spawning, Spawning};
use driftlands_world::{CameraRig, Inspect, World};
use glam::Vec2;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

const VARIANT_STREAM: u64 = 0xd1b5_4a32_d192_ed03;

/// Interface shared by every scene the runtime can host.
pub trait Scene {
    /// Advances the simulation by `dt`, appending everything that happened to `out`.
    fn update(&mut self, dt: Duration, input: &FrameInput, out: &mut Vec<Event>);

    /// Describes the current frame for a `viewport`-sized window.
    fn render(&self, viewport: Vec2, list: &mut DrawList);

    /// Debug overlay toggles, when the scene supports an overlay.
    fn debug_overlay(&mut self) -> Option<&mut DebugOverlay> {
        None
    }

    /// Read-only entity inspection, when the scene exposes a world.
    fn inspector(&self) -> Option<&dyn Inspect> {
        None
    }
}

/// Debug layers drawn over the scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DebugOverlay {
    /// Tints visible cells by classification.
    pub grid: bool,
    /// Outlines spawner shapes and marks their centres.
    pub spawners: bool,
}

/// Flips the overlay layers whose toggles were pressed this frame.
///
/// Scenes without an overlay ignore the toggles.
pub fn apply_overlay_toggles<S: Scene + ?Sized>(scene: &mut S, input: &FrameInput) {
    let Some(overlay) = scene.debug_overlay() else {
        return;
    };
    if input.toggle_grid_overlay {
        overlay.grid = !overlay.grid;
    }
    if input.toggle_spawner_overlay {
        overlay.spawners = !overlay.spawners;
    }
}

/// Lifecycle of the adventure scene.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SceneStatus {
    /// Simulation advances every frame.
    #[default]
    Running,
    /// The player ran out of health; simulation is frozen while rendering continues.
    Defeated,
}

/// Exploration scene over an endlessly growing grid.
#[derive(Debug)]
pub struct Adventure {
    world: World,
    status: SceneStatus,
    overlay: DebugOverlay,
    rng: ChaCha8Rng,
    control: PlayerControl,
    interactions: TileInteractions,
    spawning: Spawning,
    expansion: Expansion,
    autotiler: Autotiler,
}

impl Adventure {
    /// Validates the configuration and builds the initial world.
    ///
    /// Setup diagnostics, such as unmapped wall bitmasks, are appended to `out`.
    pub fn new(
        config: &GameConfig,
        images: ImageSet,
        viewport: Vec2,
        out: &mut Vec<Event>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.grid.seed;
        let generator = ChunkGenerator::new(seed, config.generation);
        let autotiler = Autotiler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(seed ^ VARIANT_STREAM);
        let bootstrap = Bootstrap::new(config, images);
        let world = bootstrap.world(&generator, &autotiler, viewport, &mut rng, out);

        Ok(Self {
            world,
            status: SceneStatus::Running,
            overlay: DebugOverlay::default(),
            rng,
            control: PlayerControl::new(config.player.speed),
            interactions: TileInteractions::new(interaction::Config::new(
                config.interaction.hazard_damage_per_second,
                config.interaction.pickup_score,
            )),
            spawning: Spawning::new(spawning::Config::new(
                images.get(ImageKey::Enemy),
                bootstrap.actor_size(),
            )),
            expansion: Expansion::new(
                expansion::Config::new(config.expansion.interval()),
                generator,
                autotiler.clone(),
            ),
            autotiler,
        })
    }

    /// World owned by the scene.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn status(&self) -> SceneStatus {
        self.status
    }

    /// Overlay toggles currently applied.
    #[must_use]
    pub fn overlay(&self) -> DebugOverlay {
        self.overlay
    }

    fn keep_camera_centred(&mut self, viewport: Vec2) {
        if viewport.cmple(Vec2::ZERO).any() {
            return;
        }
        let Some(camera) = self.world.handles().camera else {
            return;
        };
        if let Some(rig) = self.world.store_mut().get_mut::<CameraRig>(camera) {
            rig.offset = viewport / 2.0;
        }
    }

    /// Re-resolves the 3x3 neighbourhood of every cell collected since `first`.
    ///
    /// Runs before expansion so the coordinates still match the grid.
    fn retile_pickups(&mut self, first: usize, out: &mut Vec<Event>) {
        let collected: Vec<CellCoord> = out
            .get(first..)
            .unwrap_or_default()
            .iter()
            .filter_map(|event| match event {
                Event::PickupCollected { cell, .. } => Some(*cell),
                _ => None,
            })
            .collect();
        let Some(grid) = self.world.grid_mut() else {
            return;
        };
        for cell in collected {
            let top_left =
                CellCoord::new(cell.column().saturating_sub(1), cell.row().saturating_sub(1));
            let bottom_right =
                CellCoord::new(cell.column().saturating_add(1), cell.row().saturating_add(1));
            let _ = self.autotiler.resolve(
                grid,
                CellRect::from_corners(top_left, bottom_right),
                &mut self.rng,
                out,
            );
        }
    }
}

impl Scene for Adventure {
    fn update(&mut self, dt: Duration, input: &FrameInput, out: &mut Vec<Event>) {
        self.keep_camera_centred(input.viewport);
        if self.status == SceneStatus::Defeated {
            return;
        }

        let first = out.len();
        self.control.handle(&mut self.world, input.held);
        PatternMotion.run(&mut self.world, dt);
        self.interactions.run(&mut self.world, dt, out);
        self.retile_pickups(first, out);
        GridMovement.run(&mut self.world, dt);
        AnimationUpdate.run(&mut self.world, dt);
        self.spawning.run(&mut self.world, dt, &mut self.rng, out);
        CameraFollow.run(&mut self.world);
        self.expansion.run(&mut self.world, dt, &mut self.rng, out);

        if out
            .get(first..)
            .unwrap_or_default()
            .iter()
            .any(|event| matches!(event, Event::PlayerDefeated { .. }))
        {
            tracing::info!("adventure halted: player defeated");
            self.status = SceneStatus::Defeated;
        }
    }

    fn render(&self, viewport: Vec2, list: &mut DrawList) {
        render::frame(&self.world, self.overlay, self.status, viewport, list);
    }

    fn debug_overlay(&mut self) -> Option<&mut DebugOverlay> {
        Some(&mut self.overlay)
    }

    fn inspector(&self) -> Option<&dyn Inspect> {
        Some(&self.world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftlands_core::{CellClass, TileFrame};
    use driftlands_system_autotile::{BitmaskTable, GROUND_VARIANTS};
    use driftlands_world::query;

    const VIEWPORT: Vec2 = Vec2::new(960.0, 720.0);

    #[test]
    fn collected_pickup_is_retiled_before_the_grid_grows() {
        let mut events = Vec::new();
        let mut scene = Adventure::new(&GameConfig::default(), ImageSet::empty(), VIEWPORT, &mut events)
            .expect("defaults are valid");
        scene.autotiler = Autotiler::new(BitmaskTable::empty());

        let spawn = query::player_position(&scene.world).expect("player placed");
        let grid = scene.world.grid_mut().expect("grid recorded");
        let collected = grid.cell_under(spawn).expect("player inside grid");
        let beside = CellCoord::new(collected.column() + 1, collected.row());
        let slot = grid.cell_mut(collected).expect("cell inside grid");
        slot.class = CellClass::Pickup;
        slot.frame = TileFrame::new(999, 999);
        let slot = grid.cell_mut(beside).expect("cell inside grid");
        slot.class = CellClass::NonWalkable;
        slot.needs_autotile = true;

        events.clear();
        let input = FrameInput {
            viewport: VIEWPORT,
            ..FrameInput::default()
        };
        scene.update(Duration::from_millis(16), &input, &mut events);

        let rebased: Vec2 = events
            .iter()
            .filter_map(|event| match event {
                Event::WorldRebased { offset } => Some(*offset),
                _ => None,
            })
            .sum();
        assert_eq!(rebased, Vec2::new(1280.0, 1280.0), "left and top growth in one frame");
        assert!(
            events.iter().any(|event| matches!(
                event,
                Event::BitmaskUnmapped { cell, .. } if *cell == beside
            )),
            "retile diagnostics reach the frame's events"
        );

        let position = query::player_position(&scene.world).expect("player placed");
        let grid = query::grid(&scene.world).expect("grid recorded");
        let moved = grid.cell_under(position).expect("player inside grid");
        assert_eq!(
            moved,
            CellCoord::new(collected.column() + 20, collected.row() + 20)
        );
        let cell = grid.cell(moved).expect("cell inside grid");
        assert_eq!(cell.class, CellClass::Walkable);
        assert!(GROUND_VARIANTS.contains(&cell.frame));
    }
}
