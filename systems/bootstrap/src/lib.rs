#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Bootstrap system that prepares the Driftlands world.
//!
//! Setup creates the player, generates and fully autotiles the initial grid,
//! attaches a following camera and places the demo enemies and spawners.
//! When an actor sheet is loaded, the player and demo enemies share one
//! idle and walking animation cut from it.
//! The handles of the player, grid and camera are recorded on the world.

use driftlands_core::{Entity, Event, GameConfig, ImageKey, ImageSet, Tint};
use driftlands_system_autotile::Autotiler;
use driftlands_system_generation::ChunkGenerator;
use driftlands_world::{
    Animation, AnimationState, Appearance, CameraRig, Grid, Health, Hostile, InputControlled,
    MovementPattern, Position, Score, SpawnShape, Spawner, TileImages, Velocity, World,
};
use glam::Vec2;
use rand::Rng;

/// Builds the initial world from configuration and loaded images.
#[derive(Debug)]
pub struct Bootstrap<'a> {
    config: &'a GameConfig,
    images: ImageSet,
}

impl<'a> Bootstrap<'a> {
    /// Creates a bootstrapper for the provided configuration and images.
    #[must_use]
    pub const fn new(config: &'a GameConfig, images: ImageSet) -> Self {
        Self { config, images }
    }

    /// Populates a fresh world.
    ///
    /// `viewport` sizes the camera so the player is drawn at the window centre.
    pub fn world<R: Rng + ?Sized>(
        &self,
        generator: &ChunkGenerator,
        autotiler: &Autotiler,
        viewport: Vec2,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> World {
        let mut world = World::new();
        let grid = self.spawn_grid(&mut world, generator, autotiler, rng, out);
        let player = self.spawn_player(&mut world);
        let camera = self.spawn_camera(&mut world, player, viewport);
        self.spawn_demo_enemies(&mut world, player);
        spawn_demo_spawners(&mut world);

        let handles = world.handles_mut();
        handles.grid = Some(grid);
        handles.player = Some(player);
        handles.camera = Some(camera);
        tracing::info!(
            player = player.get(),
            grid = grid.get(),
            camera = camera.get(),
            "world ready"
        );
        world
    }

    /// Creates the grid entity with generated and autotiled terrain.
    pub fn spawn_grid<R: Rng + ?Sized>(
        &self,
        world: &mut World,
        generator: &ChunkGenerator,
        autotiler: &Autotiler,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> Entity {
        let mut grid = Grid::new(&self.config.grid);
        grid.set_images(TileImages {
            tileset: self.images.get(ImageKey::Tileset),
            wall: self.images.get(ImageKey::Wall),
            hazard: self.images.get(ImageKey::Hazard),
            pickup: self.images.get(ImageKey::Pickup),
        });
        let bounds = grid.bounds();
        let pieces = generator.generate_region(&mut grid, bounds);
        let resolved = autotiler.resolve(&mut grid, bounds, rng, out);
        tracing::debug!(pieces, resolved, "initial grid generated");

        let store = world.store_mut();
        let entity = store.create();
        store.add(entity, grid);
        entity
    }

    /// Creates the input-controlled player.
    pub fn spawn_player(&self, world: &mut World) -> Entity {
        let player = &self.config.player;
        let store = world.store_mut();
        let entity = store.create();
        store.add(entity, Position(player.spawn));
        store.add(entity, Velocity(Vec2::ZERO));
        store.add(entity, Health(player.health));
        store.add(entity, Score(0));
        store.add(entity, InputControlled);
        store.add(
            entity,
            Appearance {
                image: self.images.get(ImageKey::Player),
                size: self.actor_size(),
                tint: Tint::WHITE,
            },
        );
        if let Some(animation) = self.actor_animation() {
            store.add(entity, animation);
        }
        entity
    }

    /// Creates the camera following `player`.
    pub fn spawn_camera(&self, world: &mut World, player: Entity, viewport: Vec2) -> Entity {
        let camera = &self.config.camera;
        let store = world.store_mut();
        let entity = store.create();
        store.add(
            entity,
            CameraRig {
                offset: viewport / 2.0,
                target: self.config.player.spawn,
                zoom: camera.zoom,
                follow: Some(player),
                smoothing: camera.smoothing,
            },
        );
        entity
    }

    /// Places one enemy of each movement pattern.
    pub fn spawn_demo_enemies(&self, world: &mut World, player: Entity) {
        let center = Vec2::new(400.0, 300.0);
        let radius = 150.0;
        let demo = [
            (
                Vec2::new(600.0, 300.0),
                Tint::from_rgb(255, 120, 120),
                MovementPattern::Tracking {
                    target: Some(player),
                    speed: 150.0,
                    pursuit_radius: 400.0,
                    smoothing: 0.05,
                },
            ),
            (
                center + Vec2::new(radius, 0.0),
                Tint::from_rgb(120, 120, 255),
                MovementPattern::Circular {
                    center,
                    radius,
                    angular_speed: 1.5,
                    angle: 0.0,
                    orbit: None,
                },
            ),
            (
                Vec2::new(100.0, 500.0),
                Tint::from_rgb(120, 255, 120),
                MovementPattern::Patrol {
                    waypoints: vec![
                        Vec2::new(100.0, 500.0),
                        Vec2::new(300.0, 600.0),
                        Vec2::new(200.0, 400.0),
                    ],
                    current: 0,
                    looping: true,
                    arrival_threshold: 10.0,
                    speed: 120.0,
                    finished: false,
                },
            ),
        ];

        let image = self.images.get(ImageKey::Enemy);
        let size = self.actor_size();
        let animation = self.actor_animation();
        let store = world.store_mut();
        for (position, tint, pattern) in demo {
            let entity = store.create();
            store.add(entity, Position(position));
            store.add(entity, Velocity(Vec2::ZERO));
            store.add(entity, Hostile);
            store.add(entity, Appearance { image, size, tint });
            store.add(entity, pattern);
            if let Some(animation) = &animation {
                store.add(entity, animation.clone());
            }
        }
    }

    /// Idle and walking frames cut from the actor sheet, if one was loaded.
    ///
    /// Sheet rows hold the idle, walk-left and walk-right frames in that
    /// order; each frame is one tile square.
    #[must_use]
    pub fn actor_animation(&self) -> Option<Animation> {
        let sheet = self.images.get(ImageKey::ActorSheet)?;
        let settings = &self.config.animation;
        let size = u16::try_from(self.config.grid.tile_size).unwrap_or(u16::MAX);
        let animation = AnimationState::ALL.into_iter().zip(0u16..).fold(
            Animation::new(settings.frame_time),
            |animation, (state, row)| {
                let count = match state {
                    AnimationState::Idle => settings.idle_frames,
                    AnimationState::WalkLeft | AnimationState::WalkRight => settings.walk_frames,
                };
                animation.with_frames(state, Animation::sheet_row(sheet, row, size, count))
            },
        );
        Some(animation)
    }

    /// Drawn size of the player and enemies: one cell.
    #[must_use]
    pub fn actor_size(&self) -> Vec2 {
        Vec2::splat(self.config.grid.cell_extent())
    }
}

/// Places the three demo spawners.
pub fn spawn_demo_spawners(world: &mut World) {
    let spawners = [
        Spawner {
            shape: SpawnShape::HorizontalLine { spacing: 60.0 },
            center: Vec2::new(200.0, 200.0),
            interval: 8.0,
            min_batch: 3,
            max_batch: 4,
            activation_radius: 500.0,
            timer: 0.0,
        },
        Spawner {
            shape: SpawnShape::Ring { radius: 120.0 },
            center: Vec2::new(800.0, 400.0),
            interval: 12.0,
            min_batch: 4,
            max_batch: 6,
            activation_radius: 600.0,
            timer: 0.0,
        },
        Spawner {
            shape: SpawnShape::Area {
                size: Vec2::new(300.0, 200.0),
            },
            center: Vec2::new(500.0, 700.0),
            interval: 10.0,
            min_batch: 2,
            max_batch: 5,
            activation_radius: 400.0,
            timer: 0.0,
        },
    ];
    let store = world.store_mut();
    for spawner in spawners {
        let entity = store.create();
        store.add(entity, spawner);
    }
}
