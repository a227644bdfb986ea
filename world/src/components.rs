//! Component types attached to entities.

use driftlands_core::{Entity, ImageHandle, Tint};
use glam::Vec2;

use crate::{animation::Animation, grid::Grid, store::Component};

/// World-space location of an entity's top-left corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Position(pub Vec2);

/// World units per second the entity wants to travel.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Velocity(pub Vec2);

/// Remaining hit points.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Health(pub f32);

impl Default for Health {
    fn default() -> Self {
        Self(100.0)
    }
}

/// Points collected from pickups.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Score(pub u32);

/// Marks the entity steered by held directional input.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputControlled;

/// Marks an enemy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Hostile;

/// How an entity is drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Appearance {
    /// Image drawn at the entity position; a flat rectangle is drawn when absent.
    pub image: Option<ImageHandle>,
    /// Drawn size in world units.
    pub size: Vec2,
    /// Colour multiplier.
    pub tint: Tint,
}

/// Scripted motion of a non-player entity.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum MovementPattern {
    /// No scripted motion.
    #[default]
    None,
    /// Chases a target while it stays within pursuit range.
    Tracking {
        /// Entity being chased; may already be gone.
        target: Option<Entity>,
        /// Top speed in world units per second.
        speed: f32,
        /// Distance beyond which pursuit stops.
        pursuit_radius: f32,
        /// Fraction of the velocity error corrected each frame.
        smoothing: f32,
    },
    /// Moves along a circle, placed directly rather than integrated.
    Circular {
        /// Fixed centre used when no orbit target is alive.
        center: Vec2,
        /// Circle radius in world units.
        radius: f32,
        /// Radians advanced per second.
        angular_speed: f32,
        /// Current angle in radians.
        angle: f32,
        /// Entity whose live position replaces the fixed centre.
        orbit: Option<Entity>,
    },
    /// Walks through waypoints in order.
    Patrol {
        /// Waypoints in world space.
        waypoints: Vec<Vec2>,
        /// Index of the waypoint being approached.
        current: usize,
        /// Whether the route restarts after the last waypoint.
        looping: bool,
        /// Distance at which a waypoint counts as reached.
        arrival_threshold: f32,
        /// Walking speed in world units per second.
        speed: f32,
        /// Set once a non-looping route has been completed.
        finished: bool,
    },
}

/// Arrangement of a spawner's burst.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SpawnShape {
    /// Enemies evenly spaced along a horizontal line through the centre.
    HorizontalLine {
        /// Gap between neighbours.
        spacing: f32,
    },
    /// Enemies evenly spaced along a vertical line through the centre.
    VerticalLine {
        /// Gap between neighbours.
        spacing: f32,
    },
    /// Enemies evenly spaced around a circle.
    Ring {
        /// Circle radius.
        radius: f32,
    },
    /// Enemies scattered uniformly within a rectangle centred on the spawner.
    Area {
        /// Rectangle width and height.
        size: Vec2,
    },
}

/// World-anchored generator of hostile entities.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Spawner {
    /// Burst arrangement.
    pub shape: SpawnShape,
    /// Anchor point in world space.
    pub center: Vec2,
    /// Seconds between bursts.
    pub interval: f32,
    /// Smallest burst.
    pub min_batch: u32,
    /// Largest burst.
    pub max_batch: u32,
    /// Bursts only happen while the player is within this distance; zero means always.
    pub activation_radius: f32,
    /// Seconds accumulated toward the next burst.
    pub timer: f32,
}

/// Camera record held by a single entity.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraRig {
    /// Screen-space point the target is drawn at.
    pub offset: Vec2,
    /// World-space point the camera looks at.
    pub target: Vec2,
    /// World-to-screen magnification.
    pub zoom: f32,
    /// Entity the camera follows; may already be gone.
    pub follow: Option<Entity>,
    /// Fraction of the remaining distance covered each frame.
    pub smoothing: f32,
}

impl Component for Position {
    const IDENTITY: bool = true;
}

impl Component for Velocity {}

impl Component for Health {}

impl Component for Score {}

impl Component for InputControlled {
    const IDENTITY: bool = true;
}

impl Component for Hostile {
    const IDENTITY: bool = true;
}

impl Component for Appearance {}

impl Component for Animation {}

impl Component for MovementPattern {
    const IDENTITY: bool = true;
}

impl Component for Spawner {
    const IDENTITY: bool = true;
}

impl Component for CameraRig {
    const IDENTITY: bool = true;
}

impl Component for Grid {
    const IDENTITY: bool = true;
}
