#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Camera follow and the world/screen transform used for culled rendering.

use driftlands_core::{CellCoord, CellRect};
use driftlands_world::{CameraRig, Grid, Position, World};
use glam::Vec2;

/// System easing every camera's look target toward the entity it follows.
#[derive(Clone, Copy, Debug, Default)]
pub struct CameraFollow;

impl CameraFollow {
    /// Moves each rig's target a `smoothing` fraction of the way to its followed entity.
    ///
    /// Rigs without a live followed entity keep their target.
    pub fn run(&self, world: &mut World) {
        let store = world.store_mut();
        for camera in store.entities_with::<CameraRig>() {
            let Some(follow) = store.get::<CameraRig>(camera).and_then(|rig| rig.follow) else {
                continue;
            };
            let Some(goal) = store.get::<Position>(follow).map(|position| position.0) else {
                tracing::debug!(
                    camera = camera.get(),
                    follow = follow.get(),
                    "followed entity has no position"
                );
                continue;
            };
            if let Some(rig) = store.get_mut::<CameraRig>(camera) {
                rig.target += (goal - rig.target) * rig.smoothing;
            }
        }
    }
}

/// Snapshot of a camera used to map between world and screen space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraView {
    offset: Vec2,
    target: Vec2,
    zoom: f32,
}

impl CameraView {
    /// Creates a view drawing `target` at screen point `offset`, magnified by `zoom`.
    #[must_use]
    pub const fn new(offset: Vec2, target: Vec2, zoom: f32) -> Self {
        Self {
            offset,
            target,
            zoom,
        }
    }

    /// Identity view used when no camera exists.
    #[must_use]
    pub const fn identity() -> Self {
        Self::new(Vec2::ZERO, Vec2::ZERO, 1.0)
    }

    /// Screen-space point the target is drawn at.
    #[must_use]
    pub const fn offset(&self) -> Vec2 {
        self.offset
    }

    /// World-space point the view is centred on.
    #[must_use]
    pub const fn target(&self) -> Vec2 {
        self.target
    }

    /// World-to-screen magnification.
    #[must_use]
    pub const fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Maps a world position to the screen.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.target) * self.zoom + self.offset
    }

    /// Maps a screen position back into the world.
    #[must_use]
    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        (screen - self.offset) / self.zoom + self.target
    }

    /// World-space corners (top-left, bottom-right) covered by a viewport.
    #[must_use]
    pub fn visible_world(&self, viewport: Vec2) -> (Vec2, Vec2) {
        (
            self.screen_to_world(Vec2::ZERO),
            self.screen_to_world(viewport),
        )
    }
}

impl From<&CameraRig> for CameraView {
    fn from(rig: &CameraRig) -> Self {
        Self::new(rig.offset, rig.target, rig.zoom)
    }
}

/// Cells of `grid` a view can see through a `viewport`-sized window.
///
/// The range is padded to whole cells on both ends and clamped to the grid.
/// Returns `None` when the view misses the grid entirely.
#[must_use]
pub fn visible_cells(view: &CameraView, grid: &Grid, viewport: Vec2) -> Option<CellRect> {
    if grid.columns() == 0 || grid.rows() == 0 {
        return None;
    }
    let extent = grid.cell_extent();
    let (min, max) = view.visible_world(viewport);
    let first_column = (min.x / extent).floor().max(0.0);
    let first_row = (min.y / extent).floor().max(0.0);
    let last_column = (max.x / extent).ceil().min((grid.columns() - 1) as f32);
    let last_row = (max.y / extent).ceil().min((grid.rows() - 1) as f32);
    if !(first_column <= last_column && first_row <= last_row) {
        return None;
    }
    Some(CellRect::from_corners(
        CellCoord::new(first_column as u32, first_row as u32),
        CellCoord::new(last_column as u32, last_row as u32),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_round_trips_through_zoom() {
        let view = CameraView::new(Vec2::new(400.0, 300.0), Vec2::new(100.0, 100.0), 2.0);
        let screen = view.world_to_screen(Vec2::new(150.0, 90.0));
        assert_eq!(screen, Vec2::new(500.0, 280.0));
        assert_eq!(view.screen_to_world(screen), Vec2::new(150.0, 90.0));
    }

    #[test]
    fn identity_view_maps_world_to_screen_unchanged() {
        let view = CameraView::identity();
        assert_eq!(view.world_to_screen(Vec2::new(3.0, 4.0)), Vec2::new(3.0, 4.0));
    }
}
