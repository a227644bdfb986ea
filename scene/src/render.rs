//! Draw-list construction for the adventure scene.

use driftlands_core::{CellClass, ImageHandle};
use driftlands_rendering::{Color, DrawCommand, DrawList, SourceRect};
use driftlands_system_camera::{visible_cells, CameraView};
use driftlands_world::{
    query, Animation, Appearance, Cell, FrameRegion, Grid, Position, SpawnShape, Spawner, World,
};
use glam::Vec2;

use crate::{DebugOverlay, SceneStatus};

const GROUND: Color = Color::from_rgb_u8(0x3b, 0x6b, 0x3f);
const WALL: Color = Color::from_rgb_u8(0x5a, 0x55, 0x50);
const HAZARD: Color = Color::from_rgb_u8(0xc8, 0x64, 0x14);
const PICKUP: Color = Color::from_rgb_u8(0xf0, 0xd2, 0x3c);

const OVERLAY_WALL: Color = Color::from_rgba_u8(255, 0, 0, 128);
const OVERLAY_HAZARD: Color = Color::from_rgba_u8(255, 165, 0, 128);
const OVERLAY_PICKUP: Color = Color::from_rgba_u8(0, 255, 0, 128);
const SPAWNER_SHAPE: Color = Color::from_rgba_u8(253, 249, 0, 128);
const SPAWNER_CENTRE: Color = Color::from_rgb_u8(230, 41, 55);
const SPAWNER_CENTRE_RADIUS: f32 = 5.0;
const SPAWNER_STROKE: f32 = 2.0;

const HUD_FONT: f32 = 20.0;
const HEALTH_TEXT: Color = Color::from_rgb_u8(230, 41, 55);
const SCORE_TEXT: Color = Color::from_rgb_u8(0, 228, 48);
const BANNER_FONT: f32 = 48.0;

pub(crate) fn frame(
    world: &World,
    overlay: DebugOverlay,
    status: SceneStatus,
    viewport: Vec2,
    list: &mut DrawList,
) {
    let view = query::camera(world).map_or_else(CameraView::identity, CameraView::from);

    if let Some(grid) = query::grid(world) {
        tiles(grid, &view, viewport, overlay.grid, list);
    }
    entities(world, &view, list);
    if overlay.spawners {
        spawners(world, &view, list);
    }
    hud(world, status, viewport, list);
}

fn tiles(grid: &Grid, view: &CameraView, viewport: Vec2, classes: bool, list: &mut DrawList) {
    let Some(visible) = visible_cells(view, grid, viewport) else {
        return;
    };
    let size = Vec2::splat(grid.cell_extent() * view.zoom());
    let tile = grid.tile_size() as f32;
    let tileset = grid.images().tileset;

    for coord in visible.cells() {
        let Some(cell) = grid.cell(coord) else {
            continue;
        };
        let position = view.world_to_screen(grid.cell_position(coord));
        list.push(tile_command(cell, tileset, tile, position, size));
        if classes {
            if let Some(color) = overlay_color(cell.class) {
                list.push(DrawCommand::Rect {
                    position,
                    size,
                    color,
                });
            }
        }
    }
}

fn tile_command(
    cell: &Cell,
    tileset: Option<ImageHandle>,
    tile: f32,
    position: Vec2,
    size: Vec2,
) -> DrawCommand {
    if let Some(image) = cell.special {
        return DrawCommand::Image {
            image,
            source: None,
            position,
            size,
            tint: Color::WHITE,
        };
    }
    match tileset {
        Some(image) => DrawCommand::Image {
            image,
            source: Some(SourceRect {
                x: f32::from(cell.frame.x()),
                y: f32::from(cell.frame.y()),
                width: tile,
                height: tile,
            }),
            position,
            size,
            tint: Color::WHITE,
        },
        None => DrawCommand::Rect {
            position,
            size,
            color: class_color(cell.class),
        },
    }
}

fn class_color(class: CellClass) -> Color {
    match class {
        CellClass::Walkable => GROUND,
        CellClass::NonWalkable => WALL,
        CellClass::Hazard => HAZARD,
        CellClass::Pickup => PICKUP,
    }
}

fn overlay_color(class: CellClass) -> Option<Color> {
    match class {
        CellClass::Walkable => None,
        CellClass::NonWalkable => Some(OVERLAY_WALL),
        CellClass::Hazard => Some(OVERLAY_HAZARD),
        CellClass::Pickup => Some(OVERLAY_PICKUP),
    }
}

fn entities(world: &World, view: &CameraView, list: &mut DrawList) {
    let store = world.store();
    for (entity, appearance) in store.iter::<Appearance>() {
        let Some(Position(position)) = store.get::<Position>(entity).copied() else {
            continue;
        };
        let Appearance { image, size, tint } = *appearance;
        let position = view.world_to_screen(position);
        let size = size * view.zoom();
        let frame = store.get::<Animation>(entity).and_then(Animation::current);
        let sprite = match frame {
            Some(frame) => Some((frame.image, frame.region.map(source_rect))),
            None => image.map(|image| (image, None)),
        };
        list.push(match sprite {
            Some((image, source)) => DrawCommand::Image {
                image,
                source,
                position,
                size,
                tint: tint.into(),
            },
            None => DrawCommand::Rect {
                position,
                size,
                color: tint.into(),
            },
        });
    }
}

fn source_rect(region: FrameRegion) -> SourceRect {
    SourceRect {
        x: f32::from(region.origin.x()),
        y: f32::from(region.origin.y()),
        width: f32::from(region.width),
        height: f32::from(region.height),
    }
}

fn spawners(world: &World, view: &CameraView, list: &mut DrawList) {
    let zoom = view.zoom();
    for (_, spawner) in world.store().iter::<Spawner>() {
        let Spawner {
            shape,
            center,
            max_batch,
            ..
        } = *spawner;
        let centre = view.world_to_screen(center);
        let reach = max_batch as f32 / 2.0;
        list.push(match shape {
            SpawnShape::HorizontalLine { spacing } => DrawCommand::Line {
                from: view.world_to_screen(center - Vec2::new(reach * spacing, 0.0)),
                to: view.world_to_screen(center + Vec2::new(reach * spacing, 0.0)),
                thickness: SPAWNER_STROKE,
                color: SPAWNER_SHAPE,
            },
            SpawnShape::VerticalLine { spacing } => DrawCommand::Line {
                from: view.world_to_screen(center - Vec2::new(0.0, reach * spacing)),
                to: view.world_to_screen(center + Vec2::new(0.0, reach * spacing)),
                thickness: SPAWNER_STROKE,
                color: SPAWNER_SHAPE,
            },
            SpawnShape::Ring { radius } => DrawCommand::CircleOutline {
                center: centre,
                radius: radius * zoom,
                thickness: SPAWNER_STROKE,
                color: SPAWNER_SHAPE,
            },
            SpawnShape::Area { size } => DrawCommand::RectOutline {
                position: view.world_to_screen(center - size / 2.0),
                size: size * zoom,
                thickness: SPAWNER_STROKE,
                color: SPAWNER_SHAPE,
            },
        });
        list.push(DrawCommand::Circle {
            center: centre,
            radius: SPAWNER_CENTRE_RADIUS * zoom,
            color: SPAWNER_CENTRE,
        });
    }
}

fn hud(world: &World, status: SceneStatus, viewport: Vec2, list: &mut DrawList) {
    if let Some(health) = query::player_health(world) {
        list.push(DrawCommand::Text {
            text: format!("Health: {health:.0}"),
            position: Vec2::new(10.0, 30.0),
            font_size: HUD_FONT,
            color: HEALTH_TEXT,
        });
    }
    if let Some(score) = query::player_score(world) {
        list.push(DrawCommand::Text {
            text: format!("Score: {score}"),
            position: Vec2::new(10.0, 50.0),
            font_size: HUD_FONT,
            color: SCORE_TEXT,
        });
    }
    if status == SceneStatus::Defeated {
        list.push(DrawCommand::Text {
            text: String::from("Defeated"),
            position: viewport / 2.0 - Vec2::new(BANNER_FONT * 2.0, BANNER_FONT / 2.0),
            font_size: BANNER_FONT,
            color: HEALTH_TEXT,
        });
    }
}
