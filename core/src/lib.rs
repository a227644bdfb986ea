#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Driftlands runtime.
//!
//! This crate holds the plain value types that every other crate speaks:
//! entity identifiers, cell coordinates and rectangles, tile classifications,
//! image handles passed through to drawing collaborators, and the [`Event`]
//! stream systems append to while they mutate the world. Nothing here owns
//! state; the world crate stores it and systems act on it.

pub mod config;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub use config::{
    AnimationConfig, CameraConfig, ConfigError, ExpansionConfig, GameConfig, GenerationParams, GridConfig,
    InteractionConfig, PlayerConfig,
};

/// Opaque identifier of an entity living in the component store.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Entity(u64);

impl Entity {
    /// Creates a new entity identifier with the provided raw value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the raw numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Classification assigned to a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellClass {
    /// Open ground that entities may cross.
    #[default]
    Walkable,
    /// Solid terrain that rejects movement.
    NonWalkable,
    /// Walkable ground that damages the player over time.
    Hazard,
    /// Walkable ground holding a one-shot score bonus.
    Pickup,
}

impl CellClass {
    /// Reports whether movement into a cell of this class is allowed.
    #[must_use]
    pub const fn is_walkable(self) -> bool {
        !matches!(self, Self::NonWalkable)
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Returns the coordinate displaced by the signed offset, if it stays non-negative.
    #[must_use]
    pub fn offset(self, column_delta: i32, row_delta: i32) -> Option<Self> {
        let column = self.column.checked_add_signed(column_delta)?;
        let row = self.row.checked_add_signed(row_delta)?;
        Some(Self::new(column, row))
    }
}

/// Axis-aligned rectangle expressed in cell coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRect {
    origin: CellCoord,
    size: CellRectSize,
}

impl CellRect {
    /// Constructs a rectangle from an origin cell and size.
    #[must_use]
    pub const fn from_origin_and_size(origin: CellCoord, size: CellRectSize) -> Self {
        Self { origin, size }
    }

    /// Constructs a rectangle spanning two inclusive corner cells.
    #[must_use]
    pub fn from_corners(first: CellCoord, last: CellCoord) -> Self {
        let origin = CellCoord::new(
            first.column().min(last.column()),
            first.row().min(last.row()),
        );
        let width = first.column().abs_diff(last.column()) + 1;
        let height = first.row().abs_diff(last.row()) + 1;
        Self::from_origin_and_size(origin, CellRectSize::new(width, height))
    }

    /// Upper-left cell that anchors the rectangle.
    #[must_use]
    pub const fn origin(&self) -> CellCoord {
        self.origin
    }

    /// Dimensions of the rectangle measured in whole cells.
    #[must_use]
    pub const fn size(&self) -> CellRectSize {
        self.size
    }

    /// Reports whether the rectangle covers no cells.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size.width == 0 || self.size.height == 0
    }

    /// Column one past the right-most covered column.
    #[must_use]
    pub const fn end_column(&self) -> u32 {
        self.origin.column.saturating_add(self.size.width)
    }

    /// Row one past the bottom-most covered row.
    #[must_use]
    pub const fn end_row(&self) -> u32 {
        self.origin.row.saturating_add(self.size.height)
    }

    /// Reports whether the provided cell lies inside the rectangle.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column >= self.origin.column
            && cell.row >= self.origin.row
            && cell.column < self.end_column()
            && cell.row < self.end_row()
    }

    /// Intersects the rectangle with a `columns` x `rows` area anchored at the origin.
    #[must_use]
    pub fn clip(&self, columns: u32, rows: u32) -> Option<Self> {
        let end_column = self.end_column().min(columns);
        let end_row = self.end_row().min(rows);
        if self.origin.column >= end_column || self.origin.row >= end_row {
            return None;
        }
        Some(Self::from_origin_and_size(
            self.origin,
            CellRectSize::new(end_column - self.origin.column, end_row - self.origin.row),
        ))
    }

    /// Iterates the covered cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellCoord> {
        let Self { origin, size } = *self;
        (origin.row..origin.row + size.height).flat_map(move |row| {
            (origin.column..origin.column + size.width).map(move |column| CellCoord::new(column, row))
        })
    }
}

/// Size of a [`CellRect`] measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellRectSize {
    width: u32,
    height: u32,
}

impl CellRectSize {
    /// Creates a new size descriptor with explicit dimensions.
    #[must_use]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width of the rectangle in cells.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the rectangle in cells.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Pixel offset of a sub-image inside the tileset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileFrame {
    x: u16,
    y: u16,
}

impl TileFrame {
    /// Frame anchored at the tileset origin, used as the fallback variant.
    pub const ZERO: Self = Self::new(0, 0);

    /// Creates a frame located at the provided pixel offset.
    #[must_use]
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel offset within the tileset.
    #[must_use]
    pub const fn x(&self) -> u16 {
        self.x
    }

    /// Vertical pixel offset within the tileset.
    #[must_use]
    pub const fn y(&self) -> u16 {
        self.y
    }
}

/// Handle to an image loaded and owned by a rendering backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageHandle {
    id: u32,
    width: u32,
    height: u32,
}

impl ImageHandle {
    /// Creates a handle describing an image with the provided backend identifier.
    #[must_use]
    pub const fn new(id: u32, width: u32, height: u32) -> Self {
        Self { id, width, height }
    }

    /// Backend-assigned identifier of the image.
    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Width of the image in pixels.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Height of the image in pixels.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }
}

/// Named image slots the runtime knows how to use.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ImageKey {
    /// Atlas holding ground variants and bitmask wall variants.
    Tileset,
    /// Optional flat image replacing bitmask walls.
    Wall,
    /// Image drawn over hazard cells.
    Hazard,
    /// Image drawn over pickup cells.
    Pickup,
    /// Sprite used for the input-controlled entity.
    Player,
    /// Sprite used for spawned enemies.
    Enemy,
    /// Sheet of idle and walking frames; animates the player and every enemy.
    ActorSheet,
}

impl ImageKey {
    /// Every key in a stable order.
    pub const ALL: [Self; 7] = [
        Self::Tileset,
        Self::Wall,
        Self::Hazard,
        Self::Pickup,
        Self::Player,
        Self::Enemy,
        Self::ActorSheet,
    ];
}

/// Images handed to the runtime by the backend; absent slots render as flat colours.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImageSet {
    slots: [Option<ImageHandle>; 7],
}

impl ImageSet {
    /// Creates an image set with every slot empty.
    #[must_use]
    pub const fn empty() -> Self {
        Self { slots: [None; 7] }
    }

    /// Retrieves the handle assigned to the provided key.
    #[must_use]
    pub const fn get(&self, key: ImageKey) -> Option<ImageHandle> {
        self.slots[key as usize]
    }

    /// Assigns a handle to the provided key.
    pub fn set(&mut self, key: ImageKey, handle: ImageHandle) {
        self.slots[key as usize] = Some(handle);
    }

    /// Returns the set with the provided key assigned.
    #[must_use]
    pub fn with(mut self, key: ImageKey, handle: ImageHandle) -> Self {
        self.set(key, handle);
        self
    }
}

/// Opaque colour multiplier applied when drawing sprites.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tint {
    red: u8,
    green: u8,
    blue: u8,
}

impl Tint {
    /// Tint that leaves the image unchanged.
    pub const WHITE: Self = Self::from_rgb(255, 255, 255);

    /// Creates a new tint from byte RGB components.
    #[must_use]
    pub const fn from_rgb(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Red component of the tint.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Green component of the tint.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Blue component of the tint.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }
}

/// Edge of the grid that can grow by one chunk.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrowthEdge {
    /// Columns appended after the last column.
    Right,
    /// Rows appended after the last row.
    Bottom,
    /// Columns inserted before the first column.
    Left,
    /// Rows inserted before the first row.
    Top,
}

impl GrowthEdge {
    /// Edges in the order the expansion check visits them.
    pub const CHECK_ORDER: [Self; 4] = [Self::Right, Self::Bottom, Self::Left, Self::Top];

    /// Reports whether growing this edge moves the grid's coordinate origin.
    #[must_use]
    pub const fn shifts_origin(self) -> bool {
        matches!(self, Self::Left | Self::Top)
    }
}

/// Directional inputs currently held for the input-controlled entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HeldDirections {
    /// Movement toward decreasing y.
    pub up: bool,
    /// Movement toward increasing y.
    pub down: bool,
    /// Movement toward decreasing x.
    pub left: bool,
    /// Movement toward increasing x.
    pub right: bool,
}

impl HeldDirections {
    /// Reports whether no direction is held.
    #[must_use]
    pub const fn is_idle(&self) -> bool {
        !(self.up || self.down || self.left || self.right)
    }
}

/// Events appended by systems while they mutate the world.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// The grid grew by up to one chunk along an edge.
    GridExpanded {
        /// Edge that grew.
        edge: GrowthEdge,
        /// Column count after growth.
        columns: u32,
        /// Row count after growth.
        rows: u32,
        /// Cells freshly generated from noise.
        generated: CellRect,
        /// Cells whose visual variants were re-resolved.
        retiled: CellRect,
    },
    /// World-anchored state was translated to follow a moved grid origin.
    WorldRebased {
        /// Translation applied to every world-space coordinate.
        offset: Vec2,
    },
    /// A cell's neighbour bitmask had no entry in the variant table.
    BitmaskUnmapped {
        /// Cell that fell back to the default variant.
        cell: CellCoord,
        /// Bitmask that was looked up.
        mask: u8,
    },
    /// An entity standing on a hazard lost health.
    HazardDamage {
        /// Entity that took damage.
        entity: Entity,
        /// Health removed this frame.
        amount: f32,
        /// Health remaining after the damage.
        remaining: f32,
    },
    /// An entity consumed a pickup cell.
    PickupCollected {
        /// Entity that collected the pickup.
        entity: Entity,
        /// Cell that turned back into ground.
        cell: CellCoord,
        /// Score after the bonus was awarded.
        score: u32,
    },
    /// The player's health dropped to zero.
    PlayerDefeated {
        /// Entity whose health was exhausted.
        entity: Entity,
    },
    /// A spawner created a hostile entity.
    EnemySpawned {
        /// Spawner responsible for the enemy.
        spawner: Entity,
        /// Newly created enemy.
        enemy: Entity,
        /// World position the enemy appeared at.
        position: Vec2,
    },
}
