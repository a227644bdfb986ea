//! Dense row-major tile grid with chunked, four-directional growth.

use std::fmt;

use driftlands_core::{
    CellClass, CellCoord, CellRect, CellRectSize, GridConfig, ImageHandle, TileFrame,
};
use glam::{IVec2, Vec2};

/// A single tile of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Cell {
    /// Classification driving movement and interactions.
    pub class: CellClass,
    /// Tileset sub-image selected for the cell.
    pub frame: TileFrame,
    /// Whether the frame is chosen from the neighbour bitmask.
    pub needs_autotile: bool,
    /// Image drawn instead of the tileset frame.
    pub special: Option<ImageHandle>,
}

/// Images the autotiler assigns to cells.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TileImages {
    /// Atlas holding ground and wall variants.
    pub tileset: Option<ImageHandle>,
    /// Flat wall image; bitmask resolution is skipped when set.
    pub wall: Option<ImageHandle>,
    /// Image used for hazard cells.
    pub hazard: Option<ImageHandle>,
    /// Image used for pickup cells.
    pub pickup: Option<ImageHandle>,
}

/// Converts a world position into signed cell coordinates.
#[must_use]
pub fn world_to_cell(position: Vec2, tile_size: u32, scale: f32) -> IVec2 {
    let extent = tile_size as f32 * scale;
    (position / extent).floor().as_ivec2()
}

/// Growable tile grid.
///
/// Cells are stored row-major, so `cells.len() == columns * rows` holds after
/// every public operation. Local cell `(0, 0)` sits at [`Grid::origin`] in the
/// global cell space sampled by the generator; inserting columns or rows at
/// the front moves that origin so regenerated terrain keeps following the
/// global noise field.
#[derive(Clone)]
pub struct Grid {
    columns: u32,
    rows: u32,
    max_columns: u32,
    max_rows: u32,
    tile_size: u32,
    scale: f32,
    chunk_size: u32,
    seed: u64,
    origin: IVec2,
    images: TileImages,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates a grid of walkable cells shaped by the configuration.
    #[must_use]
    pub fn new(config: &GridConfig) -> Self {
        let columns = config.columns;
        let rows = config.rows;
        let len = usize::try_from(u64::from(columns) * u64::from(rows)).unwrap_or(0);
        Self {
            columns: if len == 0 { 0 } else { columns },
            rows: if len == 0 { 0 } else { rows },
            max_columns: config.max_columns.max(columns),
            max_rows: config.max_rows.max(rows),
            tile_size: config.tile_size,
            scale: config.scale,
            chunk_size: config.chunk_size,
            seed: config.seed,
            origin: IVec2::ZERO,
            images: TileImages::default(),
            cells: vec![Cell::default(); len],
        }
    }

    /// Number of columns currently allocated.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows currently allocated.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Column ceiling growth respects.
    #[must_use]
    pub const fn max_columns(&self) -> u32 {
        self.max_columns
    }

    /// Row ceiling growth respects.
    #[must_use]
    pub const fn max_rows(&self) -> u32 {
        self.max_rows
    }

    /// Tile edge length in source pixels.
    #[must_use]
    pub const fn tile_size(&self) -> u32 {
        self.tile_size
    }

    /// Uniform render scale.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Chunk edge length in cells.
    #[must_use]
    pub const fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    /// Noise seed.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Global cell coordinate of local cell `(0, 0)`.
    #[must_use]
    pub const fn origin(&self) -> IVec2 {
        self.origin
    }

    /// Images assigned to special cells.
    #[must_use]
    pub const fn images(&self) -> &TileImages {
        &self.images
    }

    /// Replaces the images assigned to special cells.
    pub fn set_images(&mut self, images: TileImages) {
        self.images = images;
    }

    /// Side length of one cell in world units.
    #[must_use]
    pub fn cell_extent(&self) -> f32 {
        self.tile_size as f32 * self.scale
    }

    /// Width of the grid in world units.
    #[must_use]
    pub fn width(&self) -> f32 {
        self.columns as f32 * self.cell_extent()
    }

    /// Height of the grid in world units.
    #[must_use]
    pub fn height(&self) -> f32 {
        self.rows as f32 * self.cell_extent()
    }

    /// Rectangle covering every cell.
    #[must_use]
    pub const fn bounds(&self) -> CellRect {
        CellRect::from_origin_and_size(
            CellCoord::new(0, 0),
            CellRectSize::new(self.columns, self.rows),
        )
    }

    /// Rectangle of the chunk at the provided chunk coordinates, clipped to the grid.
    #[must_use]
    pub fn chunk_rect(&self, chunk_column: u32, chunk_row: u32) -> Option<CellRect> {
        let origin = CellCoord::new(
            chunk_column.checked_mul(self.chunk_size)?,
            chunk_row.checked_mul(self.chunk_size)?,
        );
        CellRect::from_origin_and_size(
            origin,
            CellRectSize::new(self.chunk_size, self.chunk_size),
        )
        .clip(self.columns, self.rows)
    }

    /// Reports whether the signed coordinate lies inside the grid.
    #[must_use]
    pub fn in_bounds(&self, column: i64, row: i64) -> bool {
        (0..i64::from(self.columns)).contains(&column) && (0..i64::from(self.rows)).contains(&row)
    }

    /// Row-major storage index of the cell, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if cell.column() >= self.columns || cell.row() >= self.rows {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let columns = usize::try_from(self.columns).ok()?;
        Some(row * columns + column)
    }

    /// Cell containing the world position, if it lies inside the grid.
    #[must_use]
    pub fn cell_at(&self, position: Vec2) -> Option<CellCoord> {
        let cell = world_to_cell(position, self.tile_size, self.scale);
        if !self.in_bounds(i64::from(cell.x), i64::from(cell.y)) {
            return None;
        }
        Some(CellCoord::new(
            u32::try_from(cell.x).ok()?,
            u32::try_from(cell.y).ok()?,
        ))
    }

    /// Cell under an entity whose top-left corner sits at `position`.
    ///
    /// The sample point is offset by half a cell, approximating the entity centre.
    #[must_use]
    pub fn cell_under(&self, position: Vec2) -> Option<CellCoord> {
        self.cell_at(position + Vec2::splat(self.cell_extent() / 2.0))
    }

    /// Global coordinate of a local cell.
    #[must_use]
    pub fn global(&self, cell: CellCoord) -> IVec2 {
        self.origin + IVec2::new(cell.column() as i32, cell.row() as i32)
    }

    /// World position of the cell's top-left corner.
    #[must_use]
    pub fn cell_position(&self, cell: CellCoord) -> Vec2 {
        Vec2::new(cell.column() as f32, cell.row() as f32) * self.cell_extent()
    }

    /// Reads a cell.
    #[must_use]
    pub fn cell(&self, cell: CellCoord) -> Option<&Cell> {
        self.cells.get(self.index(cell)?)
    }

    /// Mutably reads a cell.
    pub fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        let index = self.index(cell)?;
        self.cells.get_mut(index)
    }

    /// Classification of a cell, if it lies inside the grid.
    #[must_use]
    pub fn class_at(&self, cell: CellCoord) -> Option<CellClass> {
        self.cell(cell).map(|cell| cell.class)
    }

    /// Row-major view of every cell.
    #[must_use]
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Appends up to `count` columns on the right and returns how many were added.
    pub fn append_columns(&mut self, count: u32) -> u32 {
        self.grow_columns(count, false)
    }

    /// Inserts up to `count` columns on the left and returns how many were added.
    ///
    /// Existing cells move right by the number of added columns.
    pub fn prepend_columns(&mut self, count: u32) -> u32 {
        self.grow_columns(count, true)
    }

    /// Appends up to `count` rows at the bottom and returns how many were added.
    pub fn append_rows(&mut self, count: u32) -> u32 {
        self.grow_rows(count, false)
    }

    /// Inserts up to `count` rows at the top and returns how many were added.
    ///
    /// Existing cells move down by the number of added rows.
    pub fn prepend_rows(&mut self, count: u32) -> u32 {
        self.grow_rows(count, true)
    }

    fn grow_columns(&mut self, count: u32, front: bool) -> u32 {
        let added = count.min(self.max_columns.saturating_sub(self.columns));
        if added == 0 || self.rows == 0 {
            return 0;
        }
        let (Ok(old), Ok(extra), Ok(rows)) = (
            usize::try_from(self.columns),
            usize::try_from(added),
            usize::try_from(self.rows),
        ) else {
            return 0;
        };
        let new = old + extra;
        self.cells.resize(new * rows, Cell::default());

        // Rows move to higher indices, so walk from the last row down to keep
        // unprocessed source rows intact.
        for row in (0..rows).rev() {
            let source = row * old;
            let target = if front { row * new + extra } else { row * new };
            self.cells.copy_within(source..source + old, target);
            let fresh = if front {
                row * new..row * new + extra
            } else {
                row * new + old..row * new + new
            };
            self.cells[fresh].fill(Cell::default());
        }

        self.columns += added;
        if front {
            self.origin.x -= added as i32;
        }
        added
    }

    fn grow_rows(&mut self, count: u32, front: bool) -> u32 {
        let added = count.min(self.max_rows.saturating_sub(self.rows));
        if added == 0 || self.columns == 0 {
            return 0;
        }
        let (Ok(columns), Ok(extra)) = (usize::try_from(self.columns), usize::try_from(added))
        else {
            return 0;
        };
        let old_len = self.cells.len();
        let fresh = extra * columns;
        self.cells.resize(old_len + fresh, Cell::default());
        if front {
            self.cells.copy_within(0..old_len, fresh);
            self.cells[..fresh].fill(Cell::default());
            self.origin.y -= added as i32;
        }
        self.rows += added;
        added
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("columns", &self.columns)
            .field("rows", &self.rows)
            .field("max_columns", &self.max_columns)
            .field("max_rows", &self.max_rows)
            .field("chunk_size", &self.chunk_size)
            .field("origin", &self.origin)
            .field("seed", &self.seed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_grid(columns: u32, rows: u32, chunk_size: u32) -> Grid {
        Grid::new(&GridConfig {
            columns,
            rows,
            max_columns: 12,
            max_rows: 12,
            chunk_size,
            ..GridConfig::default()
        })
    }

    fn stamp(grid: &mut Grid) {
        for row in 0..grid.rows() {
            for column in 0..grid.columns() {
                let cell = grid
                    .cell_mut(CellCoord::new(column, row))
                    .expect("cell inside grid");
                cell.frame = TileFrame::new(column as u16, row as u16);
            }
        }
    }

    fn frame(grid: &Grid, column: u32, row: u32) -> TileFrame {
        grid.cell(CellCoord::new(column, row))
            .expect("cell inside grid")
            .frame
    }

    #[test]
    fn index_is_row_major() {
        let grid = small_grid(4, 3, 2);
        assert_eq!(grid.index(CellCoord::new(1, 2)), Some(9));
        assert_eq!(grid.index(CellCoord::new(4, 0)), None);
        assert_eq!(grid.index(CellCoord::new(0, 3)), None);
    }

    #[test]
    fn world_to_cell_floors_negative_positions() {
        assert_eq!(world_to_cell(Vec2::new(-1.0, 63.9), 16, 4.0), IVec2::new(-1, 0));
        assert_eq!(world_to_cell(Vec2::new(128.0, 64.0), 16, 4.0), IVec2::new(2, 1));
    }

    #[test]
    fn appending_columns_restrides_every_row() {
        let mut grid = small_grid(3, 2, 2);
        stamp(&mut grid);

        assert_eq!(grid.append_columns(2), 2);

        assert_eq!(grid.columns(), 5);
        assert_eq!(grid.cells().len(), 10);
        assert_eq!(frame(&grid, 2, 1), TileFrame::new(2, 1));
        assert_eq!(frame(&grid, 0, 1), TileFrame::new(0, 1));
        assert_eq!(frame(&grid, 3, 0), TileFrame::ZERO);
        assert_eq!(frame(&grid, 4, 1), TileFrame::ZERO);
        assert_eq!(grid.origin(), IVec2::ZERO);
    }

    #[test]
    fn prepending_columns_shifts_rows_and_origin() {
        let mut grid = small_grid(3, 2, 2);
        stamp(&mut grid);

        assert_eq!(grid.prepend_columns(2), 2);

        assert_eq!(grid.cells().len(), 10);
        assert_eq!(frame(&grid, 2, 0), TileFrame::new(0, 0));
        assert_eq!(frame(&grid, 4, 1), TileFrame::new(2, 1));
        assert_eq!(frame(&grid, 1, 1), TileFrame::ZERO);
        assert_eq!(grid.origin(), IVec2::new(-2, 0));
    }

    #[test]
    fn prepending_rows_shifts_data_down() {
        let mut grid = small_grid(2, 2, 3);
        stamp(&mut grid);

        assert_eq!(grid.prepend_rows(3), 3);

        assert_eq!(grid.rows(), 5);
        assert_eq!(grid.cells().len(), 10);
        assert_eq!(frame(&grid, 1, 4), TileFrame::new(1, 1));
        assert_eq!(frame(&grid, 1, 2), TileFrame::ZERO);
        assert_eq!(grid.origin(), IVec2::new(0, -3));
    }

    #[test]
    fn growth_clamps_to_maximum() {
        let mut grid = small_grid(10, 10, 5);
        assert_eq!(grid.append_columns(5), 2);
        assert_eq!(grid.append_columns(5), 0);
        assert_eq!(grid.prepend_rows(5), 2);
        assert_eq!(grid.append_rows(5), 0);
        assert_eq!(grid.cells().len(), 144);
    }

    #[test]
    fn chunk_rect_is_clipped_to_grid() {
        let grid = small_grid(5, 4, 3);
        let rect = grid.chunk_rect(1, 1).expect("chunk overlaps grid");
        assert_eq!(rect.origin(), CellCoord::new(3, 3));
        assert_eq!(rect.size(), CellRectSize::new(2, 1));
        assert!(grid.chunk_rect(2, 0).is_none());
    }
}
