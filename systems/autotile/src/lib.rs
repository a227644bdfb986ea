#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Autotiling: assigns each cell its visual variant.
//!
//! Hazards, pickups and (optionally) walls take a flat special image. Ground
//! picks a random variant. Walls without a flat image look up the tileset
//! frame from an 8-neighbour bitmask.

use driftlands_core::{CellClass, CellCoord, CellRect, Event, TileFrame};
use driftlands_world::Grid;
use rand::{seq::SliceRandom, Rng};

/// Neighbour offsets in bit order: NW, N, NE, W, E, SW, S, SE.
const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Ground variants picked uniformly for walkable cells.
pub const GROUND_VARIANTS: [TileFrame; 4] = [
    TileFrame::new(0, 0),
    TileFrame::new(16, 0),
    TileFrame::new(0, 16),
    TileFrame::new(16, 16),
];

const fn frame(x: u16, y: u16) -> TileFrame {
    TileFrame::new(x, y)
}

const STANDARD_ENTRIES: &[(u8, &[TileFrame])] = &[
    (2, &[frame(0, 80)]),
    (8, &[frame(48, 96)]),
    (10, &[frame(80, 112)]),
    (11, &[frame(48, 80)]),
    (16, &[frame(0, 96)]),
    (18, &[frame(64, 112)]),
    (22, &[frame(16, 80)]),
    (24, &[frame(16, 96), frame(32, 96)]),
    (26, &[frame(144, 32)]),
    (27, &[frame(144, 80)]),
    (30, &[frame(96, 80)]),
    (31, &[frame(32, 80)]),
    (64, &[frame(0, 32)]),
    (66, &[frame(0, 48), frame(0, 64)]),
    (72, &[frame(80, 96)]),
    (74, &[frame(128, 32)]),
    (75, &[frame(112, 80)]),
    (80, &[frame(64, 96)]),
    (82, &[frame(144, 48)]),
    (86, &[frame(128, 80)]),
    (88, &[frame(128, 48)]),
    (90, &[frame(0, 112), frame(16, 112)]),
    (91, &[frame(32, 112)]),
    (94, &[frame(96, 48)]),
    (95, &[frame(96, 112)]),
    (104, &[frame(48, 48)]),
    (106, &[frame(144, 64)]),
    (107, &[frame(48, 64)]),
    (120, &[frame(112, 64)]),
    (122, &[frame(48, 112)]),
    (123, &[frame(112, 112)]),
    (126, &[frame(48, 112)]),
    (127, &[frame(64, 64)]),
    (208, &[frame(16, 48)]),
    (210, &[frame(96, 64)]),
    (214, &[frame(16, 64)]),
    (216, &[frame(128, 64)]),
    (218, &[frame(96, 32)]),
    (219, &[frame(32, 112)]),
    (222, &[frame(96, 96)]),
    (223, &[frame(80, 64)]),
    (248, &[frame(32, 48)]),
    (250, &[frame(112, 96)]),
    (251, &[frame(64, 80)]),
    (254, &[frame(80, 80)]),
    (
        255,
        &[
            frame(0, 0),
            frame(16, 0),
            frame(32, 0),
            frame(48, 0),
            frame(64, 0),
            frame(80, 0),
            frame(0, 16),
            frame(16, 16),
            frame(32, 16),
            frame(48, 16),
            frame(64, 16),
            frame(80, 16),
            frame(32, 64),
        ],
    ),
    (
        0,
        &[
            frame(16, 32),
            frame(32, 32),
            frame(48, 32),
            frame(64, 32),
            frame(80, 32),
            frame(64, 48),
            frame(80, 48),
        ],
    ),
];

/// Computes the neighbour bitmask of a cell.
///
/// A bit is set when the neighbour lies inside the grid and shares the cell's
/// class. Diagonal bits additionally require both adjacent orthogonal
/// neighbours to qualify. Out-of-bounds neighbours never set a bit.
#[must_use]
pub fn neighbor_mask(grid: &Grid, cell: CellCoord) -> u8 {
    let Some(class) = grid.class_at(cell) else {
        return 0;
    };
    let matches = |dx: i32, dy: i32| {
        cell.offset(dx, dy)
            .and_then(|neighbour| grid.class_at(neighbour))
            .is_some_and(|neighbour| neighbour == class)
    };

    let mut mask = 0u8;
    for (bit, (dx, dy)) in NEIGHBOURS.into_iter().enumerate() {
        let diagonal = dx != 0 && dy != 0;
        let connected = if diagonal {
            matches(dx, dy) && matches(dx, 0) && matches(0, dy)
        } else {
            matches(dx, dy)
        };
        if connected {
            mask |= 1 << bit;
        }
    }
    mask
}

/// Bitmask to tileset-variant lookup.
#[derive(Clone, Debug)]
pub struct BitmaskTable {
    entries: Vec<Vec<TileFrame>>,
}

impl BitmaskTable {
    /// Creates an empty table where every mask is unmapped.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: vec![Vec::new(); 256],
        }
    }

    /// Table matching the bundled wall tileset.
    #[must_use]
    pub fn standard() -> Self {
        let mut table = Self::empty();
        for (mask, frames) in STANDARD_ENTRIES {
            table.insert(*mask, frames.iter().copied());
        }
        table
    }

    /// Adds candidate variants for a mask.
    pub fn insert(&mut self, mask: u8, frames: impl IntoIterator<Item = TileFrame>) {
        self.entries[usize::from(mask)].extend(frames);
    }

    /// Candidate variants for a mask; empty when unmapped.
    #[must_use]
    pub fn candidates(&self, mask: u8) -> &[TileFrame] {
        &self.entries[usize::from(mask)]
    }
}

impl Default for BitmaskTable {
    fn default() -> Self {
        Self::standard()
    }
}

/// System that resolves cell variants inside a region.
#[derive(Clone, Debug, Default)]
pub struct Autotiler {
    table: BitmaskTable,
}

impl Autotiler {
    /// Creates an autotiler backed by the provided table.
    #[must_use]
    pub fn new(table: BitmaskTable) -> Self {
        Self { table }
    }

    /// Lookup table in use.
    #[must_use]
    pub fn table(&self) -> &BitmaskTable {
        &self.table
    }

    /// Recomputes the variant of every cell in `region`.
    ///
    /// Cell classes are never modified. Returns the number of cells visited.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        grid: &mut Grid,
        region: CellRect,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> usize {
        let Some(region) = region.clip(grid.columns(), grid.rows()) else {
            return 0;
        };
        let images = *grid.images();
        let mut visited = 0;

        for cell in region.cells() {
            let Some(current) = grid.cell(cell).copied() else {
                continue;
            };
            let mut resolved = current;
            match current.class {
                CellClass::Hazard => {
                    resolved.frame = TileFrame::ZERO;
                    resolved.special = images.hazard;
                }
                CellClass::Pickup => {
                    resolved.frame = TileFrame::ZERO;
                    resolved.special = images.pickup;
                }
                CellClass::NonWalkable if images.wall.is_some() => {
                    resolved.frame = TileFrame::ZERO;
                    resolved.special = images.wall;
                }
                CellClass::Walkable => {
                    resolved.special = None;
                    resolved.frame = GROUND_VARIANTS
                        .choose(rng)
                        .copied()
                        .unwrap_or(TileFrame::ZERO);
                }
                CellClass::NonWalkable => {
                    resolved.special = None;
                    resolved.frame = if current.needs_autotile {
                        self.bitmask_frame(grid, cell, rng, out)
                    } else {
                        TileFrame::ZERO
                    };
                }
            }
            if let Some(slot) = grid.cell_mut(cell) {
                *slot = resolved;
            }
            visited += 1;
        }
        visited
    }

    fn bitmask_frame<R: Rng + ?Sized>(
        &self,
        grid: &Grid,
        cell: CellCoord,
        rng: &mut R,
        out: &mut Vec<Event>,
    ) -> TileFrame {
        let mask = neighbor_mask(grid, cell);
        match self.table.candidates(mask).choose(rng) {
            Some(frame) => *frame,
            None => {
                tracing::warn!(
                    column = cell.column(),
                    row = cell.row(),
                    mask,
                    "no tileset variant for neighbour mask"
                );
                out.push(Event::BitmaskUnmapped { cell, mask });
                TileFrame::ZERO
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_isolated_and_surrounded_walls() {
        let table = BitmaskTable::standard();
        assert_eq!(table.candidates(255).len(), 13);
        assert_eq!(table.candidates(0).len(), 7);
        assert_eq!(table.candidates(24), &[frame(16, 96), frame(32, 96)]);
        assert!(table.candidates(1).is_empty());
    }

    #[test]
    fn every_standard_mask_respects_the_corner_rule() {
        let table = BitmaskTable::standard();
        for mask in 0..=u8::MAX {
            if table.candidates(mask).is_empty() {
                continue;
            }
            let bit = |index: u8| mask & (1 << index) != 0;
            let (nw, n, ne, w, e, sw, s, se) =
                (bit(0), bit(1), bit(2), bit(3), bit(4), bit(5), bit(6), bit(7));
            assert!(!nw || (n && w), "mask {mask} sets NW without N and W");
            assert!(!ne || (n && e), "mask {mask} sets NE without N and E");
            assert!(!sw || (s && w), "mask {mask} sets SW without S and W");
            assert!(!se || (s && e), "mask {mask} sets SE without S and E");
        }
    }
}
