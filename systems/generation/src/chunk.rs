use driftlands_core::{CellClass, CellCoord, CellRect, CellRectSize, GenerationParams, TileFrame};
use driftlands_world::{Cell, Grid};
use glam::IVec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::noise::PerlinNoise;

const COLUMN_MIX: u64 = 0x9e37_79b9_7f4a_7c15;
const ROW_MIX: u64 = 0xc2b2_ae3d_27d4_eb4f;

/// Fills grid regions with cells classified from seeded noise.
#[derive(Clone, Debug)]
pub struct ChunkGenerator {
    noise: PerlinNoise,
    params: GenerationParams,
    seed: u64,
}

impl ChunkGenerator {
    /// Creates a generator for the provided seed and thresholds.
    #[must_use]
    pub fn new(seed: u64, params: GenerationParams) -> Self {
        Self {
            noise: PerlinNoise::new(seed),
            params,
            seed,
        }
    }

    /// Thresholds driving classification.
    #[must_use]
    pub const fn params(&self) -> &GenerationParams {
        &self.params
    }

    /// Classifies a global cell from noise alone, before pickup promotion.
    #[must_use]
    pub fn classify(&self, global: IVec2) -> CellClass {
        let frequency = self.params.frequency;
        let value = self
            .noise
            .sample(global.x as f32 * frequency, global.y as f32 * frequency);
        if value > self.params.wall_threshold {
            CellClass::NonWalkable
        } else if value < self.params.hazard_threshold {
            CellClass::Hazard
        } else {
            CellClass::Walkable
        }
    }

    /// Fills the chunk at the provided chunk coordinates and returns the covered cells.
    pub fn generate_chunk(
        &self,
        grid: &mut Grid,
        chunk_column: u32,
        chunk_row: u32,
    ) -> Option<CellRect> {
        let rect = grid.chunk_rect(chunk_column, chunk_row)?;
        self.fill(grid, rect);
        Some(rect)
    }

    /// Fills an arbitrary region in chunk-sized pieces anchored at its origin.
    ///
    /// Returns the number of pieces generated.
    pub fn generate_region(&self, grid: &mut Grid, region: CellRect) -> usize {
        let Some(region) = region.clip(grid.columns(), grid.rows()) else {
            return 0;
        };
        let step = grid.chunk_size().max(1);
        let mut pieces = 0;
        let mut row = region.origin().row();
        while row < region.end_row() {
            let height = step.min(region.end_row() - row);
            let mut column = region.origin().column();
            while column < region.end_column() {
                let width = step.min(region.end_column() - column);
                let piece = CellRect::from_origin_and_size(
                    CellCoord::new(column, row),
                    CellRectSize::new(width, height),
                );
                self.fill(grid, piece);
                pieces += 1;
                column += width;
            }
            row += height;
        }
        tracing::debug!(
            column = region.origin().column(),
            row = region.origin().row(),
            width = region.size().width(),
            height = region.size().height(),
            pieces,
            "generated region"
        );
        pieces
    }

    fn fill(&self, grid: &mut Grid, rect: CellRect) {
        let mut promotion = self.promotion_stream(grid.global(rect.origin()));
        for cell in rect.cells() {
            let mut class = self.classify(grid.global(cell));
            if class == CellClass::Walkable && promotion.gen::<f32>() < self.params.pickup_chance {
                class = CellClass::Pickup;
            }
            if let Some(slot) = grid.cell_mut(cell) {
                *slot = Cell {
                    class,
                    frame: TileFrame::ZERO,
                    needs_autotile: class == CellClass::NonWalkable,
                    special: None,
                };
            }
        }
    }

    fn promotion_stream(&self, anchor: IVec2) -> ChaCha8Rng {
        let column = (anchor.x as i64 as u64).wrapping_mul(COLUMN_MIX);
        let row = (anchor.y as i64 as u64).wrapping_mul(ROW_MIX);
        ChaCha8Rng::seed_from_u64(self.seed ^ column ^ row.rotate_left(17))
    }
}
