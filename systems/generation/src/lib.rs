#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural terrain: seeded gradient noise and the chunk generator that
//! turns noise samples into cell classifications.
//!
//! Classification is a pure function of a cell's global coordinate and the
//! seed. Pickup promotion draws from a stream seeded by the seed and the
//! generated piece's global origin, so regenerating the same region yields
//! the same cells.

mod chunk;
mod noise;

pub use chunk::ChunkGenerator;
pub use noise::PerlinNoise;
