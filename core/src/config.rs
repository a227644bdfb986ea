//! Tunable parameters for the world, its generator and the per-frame systems.
//!
//! Every record deserialises with `#[serde(default)]`, so a configuration file
//! only needs to name the values it overrides.

use std::time::Duration;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors reported when a configuration record cannot drive the runtime.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Chunks must cover at least one cell.
    #[error("chunk size must be positive")]
    ZeroChunkSize,
    /// Tiles must cover at least one pixel.
    #[error("tile size must be positive")]
    ZeroTileSize,
    /// Render scale must be a positive finite number.
    #[error("render scale must be positive and finite (received {scale})")]
    InvalidScale {
        /// Rejected scale.
        scale: f32,
    },
    /// The starting grid must fit inside the configured maximum.
    #[error("initial grid {columns}x{rows} exceeds maximum {max_columns}x{max_rows}")]
    InitialExceedsMaximum {
        /// Requested initial columns.
        columns: u32,
        /// Requested initial rows.
        rows: u32,
        /// Configured column ceiling.
        max_columns: u32,
        /// Configured row ceiling.
        max_rows: u32,
    },
    /// The starting grid must hold at least one cell.
    #[error("initial grid must contain at least one cell")]
    EmptyGrid,
    /// Noise thresholds must lie within the noise range and not overlap.
    #[error("thresholds must satisfy 0 <= hazard ({hazard}) <= wall ({wall}) <= 1")]
    InvalidThresholds {
        /// Hazard threshold.
        hazard: f32,
        /// Wall threshold.
        wall: f32,
    },
    /// Pickup promotion chance must be a probability.
    #[error("pickup chance must lie within 0..=1 (received {chance})")]
    InvalidPickupChance {
        /// Rejected chance.
        chance: f32,
    },
    /// Camera zoom must be a positive finite number.
    #[error("camera zoom must be positive and finite (received {zoom})")]
    InvalidZoom {
        /// Rejected zoom.
        zoom: f32,
    },
    /// Camera smoothing must be a lerp factor within `(0, 1]`.
    #[error("camera smoothing must lie within (0, 1] (received {smoothing})")]
    InvalidSmoothing {
        /// Rejected smoothing.
        smoothing: f32,
    },
    /// Expansion checks need a non-negative finite interval.
    #[error("expansion interval must be non-negative and finite (received {seconds})")]
    InvalidInterval {
        /// Rejected interval in seconds.
        seconds: f32,
    },
    /// Animation frames need a positive finite display time.
    #[error("animation frame time must be positive and finite (received {seconds})")]
    InvalidFrameTime {
        /// Rejected frame time in seconds.
        seconds: f32,
    },
    /// Every animation state needs at least one frame.
    #[error("animation states must hold at least one frame")]
    ZeroAnimationFrames,
}

/// Shape, limits and seed of the tile grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Columns present when the world starts.
    pub columns: u32,
    /// Rows present when the world starts.
    pub rows: u32,
    /// Ceiling on the column count.
    pub max_columns: u32,
    /// Ceiling on the row count.
    pub max_rows: u32,
    /// Edge length of a tile in source pixels.
    pub tile_size: u32,
    /// Uniform render scale applied to tiles.
    pub scale: f32,
    /// Edge length of a chunk in cells.
    pub chunk_size: u32,
    /// Seed feeding the noise permutation and pickup promotion.
    pub seed: u64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            columns: 40,
            rows: 40,
            max_columns: 200,
            max_rows: 200,
            tile_size: 16,
            scale: 4.0,
            chunk_size: 20,
            seed: 12345,
        }
    }
}

impl GridConfig {
    /// Side length of one cell in world units.
    #[must_use]
    pub fn cell_extent(&self) -> f32 {
        self.tile_size as f32 * self.scale
    }

    /// Verifies that the grid can be built and grown.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::ZeroChunkSize);
        }
        if self.tile_size == 0 {
            return Err(ConfigError::ZeroTileSize);
        }
        if !(self.scale.is_finite() && self.scale > 0.0) {
            return Err(ConfigError::InvalidScale { scale: self.scale });
        }
        if self.columns == 0 || self.rows == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.columns > self.max_columns || self.rows > self.max_rows {
            return Err(ConfigError::InitialExceedsMaximum {
                columns: self.columns,
                rows: self.rows,
                max_columns: self.max_columns,
                max_rows: self.max_rows,
            });
        }
        Ok(())
    }
}

/// Noise sampling and classification thresholds used by the chunk generator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationParams {
    /// Multiplier applied to global cell coordinates before sampling.
    pub frequency: f32,
    /// Samples above this value become walls.
    pub wall_threshold: f32,
    /// Samples below this value become hazards.
    pub hazard_threshold: f32,
    /// Probability that a walkable cell is promoted to a pickup.
    pub pickup_chance: f32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            frequency: 0.03,
            wall_threshold: 0.65,
            hazard_threshold: 0.2,
            pickup_chance: 0.02,
        }
    }
}

impl GenerationParams {
    /// Verifies thresholds and probabilities.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ordered = 0.0 <= self.hazard_threshold
            && self.hazard_threshold <= self.wall_threshold
            && self.wall_threshold <= 1.0;
        if !ordered {
            return Err(ConfigError::InvalidThresholds {
                hazard: self.hazard_threshold,
                wall: self.wall_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.pickup_chance) {
            return Err(ConfigError::InvalidPickupChance {
                chance: self.pickup_chance,
            });
        }
        Ok(())
    }
}

/// Cadence of the edge-proximity check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ExpansionConfig {
    /// Seconds of simulated time between checks.
    pub check_interval: f32,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            check_interval: 0.2,
        }
    }
}

impl ExpansionConfig {
    /// Interval between checks as a duration.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f32(self.check_interval).unwrap_or_default()
    }

    /// Verifies the interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.check_interval.is_finite() && self.check_interval >= 0.0) {
            return Err(ConfigError::InvalidInterval {
                seconds: self.check_interval,
            });
        }
        Ok(())
    }
}

/// Starting state of the input-controlled entity.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlayerConfig {
    /// World position the player starts at.
    pub spawn: Vec2,
    /// Movement speed in world units per second.
    pub speed: f32,
    /// Starting health.
    pub health: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            spawn: Vec2::new(100.0, 100.0),
            speed: 200.0,
            health: 100.0,
        }
    }
}

/// Effects applied by special cells.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InteractionConfig {
    /// Health removed per second while standing on a hazard.
    pub hazard_damage_per_second: f32,
    /// Score awarded by a pickup.
    pub pickup_score: u32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            hazard_damage_per_second: 10.0,
            pickup_score: 10,
        }
    }
}

/// Follow camera parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CameraConfig {
    /// World-to-screen magnification.
    pub zoom: f32,
    /// Fraction of the remaining distance covered each frame.
    pub smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            smoothing: 0.1,
        }
    }
}

impl CameraConfig {
    /// Verifies zoom and smoothing.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.zoom.is_finite() && self.zoom > 0.0) {
            return Err(ConfigError::InvalidZoom { zoom: self.zoom });
        }
        if !(self.smoothing > 0.0 && self.smoothing <= 1.0) {
            return Err(ConfigError::InvalidSmoothing {
                smoothing: self.smoothing,
            });
        }
        Ok(())
    }
}

/// Actor sprite sheet layout and playback speed.
///
/// The sheet holds one row per state (idle, walking left, walking right) of
/// square frames whose edge is the grid tile size.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnimationConfig {
    /// Seconds each frame stays on screen.
    pub frame_time: f32,
    /// Frames in the idle row.
    pub idle_frames: u16,
    /// Frames in each walking row.
    pub walk_frames: u16,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            frame_time: 0.15,
            idle_frames: 4,
            walk_frames: 2,
        }
    }
}

impl AnimationConfig {
    /// Verifies frame time and frame counts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.frame_time.is_finite() && self.frame_time > 0.0) {
            return Err(ConfigError::InvalidFrameTime {
                seconds: self.frame_time,
            });
        }
        if self.idle_frames == 0 || self.walk_frames == 0 {
            return Err(ConfigError::ZeroAnimationFrames);
        }
        Ok(())
    }
}

/// Complete runtime configuration, usually loaded from a TOML file.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Grid shape and seed.
    pub grid: GridConfig,
    /// Chunk generator thresholds.
    pub generation: GenerationParams,
    /// Expansion check cadence.
    pub expansion: ExpansionConfig,
    /// Player start state.
    pub player: PlayerConfig,
    /// Special cell effects.
    pub interaction: InteractionConfig,
    /// Camera behaviour.
    pub camera: CameraConfig,
    /// Actor sprite animation.
    pub animation: AnimationConfig,
}

impl GameConfig {
    /// Verifies every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.grid.validate()?;
        self.generation.validate()?;
        self.expansion.validate()?;
        self.camera.validate()?;
        self.animation.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        GameConfig::default()
            .validate()
            .expect("default configuration must validate");
    }

    #[test]
    fn partial_toml_keeps_remaining_defaults() {
        let config: GameConfig = toml::from_str(
            r#"
                [grid]
                seed = 7
                max_columns = 60

                [player]
                spawn = [1000.0, 1000.0]
            "#,
        )
        .expect("partial configuration should parse");

        assert_eq!(config.grid.seed, 7);
        assert_eq!(config.grid.max_columns, 60);
        assert_eq!(config.grid.chunk_size, 20);
        assert_eq!(config.player.spawn, Vec2::new(1000.0, 1000.0));
        assert_eq!(config.player.speed, 200.0);
        assert_eq!(config.generation, GenerationParams::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = toml::from_str::<GameConfig>("[grid]\nchunk = 3\n");
        assert!(result.is_err(), "misspelled keys must not be ignored");
    }

    #[test]
    fn initial_grid_larger_than_maximum_is_rejected() {
        let config = GridConfig {
            columns: 80,
            max_columns: 60,
            ..GridConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InitialExceedsMaximum { columns: 80, .. })
        ));
    }

    #[test]
    fn overlapping_thresholds_are_rejected() {
        let params = GenerationParams {
            hazard_threshold: 0.7,
            wall_threshold: 0.6,
            ..GenerationParams::default()
        };
        assert!(matches!(
            params.validate(),
            Err(ConfigError::InvalidThresholds { .. })
        ));
    }

    #[test]
    fn animation_needs_frames_and_time() {
        let stalled = AnimationConfig {
            frame_time: 0.0,
            ..AnimationConfig::default()
        };
        assert!(matches!(
            stalled.validate(),
            Err(ConfigError::InvalidFrameTime { .. })
        ));
        let empty = AnimationConfig {
            walk_frames: 0,
            ..AnimationConfig::default()
        };
        assert_eq!(empty.validate(), Err(ConfigError::ZeroAnimationFrames));
    }

    #[test]
    fn interval_converts_to_duration() {
        assert_eq!(
            ExpansionConfig::default().interval(),
            Duration::from_secs_f32(0.2)
        );
    }
}
