//! World tuning constants.
//!
//! [`WorldConfig::default`] describes the reference world: a ±400 unit
//! square split into a 4×4 chunk grid, boulevards every 200 units,
//! secondary streets every 100, and a 25 unit building grid. Every field
//! can be overridden from a config file; missing fields keep their
//! default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Seed of the reference world.
pub const REFERENCE_SEED: u64 = 42;

/// Largest chunk count per axis; `dim * dim` must fit in an `i32`.
pub const MAX_GRID_DIM: i32 = 46_340;

/// Top-level world configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed for the building generator.
    pub seed: u64,
    pub generator: GeneratorConfig,
    pub roads: RoadConfig,
    pub chunks: ChunkConfig,
    pub controller: ControllerConfig,
}

/// Building generator constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Distance between candidate grid points inside a district.
    pub grid_spacing: f32,
    /// Maximum jitter as a fraction of `grid_spacing`, per axis.
    pub jitter: f32,
    /// Clearance added to every side of a building footprint.
    pub building_margin: f32,
    /// Clearance added to every side of a road corridor.
    pub road_margin: f32,
    /// Clearance added around landmark footprints and zone bounds.
    pub reservation_margin: f32,
}

/// Road network constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoadConfig {
    pub boulevard_spacing: f32,
    pub secondary_spacing: f32,
    pub boulevard_width: f32,
    pub secondary_width: f32,
}

/// Chunk grid constants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkConfig {
    /// Half-size of the square world; the world spans `-extent..extent`.
    pub extent: f32,
    /// Edge length of one chunk. Must divide `2 * extent` evenly.
    pub chunk_size: f32,
    /// Chebyshev radius of the active set around the player's chunk.
    pub active_ring: u32,
}

/// Player controller tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub walk_speed: f32,
    pub sprint_speed: f32,
    pub jump_impulse: f32,
    pub capsule_height: f32,
    /// Ground probe length as a fraction of `capsule_height`.
    pub ground_ray_factor: f32,
    /// Below this height the player is returned to the zone spawn.
    pub fall_limit: f32,
    /// Radians of camera rotation per pointer pixel.
    pub pointer_sensitivity: f32,
    pub pitch_min: f32,
    pub pitch_max: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: REFERENCE_SEED,
            generator: GeneratorConfig::default(),
            roads: RoadConfig::default(),
            chunks: ChunkConfig::default(),
            controller: ControllerConfig::default(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            grid_spacing: 25.0,
            jitter: 0.4,
            building_margin: 3.0,
            road_margin: 2.0,
            reservation_margin: 10.0,
        }
    }
}

impl Default for RoadConfig {
    fn default() -> Self {
        Self {
            boulevard_spacing: 200.0,
            secondary_spacing: 100.0,
            boulevard_width: 20.0,
            secondary_width: 10.0,
        }
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            extent: 400.0,
            chunk_size: 200.0,
            active_ring: 1,
        }
    }
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            walk_speed: 8.0,
            sprint_speed: 14.0,
            jump_impulse: 8.0,
            capsule_height: 1.8,
            ground_ray_factor: 0.6,
            fall_limit: -50.0,
            pointer_sensitivity: 0.002,
            pitch_min: -1.2,
            pitch_max: 0.6,
        }
    }
}

/// A configuration value that would make the world ill-defined.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{field} must be positive and finite, got {value}")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must lie in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("chunk size {chunk_size} does not divide world width {width}")]
    UnevenChunks { chunk_size: f32, width: f32 },
    #[error("{cells} chunks per axis exceeds the limit of {max}")]
    TooManyChunks { cells: f32, max: i32 },
    #[error("active ring {ring} is wider than the grid allows ({max})")]
    RingTooWide { ring: u32, max: u32 },
    #[error("secondary spacing {secondary} must not exceed boulevard spacing {boulevard}")]
    RoadSpacing { secondary: f32, boulevard: f32 },
    #[error("pitch range [{min}, {max}] is empty")]
    PitchRange { min: f32, max: f32 },
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min: 0.0,
            max: f32::MAX,
        })
    }
}

impl WorldConfig {
    /// Check every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.generator.validate()?;
        self.roads.validate()?;
        self.chunks.validate()?;
        self.controller.validate()
    }
}

impl GeneratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("generator.grid_spacing", self.grid_spacing)?;
        if !(0.0..=0.5).contains(&self.jitter) {
            return Err(ConfigError::OutOfRange {
                field: "generator.jitter",
                value: self.jitter,
                min: 0.0,
                max: 0.5,
            });
        }
        non_negative("generator.building_margin", self.building_margin)?;
        non_negative("generator.road_margin", self.road_margin)?;
        non_negative("generator.reservation_margin", self.reservation_margin)
    }
}

impl RoadConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("roads.boulevard_spacing", self.boulevard_spacing)?;
        positive("roads.secondary_spacing", self.secondary_spacing)?;
        positive("roads.boulevard_width", self.boulevard_width)?;
        positive("roads.secondary_width", self.secondary_width)?;
        if self.secondary_spacing > self.boulevard_spacing {
            return Err(ConfigError::RoadSpacing {
                secondary: self.secondary_spacing,
                boulevard: self.boulevard_spacing,
            });
        }
        Ok(())
    }
}

impl ChunkConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("chunks.extent", self.extent)?;
        positive("chunks.chunk_size", self.chunk_size)?;
        let width = self.extent * 2.0;
        let cells = width / self.chunk_size;
        if cells.round() > MAX_GRID_DIM as f32 {
            return Err(ConfigError::TooManyChunks {
                cells,
                max: MAX_GRID_DIM,
            });
        }
        if cells < 1.0 || (cells - cells.round()).abs() > 1e-4 {
            return Err(ConfigError::UnevenChunks {
                chunk_size: self.chunk_size,
                width,
            });
        }
        let max_ring = (self.grid_dim() - 1) as u32;
        if self.active_ring > max_ring {
            return Err(ConfigError::RingTooWide {
                ring: self.active_ring,
                max: max_ring,
            });
        }
        Ok(())
    }

    /// Number of chunks along one axis.
    pub fn grid_dim(&self) -> i32 {
        (self.extent * 2.0 / self.chunk_size).round() as i32
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("controller.walk_speed", self.walk_speed)?;
        positive("controller.sprint_speed", self.sprint_speed)?;
        non_negative("controller.jump_impulse", self.jump_impulse)?;
        positive("controller.capsule_height", self.capsule_height)?;
        positive("controller.ground_ray_factor", self.ground_ray_factor)?;
        positive("controller.pointer_sensitivity", self.pointer_sensitivity)?;
        if !self.fall_limit.is_finite() {
            return Err(ConfigError::NotPositive {
                field: "controller.fall_limit",
                value: self.fall_limit,
            });
        }
        if self.pitch_min >= self.pitch_max {
            return Err(ConfigError::PitchRange {
                min: self.pitch_min,
                max: self.pitch_max,
            });
        }
        Ok(())
    }

    /// Length of the downward ground probe.
    pub fn ground_ray_length(&self) -> f32 {
        self.capsule_height * self.ground_ray_factor
    }
}
