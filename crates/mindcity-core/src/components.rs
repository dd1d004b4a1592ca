//! Component definitions for the geometry registry.
//!
//! Components are plain data attached to entities. Chunk membership is
//! the logic crate's [`ChunkId`](mindcity_logic::chunks::ChunkId) used
//! directly as a component.

use mindcity_logic::geometry::Rect;

/// Index into `WorldGeometry::buildings`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BuildingRef(pub usize);

/// Index into `WorldGeometry::roads`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoadRef(pub usize);

/// Static box collider handed to the physics engine once at start-up.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collider {
    pub footprint: Rect,
    pub height: f32,
}
