//! Chunk grid index and active-set tracking for render culling.
//!
//! The world square is split into a fixed N×N grid of chunks. The
//! [`ChunkTracker`] follows the player and keeps the player's chunk plus
//! its neighbour ring as the *active set*; the renderer only draws
//! chunk-tagged payloads inside it. Chunks never affect simulation:
//! colliders for the whole world stay loaded.
//!
//! ```
//! use mindcity_logic::chunks::{ChunkGrid, ChunkId};
//! use mindcity_logic::config::ChunkConfig;
//!
//! let grid = ChunkGrid::new(&ChunkConfig::default()).unwrap();
//! assert_eq!(grid.chunk_of(0.0, 0.0), ChunkId::new(0, 0));
//! assert_eq!(grid.chunk_of(-399.0, 399.0), ChunkId::new(-2, 1));
//! assert_eq!(grid.neighbors(ChunkId::new(-2, -2), 1).len(), 4);
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{ChunkConfig, ConfigError};
use crate::geometry::Rect;

/// Grid coordinates of a chunk. Ordering is x-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId {
    pub x: i32,
    pub z: i32,
}

impl ChunkId {
    pub const fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chebyshev distance in chunks.
    pub fn ring_distance(self, other: ChunkId) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.z - other.z).unsigned_abs())
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk_{}_{}", self.x, self.z)
    }
}

/// Fixed chunk grid over the world extent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkGrid {
    extent: f32,
    chunk_size: f32,
    dim: i32,
    min_index: i32,
}

impl ChunkGrid {
    pub fn new(config: &ChunkConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let dim = config.grid_dim();
        Ok(Self {
            extent: config.extent,
            chunk_size: config.chunk_size,
            dim,
            min_index: -(dim / 2),
        })
    }

    /// Chunks per axis.
    pub fn dim(&self) -> i32 {
        self.dim
    }

    pub fn chunk_size(&self) -> f32 {
        self.chunk_size
    }

    fn axis_index(&self, coord: f32) -> i32 {
        let raw = ((coord + self.extent) / self.chunk_size).floor() as i32;
        raw.clamp(0, self.dim - 1) + self.min_index
    }

    /// Chunk containing `(x, z)`. Points outside the world clamp to the
    /// nearest edge chunk.
    pub fn chunk_of(&self, x: f32, z: f32) -> ChunkId {
        ChunkId::new(self.axis_index(x), self.axis_index(z))
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        let max = self.min_index + self.dim;
        (self.min_index..max).contains(&id.x) && (self.min_index..max).contains(&id.z)
    }

    /// `id` plus every in-grid chunk within `ring` (Chebyshev), x-major.
    /// Edge and corner chunks have fewer neighbours.
    pub fn neighbors(&self, id: ChunkId, ring: u32) -> Vec<ChunkId> {
        // No ring reaches further than the grid is wide.
        let r = ring.min((self.dim - 1) as u32) as i32;
        let side = 2 * r as usize + 1;
        let mut out = Vec::with_capacity(side * side);
        for dx in -r..=r {
            for dz in -r..=r {
                let c = ChunkId::new(id.x.saturating_add(dx), id.z.saturating_add(dz));
                if self.contains(c) {
                    out.push(c);
                }
            }
        }
        out
    }

    /// World rectangle covered by a chunk.
    pub fn bounds(&self, id: ChunkId) -> Rect {
        let min_x = (id.x - self.min_index) as f32 * self.chunk_size - self.extent;
        let min_z = (id.z - self.min_index) as f32 * self.chunk_size - self.extent;
        Rect::new(
            min_x,
            min_x + self.chunk_size,
            min_z,
            min_z + self.chunk_size,
        )
    }

    /// Every chunk, x-major.
    pub fn all(&self) -> Vec<ChunkId> {
        let max = self.min_index + self.dim;
        (self.min_index..max)
            .flat_map(|x| (self.min_index..max).map(move |z| ChunkId::new(x, z)))
            .collect()
    }
}

/// The player's chunk and its neighbour ring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveSet {
    center: ChunkId,
    chunks: Vec<ChunkId>,
}

impl ActiveSet {
    pub fn center(&self) -> ChunkId {
        self.center
    }

    pub fn chunks(&self) -> &[ChunkId] {
        &self.chunks
    }

    pub fn contains(&self, id: ChunkId) -> bool {
        self.chunks.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Follows the player, memoising the active set per chunk and recording
/// every chunk ever entered.
#[derive(Debug, Clone)]
pub struct ChunkTracker {
    grid: ChunkGrid,
    ring: u32,
    active: Option<Arc<ActiveSet>>,
    discovered: BTreeSet<ChunkId>,
}

impl ChunkTracker {
    pub fn new(grid: ChunkGrid, ring: u32) -> Self {
        Self {
            grid,
            ring,
            active: None,
            discovered: BTreeSet::new(),
        }
    }

    pub fn grid(&self) -> &ChunkGrid {
        &self.grid
    }

    /// Per-tick update. The neighbour set is rebuilt only when the player
    /// crosses into a different chunk; otherwise the same `Arc` is
    /// returned.
    pub fn update(&mut self, x: f32, z: f32) -> Arc<ActiveSet> {
        let current = self.grid.chunk_of(x, z);
        self.discovered.insert(current);

        match &self.active {
            Some(active) if active.center == current => Arc::clone(active),
            _ => {
                debug!("Player entered {}", current);
                let active = Arc::new(ActiveSet {
                    center: current,
                    chunks: self.grid.neighbors(current, self.ring),
                });
                self.active = Some(Arc::clone(&active));
                active
            }
        }
    }

    /// Last computed active set, if any tick has run.
    pub fn active(&self) -> Option<&Arc<ActiveSet>> {
        self.active.as_ref()
    }

    /// Chunks the player has ever stood in.
    pub fn discovered(&self) -> &BTreeSet<ChunkId> {
        &self.discovered
    }

    /// Merge previously discovered chunks (e.g. from a save). Ids outside
    /// the grid are dropped.
    pub fn restore_discovered(&mut self, chunks: impl IntoIterator<Item = ChunkId>) {
        let grid = &self.grid;
        self.discovered
            .extend(chunks.into_iter().filter(|c| grid.contains(*c)));
    }

    /// Fraction of the map discovered, in `[0, 1]`.
    pub fn discovery_ratio(&self) -> f32 {
        let dim = self.grid.dim() as usize;
        self.discovered.len() as f32 / (dim * dim) as f32
    }
}
