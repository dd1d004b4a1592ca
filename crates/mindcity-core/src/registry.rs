//! Geometry registry: the generated city as ECS entities.
//!
//! Every building becomes an entity carrying `(BuildingRef, ChunkId,
//! Collider)`; every road an entity carrying `(RoadRef, Collider)`.
//! Render payloads are filtered by the active chunk set, colliders never
//! are: the physics world keeps all geometry loaded for the whole
//! session.

use std::collections::BTreeMap;

use hecs::World;
use log::info;

use mindcity_logic::chunks::{ActiveSet, ChunkGrid, ChunkId};
use mindcity_logic::generation::WorldGeometry;

use crate::components::{BuildingRef, Collider, RoadRef};

/// Collider thickness for road surfaces.
pub const ROAD_THICKNESS: f32 = 0.1;

pub struct GeometryRegistry {
    world: World,
    per_chunk: BTreeMap<ChunkId, Vec<usize>>,
}

impl GeometryRegistry {
    /// Spawn one entity per building and road.
    pub fn build(geometry: &WorldGeometry, grid: &ChunkGrid) -> Self {
        let mut world = World::new();
        let mut per_chunk: BTreeMap<ChunkId, Vec<usize>> = BTreeMap::new();

        for (i, building) in geometry.buildings.iter().enumerate() {
            let chunk = grid.chunk_of(building.position.x, building.position.z);
            world.spawn((
                BuildingRef(i),
                chunk,
                Collider {
                    footprint: building.footprint(),
                    height: building.height,
                },
            ));
            per_chunk.entry(chunk).or_default().push(i);
        }

        for (i, road) in geometry.roads.iter().enumerate() {
            world.spawn((
                RoadRef(i),
                Collider {
                    footprint: road.corridor(),
                    height: ROAD_THICKNESS,
                },
            ));
        }

        info!(
            "Registered {} buildings across {} chunks, {} roads",
            geometry.buildings.len(),
            per_chunk.len(),
            geometry.roads.len()
        );

        Self { world, per_chunk }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Building indices standing in `chunk`, in generation order.
    pub fn buildings_in_chunk(&self, chunk: ChunkId) -> &[usize] {
        self.per_chunk.get(&chunk).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Building indices to render for `active`, sorted.
    pub fn visible_buildings(&self, active: &ActiveSet) -> Vec<usize> {
        let mut visible: Vec<usize> = self
            .world
            .query::<(&BuildingRef, &ChunkId)>()
            .iter()
            .filter(|(_, (_, chunk))| active.contains(**chunk))
            .map(|(_, (building, _))| building.0)
            .collect();
        visible.sort_unstable();
        visible
    }

    /// Every collider, buildings and roads alike, regardless of activity.
    pub fn colliders(&self) -> Vec<Collider> {
        self.world
            .query::<&Collider>()
            .iter()
            .map(|(_, collider)| *collider)
            .collect()
    }

    pub fn building_count(&self) -> usize {
        self.world.query::<&BuildingRef>().iter().count()
    }

    pub fn road_count(&self) -> usize {
        self.world.query::<&RoadRef>().iter().count()
    }

    /// Buildings per chunk.
    pub fn chunk_counts(&self) -> BTreeMap<ChunkId, usize> {
        self.per_chunk
            .iter()
            .map(|(chunk, buildings)| (*chunk, buildings.len()))
            .collect()
    }
}
