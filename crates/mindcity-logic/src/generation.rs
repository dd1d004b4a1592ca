//! Deterministic building placement.
//!
//! Given a seed and the authored [`Layout`], the generator walks a
//! jittered grid over every district, thins it by district density,
//! picks a building category, sizes the box and keeps it only if its
//! grown footprint stays clear of roads, reservations and earlier
//! buildings. All randomness comes from one [`ParkMiller`] sequence, so
//! the same seed reproduces the identical list, ids and order included.
//!
//! # Draw order per grid point
//!
//! | Step | Draws |
//! |------|-------|
//! | jitter x, jitter z | 2 |
//! | density thinning | 1 |
//! | category | 1 |
//! | width, height, depth | 3 |
//! | (overlap check) | 0 |
//! | colour, roof colour, roof style (accepted only) | 3 |
//!
//! A rejected point produces nothing; there are no retries.

use std::collections::BTreeMap;

use glam::Vec3;
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, GeneratorConfig, WorldConfig};
use crate::geometry::Rect;
use crate::layout::{BuildingCategory, Color, Layout, LayoutError, RoofStyle};
use crate::rng::ParkMiller;
use crate::roads::{generate_roads, RoadSegment};

/// One generated building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    pub id: String,
    pub category: BuildingCategory,
    /// Centre of the box; `y` is half the height so it rests on the ground.
    pub position: Vec3,
    pub width: f32,
    pub height: f32,
    pub depth: f32,
    pub color: Color,
    pub roof_color: Color,
    pub roof_style: RoofStyle,
    pub district: String,
}

impl BuildingPlacement {
    /// Ground footprint without any margin.
    pub fn footprint(&self) -> Rect {
        Rect::from_center(self.position.x, self.position.z, self.width, self.depth)
    }
}

/// Everything the renderer and collider builder need, produced once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldGeometry {
    pub seed: u64,
    pub buildings: Vec<BuildingPlacement>,
    pub roads: Vec<RoadSegment>,
}

/// World construction failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum WorldError {
    #[error("invalid world config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid layout: {0}")]
    Layout(#[from] LayoutError),
}

/// Build roads and buildings for `layout`. Validates both inputs first.
pub fn generate_world(layout: &Layout, config: &WorldConfig) -> Result<WorldGeometry, WorldError> {
    config.validate()?;
    layout.validate()?;

    let roads = generate_roads(&config.roads, config.chunks.extent);
    let buildings = place_buildings(layout, &config.generator, &roads, config.seed);

    info!(
        "Generated world for seed {}: {} buildings, {} roads",
        config.seed,
        buildings.len(),
        roads.len()
    );

    Ok(WorldGeometry {
        seed: config.seed,
        buildings,
        roads,
    })
}

/// Buildings for the reference layout and default constants.
pub fn generate(seed: u64) -> Result<Vec<BuildingPlacement>, WorldError> {
    let config = WorldConfig {
        seed,
        ..WorldConfig::default()
    };
    Ok(generate_world(&Layout::reference(), &config)?.buildings)
}

/// Candidate coordinates `min + spacing/2, min + 3·spacing/2, …` below `max`.
fn grid_axis(min: f32, max: f32, spacing: f32) -> impl Iterator<Item = f32> {
    let first = min + spacing / 2.0;
    (0..)
        .map(move |i| first + spacing * i as f32)
        .take_while(move |v| *v < max)
}

/// A candidate is kept with probability `density`; draws lie in `[0, 1)`.
fn survives_thinning(draw: f64, density: f32) -> bool {
    draw < f64::from(density)
}

/// Core placement loop. Assumes `layout` and `config` were validated.
pub fn place_buildings(
    layout: &Layout,
    config: &GeneratorConfig,
    roads: &[RoadSegment],
    seed: u64,
) -> Vec<BuildingPlacement> {
    let mut rng = ParkMiller::new(seed);
    let mut buildings = Vec::new();
    // Grown footprints of accepted buildings, parallel to `buildings`.
    let mut occupied: Vec<Rect> = Vec::new();

    let corridors: Vec<Rect> = roads
        .iter()
        .map(|r| r.corridor().expand(config.road_margin))
        .collect();
    let reserved = layout.exclusion_boxes(config.reservation_margin);
    let max_jitter = config.grid_spacing * config.jitter;

    for district in &layout.districts {
        let b = district.bounds;
        for gx in grid_axis(b.min_x, b.max_x, config.grid_spacing) {
            for gz in grid_axis(b.min_z, b.max_z, config.grid_spacing) {
                let x = gx + (rng.next_f64() as f32 - 0.5) * 2.0 * max_jitter;
                let z = gz + (rng.next_f64() as f32 - 0.5) * 2.0 * max_jitter;

                if !survives_thinning(rng.next_f64(), district.density) {
                    continue;
                }

                let category = district.weights.choose(rng.next_f64());
                let profile = category.profile();
                let width = rng.range(profile.width.min, profile.width.max);
                let height = rng.range(profile.height.min, profile.height.max);
                let depth = rng.range(profile.depth.min, profile.depth.max);

                let grown = Rect::from_center(x, z, width, depth).expand(config.building_margin);
                let blocked = corridors.iter().any(|c| grown.intersects(c))
                    || reserved.iter().any(|r| grown.intersects(r))
                    || occupied.iter().any(|o| grown.intersects(o));
                if blocked {
                    continue;
                }

                let color = *rng.pick(profile.colors);
                let roof_color = *rng.pick(profile.roof_colors);
                let roof_style = *rng.pick(profile.roof_styles);

                buildings.push(BuildingPlacement {
                    id: format!("bldg-{}", buildings.len()),
                    category,
                    position: Vec3::new(x, height / 2.0, z),
                    width,
                    height,
                    depth,
                    color,
                    roof_color,
                    roof_style,
                    district: district.id.clone(),
                });
                occupied.push(grown);
            }
        }
    }

    buildings
}

/// Summary counts for a generated world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldStats {
    pub building_count: usize,
    pub road_count: usize,
    pub by_district: BTreeMap<String, usize>,
    pub by_category: BTreeMap<BuildingCategory, usize>,
    pub tallest: f32,
}

impl WorldGeometry {
    pub fn stats(&self) -> WorldStats {
        let mut stats = WorldStats {
            building_count: self.buildings.len(),
            road_count: self.roads.len(),
            ..WorldStats::default()
        };
        for b in &self.buildings {
            *stats.by_district.entry(b.district.clone()).or_default() += 1;
            *stats.by_category.entry(b.category).or_default() += 1;
            stats.tallest = stats.tallest.max(b.height);
        }
        stats
    }

    pub fn building(&self, id: &str) -> Option<&BuildingPlacement> {
        self.buildings.iter().find(|b| b.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{check_building_overlaps, check_reservations, check_road_clearance};
    use crate::layout::{CategoryWeights, District};

    fn reference() -> WorldGeometry {
        generate_world(&Layout::reference(), &WorldConfig::default()).unwrap()
    }

    #[test]
    fn grid_axis_is_cell_centred() {
        let xs: Vec<f32> = grid_axis(-100.0, 0.0, 25.0).collect();
        assert_eq!(xs, vec![-87.5, -62.5, -37.5, -12.5]);
    }

    #[test]
    fn same_seed_same_world() {
        assert_eq!(reference(), reference());
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate(1).unwrap();
        let b = generate(2).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn ids_are_sequential() {
        let world = reference();
        assert!(!world.buildings.is_empty());
        for (i, b) in world.buildings.iter().enumerate() {
            assert_eq!(b.id, format!("bldg-{}", i));
        }
    }

    #[test]
    fn buildings_rest_on_ground() {
        for b in &reference().buildings {
            assert!((b.position.y - b.height / 2.0).abs() < 1e-5);
        }
    }

    #[test]
    fn reference_world_satisfies_invariants() {
        let world = reference();
        let config = GeneratorConfig::default();
        let layout = Layout::reference();
        assert!(check_building_overlaps(&world.buildings, config.building_margin).is_empty());
        assert!(check_road_clearance(
            &world.buildings,
            &world.roads,
            config.building_margin,
            config.road_margin
        )
        .is_empty());
        assert!(check_reservations(
            &world.buildings,
            &layout.exclusion_boxes(config.reservation_margin),
            config.building_margin
        )
        .is_empty());
    }

    #[test]
    fn sizes_stay_in_category_ranges() {
        for b in &reference().buildings {
            let p = b.category.profile();
            assert!(b.width >= p.width.min && b.width <= p.width.max);
            assert!(b.height >= p.height.min && b.height <= p.height.max);
            assert!(b.depth >= p.depth.min && b.depth <= p.depth.max);
            assert!(p.colors.contains(&b.color));
            assert!(p.roof_colors.contains(&b.roof_color));
            assert!(p.roof_styles.contains(&b.roof_style));
        }
    }

    #[test]
    fn zero_density_district_is_empty() {
        let mut layout = Layout::reference();
        for d in &mut layout.districts {
            d.density = 0.0;
        }
        let world = generate_world(&layout, &WorldConfig::default()).unwrap();
        assert!(world.buildings.is_empty());
        assert!(!world.roads.is_empty());
    }

    #[test]
    fn thinning_bounds_are_exact() {
        assert!(!survives_thinning(0.0, 0.0));
        assert!(survives_thinning(0.0, 0.5));
        assert!(!survives_thinning(0.5, 0.5));
        assert!(survives_thinning(0.999_999, 1.0));
    }

    #[test]
    fn zero_density_stays_empty_across_seeds() {
        let mut layout = Layout::reference();
        for d in &mut layout.districts {
            d.density = 0.0;
        }
        for seed in 0..8 {
            let config = WorldConfig {
                seed,
                ..WorldConfig::default()
            };
            assert!(generate_world(&layout, &config).unwrap().buildings.is_empty());
        }
    }

    #[test]
    fn single_category_district() {
        let layout = Layout {
            districts: vec![District {
                id: "warehouses".into(),
                name: "Warehouses".into(),
                bounds: Rect::new(-190.0, -10.0, -190.0, -10.0),
                density: 1.0,
                weights: CategoryWeights {
                    residential: 0.0,
                    commercial: 0.0,
                    office: 0.0,
                    industrial: 1.0,
                },
                ground_tint: Color(0),
            }],
            landmarks: vec![],
            zones: vec![],
            skills: vec![],
        };
        let world = generate_world(&layout, &WorldConfig::default()).unwrap();
        assert!(!world.buildings.is_empty());
        assert!(world
            .buildings
            .iter()
            .all(|b| b.category == BuildingCategory::Industrial && b.district == "warehouses"));
    }

    #[test]
    fn malformed_layout_aborts() {
        let mut layout = Layout::reference();
        layout.districts[0].bounds = Rect::new(0.0, -10.0, 0.0, 10.0);
        let err = generate_world(&layout, &WorldConfig::default()).unwrap_err();
        assert!(matches!(err, WorldError::Layout(LayoutError::InvalidBounds { .. })));
    }

    #[test]
    fn malformed_config_aborts() {
        let mut config = WorldConfig::default();
        config.generator.grid_spacing = -5.0;
        let err = generate_world(&Layout::reference(), &config).unwrap_err();
        assert!(matches!(err, WorldError::Config(_)));
    }

    #[test]
    fn stats_add_up() {
        let world = reference();
        let stats = world.stats();
        assert_eq!(stats.building_count, world.buildings.len());
        assert_eq!(stats.by_district.values().sum::<usize>(), stats.building_count);
        assert_eq!(stats.by_category.values().sum::<usize>(), stats.building_count);
        assert!(stats.tallest > 0.0);
        assert!(world.building("bldg-0").is_some());
    }
}
