//! Axis-aligned rectangles on the ground plane, plus validation of a
//! generated world against its placement invariants.
//!
//! Validation functions take plain data and return a list of
//! [`ValidationError`]s; an empty list means the world is sound.

use serde::{Deserialize, Serialize};

use crate::generation::BuildingPlacement;
use crate::roads::RoadSegment;

/// Rectangle on the XZ plane.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
}

impl Rect {
    pub fn new(min_x: f32, max_x: f32, min_z: f32, max_z: f32) -> Self {
        Self {
            min_x,
            max_x,
            min_z,
            max_z,
        }
    }

    /// Rectangle of the given size centred on `(cx, cz)`.
    pub fn from_center(cx: f32, cz: f32, width: f32, depth: f32) -> Self {
        let hw = width / 2.0;
        let hd = depth / 2.0;
        Self::new(cx - hw, cx + hw, cz - hd, cz + hd)
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn depth(&self) -> f32 {
        self.max_z - self.min_z
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_z + self.max_z) / 2.0,
        )
    }

    /// Grow every side by `margin`.
    pub fn expand(&self, margin: f32) -> Self {
        Self::new(
            self.min_x - margin,
            self.max_x + margin,
            self.min_z - margin,
            self.max_z + margin,
        )
    }

    /// Inclusive point containment.
    pub fn contains(&self, x: f32, z: f32) -> bool {
        x >= self.min_x && x <= self.max_x && z >= self.min_z && z <= self.max_z
    }

    /// Open-interval overlap test: rectangles that only touch along an
    /// edge do not intersect.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_z < other.max_z
            && other.min_z < self.max_z
    }

    /// Finite and strictly positive in both dimensions.
    pub fn is_well_formed(&self) -> bool {
        [self.min_x, self.max_x, self.min_z, self.max_z]
            .iter()
            .all(|v| v.is_finite())
            && self.min_x < self.max_x
            && self.min_z < self.max_z
    }
}

/// A world validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Error severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

/// Check that no two buildings' footprints, each grown by `margin`,
/// intersect.
pub fn check_building_overlaps(
    buildings: &[BuildingPlacement],
    margin: f32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let rects: Vec<Rect> = buildings
        .iter()
        .map(|b| b.footprint().expand(margin))
        .collect();
    for i in 0..rects.len() {
        for j in (i + 1)..rects.len() {
            if rects[i].intersects(&rects[j]) {
                errors.push(ValidationError {
                    category: "building_overlap",
                    severity: Severity::Error,
                    message: format!(
                        "{} overlaps {} (margin {})",
                        buildings[i].id, buildings[j].id, margin
                    ),
                });
            }
        }
    }
    errors
}

/// Check that no grown building footprint reaches into a grown road
/// corridor.
pub fn check_road_clearance(
    buildings: &[BuildingPlacement],
    roads: &[RoadSegment],
    building_margin: f32,
    road_margin: f32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let corridors: Vec<Rect> = roads
        .iter()
        .map(|r| r.corridor().expand(road_margin))
        .collect();
    for b in buildings {
        let fp = b.footprint().expand(building_margin);
        for (road, corridor) in roads.iter().zip(&corridors) {
            if fp.intersects(corridor) {
                errors.push(ValidationError {
                    category: "road_clearance",
                    severity: Severity::Error,
                    message: format!("{} encroaches on road {}", b.id, road.id),
                });
            }
        }
    }
    errors
}

/// Check that no grown building footprint covers a reserved area.
pub fn check_reservations(
    buildings: &[BuildingPlacement],
    exclusions: &[Rect],
    building_margin: f32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for b in buildings {
        let fp = b.footprint().expand(building_margin);
        for (i, ex) in exclusions.iter().enumerate() {
            if fp.intersects(ex) {
                errors.push(ValidationError {
                    category: "reservation",
                    severity: Severity::Error,
                    message: format!("{} covers reserved area #{}", b.id, i),
                });
            }
        }
    }
    errors
}

/// Flag buildings whose centre falls outside the world extent. Jitter can
/// push a candidate slightly past a district edge, which is harmless, but
/// leaving the world entirely is not.
pub fn check_within_extent(buildings: &[BuildingPlacement], extent: f32) -> Vec<ValidationError> {
    let world = Rect::new(-extent, extent, -extent, extent);
    buildings
        .iter()
        .filter(|b| !world.contains(b.position.x, b.position.z))
        .map(|b| ValidationError {
            category: "extent",
            severity: Severity::Warning,
            message: format!(
                "{} centre ({:.1}, {:.1}) is outside ±{}",
                b.id, b.position.x, b.position.z, extent
            ),
        })
        .collect()
}
