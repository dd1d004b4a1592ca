//! Authored layout tables: districts, landmarks, portfolio zones and
//! skill stars.
//!
//! These are pure data. [`Layout::reference`] returns the hand-authored
//! city; [`Layout::validate`] rejects malformed tables before the
//! generator touches them, so a broken table aborts world construction
//! instead of silently producing an empty city.
//!
//! # Reference districts
//!
//! | District | x | z | Density | Mix |
//! |----------|---|---|---------|-----|
//! | `suburbs` | −400..−100 | −400..400 | 0.40 | mostly residential |
//! | `old-town` | −100..200 | −400..−200 | 0.60 | residential / commercial |
//! | `downtown` | −100..200 | −200..100 | 0.70 | commercial / office |
//! | `tech-park` | −100..400 | 100..400 | 0.55 | office |
//! | `harbor` | 200..400 | −400..100 | 0.50 | industrial |

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use glam::Vec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::Rect;

/// Packed `0xRRGGBB` colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Color(pub u32);

impl Color {
    pub fn rgb(self) -> (u8, u8, u8) {
        (
            ((self.0 >> 16) & 0xff) as u8,
            ((self.0 >> 8) & 0xff) as u8,
            (self.0 & 0xff) as u8,
        )
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:06x}", self.0)
    }
}

// ── Building categories ─────────────────────────────────────────────────

/// The four procedural building categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildingCategory {
    Residential,
    Commercial,
    Office,
    Industrial,
}

/// Roof shape drawn on top of a building box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoofStyle {
    Flat,
    Peaked,
    Stepped,
}

/// Inclusive-exclusive size range in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeRange {
    pub min: f32,
    pub max: f32,
}

/// Dimensions and palette for one building category.
#[derive(Debug)]
pub struct CategoryProfile {
    pub width: SizeRange,
    pub height: SizeRange,
    pub depth: SizeRange,
    pub colors: &'static [Color],
    pub roof_colors: &'static [Color],
    /// Repeated entries weight the pick.
    pub roof_styles: &'static [RoofStyle],
}

const RESIDENTIAL: CategoryProfile = CategoryProfile {
    width: SizeRange { min: 8.0, max: 16.0 },
    height: SizeRange { min: 6.0, max: 18.0 },
    depth: SizeRange { min: 8.0, max: 16.0 },
    colors: &[
        Color(0xe8d5b7),
        Color(0xd9cab3),
        Color(0xc9a27e),
        Color(0xf2e8cf),
        Color(0xb7c4cf),
    ],
    roof_colors: &[Color(0x8b3a3a), Color(0x5c4033), Color(0x6b705c)],
    roof_styles: &[RoofStyle::Peaked, RoofStyle::Peaked, RoofStyle::Flat],
};

const COMMERCIAL: CategoryProfile = CategoryProfile {
    width: SizeRange { min: 12.0, max: 22.0 },
    height: SizeRange { min: 10.0, max: 40.0 },
    depth: SizeRange { min: 12.0, max: 22.0 },
    colors: &[
        Color(0x9fb1bc),
        Color(0xd4a373),
        Color(0xe9edc9),
        Color(0x8d99ae),
    ],
    roof_colors: &[Color(0x3d405b), Color(0x495057)],
    roof_styles: &[RoofStyle::Flat, RoofStyle::Flat, RoofStyle::Stepped],
};

const OFFICE: CategoryProfile = CategoryProfile {
    width: SizeRange { min: 14.0, max: 26.0 },
    height: SizeRange { min: 30.0, max: 90.0 },
    depth: SizeRange { min: 14.0, max: 26.0 },
    colors: &[
        Color(0x6c8ebf),
        Color(0x9db4c0),
        Color(0x5c6b73),
        Color(0xc2dfe3),
    ],
    roof_colors: &[Color(0x253237), Color(0x2b2d42)],
    roof_styles: &[RoofStyle::Flat, RoofStyle::Stepped],
};

const INDUSTRIAL: CategoryProfile = CategoryProfile {
    width: SizeRange { min: 18.0, max: 28.0 },
    height: SizeRange { min: 8.0, max: 16.0 },
    depth: SizeRange { min: 18.0, max: 28.0 },
    colors: &[Color(0x7f7f7f), Color(0xa68a64), Color(0x656d4a)],
    roof_colors: &[Color(0x414833), Color(0x333533)],
    roof_styles: &[RoofStyle::Flat, RoofStyle::Peaked],
};

impl BuildingCategory {
    /// Fixed order used by weighted selection.
    pub const ALL: [BuildingCategory; 4] = [
        BuildingCategory::Residential,
        BuildingCategory::Commercial,
        BuildingCategory::Office,
        BuildingCategory::Industrial,
    ];

    pub fn profile(self) -> &'static CategoryProfile {
        match self {
            BuildingCategory::Residential => &RESIDENTIAL,
            BuildingCategory::Commercial => &COMMERCIAL,
            BuildingCategory::Office => &OFFICE,
            BuildingCategory::Industrial => &INDUSTRIAL,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BuildingCategory::Residential => "residential",
            BuildingCategory::Commercial => "commercial",
            BuildingCategory::Office => "office",
            BuildingCategory::Industrial => "industrial",
        }
    }
}

/// Relative weight of each building category within a district.
/// Weights need not sum to one; selection normalises by the total.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryWeights {
    pub residential: f32,
    pub commercial: f32,
    pub office: f32,
    pub industrial: f32,
}

impl CategoryWeights {
    pub fn get(&self, category: BuildingCategory) -> f32 {
        match category {
            BuildingCategory::Residential => self.residential,
            BuildingCategory::Commercial => self.commercial,
            BuildingCategory::Office => self.office,
            BuildingCategory::Industrial => self.industrial,
        }
    }

    pub fn total(&self) -> f32 {
        BuildingCategory::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Weighted choice: `roll` is a draw in `[0, 1)`, scaled by the total
    /// weight and walked down the categories in [`BuildingCategory::ALL`]
    /// order. Float residue past the last category falls back to
    /// commercial.
    pub fn choose(&self, roll: f64) -> BuildingCategory {
        let mut remaining = roll * f64::from(self.total());
        for category in BuildingCategory::ALL {
            remaining -= f64::from(self.get(category));
            if remaining < 0.0 {
                return category;
            }
        }
        BuildingCategory::Commercial
    }
}

// ── Authored entities ───────────────────────────────────────────────────

/// A rectangular region with its own density and building mix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct District {
    pub id: String,
    pub name: String,
    pub bounds: Rect,
    /// Probability that a grid point survives thinning, in `[0, 1]`.
    pub density: f32,
    pub weights: CategoryWeights,
    pub ground_tint: Color,
}

/// A hand-placed structure. The generator only uses it as a reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub id: String,
    pub name: String,
    pub position: Vec3,
    pub height: f32,
    pub footprint_width: f32,
    pub footprint_depth: f32,
    pub district: String,
}

impl Landmark {
    pub fn footprint(&self) -> Rect {
        Rect::from_center(
            self.position.x,
            self.position.z,
            self.footprint_width,
            self.footprint_depth,
        )
    }
}

/// Portfolio zones, in authored order.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum ZoneId {
    #[default]
    CentralPlaza,
    MemoryLane,
    SkillGarden,
    ProjectDistrict,
    OpenSourceDocks,
    ContactPier,
    Arcade,
}

impl ZoneId {
    pub const ALL: [ZoneId; 7] = [
        ZoneId::CentralPlaza,
        ZoneId::MemoryLane,
        ZoneId::SkillGarden,
        ZoneId::ProjectDistrict,
        ZoneId::OpenSourceDocks,
        ZoneId::ContactPier,
        ZoneId::Arcade,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ZoneId::CentralPlaza => "central-plaza",
            ZoneId::MemoryLane => "memory-lane",
            ZoneId::SkillGarden => "skill-garden",
            ZoneId::ProjectDistrict => "project-district",
            ZoneId::OpenSourceDocks => "open-source-docks",
            ZoneId::ContactPier => "contact-pier",
            ZoneId::Arcade => "arcade",
        }
    }
}

impl fmt::Display for ZoneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised zone name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown zone `{0}`")]
pub struct UnknownZone(pub String);

impl FromStr for ZoneId {
    type Err = UnknownZone;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneId::ALL
            .into_iter()
            .find(|z| z.as_str() == s)
            .ok_or_else(|| UnknownZone(s.to_string()))
    }
}

/// A named gameplay area. Doubles as a generator reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioZone {
    pub id: ZoneId,
    pub name: String,
    pub position: Vec3,
    pub bounds: Rect,
    pub color: Color,
    /// Where the player lands when teleported into this zone.
    pub spawn: Vec3,
}

/// Portfolio skill groupings for collectible stars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SkillCategory {
    Language,
    Frontend,
    Backend,
    Infrastructure,
}

/// A collectible tied to one portfolio skill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkillStar {
    pub id: String,
    pub name: String,
    pub category: SkillCategory,
    pub position: Vec3,
}

/// Complete authored layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub districts: Vec<District>,
    pub landmarks: Vec<Landmark>,
    pub zones: Vec<PortfolioZone>,
    pub skills: Vec<SkillStar>,
}

// ── Validation ──────────────────────────────────────────────────────────

/// A malformed layout table entry.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("layout has no districts")]
    NoDistricts,
    #[error("{kind} `{id}` has malformed bounds {bounds:?}")]
    InvalidBounds {
        kind: &'static str,
        id: String,
        bounds: Rect,
    },
    #[error("district `{id}` density {density} is outside [0, 1]")]
    DensityOutOfRange { id: String, density: f32 },
    #[error("district `{id}` has negative or all-zero category weights")]
    InvalidWeights { id: String },
    #[error("duplicate {kind} id `{id}`")]
    DuplicateId { kind: &'static str, id: String },
    #[error("landmark `{landmark}` references unknown district `{district}`")]
    UnknownDistrict { landmark: String, district: String },
    #[error("landmark `{id}` needs a positive footprint and height")]
    InvalidFootprint { id: String },
}

fn check_unique<'a>(
    kind: &'static str,
    ids: impl IntoIterator<Item = &'a str>,
) -> Result<(), LayoutError> {
    let mut seen = HashSet::new();
    for id in ids {
        if !seen.insert(id) {
            return Err(LayoutError::DuplicateId {
                kind,
                id: id.to_string(),
            });
        }
    }
    Ok(())
}

impl Layout {
    /// Check every table. Called by the generator before any draw.
    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.districts.is_empty() {
            return Err(LayoutError::NoDistricts);
        }
        check_unique("district", self.districts.iter().map(|d| d.id.as_str()))?;
        for d in &self.districts {
            if !d.bounds.is_well_formed() {
                return Err(LayoutError::InvalidBounds {
                    kind: "district",
                    id: d.id.clone(),
                    bounds: d.bounds,
                });
            }
            if !(0.0..=1.0).contains(&d.density) {
                return Err(LayoutError::DensityOutOfRange {
                    id: d.id.clone(),
                    density: d.density,
                });
            }
            let weights_ok = BuildingCategory::ALL
                .iter()
                .all(|c| d.weights.get(*c).is_finite() && d.weights.get(*c) >= 0.0)
                && d.weights.total() > 0.0;
            if !weights_ok {
                return Err(LayoutError::InvalidWeights { id: d.id.clone() });
            }
        }

        check_unique("landmark", self.landmarks.iter().map(|l| l.id.as_str()))?;
        for l in &self.landmarks {
            if !self.districts.iter().any(|d| d.id == l.district) {
                return Err(LayoutError::UnknownDistrict {
                    landmark: l.id.clone(),
                    district: l.district.clone(),
                });
            }
            if !l.footprint().is_well_formed() || !(l.height.is_finite() && l.height > 0.0) {
                return Err(LayoutError::InvalidFootprint { id: l.id.clone() });
            }
        }

        check_unique("zone", self.zones.iter().map(|z| z.id.as_str()))?;
        for z in &self.zones {
            if !z.bounds.is_well_formed() {
                return Err(LayoutError::InvalidBounds {
                    kind: "zone",
                    id: z.id.to_string(),
                    bounds: z.bounds,
                });
            }
        }

        check_unique("skill", self.skills.iter().map(|s| s.id.as_str()))
    }

    /// Look up an authored zone.
    pub fn zone(&self, id: ZoneId) -> Option<&PortfolioZone> {
        self.zones.iter().find(|z| z.id == id)
    }

    pub fn district(&self, id: &str) -> Option<&District> {
        self.districts.iter().find(|d| d.id == id)
    }

    /// Areas the generator must leave empty: landmark footprints and zone
    /// bounds, each grown by `margin`.
    pub fn exclusion_boxes(&self, margin: f32) -> Vec<Rect> {
        self.landmarks
            .iter()
            .map(|l| l.footprint().expand(margin))
            .chain(self.zones.iter().map(|z| z.bounds.expand(margin)))
            .collect()
    }

    /// The hand-authored reference city.
    pub fn reference() -> Self {
        Self {
            districts: reference_districts(),
            landmarks: reference_landmarks(),
            zones: reference_zones(),
            skills: reference_skills(),
        }
    }
}

fn district(
    id: &str,
    name: &str,
    bounds: Rect,
    density: f32,
    weights: [f32; 4],
    ground_tint: u32,
) -> District {
    District {
        id: id.to_string(),
        name: name.to_string(),
        bounds,
        density,
        weights: CategoryWeights {
            residential: weights[0],
            commercial: weights[1],
            office: weights[2],
            industrial: weights[3],
        },
        ground_tint: Color(ground_tint),
    }
}

fn reference_districts() -> Vec<District> {
    vec![
        district(
            "suburbs",
            "Suburbs",
            Rect::new(-400.0, -100.0, -400.0, 400.0),
            0.4,
            [0.8, 0.15, 0.05, 0.0],
            0x7fa05a,
        ),
        district(
            "old-town",
            "Old Town",
            Rect::new(-100.0, 200.0, -400.0, -200.0),
            0.6,
            [0.5, 0.4, 0.1, 0.0],
            0xa89f91,
        ),
        district(
            "downtown",
            "Downtown",
            Rect::new(-100.0, 200.0, -200.0, 100.0),
            0.7,
            [0.1, 0.45, 0.4, 0.05],
            0x8d8d8d,
        ),
        district(
            "tech-park",
            "Tech Park",
            Rect::new(-100.0, 400.0, 100.0, 400.0),
            0.55,
            [0.05, 0.2, 0.7, 0.05],
            0x6f9e8f,
        ),
        district(
            "harbor",
            "Harbor",
            Rect::new(200.0, 400.0, -400.0, 100.0),
            0.5,
            [0.05, 0.15, 0.1, 0.7],
            0x6b7b8c,
        ),
    ]
}

fn landmark(
    id: &str,
    name: &str,
    position: Vec3,
    height: f32,
    footprint: (f32, f32),
    district: &str,
) -> Landmark {
    Landmark {
        id: id.to_string(),
        name: name.to_string(),
        position,
        height,
        footprint_width: footprint.0,
        footprint_depth: footprint.1,
        district: district.to_string(),
    }
}

fn reference_landmarks() -> Vec<Landmark> {
    vec![
        landmark(
            "clock-tower",
            "Clock Tower",
            Vec3::new(150.0, 0.0, -150.0),
            80.0,
            (20.0, 20.0),
            "downtown",
        ),
        landmark(
            "observatory",
            "Observatory",
            Vec3::new(150.0, 0.0, 250.0),
            45.0,
            (30.0, 30.0),
            "tech-park",
        ),
        landmark(
            "lighthouse",
            "Lighthouse",
            Vec3::new(370.0, 0.0, -370.0),
            60.0,
            (12.0, 12.0),
            "harbor",
        ),
        landmark(
            "old-library",
            "Old Library",
            Vec3::new(50.0, 0.0, -300.0),
            25.0,
            (25.0, 35.0),
            "old-town",
        ),
        landmark(
            "water-tower",
            "Water Tower",
            Vec3::new(-250.0, 0.0, 250.0),
            35.0,
            (10.0, 10.0),
            "suburbs",
        ),
    ]
}

fn zone(id: ZoneId, name: &str, bounds: Rect, color: u32, spawn: Vec3) -> PortfolioZone {
    let (cx, cz) = bounds.center();
    PortfolioZone {
        id,
        name: name.to_string(),
        position: Vec3::new(cx, 0.0, cz),
        bounds,
        color: Color(color),
        spawn,
    }
}

fn reference_zones() -> Vec<PortfolioZone> {
    vec![
        zone(
            ZoneId::CentralPlaza,
            "Central Plaza",
            Rect::new(-20.0, 20.0, -20.0, 20.0),
            0xf4a261,
            Vec3::new(0.0, 2.0, 5.0),
        ),
        zone(
            ZoneId::MemoryLane,
            "Memory Lane",
            Rect::new(-25.0, 25.0, -80.0, -25.0),
            0xe76f51,
            Vec3::new(0.0, 2.0, -30.0),
        ),
        zone(
            ZoneId::SkillGarden,
            "Skill Garden",
            Rect::new(-90.0, -30.0, 30.0, 90.0),
            0x2a9d8f,
            Vec3::new(-60.0, 2.0, 35.0),
        ),
        zone(
            ZoneId::ProjectDistrict,
            "Project District",
            Rect::new(60.0, 120.0, -90.0, -30.0),
            0x264653,
            Vec3::new(90.0, 2.0, -35.0),
        ),
        zone(
            ZoneId::OpenSourceDocks,
            "Open Source Docks",
            Rect::new(270.0, 330.0, -280.0, -220.0),
            0x457b9d,
            Vec3::new(300.0, 2.0, -225.0),
        ),
        zone(
            ZoneId::ContactPier,
            "Contact Pier",
            Rect::new(300.0, 360.0, 20.0, 80.0),
            0xa8dadc,
            Vec3::new(330.0, 2.0, 25.0),
        ),
        zone(
            ZoneId::Arcade,
            "Arcade",
            Rect::new(-280.0, -220.0, -180.0, -120.0),
            0x9b5de5,
            Vec3::new(-250.0, 2.0, -125.0),
        ),
    ]
}

/// Radius of the ring of stars in the skill garden.
const SKILL_RING_RADIUS: f32 = 20.0;
/// Stars float at roughly chest height.
const SKILL_STAR_HEIGHT: f32 = 1.5;

fn reference_skills() -> Vec<SkillStar> {
    let skills = [
        ("rust", "Rust", SkillCategory::Language),
        ("typescript", "TypeScript", SkillCategory::Language),
        ("python", "Python", SkillCategory::Language),
        ("go", "Go", SkillCategory::Language),
        ("react", "React", SkillCategory::Frontend),
        ("threejs", "Three.js", SkillCategory::Frontend),
        ("nextjs", "Next.js", SkillCategory::Frontend),
        ("node", "Node.js", SkillCategory::Backend),
        ("postgres", "PostgreSQL", SkillCategory::Backend),
        ("docker", "Docker", SkillCategory::Infrastructure),
        ("kubernetes", "Kubernetes", SkillCategory::Infrastructure),
        ("aws", "AWS", SkillCategory::Infrastructure),
    ];
    let (cx, cz) = (-60.0_f32, 60.0_f32);
    let step = std::f32::consts::TAU / skills.len() as f32;
    skills
        .iter()
        .enumerate()
        .map(|(i, (id, name, category))| {
            let angle = step * i as f32;
            SkillStar {
                id: id.to_string(),
                name: name.to_string(),
                category: *category,
                position: Vec3::new(
                    cx + SKILL_RING_RADIUS * angle.cos(),
                    SKILL_STAR_HEIGHT,
                    cz + SKILL_RING_RADIUS * angle.sin(),
                ),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_layout_is_valid() {
        let layout = Layout::reference();
        assert!(layout.validate().is_ok());
        assert_eq!(layout.zones.len(), ZoneId::ALL.len());
        assert_eq!(layout.skills.len(), 12);
    }

    #[test]
    fn downtown_matches_reference_bounds() {
        let layout = Layout::reference();
        let downtown = layout.district("downtown").unwrap();
        assert_eq!(downtown.bounds, Rect::new(-100.0, 200.0, -200.0, 100.0));
        assert_eq!(downtown.density, 0.7);
    }

    #[test]
    fn zones_are_authored_in_enum_order() {
        let layout = Layout::reference();
        let ids: Vec<ZoneId> = layout.zones.iter().map(|z| z.id).collect();
        assert_eq!(ids, ZoneId::ALL.to_vec());
    }

    #[test]
    fn zone_spawns_lie_inside_their_zone() {
        for z in &Layout::reference().zones {
            assert!(
                z.bounds.contains(z.spawn.x, z.spawn.z),
                "{} spawn outside bounds",
                z.id
            );
        }
    }

    #[test]
    fn skill_stars_are_far_enough_apart() {
        // Two stars closer than the collection diameter would let one
        // step collect either of them.
        let skills = Layout::reference().skills;
        for i in 0..skills.len() {
            for j in (i + 1)..skills.len() {
                assert!(skills[i].position.distance(skills[j].position) > 10.0);
            }
        }
    }

    #[test]
    fn inverted_district_bounds_rejected() {
        let mut layout = Layout::reference();
        layout.districts[0].bounds = Rect::new(100.0, -100.0, 0.0, 50.0);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::InvalidBounds { kind: "district", .. })
        ));
    }

    #[test]
    fn density_above_one_rejected() {
        let mut layout = Layout::reference();
        layout.districts[1].density = 1.5;
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::DensityOutOfRange { .. })
        ));
    }

    #[test]
    fn zero_weights_rejected() {
        let mut layout = Layout::reference();
        layout.districts[2].weights = CategoryWeights {
            residential: 0.0,
            commercial: 0.0,
            office: 0.0,
            industrial: 0.0,
        };
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::InvalidWeights { .. })
        ));
    }

    #[test]
    fn dangling_landmark_district_rejected() {
        let mut layout = Layout::reference();
        layout.landmarks[0].district = "atlantis".into();
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::UnknownDistrict { .. })
        ));
    }

    #[test]
    fn duplicate_district_rejected() {
        let mut layout = Layout::reference();
        let copy = layout.districts[0].clone();
        layout.districts.push(copy);
        assert!(matches!(
            layout.validate(),
            Err(LayoutError::DuplicateId { kind: "district", .. })
        ));
    }

    #[test]
    fn empty_layout_rejected() {
        let mut layout = Layout::reference();
        layout.districts.clear();
        layout.landmarks.clear();
        assert_eq!(layout.validate(), Err(LayoutError::NoDistricts));
    }

    #[test]
    fn weighted_choice_walks_categories_in_order() {
        let w = CategoryWeights {
            residential: 1.0,
            commercial: 1.0,
            office: 1.0,
            industrial: 1.0,
        };
        assert_eq!(w.choose(0.0), BuildingCategory::Residential);
        assert_eq!(w.choose(0.3), BuildingCategory::Commercial);
        assert_eq!(w.choose(0.6), BuildingCategory::Office);
        assert_eq!(w.choose(0.99), BuildingCategory::Industrial);
    }

    #[test]
    fn weighted_choice_skips_zero_weights() {
        let w = CategoryWeights {
            residential: 0.0,
            commercial: 0.0,
            office: 2.0,
            industrial: 0.0,
        };
        for roll in [0.0, 0.25, 0.5, 0.999] {
            assert_eq!(w.choose(roll), BuildingCategory::Office);
        }
    }

    #[test]
    fn zone_names_round_trip_through_from_str() {
        for z in ZoneId::ALL {
            assert_eq!(z.as_str().parse::<ZoneId>(), Ok(z));
        }
        assert!("moon-base".parse::<ZoneId>().is_err());
    }

    #[test]
    fn exclusions_cover_landmarks_and_zones() {
        let layout = Layout::reference();
        let boxes = layout.exclusion_boxes(10.0);
        assert_eq!(boxes.len(), layout.landmarks.len() + layout.zones.len());
        // Clock tower 20×20 at (150, -150) grown by 10.
        assert_eq!(boxes[0], Rect::new(130.0, 170.0, -170.0, -130.0));
    }

    #[test]
    fn color_unpacks_channels() {
        assert_eq!(Color(0x123456).rgb(), (0x12, 0x34, 0x56));
        assert_eq!(Color(0xabcdef).to_string(), "#abcdef");
    }
}
