//! Road network: a regular lattice of boulevards with secondary streets
//! in between.
//!
//! Both families span the whole world on both axes. A secondary street
//! whose slot coincides with a boulevard is skipped, so every
//! axis-position slot carries at most one road.

use serde::{Deserialize, Serialize};

use crate::config::RoadConfig;
use crate::geometry::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoadCategory {
    Boulevard,
    Secondary,
}

/// Direction a road runs in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    /// Runs along X; `position` is a z coordinate.
    X,
    /// Runs along Z; `position` is an x coordinate.
    Z,
}

impl Axis {
    fn tag(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Z => "z",
        }
    }
}

/// One straight road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: String,
    pub category: RoadCategory,
    pub axis: Axis,
    /// Fixed cross-axis coordinate.
    pub position: f32,
    pub start: f32,
    pub end: f32,
    pub width: f32,
}

impl RoadSegment {
    /// Paved area of the road.
    pub fn corridor(&self) -> Rect {
        let hw = self.width / 2.0;
        match self.axis {
            Axis::X => Rect::new(self.start, self.end, self.position - hw, self.position + hw),
            Axis::Z => Rect::new(self.position - hw, self.position + hw, self.start, self.end),
        }
    }
}

/// Slot positions `-extent, -extent + spacing, …` up to `extent`.
/// Computed from an integer index so positions do not drift.
fn slots(extent: f32, spacing: f32) -> impl Iterator<Item = (usize, f32)> {
    let count = (extent * 2.0 / spacing + 1e-4).floor() as usize;
    (0..=count).map(move |i| (i, -extent + spacing * i as f32))
}

fn on_boulevard(position: f32, extent: f32, boulevard_spacing: f32) -> bool {
    let k = ((position + extent) / boulevard_spacing).round();
    ((position + extent) - k * boulevard_spacing).abs() < 1e-3
}

/// Build the full network: boulevards on X then Z, followed by secondary
/// streets on X then Z.
pub fn generate_roads(config: &RoadConfig, extent: f32) -> Vec<RoadSegment> {
    let mut roads = Vec::new();

    for axis in [Axis::X, Axis::Z] {
        for (i, position) in slots(extent, config.boulevard_spacing) {
            roads.push(RoadSegment {
                id: format!("boulevard-{}-{}", axis.tag(), i),
                category: RoadCategory::Boulevard,
                axis,
                position,
                start: -extent,
                end: extent,
                width: config.boulevard_width,
            });
        }
    }

    for axis in [Axis::X, Axis::Z] {
        for (i, position) in slots(extent, config.secondary_spacing) {
            if on_boulevard(position, extent, config.boulevard_spacing) {
                continue;
            }
            roads.push(RoadSegment {
                id: format!("secondary-{}-{}", axis.tag(), i),
                category: RoadCategory::Secondary,
                axis,
                position,
                start: -extent,
                end: extent,
                width: config.secondary_width,
            });
        }
    }

    roads
}
