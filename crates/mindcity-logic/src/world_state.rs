//! Persistent gameplay state: zones, skills, secrets and mini-games.
//!
//! [`WorldState`] is a bag of small independent state machines. Every
//! operation is total: redundant calls (collecting a collected skill,
//! re-entering the current zone, ending a game that is not running) are
//! no-ops rather than errors.

use std::collections::{BTreeMap, BTreeSet};

use glam::Vec3;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::layout::{PortfolioZone, SkillStar, ZoneId};

/// Distance (3D, Euclidean) within which a skill star is collected.
pub const SKILL_COLLECT_RADIUS: f32 = 5.0;

/// The persisted subset of [`WorldState`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldProgress {
    pub visited_zones: BTreeSet<ZoneId>,
    pub collected_skills: BTreeSet<String>,
    pub secrets_found: BTreeSet<String>,
    /// Seconds of play across all sessions.
    pub total_play_time: f64,
    pub mini_game_scores: BTreeMap<String, u32>,
    /// Horizontal distance walked across all sessions.
    pub distance_travelled: f64,
}

/// Outcome of ending a mini-game session.
#[derive(Debug, Clone, PartialEq)]
pub struct MiniGameResult {
    pub game: String,
    pub score: Option<u32>,
    /// The score beat (or set) the stored best.
    pub new_best: bool,
}

/// Session-scoped world state. The current zone and active mini-game
/// are not persisted; everything in [`WorldProgress`] is.
#[derive(Debug, Clone, PartialEq)]
pub struct WorldState {
    current_zone: ZoneId,
    active_mini_game: Option<String>,
    progress: WorldProgress,
}

impl Default for WorldState {
    fn default() -> Self {
        Self::new(ZoneId::default())
    }
}

impl WorldState {
    /// Fresh state standing in `start`, which counts as visited.
    pub fn new(start: ZoneId) -> Self {
        let mut progress = WorldProgress::default();
        progress.visited_zones.insert(start);
        Self {
            current_zone: start,
            active_mini_game: None,
            progress,
        }
    }

    /// Resume from persisted progress, standing in `start`.
    pub fn from_progress(start: ZoneId, mut progress: WorldProgress) -> Self {
        progress.visited_zones.insert(start);
        if !progress.total_play_time.is_finite() || progress.total_play_time < 0.0 {
            progress.total_play_time = 0.0;
        }
        if !progress.distance_travelled.is_finite() || progress.distance_travelled < 0.0 {
            progress.distance_travelled = 0.0;
        }
        Self {
            current_zone: start,
            active_mini_game: None,
            progress,
        }
    }

    pub fn progress(&self) -> &WorldProgress {
        &self.progress
    }

    // ── Zones ──────────────────────────────────────────────────────────

    pub fn current_zone(&self) -> ZoneId {
        self.current_zone
    }

    pub fn visited_zones(&self) -> &BTreeSet<ZoneId> {
        &self.progress.visited_zones
    }

    pub fn has_visited(&self, zone: ZoneId) -> bool {
        self.progress.visited_zones.contains(&zone)
    }

    /// Explicit transition (portal). Returns the new zone if it changed.
    pub fn set_zone(&mut self, zone: ZoneId) -> Option<ZoneId> {
        self.progress.visited_zones.insert(zone);
        if zone == self.current_zone {
            return None;
        }
        debug!("Zone {} -> {}", self.current_zone, zone);
        self.current_zone = zone;
        Some(zone)
    }

    /// Position-based transition: the first zone (authored order) whose
    /// bounds contain `(x, z)` becomes current. Outside every zone the
    /// current zone is kept.
    pub fn detect_zone(&mut self, x: f32, z: f32, zones: &[PortfolioZone]) -> Option<ZoneId> {
        let hit = zones.iter().find(|zone| zone.bounds.contains(x, z))?;
        self.set_zone(hit.id)
    }

    // ── Skills ─────────────────────────────────────────────────────────

    pub fn collected_skills(&self) -> &BTreeSet<String> {
        &self.progress.collected_skills
    }

    pub fn has_skill(&self, id: &str) -> bool {
        self.progress.collected_skills.contains(id)
    }

    /// Collect the first uncollected star within [`SKILL_COLLECT_RADIUS`]
    /// of `position`. At most one star per call.
    pub fn try_collect<'a>(
        &mut self,
        position: Vec3,
        skills: &'a [SkillStar],
    ) -> Option<&'a SkillStar> {
        let star = skills.iter().find(|s| {
            !self.progress.collected_skills.contains(&s.id)
                && s.position.distance(position) <= SKILL_COLLECT_RADIUS
        })?;
        self.progress.collected_skills.insert(star.id.clone());
        debug!("Collected skill {}", star.id);
        Some(star)
    }

    // ── Secrets ────────────────────────────────────────────────────────

    /// Record a secret. Returns `true` the first time only.
    pub fn discover_secret(&mut self, id: &str) -> bool {
        if self.progress.secrets_found.contains(id) {
            return false;
        }
        self.progress.secrets_found.insert(id.to_string());
        true
    }

    pub fn has_secret(&self, id: &str) -> bool {
        self.progress.secrets_found.contains(id)
    }

    pub fn secrets_found(&self) -> &BTreeSet<String> {
        &self.progress.secrets_found
    }

    // ── Mini-games ─────────────────────────────────────────────────────

    pub fn active_mini_game(&self) -> Option<&str> {
        self.active_mini_game.as_deref()
    }

    /// Start a session. A game already running is displaced without a
    /// score (last start wins); its id is returned.
    pub fn start_mini_game(&mut self, game: &str) -> Option<String> {
        let displaced = self.active_mini_game.replace(game.to_string());
        if let Some(old) = &displaced {
            debug!("Mini-game {} displaced by {}", old, game);
        }
        displaced
    }

    /// End the running session, keeping the best score per game.
    /// Returns `None` when nothing was running.
    pub fn end_mini_game(&mut self, score: Option<u32>) -> Option<MiniGameResult> {
        let game = self.active_mini_game.take()?;
        let mut new_best = false;
        if let Some(score) = score {
            match self.progress.mini_game_scores.get_mut(&game) {
                Some(best) => {
                    new_best = score > *best;
                    *best = (*best).max(score);
                }
                None => {
                    self.progress.mini_game_scores.insert(game.clone(), score);
                    new_best = true;
                }
            }
        }
        Some(MiniGameResult {
            game,
            score,
            new_best,
        })
    }

    pub fn best_score(&self, game: &str) -> Option<u32> {
        self.progress.mini_game_scores.get(game).copied()
    }

    pub fn mini_game_scores(&self) -> &BTreeMap<String, u32> {
        &self.progress.mini_game_scores
    }

    // ── Counters ───────────────────────────────────────────────────────

    pub fn add_play_time(&mut self, seconds: f64) {
        if seconds.is_finite() && seconds > 0.0 {
            self.progress.total_play_time += seconds;
        }
    }

    pub fn total_play_time(&self) -> f64 {
        self.progress.total_play_time
    }

    pub fn add_distance(&mut self, units: f64) {
        if units.is_finite() && units > 0.0 {
            self.progress.distance_travelled += units;
        }
    }

    pub fn distance_travelled(&self) -> f64 {
        self.progress.distance_travelled
    }
}
