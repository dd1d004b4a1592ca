//! Achievement counters, one-shot unlocks and the unlock notification
//! queue.
//!
//! Every achievement carries a progress counter bounded by its
//! `max_progress`. Progress only moves up: [`AchievementBook::update_progress`]
//! clamps the requested value into `[progress, max_progress]`. The first
//! update that reaches the maximum unlocks the achievement, stamps the
//! time, queues a notification and awards the points, exactly once.
//!
//! ```
//! use mindcity_logic::achievements::{AchievementBook, AchievementId};
//!
//! let mut book = AchievementBook::new();
//! assert_eq!(book.update_progress(AchievementId::Explorer, 7), Some(AchievementId::Explorer));
//! assert_eq!(book.total_points(), 100);
//! assert_eq!(book.update_progress(AchievementId::Explorer, 10), None);
//! assert_eq!(book.total_points(), 100);
//! ```

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How long an unlock toast stays on screen, in seconds.
pub const NOTIFICATION_DURATION: f32 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AchievementId {
    FirstSteps,
    Explorer,
    Collector,
    SecretHunter,
    ArcadeRegular,
    HighScorer,
    Marathon,
    Dedicated,
    Completionist,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Bronze,
    Silver,
    Gold,
    Platinum,
}

/// Static description of an achievement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AchievementDef {
    pub name: &'static str,
    pub description: &'static str,
    pub tier: Tier,
    pub max_progress: u32,
    pub points: u32,
}

impl AchievementId {
    pub const ALL: [AchievementId; 9] = [
        AchievementId::FirstSteps,
        AchievementId::Explorer,
        AchievementId::Collector,
        AchievementId::SecretHunter,
        AchievementId::ArcadeRegular,
        AchievementId::HighScorer,
        AchievementId::Marathon,
        AchievementId::Dedicated,
        AchievementId::Completionist,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            AchievementId::FirstSteps => "first-steps",
            AchievementId::Explorer => "explorer",
            AchievementId::Collector => "collector",
            AchievementId::SecretHunter => "secret-hunter",
            AchievementId::ArcadeRegular => "arcade-regular",
            AchievementId::HighScorer => "high-scorer",
            AchievementId::Marathon => "marathon",
            AchievementId::Dedicated => "dedicated",
            AchievementId::Completionist => "completionist",
        }
    }

    pub fn def(self) -> AchievementDef {
        match self {
            AchievementId::FirstSteps => AchievementDef {
                name: "First Steps",
                description: "Leave the plaza for another zone",
                tier: Tier::Bronze,
                max_progress: 1,
                points: 10,
            },
            AchievementId::Explorer => AchievementDef {
                name: "Explorer",
                description: "Visit every zone in the city",
                tier: Tier::Silver,
                max_progress: 7,
                points: 100,
            },
            AchievementId::Collector => AchievementDef {
                name: "Collector",
                description: "Collect every skill star",
                tier: Tier::Gold,
                max_progress: 12,
                points: 150,
            },
            AchievementId::SecretHunter => AchievementDef {
                name: "Secret Hunter",
                description: "Discover three hidden secrets",
                tier: Tier::Silver,
                max_progress: 3,
                points: 75,
            },
            AchievementId::ArcadeRegular => AchievementDef {
                name: "Arcade Regular",
                description: "Finish five mini-games",
                tier: Tier::Bronze,
                max_progress: 5,
                points: 50,
            },
            AchievementId::HighScorer => AchievementDef {
                name: "High Scorer",
                description: "Score 1000 points in any mini-game",
                tier: Tier::Silver,
                max_progress: 1,
                points: 50,
            },
            AchievementId::Marathon => AchievementDef {
                name: "Marathon",
                description: "Walk two kilometres through the city",
                tier: Tier::Bronze,
                max_progress: 2_000,
                points: 50,
            },
            AchievementId::Dedicated => AchievementDef {
                name: "Dedicated",
                description: "Spend fifteen minutes exploring",
                tier: Tier::Bronze,
                max_progress: 15,
                points: 50,
            },
            AchievementId::Completionist => AchievementDef {
                name: "Completionist",
                description: "Unlock every other achievement",
                tier: Tier::Platinum,
                max_progress: AchievementId::ALL.len() as u32 - 1,
                points: 250,
            },
        }
    }
}

impl fmt::Display for AchievementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised achievement name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown achievement `{0}`")]
pub struct UnknownAchievement(pub String);

impl FromStr for AchievementId {
    type Err = UnknownAchievement;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AchievementId::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| UnknownAchievement(s.to_string()))
    }
}

/// Mutable progress for one achievement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub id: AchievementId,
    pub progress: u32,
    pub max_progress: u32,
    pub unlocked: bool,
    pub unlocked_at: Option<DateTime<Utc>>,
}

impl Achievement {
    fn locked(id: AchievementId) -> Self {
        Self {
            id,
            progress: 0,
            max_progress: id.def().max_progress,
            unlocked: false,
            unlocked_at: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.id.def().name
    }

    pub fn description(&self) -> &'static str {
        self.id.def().description
    }

    pub fn tier(&self) -> Tier {
        self.id.def().tier
    }

    pub fn points(&self) -> u32 {
        self.id.def().points
    }

    /// Progress as a fraction in `[0, 1]`.
    pub fn ratio(&self) -> f32 {
        self.progress as f32 / self.max_progress as f32
    }
}

/// User-facing unlock toast.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AchievementNotification {
    pub id: AchievementId,
    pub name: String,
    pub description: String,
    pub tier: Tier,
    pub points: u32,
}

impl AchievementNotification {
    fn for_id(id: AchievementId) -> Self {
        let def = id.def();
        Self {
            id,
            name: def.name.to_string(),
            description: def.description.to_string(),
            tier: def.tier,
            points: def.points,
        }
    }
}

/// FIFO of unlock toasts. The head is shown for
/// [`NOTIFICATION_DURATION`] seconds or until dismissed, then the next
/// queued toast takes its place.
#[derive(Debug, Clone, Default)]
pub struct NotificationQueue {
    current: Option<(AchievementNotification, f32)>,
    pending: VecDeque<AchievementNotification>,
}

impl NotificationQueue {
    pub fn push(&mut self, notification: AchievementNotification) {
        self.pending.push_back(notification);
        if self.current.is_none() {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.current = self
            .pending
            .pop_front()
            .map(|n| (n, NOTIFICATION_DURATION));
    }

    /// Toast currently on screen.
    pub fn current(&self) -> Option<&AchievementNotification> {
        self.current.as_ref().map(|(n, _)| n)
    }

    /// Seconds left for the current toast.
    pub fn remaining(&self) -> Option<f32> {
        self.current.as_ref().map(|(_, t)| *t)
    }

    /// Age the current toast; an expired toast is replaced by the next.
    pub fn tick(&mut self, dt: f32) {
        if let Some((_, remaining)) = &mut self.current {
            *remaining -= dt;
            if *remaining <= 0.0 {
                self.advance();
            }
        }
    }

    /// Close the current toast early.
    pub fn dismiss(&mut self) -> Option<AchievementNotification> {
        let dismissed = self.current.take().map(|(n, _)| n);
        self.advance();
        dismissed
    }

    /// Toasts shown or waiting.
    pub fn len(&self) -> usize {
        self.pending.len() + usize::from(self.current.is_some())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Persisted achievement data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AchievementState {
    pub achievements: Vec<Achievement>,
    pub unlocked_achievements: Vec<AchievementId>,
    pub total_points: u32,
}

/// All achievements for one player.
#[derive(Debug, Clone)]
pub struct AchievementBook {
    entries: Vec<Achievement>,
    total_points: u32,
    notifications: NotificationQueue,
    dirty: bool,
}

impl Default for AchievementBook {
    fn default() -> Self {
        Self::new()
    }
}

impl AchievementBook {
    /// Every achievement locked at zero.
    pub fn new() -> Self {
        Self {
            entries: AchievementId::ALL.iter().map(|id| Achievement::locked(*id)).collect(),
            total_points: 0,
            notifications: NotificationQueue::default(),
            dirty: false,
        }
    }

    /// Rebuild from saved data. Progress is clamped to the current
    /// table, unlocked entries are pinned at their maximum and the point
    /// total is recomputed from what is unlocked.
    pub fn restore(state: AchievementState) -> Self {
        let mut book = Self::new();
        for entry in &mut book.entries {
            let saved = state.achievements.iter().find(|a| a.id == entry.id);
            let listed = state.unlocked_achievements.contains(&entry.id);
            if let Some(saved) = saved {
                entry.progress = saved.progress.min(entry.max_progress);
                entry.unlocked_at = saved.unlocked_at;
            }
            let unlocked =
                listed || saved.is_some_and(|s| s.unlocked) || entry.progress >= entry.max_progress;
            if unlocked {
                entry.unlocked = true;
                entry.progress = entry.max_progress;
                book.total_points += entry.points();
            }
        }
        if book.total_points != state.total_points {
            info!(
                "Recomputed achievement points: saved {}, actual {}",
                state.total_points, book.total_points
            );
        }
        book
    }

    pub fn snapshot(&self) -> AchievementState {
        AchievementState {
            achievements: self.entries.clone(),
            unlocked_achievements: self.unlocked_ids(),
            total_points: self.total_points,
        }
    }

    fn entry_mut(&mut self, id: AchievementId) -> &mut Achievement {
        // Entries are built from ALL in order.
        let idx = AchievementId::ALL
            .iter()
            .position(|a| *a == id)
            .unwrap_or_default();
        &mut self.entries[idx]
    }

    pub fn get(&self, id: AchievementId) -> Option<&Achievement> {
        self.entries.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.entries.iter()
    }

    pub fn is_unlocked(&self, id: AchievementId) -> bool {
        self.get(id).is_some_and(|a| a.unlocked)
    }

    pub fn unlocked_ids(&self) -> Vec<AchievementId> {
        self.entries.iter().filter(|a| a.unlocked).map(|a| a.id).collect()
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    pub fn notifications(&self) -> &NotificationQueue {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationQueue {
        &mut self.notifications
    }

    /// `true` if progress changed since the last call.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Push progress up to `value` (never down, never past the maximum).
    /// Returns the id if this call unlocked the achievement.
    pub fn update_progress(&mut self, id: AchievementId, value: u32) -> Option<AchievementId> {
        let entry = self.entry_mut(id);
        if entry.unlocked {
            return None;
        }
        let clamped = value.clamp(entry.progress, entry.max_progress);
        if clamped == entry.progress {
            return None;
        }
        entry.progress = clamped;
        let unlocked = clamped == entry.max_progress;
        if unlocked {
            entry.unlocked = true;
            entry.unlocked_at = Some(Utc::now());
        }
        let points = entry.points();
        self.dirty = true;

        if !unlocked {
            return None;
        }
        self.total_points += points;
        info!("Achievement unlocked: {} (+{} points)", id, points);
        self.notifications.push(AchievementNotification::for_id(id));
        Some(id)
    }

    /// Add `delta` to the current progress. No-op once unlocked.
    pub fn increment_progress(&mut self, id: AchievementId, delta: u32) -> Option<AchievementId> {
        let current = self.get(id)?;
        if current.unlocked {
            return None;
        }
        let target = current.progress.saturating_add(delta);
        self.update_progress(id, target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::ParkMiller;
    use rand::Rng;

    #[test]
    fn explorer_unlocks_once() {
        let mut book = AchievementBook::new();
        assert_eq!(
            book.update_progress(AchievementId::Explorer, 7),
            Some(AchievementId::Explorer)
        );
        assert_eq!(book.total_points(), 100);
        assert_eq!(book.notifications().len(), 1);
        let explorer = book.get(AchievementId::Explorer).unwrap();
        assert!(explorer.unlocked);
        assert!(explorer.unlocked_at.is_some());

        assert_eq!(book.update_progress(AchievementId::Explorer, 10), None);
        assert_eq!(book.get(AchievementId::Explorer).unwrap().progress, 7);
        assert_eq!(book.total_points(), 100);
        assert_eq!(book.notifications().len(), 1);
    }

    #[test]
    fn progress_never_decreases() {
        let mut book = AchievementBook::new();
        book.update_progress(AchievementId::Marathon, 500);
        book.update_progress(AchievementId::Marathon, 100);
        assert_eq!(book.get(AchievementId::Marathon).unwrap().progress, 500);
    }

    #[test]
    fn random_sequences_are_monotonic_and_unlock_once() {
        let mut rng = ParkMiller::new(2024);
        for _ in 0..50 {
            let mut book = AchievementBook::new();
            let mut last = 0;
            let mut unlocks = 0;
            for _ in 0..40 {
                let value: u32 = rng.gen_range(0..12);
                if book.update_progress(AchievementId::SecretHunter, value).is_some() {
                    unlocks += 1;
                    assert!(value >= 3);
                }
                let now = book.get(AchievementId::SecretHunter).unwrap().progress;
                assert!(now >= last);
                assert!(now <= 3);
                last = now;
            }
            assert!(unlocks <= 1);
            assert_eq!(unlocks == 1, book.is_unlocked(AchievementId::SecretHunter));
        }
    }

    #[test]
    fn increment_reaches_threshold() {
        let mut book = AchievementBook::new();
        for _ in 0..4 {
            assert_eq!(book.increment_progress(AchievementId::ArcadeRegular, 1), None);
        }
        assert_eq!(
            book.increment_progress(AchievementId::ArcadeRegular, 1),
            Some(AchievementId::ArcadeRegular)
        );
        assert_eq!(book.increment_progress(AchievementId::ArcadeRegular, 1), None);
        assert_eq!(book.total_points(), 50);
    }

    #[test]
    fn increment_saturates() {
        let mut book = AchievementBook::new();
        book.update_progress(AchievementId::Marathon, 1_999);
        assert!(book
            .increment_progress(AchievementId::Marathon, u32::MAX)
            .is_some());
    }

    #[test]
    fn dirty_tracks_real_changes_only() {
        let mut book = AchievementBook::new();
        assert!(!book.take_dirty());
        book.update_progress(AchievementId::Collector, 0);
        assert!(!book.take_dirty());
        book.update_progress(AchievementId::Collector, 2);
        assert!(book.take_dirty());
        assert!(!book.take_dirty());
    }

    #[test]
    fn notifications_expire_in_order() {
        let mut book = AchievementBook::new();
        book.update_progress(AchievementId::FirstSteps, 1);
        book.update_progress(AchievementId::HighScorer, 1);
        let queue = book.notifications_mut();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.current().unwrap().id, AchievementId::FirstSteps);
        queue.tick(4.0);
        assert_eq!(queue.current().unwrap().id, AchievementId::FirstSteps);
        queue.tick(1.0);
        assert_eq!(queue.current().unwrap().id, AchievementId::HighScorer);
        assert_eq!(queue.remaining(), Some(NOTIFICATION_DURATION));
        queue.tick(5.0);
        assert!(queue.is_empty());
    }

    #[test]
    fn dismiss_advances() {
        let mut book = AchievementBook::new();
        book.update_progress(AchievementId::FirstSteps, 1);
        book.update_progress(AchievementId::HighScorer, 1);
        let queue = book.notifications_mut();
        assert_eq!(queue.dismiss().unwrap().id, AchievementId::FirstSteps);
        assert_eq!(queue.current().unwrap().id, AchievementId::HighScorer);
        queue.dismiss();
        assert!(queue.dismiss().is_none());
    }

    #[test]
    fn restore_normalises_saved_data() {
        let mut book = AchievementBook::new();
        book.update_progress(AchievementId::Explorer, 7);
        book.update_progress(AchievementId::Collector, 5);
        let mut state = book.snapshot();
        state.total_points = 9_999;
        // Tampered progress beyond the maximum.
        state
            .achievements
            .iter_mut()
            .find(|a| a.id == AchievementId::Marathon)
            .unwrap()
            .progress = 50_000;

        let restored = AchievementBook::restore(state);
        assert!(restored.is_unlocked(AchievementId::Explorer));
        assert!(restored.is_unlocked(AchievementId::Marathon));
        assert_eq!(restored.get(AchievementId::Collector).unwrap().progress, 5);
        assert_eq!(restored.total_points(), 150);
        assert!(restored.notifications().is_empty());
    }

    #[test]
    fn restore_from_empty_state_is_fresh() {
        let book = AchievementBook::restore(AchievementState::default());
        assert_eq!(book.total_points(), 0);
        assert!(book.unlocked_ids().is_empty());
        assert_eq!(book.iter().count(), AchievementId::ALL.len());
    }

    #[test]
    fn ids_parse_from_names() {
        assert_eq!("explorer".parse(), Ok(AchievementId::Explorer));
        for id in AchievementId::ALL {
            assert_eq!(id.as_str().parse::<AchievementId>(), Ok(id));
        }
        assert!("speedrunner".parse::<AchievementId>().is_err());
    }

    #[test]
    fn completionist_covers_the_rest() {
        assert_eq!(
            AchievementId::Completionist.def().max_progress as usize,
            AchievementId::ALL.len() - 1
        );
    }
}
