//! Maps gameplay events onto achievement progress.
//!
//! The world state machine reports what happened; this module decides
//! which counters move. Completionist is recomputed after every event
//! from the number of other achievements that are unlocked.

use crate::achievements::{AchievementBook, AchievementId};
use crate::layout::ZoneId;

/// Best score that earns High Scorer.
pub const HIGH_SCORE_THRESHOLD: u32 = 1_000;

/// Something the player did that may move an achievement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GameEvent {
    ZoneEntered { zone: ZoneId, visited_count: usize },
    SkillCollected { collected_count: usize },
    SecretFound { found_count: usize },
    /// A mini-game ended. `score` is `None` when it was abandoned.
    MiniGameFinished { score: Option<u32> },
    Travelled { total_distance: f64 },
    PlayTime { total_seconds: f64 },
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

/// Whole units, saturating. Negative and NaN read as zero.
fn whole(v: f64) -> u32 {
    if v.is_finite() && v > 0.0 {
        v.floor().min(f64::from(u32::MAX)) as u32
    } else {
        0
    }
}

/// Apply one event. Returns the achievements it unlocked, in unlock order.
pub fn apply(book: &mut AchievementBook, event: GameEvent) -> Vec<AchievementId> {
    let mut unlocked = Vec::new();
    let mut push = |id: Option<AchievementId>| unlocked.extend(id);

    match event {
        GameEvent::ZoneEntered {
            zone,
            visited_count,
        } => {
            if zone != ZoneId::CentralPlaza {
                push(book.update_progress(AchievementId::FirstSteps, 1));
            }
            push(book.update_progress(AchievementId::Explorer, count(visited_count)));
        }
        GameEvent::SkillCollected { collected_count } => {
            push(book.update_progress(AchievementId::Collector, count(collected_count)));
        }
        GameEvent::SecretFound { found_count } => {
            push(book.update_progress(AchievementId::SecretHunter, count(found_count)));
        }
        GameEvent::MiniGameFinished { score: None } => {}
        GameEvent::MiniGameFinished { score: Some(score) } => {
            push(book.increment_progress(AchievementId::ArcadeRegular, 1));
            if score >= HIGH_SCORE_THRESHOLD {
                push(book.update_progress(AchievementId::HighScorer, 1));
            }
        }
        GameEvent::Travelled { total_distance } => {
            push(book.update_progress(AchievementId::Marathon, whole(total_distance)));
        }
        GameEvent::PlayTime { total_seconds } => {
            push(book.update_progress(AchievementId::Dedicated, whole(total_seconds / 60.0)));
        }
    }

    if !unlocked.is_empty() {
        let others = book
            .iter()
            .filter(|a| a.unlocked && a.id != AchievementId::Completionist)
            .count();
        unlocked.extend(book.update_progress(AchievementId::Completionist, count(others)));
    }
    unlocked
}
