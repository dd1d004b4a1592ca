//! Integration tests for the session engine.
//!
//! Exercises: generation → registry → tick (controller, chunks, zones,
//! skills, achievements) → persistence → resume
//!
//! The physics engine is stood in for by `GroundPlaneBody`.

use std::sync::Arc;

use mindcity_core::engine::Session;
use mindcity_core::persistence::{
    BlobStore, MemoryStore, SaveState, StoreError, ACHIEVEMENTS_KEY, PROGRESS_KEY,
};
use mindcity_logic::achievements::AchievementId;
use mindcity_logic::config::WorldConfig;
use mindcity_logic::controller::{GroundPlaneBody, InputSnapshot};
use mindcity_logic::generation::WorldError;
use mindcity_logic::layout::ZoneId;

use glam::Vec3;

// ── Helpers ────────────────────────────────────────────────────────────

const DT: f32 = 1.0 / 60.0;

fn fresh() -> (Session<MemoryStore>, GroundPlaneBody) {
    resume(MemoryStore::new())
}

fn resume(store: MemoryStore) -> (Session<MemoryStore>, GroundPlaneBody) {
    let config = WorldConfig::default();
    let session = Session::new(config, store).unwrap();
    let body = GroundPlaneBody::standing_at(session.player().position, &session.config().controller);
    (session, body)
}

fn idle() -> InputSnapshot {
    InputSnapshot::default()
}

/// Move the body to `(x, z)` on the ground.
fn place(body: &mut GroundPlaneBody, x: f32, z: f32) {
    body.translation = Vec3::new(x, body.half_height, z);
    body.velocity = Vec3::ZERO;
}

/// Store whose writes always fail.
struct ReadOnlyStore;

impl BlobStore for ReadOnlyStore {
    fn load(&self, _key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(None)
    }

    fn store(&mut self, key: &str, _bytes: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::Rejected {
            key: key.to_string(),
            reason: "read-only".into(),
        })
    }
}

// ── Start-up ───────────────────────────────────────────────────────────

#[test]
fn fresh_session_starts_in_the_plaza() {
    let (session, _) = fresh();
    assert_eq!(session.world_state().current_zone(), ZoneId::CentralPlaza);
    assert!(session.world_state().has_visited(ZoneId::CentralPlaza));
    assert_eq!(session.achievements().total_points(), 0);
    assert!(!session.geometry().buildings.is_empty());
    assert_eq!(
        session.registry().building_count(),
        session.geometry().buildings.len()
    );
}

#[test]
fn invalid_config_is_rejected() {
    let mut config = WorldConfig::default();
    config.chunks.chunk_size = 0.0;
    let err = Session::new(config, MemoryStore::new()).err().unwrap();
    assert!(matches!(err, WorldError::Config(_)));
}

#[test]
fn sessions_are_independent() {
    let (mut a, mut body_a) = fresh();
    let (b, _) = fresh();
    place(&mut body_a, 0.0, -30.0);
    a.tick(DT, idle(), &mut body_a);
    assert_eq!(a.world_state().current_zone(), ZoneId::MemoryLane);
    assert_eq!(b.world_state().current_zone(), ZoneId::CentralPlaza);
}

// ── Chunks ─────────────────────────────────────────────────────────────

#[test]
fn active_set_is_stable_within_a_chunk() {
    let (mut session, mut body) = fresh();
    let first = session.tick(DT, idle(), &mut body).active_chunks;
    assert_eq!(first.len(), 9);
    place(&mut body, 50.0, 50.0);
    let second = session.tick(DT, idle(), &mut body).active_chunks;
    assert!(Arc::ptr_eq(&first, &second));

    place(&mut body, -250.0, 250.0);
    let third = session.tick(DT, idle(), &mut body).active_chunks;
    assert!(!Arc::ptr_eq(&first, &third));
    assert_eq!(session.tracker().discovered().len(), 2);
}

#[test]
fn visible_buildings_are_a_subset() {
    let (mut session, mut body) = fresh();
    place(&mut body, -390.0, 390.0);
    let report = session.tick(DT, idle(), &mut body);
    let visible = session.registry().visible_buildings(&report.active_chunks);
    assert!(visible.len() < session.geometry().buildings.len());
    assert_eq!(
        session.registry().colliders().len(),
        session.geometry().buildings.len() + session.geometry().roads.len()
    );
}

// ── Zones, skills, achievements ────────────────────────────────────────

#[test]
fn walking_into_memory_lane() {
    let (mut session, mut body) = fresh();
    place(&mut body, 0.0, -30.0);
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, Some(ZoneId::MemoryLane));
    assert_eq!(report.achievements_unlocked, vec![AchievementId::FirstSteps]);

    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, None);
    assert!(report.achievements_unlocked.is_empty());
}

#[test]
fn visiting_every_zone_unlocks_explorer_once() {
    let (mut session, mut body) = fresh();
    for zone in ZoneId::ALL {
        assert!(session.enter_portal(zone));
    }
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, Some(ZoneId::Arcade));
    assert_eq!(
        report
            .achievements_unlocked
            .iter()
            .filter(|a| **a == AchievementId::Explorer)
            .count(),
        1
    );
    assert_eq!(session.achievements().total_points(), 110);
    assert_eq!(session.achievements().notifications().len(), 2);

    // The body was teleported to the arcade spawn.
    let spawn = session.layout().zone(ZoneId::Arcade).unwrap().spawn;
    assert_eq!(body.translation, spawn);

    for zone in ZoneId::ALL {
        session.enter_portal(zone);
    }
    let report = session.tick(DT, idle(), &mut body);
    assert!(report.achievements_unlocked.is_empty());
    assert_eq!(session.achievements().total_points(), 110);
}

#[test]
fn portal_into_the_current_zone_changes_nothing() {
    let (mut session, mut body) = fresh();
    session.tick(DT, idle(), &mut body);
    let writes = session.store().writes();

    assert!(session.enter_portal(ZoneId::CentralPlaza));
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, None);
    assert!(report.achievements_unlocked.is_empty());
    assert_eq!(session.world_state().current_zone(), ZoneId::CentralPlaza);
    assert_eq!(session.store().writes(), writes);

    // The spawn teleport still happens.
    let spawn = session.layout().zone(ZoneId::CentralPlaza).unwrap().spawn;
    assert_eq!(body.translation, spawn);
}

#[test]
fn portal_change_is_reported_once() {
    let (mut session, mut body) = fresh();
    session.enter_portal(ZoneId::SkillGarden);
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, Some(ZoneId::SkillGarden));
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, None);
}

#[test]
fn skill_stars_are_collected_once() {
    let (mut session, mut body) = fresh();
    let star = session.layout().skills[0].clone();
    place(&mut body, star.position.x, star.position.z);

    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.skill_collected.as_deref(), Some(star.id.as_str()));
    assert_eq!(report.zone_changed, Some(ZoneId::SkillGarden));

    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.skill_collected, None);
    assert_eq!(session.world_state().collected_skills().len(), 1);
    assert_eq!(
        session
            .achievements()
            .get(AchievementId::Collector)
            .unwrap()
            .progress,
        1
    );
}

#[test]
fn secrets_count_toward_secret_hunter() {
    let (mut session, mut body) = fresh();
    assert!(session.discover_secret("rooftop-cat"));
    assert!(!session.discover_secret("rooftop-cat"));
    session.discover_secret("hidden-commit");
    session.discover_secret("konami");
    let report = session.tick(DT, idle(), &mut body);
    assert!(report
        .achievements_unlocked
        .contains(&AchievementId::SecretHunter));
}

#[test]
fn mini_games_keep_best_scores() {
    let (mut session, mut body) = fresh();
    assert_eq!(session.start_mini_game("snake"), None);
    assert_eq!(session.start_mini_game("breakout"), Some("snake".to_string()));
    let result = session.end_mini_game(Some(1_200)).unwrap();
    assert_eq!(result.game, "breakout");
    assert!(result.new_best);
    assert!(session.end_mini_game(Some(5)).is_none());

    session.start_mini_game("breakout");
    let result = session.end_mini_game(Some(300)).unwrap();
    assert!(!result.new_best);
    assert_eq!(session.world_state().best_score("breakout"), Some(1_200));

    let report = session.tick(DT, idle(), &mut body);
    assert!(report
        .achievements_unlocked
        .contains(&AchievementId::HighScorer));
    assert_eq!(
        session
            .achievements()
            .get(AchievementId::ArcadeRegular)
            .unwrap()
            .progress,
        2
    );
}

#[test]
fn falling_out_respawns_in_current_zone() {
    let (mut session, mut body) = fresh();
    place(&mut body, 0.0, -30.0);
    session.tick(DT, idle(), &mut body);

    body.translation = Vec3::new(500.0, -60.0, 500.0);
    session.tick(DT, idle(), &mut body);
    let spawn = session.layout().zone(ZoneId::MemoryLane).unwrap().spawn;
    assert_eq!(body.translation, spawn);
}

#[test]
fn walking_accumulates_distance() {
    let (mut session, mut body) = fresh();
    let forward = InputSnapshot {
        forward: true,
        ..InputSnapshot::default()
    };
    for _ in 0..60 {
        session.tick(DT, forward, &mut body);
        body.integrate(DT);
    }
    // One second at walking speed, minus the first tick spent at rest.
    let travelled = session.world_state().distance_travelled();
    assert!(travelled > 7.0 && travelled <= 8.0, "{}", travelled);
    assert!((session.world_state().total_play_time() - 1.0).abs() < 1e-3);
}

// ── Persistence ────────────────────────────────────────────────────────

#[test]
fn progress_survives_a_restart() {
    let (mut session, mut body) = fresh();
    place(&mut body, 0.0, -30.0);
    session.tick(DT, idle(), &mut body);
    session.discover_secret("rooftop-cat");
    assert!(session.store().writes() > 0);
    assert!(session.store().get(PROGRESS_KEY).is_some());
    assert!(session.store().get(ACHIEVEMENTS_KEY).is_some());

    let (resumed, _) = resume(session.store().clone());
    let world = resumed.world_state();
    assert_eq!(world.current_zone(), ZoneId::CentralPlaza);
    assert!(world.has_visited(ZoneId::MemoryLane));
    assert!(world.has_secret("rooftop-cat"));
    assert!(resumed.achievements().is_unlocked(AchievementId::FirstSteps));
    assert_eq!(resumed.achievements().total_points(), 10);
    assert!(resumed.achievements().notifications().is_empty());
    assert_eq!(
        resumed.tracker().discovered(),
        session.tracker().discovered()
    );
}

#[test]
fn corrupt_store_starts_fresh() {
    let mut store = MemoryStore::new();
    store.insert(PROGRESS_KEY, vec![0xde, 0xad, 0xbe, 0xef]);
    store.insert(ACHIEVEMENTS_KEY, Vec::new());
    let (session, _) = resume(store);
    assert_eq!(session.world_state().visited_zones().len(), 1);
    assert_eq!(session.achievements().total_points(), 0);
}

#[test]
fn export_and_import() {
    let (mut session, mut body) = fresh();
    session.enter_portal(ZoneId::ContactPier);
    session.tick(DT, idle(), &mut body);
    let exported = session.save_state().to_bytes().unwrap();

    let (mut other, _) = fresh();
    other.load_state(&exported).unwrap();
    assert!(other.world_state().has_visited(ZoneId::ContactPier));
    assert_eq!(other.save_state(), SaveState::from_bytes(&exported).unwrap());
}

#[test]
fn bad_import_resets_to_defaults() {
    let (mut session, mut body) = fresh();
    session.enter_portal(ZoneId::ContactPier);
    session.tick(DT, idle(), &mut body);

    let writes = session.store().writes();

    assert!(session.load_state(b"nonsense").is_err());
    assert!(!session.world_state().has_visited(ZoneId::ContactPier));
    assert_eq!(session.achievements().total_points(), 0);

    // The stored progress is left alone.
    assert_eq!(session.store().writes(), writes);
    let (resumed, _) = resume(session.store().clone());
    assert!(resumed.world_state().has_visited(ZoneId::ContactPier));
}

#[test]
fn store_failures_are_kept_not_fatal() {
    let config = WorldConfig::default();
    let mut session = Session::new(config, ReadOnlyStore).unwrap();
    let mut body =
        GroundPlaneBody::standing_at(session.player().position, &session.config().controller);
    assert!(session.last_persist_error().is_none());
    session.enter_portal(ZoneId::Arcade);
    assert!(matches!(
        session.last_persist_error(),
        Some(StoreError::Rejected { .. })
    ));
    let report = session.tick(DT, idle(), &mut body);
    assert_eq!(report.zone_changed, Some(ZoneId::Arcade));
}
