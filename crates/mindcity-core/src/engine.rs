//! Session engine - main entry point for running the city

use std::sync::Arc;

use glam::Vec3;
use log::{debug, info, warn};

use mindcity_logic::achievements::{AchievementBook, AchievementId};
use mindcity_logic::chunks::{ActiveSet, ChunkGrid, ChunkTracker};
use mindcity_logic::config::WorldConfig;
use mindcity_logic::controller::{
    InputSnapshot, PhysicsBody, PlayerController, PlayerState, TeleportCause,
};
use mindcity_logic::generation::{generate_world, WorldError, WorldGeometry};
use mindcity_logic::layout::{Layout, ZoneId};
use mindcity_logic::progression::{self, GameEvent};
use mindcity_logic::world_state::{MiniGameResult, WorldState};

use crate::persistence::{BlobStore, PersistError, ProgressRecord, SaveState, StoreError};
use crate::registry::GeometryRegistry;

/// Spawn used when the layout has no zone to start in.
const FALLBACK_SPAWN: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// What happened during one tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub player: PlayerState,
    pub active_chunks: Arc<ActiveSet>,
    /// New zone, if the player changed zone this tick.
    pub zone_changed: Option<ZoneId>,
    pub skill_collected: Option<String>,
    /// Unlocks since the previous report, including those caused by
    /// portals, secrets and mini-games between ticks.
    pub achievements_unlocked: Vec<AchievementId>,
}

/// One player's run through the city. Owns all state.
pub struct Session<S: BlobStore> {
    config: WorldConfig,
    layout: Layout,
    geometry: WorldGeometry,
    registry: GeometryRegistry,
    tracker: ChunkTracker,
    controller: PlayerController,
    world: WorldState,
    achievements: AchievementBook,
    store: S,
    last_position: Option<Vec3>,
    pending_unlocks: Vec<AchievementId>,
    /// Zone change made by a portal since the last tick.
    pending_zone_change: Option<ZoneId>,
    progress_dirty: bool,
    last_persist_error: Option<StoreError>,
}

impl<S: BlobStore> Session<S> {
    /// Generate the reference city and resume any progress in `store`.
    pub fn new(config: WorldConfig, store: S) -> Result<Self, WorldError> {
        Self::with_layout(Layout::reference(), config, store)
    }

    pub fn with_layout(layout: Layout, config: WorldConfig, store: S) -> Result<Self, WorldError> {
        let geometry = generate_world(&layout, &config)?;
        let grid = ChunkGrid::new(&config.chunks)?;
        let registry = GeometryRegistry::build(&geometry, &grid);

        let start = ZoneId::default();
        let spawn = layout.zone(start).map_or(FALLBACK_SPAWN, |z| z.spawn);
        let controller = PlayerController::new(config.controller.clone(), spawn, start);

        let mut session = Self {
            tracker: ChunkTracker::new(grid, config.chunks.active_ring),
            world: WorldState::new(start),
            achievements: AchievementBook::new(),
            config,
            layout,
            geometry,
            registry,
            controller,
            store,
            last_position: None,
            pending_unlocks: Vec::new(),
            pending_zone_change: None,
            progress_dirty: false,
            last_persist_error: None,
        };
        let saved = SaveState::load(&session.store);
        session.apply_save(saved);
        info!(
            "Session ready: {} zones visited, {} achievement points",
            session.world.visited_zones().len(),
            session.achievements.total_points()
        );
        Ok(session)
    }

    fn apply_save(&mut self, saved: SaveState) {
        self.world = WorldState::from_progress(self.world.current_zone(), saved.progress.world);
        self.tracker = ChunkTracker::new(self.tracker.grid().clone(), self.config.chunks.active_ring);
        self.tracker
            .restore_discovered(saved.progress.discovered_chunks);
        self.achievements = AchievementBook::restore(saved.achievements);
    }

    // ── Accessors ──────────────────────────────────────────────────────

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn geometry(&self) -> &WorldGeometry {
        &self.geometry
    }

    pub fn registry(&self) -> &GeometryRegistry {
        &self.registry
    }

    pub fn tracker(&self) -> &ChunkTracker {
        &self.tracker
    }

    pub fn player(&self) -> &PlayerState {
        self.controller.state()
    }

    pub fn world_state(&self) -> &WorldState {
        &self.world
    }

    pub fn achievements(&self) -> &AchievementBook {
        &self.achievements
    }

    /// Mutable access for the UI (dismissing notifications).
    pub fn achievements_mut(&mut self) -> &mut AchievementBook {
        &mut self.achievements
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Most recent store write failure, cleared by the next good write.
    pub fn last_persist_error(&self) -> Option<&StoreError> {
        self.last_persist_error.as_ref()
    }

    // ── Tick ───────────────────────────────────────────────────────────

    fn record(&mut self, event: GameEvent) {
        let unlocked = progression::apply(&mut self.achievements, event);
        self.pending_unlocks.extend(unlocked);
    }

    /// Advance the session by `dt` seconds.
    pub fn tick(&mut self, dt: f32, input: InputSnapshot, body: &mut dyn PhysicsBody) -> TickReport {
        let outcome = self.controller.step(input, body);
        let player = *self.controller.state();
        let position = player.position;

        let discovered_before = self.tracker.discovered().len();
        let active_chunks = self.tracker.update(position.x, position.z);
        if self.tracker.discovered().len() != discovered_before {
            self.progress_dirty = true;
        }

        if outcome.teleported.is_none() {
            if let Some(last) = self.last_position {
                let step = Vec3::new(position.x - last.x, 0.0, position.z - last.z).length();
                self.world.add_distance(f64::from(step));
            }
        }
        self.last_position = Some(position);
        self.world.add_play_time(f64::from(dt));

        // Portal transitions were already recorded by `enter_portal`.
        let portal_zone = self.pending_zone_change.take();
        let zone_changed = match outcome.teleported {
            Some(TeleportCause::ZoneChange(_)) => portal_zone,
            _ => {
                let detected = self
                    .world
                    .detect_zone(position.x, position.z, &self.layout.zones);
                if let Some(zone) = detected {
                    if let Some(spawn) = self.layout.zone(zone).map(|z| z.spawn) {
                        self.controller.set_respawn(spawn, zone);
                    }
                    self.record(GameEvent::ZoneEntered {
                        zone,
                        visited_count: self.world.visited_zones().len(),
                    });
                    self.progress_dirty = true;
                }
                detected.or(portal_zone)
            }
        };

        let skill_collected = self
            .world
            .try_collect(position, &self.layout.skills)
            .map(|star| star.id.clone());
        if skill_collected.is_some() {
            self.record(GameEvent::SkillCollected {
                collected_count: self.world.collected_skills().len(),
            });
            self.progress_dirty = true;
        }

        self.record(GameEvent::Travelled {
            total_distance: self.world.distance_travelled(),
        });
        self.record(GameEvent::PlayTime {
            total_seconds: self.world.total_play_time(),
        });

        self.achievements.notifications_mut().tick(dt);
        self.persist_if_dirty();

        TickReport {
            player,
            active_chunks,
            zone_changed,
            skill_collected,
            achievements_unlocked: std::mem::take(&mut self.pending_unlocks),
        }
    }

    // ── Player actions between ticks ───────────────────────────────────

    /// Teleport to a zone's spawn point. Returns `false` if the layout
    /// has no such zone.
    pub fn enter_portal(&mut self, zone: ZoneId) -> bool {
        let Some(spawn) = self.layout.zone(zone).map(|z| z.spawn) else {
            debug!("No portal target for {}", zone);
            return false;
        };
        self.controller.request_teleport(spawn, zone);
        self.last_position = None;
        if self.world.set_zone(zone).is_some() {
            self.record(GameEvent::ZoneEntered {
                zone,
                visited_count: self.world.visited_zones().len(),
            });
            self.pending_zone_change = Some(zone);
            self.progress_dirty = true;
        }
        self.persist_if_dirty();
        true
    }

    /// Returns `true` the first time `id` is found.
    pub fn discover_secret(&mut self, id: &str) -> bool {
        if !self.world.discover_secret(id) {
            return false;
        }
        self.record(GameEvent::SecretFound {
            found_count: self.world.secrets_found().len(),
        });
        self.progress_dirty = true;
        self.persist_if_dirty();
        true
    }

    /// Start `game`. A game already running is ended without a score and
    /// its id returned.
    pub fn start_mini_game(&mut self, game: &str) -> Option<String> {
        let displaced = self.world.start_mini_game(game);
        if displaced.is_some() {
            self.record(GameEvent::MiniGameFinished { score: None });
        }
        displaced
    }

    pub fn end_mini_game(&mut self, score: Option<u32>) -> Option<MiniGameResult> {
        let result = self.world.end_mini_game(score)?;
        self.record(GameEvent::MiniGameFinished {
            score: result.score,
        });
        if result.new_best {
            self.progress_dirty = true;
        }
        self.persist_if_dirty();
        Some(result)
    }

    // ── Persistence ────────────────────────────────────────────────────

    pub fn save_state(&self) -> SaveState {
        SaveState {
            progress: ProgressRecord {
                world: self.world.progress().clone(),
                discovered_chunks: self.tracker.discovered().iter().copied().collect(),
            },
            achievements: self.achievements.snapshot(),
        }
    }

    /// Replace progress with an exported blob and persist it. An
    /// unreadable blob resets the in-memory progress to defaults and
    /// returns the error; the store keeps its previous contents until the
    /// next write.
    pub fn load_state(&mut self, bytes: &[u8]) -> Result<(), PersistError> {
        match SaveState::from_bytes(bytes) {
            Ok(saved) => {
                self.apply_save(saved);
                self.flush();
                Ok(())
            }
            Err(e) => {
                warn!("Rejected imported save, starting fresh: {}", e);
                self.apply_save(SaveState::default());
                Err(e)
            }
        }
    }

    fn persist_if_dirty(&mut self) {
        let achievements_dirty = self.achievements.take_dirty();
        if self.progress_dirty || achievements_dirty {
            self.flush();
        }
    }

    /// Write everything now. Failures are logged and kept in
    /// [`Session::last_persist_error`].
    pub fn flush(&mut self) {
        self.progress_dirty = false;
        self.achievements.take_dirty();
        match self.save_state().store(&mut self.store) {
            Ok(()) => self.last_persist_error = None,
            Err(PersistError::Store(e)) => {
                warn!("Failed to persist progress: {}", e);
                self.last_persist_error = Some(e);
            }
            Err(e) => warn!("Failed to encode progress: {}", e),
        }
    }
}
