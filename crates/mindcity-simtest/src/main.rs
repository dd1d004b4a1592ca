//! Mind City Headless Harness
//!
//! Validates world generation and gameplay logic without a renderer or a
//! physics engine. Runs entirely in-process.
//!
//! Usage:
//!   cargo run -p mindcity-simtest
//!   cargo run -p mindcity-simtest -- --verbose
//!   cargo run -p mindcity-simtest -- path/to/world.json

use std::sync::Arc;

use glam::Vec3;
use log::info;
use rand::Rng;

use mindcity_core::engine::Session;
use mindcity_core::persistence::MemoryStore;
use mindcity_logic::achievements::AchievementId;
use mindcity_logic::chunks::ChunkGrid;
use mindcity_logic::config::WorldConfig;
use mindcity_logic::controller::{GroundPlaneBody, InputSnapshot};
use mindcity_logic::generation::{generate_world, WorldGeometry};
use mindcity_logic::geometry::{
    check_building_overlaps, check_reservations, check_road_clearance, check_within_extent,
    Severity,
};
use mindcity_logic::layout::{Layout, ZoneId};

const DT: f32 = 1.0 / 60.0;
const RANDOM_SEEDS: usize = 20;

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn check(name: &str, passed: bool, detail: impl Into<String>) -> TestResult {
    TestResult {
        name: name.into(),
        passed,
        detail: detail.into(),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let verbose = std::env::args().any(|a| a == "--verbose");
    let config_path = std::env::args().skip(1).find(|a| !a.starts_with("--"));
    println!("=== Mind City Headless Harness ===\n");

    let config = match load_config(config_path.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            println!("  ✗ config: {}", e);
            std::process::exit(1);
        }
    };
    let layout = Layout::reference();

    let mut results = Vec::new();

    // 1. Layout and config validation
    results.extend(validate_inputs(&layout, &config));

    // 2. Generation invariants over a seed sweep
    results.extend(validate_generation(&layout, &config, verbose));

    // 3. Chunk grid coverage
    results.extend(validate_chunks(&config));

    // 4. Scripted tour through a session
    results.extend(validate_tour(&config, verbose));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn load_config(path: Option<&str>) -> Result<WorldConfig, String> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path).map_err(|e| format!("{}: {}", path, e))?;
    let config: WorldConfig =
        serde_json::from_str(&text).map_err(|e| format!("{}: {}", path, e))?;
    info!("Loaded world config from {}", path);
    Ok(config)
}

// ── 1. Inputs ───────────────────────────────────────────────────────────

fn validate_inputs(layout: &Layout, config: &WorldConfig) -> Vec<TestResult> {
    println!("--- Inputs ---");
    let layout_check = layout.validate();
    let config_check = config.validate();
    vec![
        check(
            "layout_valid",
            layout_check.is_ok(),
            match layout_check {
                Ok(()) => format!(
                    "{} districts, {} landmarks, {} zones, {} skills",
                    layout.districts.len(),
                    layout.landmarks.len(),
                    layout.zones.len(),
                    layout.skills.len()
                ),
                Err(e) => e.to_string(),
            },
        ),
        check(
            "config_valid",
            config_check.is_ok(),
            match config_check {
                Ok(()) => format!("seed {}", config.seed),
                Err(e) => e.to_string(),
            },
        ),
        check(
            "every_zone_authored",
            ZoneId::ALL.iter().all(|z| layout.zone(*z).is_some()),
            format!("{} of {} zones", layout.zones.len(), ZoneId::ALL.len()),
        ),
    ]
}

// ── 2. Generation ───────────────────────────────────────────────────────

fn invariant_errors(world: &WorldGeometry, layout: &Layout, config: &WorldConfig) -> usize {
    let g = &config.generator;
    let mut errors = check_building_overlaps(&world.buildings, g.building_margin);
    errors.extend(check_road_clearance(
        &world.buildings,
        &world.roads,
        g.building_margin,
        g.road_margin,
    ));
    errors.extend(check_reservations(
        &world.buildings,
        &layout.exclusion_boxes(g.reservation_margin),
        g.building_margin,
    ));
    errors.extend(check_within_extent(&world.buildings, config.chunks.extent));
    errors
        .iter()
        .filter(|e| e.severity == Severity::Error)
        .count()
}

fn validate_generation(layout: &Layout, config: &WorldConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Generation ---");
    let mut results = Vec::new();

    let (first, second) = match (
        generate_world(layout, config),
        generate_world(layout, config),
    ) {
        (Ok(a), Ok(b)) => (a, b),
        (Err(e), _) | (_, Err(e)) => {
            results.push(check("generate", false, e.to_string()));
            return results;
        }
    };

    results.push(check(
        "deterministic",
        first == second,
        format!("seed {}: {} buildings", config.seed, first.buildings.len()),
    ));
    results.push(check(
        "ids_sequential",
        first
            .buildings
            .iter()
            .enumerate()
            .all(|(i, b)| b.id == format!("bldg-{}", i)),
        "bldg-0 .. bldg-n",
    ));

    let stats = first.stats();
    results.push(check(
        "every_district_built",
        layout
            .districts
            .iter()
            .filter(|d| d.density > 0.0)
            .all(|d| stats.by_district.contains_key(&d.id)),
        format!("{:?}", stats.by_district),
    ));

    let mut rng = rand::thread_rng();
    let seeds: Vec<u64> = std::iter::once(config.seed)
        .chain((0..RANDOM_SEEDS).map(|_| rng.gen_range(0..u64::from(u32::MAX))))
        .collect();
    let mut failures = Vec::new();
    for seed in &seeds {
        let seeded = WorldConfig {
            seed: *seed,
            ..config.clone()
        };
        match generate_world(layout, &seeded) {
            Ok(world) => {
                let errors = invariant_errors(&world, layout, &seeded);
                if verbose {
                    println!(
                        "  seed {:>10}: {:>4} buildings, tallest {:.1}",
                        seed,
                        world.buildings.len(),
                        world.stats().tallest
                    );
                }
                if errors > 0 {
                    failures.push(format!("seed {} ({} violations)", seed, errors));
                }
            }
            Err(e) => failures.push(format!("seed {} ({})", seed, e)),
        }
    }
    results.push(check(
        "invariants_hold",
        failures.is_empty(),
        if failures.is_empty() {
            format!("{} seeds clean", seeds.len())
        } else {
            failures.join(", ")
        },
    ));

    results
}

// ── 3. Chunks ───────────────────────────────────────────────────────────

fn validate_chunks(config: &WorldConfig) -> Vec<TestResult> {
    println!("--- Chunks ---");
    let grid = match ChunkGrid::new(&config.chunks) {
        Ok(g) => g,
        Err(e) => return vec![check("chunk_grid", false, e.to_string())],
    };
    let all = grid.all();
    let dim = grid.dim() as usize;

    let centres_round_trip = all.iter().all(|c| {
        let (x, z) = grid.bounds(*c).center();
        grid.chunk_of(x, z) == *c
    });
    let extent = config.chunks.extent;
    let far = [
        (-extent * 3.0, -extent * 3.0),
        (extent * 3.0, extent * 3.0),
        (0.0, extent * 10.0),
    ];
    let clamped = far.iter().all(|(x, z)| grid.contains(grid.chunk_of(*x, *z)));

    vec![
        check(
            "chunk_count",
            all.len() == dim * dim,
            format!("{}x{} grid", dim, dim),
        ),
        check(
            "chunk_centres_map_back",
            centres_round_trip,
            "chunk_of(bounds(c).center()) == c",
        ),
        check("far_points_clamp", clamped, "out-of-extent points stay in grid"),
    ]
}

// ── 4. Tour ─────────────────────────────────────────────────────────────

fn validate_tour(config: &WorldConfig, verbose: bool) -> Vec<TestResult> {
    println!("--- Tour ---");
    let mut results = Vec::new();

    let mut session = match Session::new(config.clone(), MemoryStore::new()) {
        Ok(s) => s,
        Err(e) => {
            results.push(check("session", false, e.to_string()));
            return results;
        }
    };
    let mut body = GroundPlaneBody::standing_at(session.player().position, &config.controller);

    // Stand still: the active set must not be rebuilt.
    let first = session.tick(DT, InputSnapshot::default(), &mut body).active_chunks;
    let mut stable = true;
    for _ in 0..30 {
        let next = session.tick(DT, InputSnapshot::default(), &mut body).active_chunks;
        stable &= Arc::ptr_eq(&first, &next);
        body.integrate(DT);
    }
    results.push(check(
        "active_set_stable",
        stable,
        format!("{} chunks around {}", first.len(), first.center()),
    ));

    // Portal to every zone.
    let mut unlocked = Vec::new();
    for zone in ZoneId::ALL {
        session.enter_portal(zone);
        let report = session.tick(DT, InputSnapshot::default(), &mut body);
        unlocked.extend(report.achievements_unlocked);
        if verbose {
            println!("  portal -> {} at {}", zone, report.player.position);
        }
    }
    results.push(check(
        "explorer_unlocked_once",
        unlocked
            .iter()
            .filter(|a| **a == AchievementId::Explorer)
            .count()
            == 1,
        format!("{:?}", unlocked),
    ));

    // Walk the skill ring.
    let stars: Vec<Vec3> = session.layout().skills.iter().map(|s| s.position).collect();
    for star in &stars {
        body.translation = Vec3::new(star.x, body.half_height, star.z);
        body.velocity = Vec3::ZERO;
        session.tick(DT, InputSnapshot::default(), &mut body);
    }
    let collected = session.world_state().collected_skills().len();
    results.push(check(
        "all_skills_collected",
        collected == stars.len()
            && session.achievements().is_unlocked(AchievementId::Collector),
        format!("{}/{} stars", collected, stars.len()),
    ));

    // Walk forward for ten seconds.
    let forward = InputSnapshot {
        forward: true,
        sprint: true,
        ..InputSnapshot::default()
    };
    let before = session.world_state().distance_travelled();
    for _ in 0..600 {
        session.tick(DT, forward, &mut body);
        body.integrate(DT);
    }
    let walked = session.world_state().distance_travelled() - before;
    results.push(check(
        "sprint_distance",
        (walked - 140.0).abs() < 1.0,
        format!("{:.1} units in 10 s", walked),
    ));

    // Resume from the store.
    let points = session.achievements().total_points();
    let resumed = Session::new(config.clone(), session.store().clone());
    results.push(match resumed {
        Ok(r) => check(
            "progress_resumes",
            r.achievements().total_points() == points
                && r.world_state().visited_zones() == session.world_state().visited_zones()
                && r.tracker().discovered() == session.tracker().discovered(),
            format!(
                "{} points, {} zones, {} chunks",
                points,
                r.world_state().visited_zones().len(),
                r.tracker().discovered().len()
            ),
        ),
        Err(e) => check("progress_resumes", false, e.to_string()),
    });

    results
}
