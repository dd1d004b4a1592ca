//! Pure world logic for the Mind City explorer.
//!
//! This crate contains everything about the explorable city that is
//! independent of a renderer, an audio engine or a physics engine.
//! Functions take plain data and return results, so the whole world can
//! be generated, walked through and scored from a unit test.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`achievements`] | Monotonic achievement counters, unlocks, notification queue |
//! | [`chunks`] | Chunk grid index and per-tick active-set tracking |
//! | [`config`] | World tuning constants (generator, roads, chunks, controller) |
//! | [`controller`] | Player motion controller and the physics-body boundary |
//! | [`generation`] | Deterministic building placement over the district layout |
//! | [`geometry`] | Axis-aligned rectangles and world invariant validation |
//! | [`layout`] | Authored districts, landmarks, portfolio zones, skill stars |
//! | [`progression`] | Maps gameplay events onto achievement progress |
//! | [`rng`] | Park–Miller seeded random sequence |
//! | [`roads`] | Boulevard / secondary road network |
//! | [`world_state`] | Zone visitation, skills, secrets, mini-game sessions |

pub mod achievements;
pub mod chunks;
pub mod config;
pub mod controller;
pub mod generation;
pub mod geometry;
pub mod layout;
pub mod progression;
pub mod rng;
pub mod roads;
pub mod world_state;
