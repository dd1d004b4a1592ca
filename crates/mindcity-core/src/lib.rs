//! Mind City Core - session engine for the explorable city
//!
//! Ties the pure world logic together into one tick-driven session:
//! the generated city, the chunk tracker, the player controller, the
//! world state machine and the achievement book, plus the persistence
//! boundary that carries progress across sessions.
//!
//! # Architecture
//!
//! - **Registry**: generated geometry lives in a `hecs` world. Buildings
//!   are tagged with the chunk they stand in so the renderer can cull by
//!   the active set; colliders for everything stay loaded.
//! - **Session**: owns all state. No globals, so several sessions can
//!   coexist (one per test, for instance).
//! - **Persistence**: versioned `bincode` blobs in a [`BlobStore`].
//!
//! # Example
//!
//! ```rust,no_run
//! use mindcity_core::prelude::*;
//!
//! let config = WorldConfig::default();
//! let mut body = GroundPlaneBody::standing_at(Vec3::ZERO, &config.controller);
//! let mut session = Session::new(config, MemoryStore::new()).unwrap();
//!
//! loop {
//!     let report = session.tick(1.0 / 60.0, InputSnapshot::default(), &mut body);
//!     body.integrate(1.0 / 60.0);
//!     # let _ = report;
//! }
//! ```
//!
//! [`BlobStore`]: persistence::BlobStore

pub mod components;
pub mod engine;
pub mod persistence;
pub mod registry;

/// Commonly used types for convenient importing
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{Session, TickReport};
    pub use crate::persistence::{BlobStore, FileStore, MemoryStore, SaveState};
    pub use crate::registry::GeometryRegistry;
    pub use glam::Vec3;
    pub use mindcity_logic::config::WorldConfig;
    pub use mindcity_logic::controller::{GroundPlaneBody, InputSnapshot, PhysicsBody};
    pub use mindcity_logic::layout::ZoneId;
}
