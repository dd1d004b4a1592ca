//! Save/Load of player progress.
//!
//! Progress is stored as two blobs, `"progress"` and `"achievements"`,
//! each a `bincode` envelope `{ version, payload }`. The version is read
//! first so a blob written by a different schema is rejected cleanly
//! instead of being misread. A blob that cannot be decoded is never
//! fatal: the caller logs it and starts from defaults.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use mindcity_logic::achievements::AchievementState;
use mindcity_logic::chunks::ChunkId;
use mindcity_logic::world_state::WorldProgress;

/// Version number for the blob format (increment when the format changes)
pub const SCHEMA_VERSION: u32 = 1;

pub const PROGRESS_KEY: &str = "progress";
pub const ACHIEVEMENTS_KEY: &str = "achievements";

/// Key/value byte storage supplied by the host.
pub trait BlobStore {
    /// `Ok(None)` when nothing was stored under `key`.
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;
    fn store(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError>;
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on blob `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("store rejected blob `{key}`: {reason}")]
    Rejected { key: String, reason: String },
}

#[derive(Debug, Error)]
pub enum PersistError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("serialization error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// In-memory store; the default for tests and headless runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: HashMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&[u8]> {
        self.blobs.get(key).map(Vec::as_slice)
    }

    /// Put raw bytes, bypassing the write counter.
    pub fn insert(&mut self, key: &str, bytes: Vec<u8>) {
        self.blobs.insert(key.to_string(), bytes);
    }

    /// Number of successful `store` calls.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl BlobStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.blobs.get(key).cloned())
    }

    fn store(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        self.blobs.insert(key.to_string(), bytes.to_vec());
        self.writes += 1;
        Ok(())
    }
}

/// One file per key under a directory, `<dir>/<key>.bin`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.bin"))
    }
}

impl BlobStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        match fs::read(self.path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn store(&mut self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            key: key.to_string(),
            source,
        };
        fs::create_dir_all(&self.dir).map_err(io_err)?;
        // Write then rename so a crash never leaves a half-written blob.
        let tmp = self.dir.join(format!("{key}.bin.tmp"));
        fs::write(&tmp, bytes).map_err(io_err)?;
        fs::rename(&tmp, self.path(key)).map_err(io_err)
    }
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u32,
    payload: T,
}

/// Wrap `payload` in a versioned envelope.
pub fn encode<T: Serialize>(payload: &T) -> Result<Vec<u8>, PersistError> {
    Ok(bincode::serialize(&Envelope {
        version: SCHEMA_VERSION,
        payload,
    })?)
}

/// Inverse of [`encode`]. Rejects other schema versions.
pub fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, PersistError> {
    let found: u32 = bincode::deserialize(bytes)?;
    if found != SCHEMA_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SCHEMA_VERSION,
            found,
        });
    }
    let envelope: Envelope<T> = bincode::deserialize(bytes)?;
    Ok(envelope.payload)
}

/// Load and decode `key`, falling back to `T::default()` with a warning
/// on any failure. A missing blob is not a failure.
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn BlobStore, key: &str) -> T {
    let result = store
        .load(key)
        .map_err(PersistError::from)
        .and_then(|bytes| bytes.map(|b| decode(&b)).transpose());
    match result {
        Ok(value) => value.unwrap_or_default(),
        Err(e) => {
            warn!("Discarding saved `{}`: {}", key, e);
            T::default()
        }
    }
}

/// Persisted world progress plus discovered map chunks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub world: WorldProgress,
    pub discovered_chunks: Vec<ChunkId>,
}

/// Everything a session persists, as one exportable value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SaveState {
    pub progress: ProgressRecord,
    pub achievements: AchievementState,
}

impl SaveState {
    pub fn to_bytes(&self) -> Result<Vec<u8>, PersistError> {
        encode(self)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PersistError> {
        decode(bytes)
    }

    /// Read both blobs, each independently defaulting on failure.
    pub fn load(store: &dyn BlobStore) -> Self {
        Self {
            progress: load_or_default(store, PROGRESS_KEY),
            achievements: load_or_default(store, ACHIEVEMENTS_KEY),
        }
    }

    /// Write both blobs. Stops at the first failure.
    pub fn store(&self, store: &mut dyn BlobStore) -> Result<(), PersistError> {
        store.store(PROGRESS_KEY, &encode(&self.progress)?)?;
        store.store(ACHIEVEMENTS_KEY, &encode(&self.achievements)?)?;
        Ok(())
    }
}
