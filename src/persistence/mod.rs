//! Save/load of plain snapshots
//!
//! Features:
//! - Versioned JSON envelope (`{"version": 1, "data": ...}`)
//! - Key/value store trait; the core never touches storage directly
//! - In-memory and directory-backed stores

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::PersistenceError;

/// Current envelope version
pub const FORMAT_VERSION: u32 = 1;

/// Storage keys
pub mod keys {
    pub const PLAYER_PROFILE: &str = "cosmicPongPlayerProfile";
    pub const TOURNAMENT_HISTORY: &str = "cosmicPongTournamentHistory";
    pub const CURRENT_TOURNAMENT: &str = "cosmicPongCurrentTournament";
    pub const AI_SELECTION: &str = "cosmicPongAISettings";
    pub const MATCH_STATS: &str = "cosmicPongStats";
}

/// String key/value storage supplied by the host
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError>;
    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError>;
    fn remove(&mut self, key: &str) -> Result<(), PersistenceError>;
}

#[derive(Serialize)]
struct EnvelopeOut<'a, T> {
    version: u32,
    data: &'a T,
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct EnvelopeIn<T> {
    data: T,
}

/// Wrap `value` in an envelope and store it under `key`
pub fn save<T: Serialize>(store: &mut dyn Store, key: &str, value: &T) -> Result<(), PersistenceError> {
    let json = serde_json::to_string(&EnvelopeOut {
        version: FORMAT_VERSION,
        data: value,
    })?;
    store.set(key, json)
}

/// Read `key`; `Ok(None)` when nothing was saved
pub fn load<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<T>, PersistenceError> {
    let Some(json) = store.get(key)? else {
        return Ok(None);
    };
    let header: Header = serde_json::from_str(&json)?;
    if header.version != FORMAT_VERSION {
        return Err(PersistenceError::Version {
            found: header.version,
            expected: FORMAT_VERSION,
        });
    }
    let envelope: EnvelopeIn<T> = serde_json::from_str(&json)?;
    Ok(Some(envelope.data))
}

/// Load, falling back to the default on a missing or unreadable entry
pub fn load_or_default<T: DeserializeOwned + Default>(store: &dyn Store, key: &str) -> T {
    match load(store, key) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            log::warn!("Failed to load '{}': {}", key, e);
            T::default()
        }
    }
}

/// Process-local store. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        self.entries.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per entry under a directory
#[derive(Debug, Clone)]
pub struct DirStore {
    dir: PathBuf,
}

impl DirStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl Store for DirStore {
    fn get(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        match fs::read_to_string(self.path(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(PersistenceError::Store(e.to_string())),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(|e| PersistenceError::Store(e.to_string()))?;
        // Replace atomically
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        fs::write(&tmp, value).map_err(|e| PersistenceError::Store(e.to_string()))?;
        fs::rename(&tmp, self.path(key)).map_err(|e| PersistenceError::Store(e.to_string()))
    }

    fn remove(&mut self, key: &str) -> Result<(), PersistenceError> {
        match fs::remove_file(self.path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PersistenceError::Store(e.to_string())),
        }
    }
}
