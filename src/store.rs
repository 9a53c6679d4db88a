use std::collections::HashMap;
use std::sync::Mutex;

use thiserror::Error;
use tracing::debug;

use crate::game::GameRecord;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("game {0} not found")]
    GameNotFound(String),
    #[error("game {0} already exists")]
    AlreadyExists(String),
    #[error("game was updated concurrently (expected seq {expected}, found {actual})")]
    Conflict { expected: u64, actual: u64 },
    #[error("stored record is unreadable: {0}")]
    Codec(#[from] serde_json::Error),
    #[error("store lock poisoned")]
    Poisoned,
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::GameNotFound(_) => "GAME_NOT_FOUND",
            StoreError::AlreadyExists(_) => "GAME_EXISTS",
            StoreError::Conflict { .. } => "CONFLICT",
            StoreError::Codec(_) | StoreError::Poisoned => "STORE_FAILURE",
        }
    }
}

/// `save` is a compare-and-set on [`GameRecord::move_seq`].
pub trait GameStore: Send + Sync {
    fn create(&self, record: &GameRecord) -> Result<(), StoreError>;
    fn load(&self, id: &str) -> Result<GameRecord, StoreError>;
    fn save(&self, record: &GameRecord, expected_seq: u64) -> Result<(), StoreError>;
}

#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for MemoryStore {
    fn create(&self, record: &GameRecord) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(record)?;
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        if records.contains_key(&record.id) {
            return Err(StoreError::AlreadyExists(record.id.clone()));
        }
        records.insert(record.id.clone(), encoded);
        debug!("store create {}", record.id);
        Ok(())
    }

    fn load(&self, id: &str) -> Result<GameRecord, StoreError> {
        let records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let raw = records
            .get(id)
            .ok_or_else(|| StoreError::GameNotFound(id.to_string()))?;
        Ok(serde_json::from_str(raw)?)
    }

    fn save(&self, record: &GameRecord, expected_seq: u64) -> Result<(), StoreError> {
        let encoded = serde_json::to_string(record)?;
        let mut records = self.records.lock().map_err(|_| StoreError::Poisoned)?;
        let slot = records
            .get_mut(&record.id)
            .ok_or_else(|| StoreError::GameNotFound(record.id.clone()))?;
        let current: GameRecord = serde_json::from_str(slot)?;
        if current.move_seq != expected_seq {
            return Err(StoreError::Conflict {
                expected: expected_seq,
                actual: current.move_seq,
            });
        }
        *slot = encoded;
        debug!("store save {} seq={}", record.id, record.move_seq);
        Ok(())
    }
}
