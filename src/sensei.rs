//! The instructor name remembered between sessions.
//!
//! Stored in its own slot as `{"name": ..., "timestamp": <epoch millis>}`.
//! A name older than the TTL counts as expired and must be refreshed before
//! new entries are recorded.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::storage::{KeyValueStore, StorageError};

pub const SENSEI_KEY: &str = "sensei_name";
pub const DEFAULT_TTL_HOURS: i64 = 24;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SenseiSetting {
    pub name: String,
    /// Milliseconds since the Unix epoch when the name was set.
    pub timestamp: i64,
}

impl SenseiSetting {
    pub fn set_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SenseiStatus {
    Missing,
    Active(String),
    Expired(String),
}

pub struct SenseiRegistry<S> {
    backend: S,
    ttl: Duration,
}

impl<S: KeyValueStore> SenseiRegistry<S> {
    pub fn new(backend: S) -> Self {
        Self::with_ttl(backend, Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(backend: S, ttl: Duration) -> Self {
        Self { backend, ttl }
    }

    pub fn set(&self, name: &str) -> Result<SenseiSetting, StorageError> {
        self.set_at(name, Utc::now())
    }

    pub fn set_at(&self, name: &str, at: DateTime<Utc>) -> Result<SenseiSetting, StorageError> {
        let setting = SenseiSetting {
            name: name.trim().to_string(),
            timestamp: at.timestamp_millis(),
        };
        self.backend
            .set(SENSEI_KEY, &serde_json::to_string(&setting)?)?;
        debug!(name = %setting.name, "sensei name stored");
        Ok(setting)
    }

    pub fn current(&self) -> SenseiStatus {
        self.status_at(Utc::now())
    }

    pub fn status_at(&self, now: DateTime<Utc>) -> SenseiStatus {
        let Some(setting) = self.load() else {
            return SenseiStatus::Missing;
        };
        if setting.name.is_empty() {
            return SenseiStatus::Missing;
        }
        match setting.set_at() {
            Some(set_at) if now - set_at <= self.ttl => SenseiStatus::Active(setting.name),
            _ => SenseiStatus::Expired(setting.name),
        }
    }

    pub fn clear(&self) -> Result<(), StorageError> {
        self.backend.remove(SENSEI_KEY)
    }

    fn load(&self) -> Option<SenseiSetting> {
        let raw = match self.backend.get(SENSEI_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "failed to read sensei name");
                return None;
            }
        };
        serde_json::from_str(&raw)
            .map_err(|e| warn!(error = %e, "failed to parse sensei name"))
            .ok()
    }
}
