//! Local-first progress tracking for coding dojo ninjas.
//!
//! The heart of the crate is [`entries::EntryStore`], a CRUD repository over
//! goal entries kept in a [`storage::KeyValueStore`] slot.

pub mod cli;
pub mod commands;
pub mod config;
pub mod entries;
pub mod error;
pub mod export;
pub mod metadata;
pub mod project_status;
pub mod sensei;
pub mod storage;
pub mod types;
pub mod validation;

pub use entries::{EntryStore, StoreError};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
pub use types::{EntryDraft, EntryPatch, GoalEntry};
