use thiserror::Error;

use crate::config::ConfigError;
use crate::entries::StoreError;
use crate::export::ExportError;
use crate::storage::StorageError;
use crate::validation::ValidationError;

pub type ServiceResult<T> = core::result::Result<T, ServiceError>;

/// Failures surfaced by the command-line front-end.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0}")]
    Store(#[from] StoreError),
    #[error("{0}")]
    Storage(#[from] StorageError),
    #[error("{0}")]
    Export(#[from] ExportError),
    #[error("{0}")]
    Validation(#[from] ValidationError),
    #[error("{0}")]
    Config(#[from] ConfigError),
    #[error("{0}")]
    IoError(#[from] std::io::Error),
    #[error("{0}")]
    SerdeJsonError(#[from] serde_json::Error),
    #[error("{0}")]
    Prompt(#[from] dialoguer::Error),
    #[error("No active sensei name. Run `sensei set <NAME>` or pass --sensei")]
    SenseiMissing,
    #[error("Sensei name '{0}' expired. Run `sensei set <NAME>` to refresh it or pass --sensei")]
    SenseiExpired(String),
    #[error("{0}")]
    Other(String),
}
