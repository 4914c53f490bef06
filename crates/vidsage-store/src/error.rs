use thiserror::Error;

use crate::store::StorageArea;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Storage area '{area}' is corrupt: {reason}")]
    Corrupt { area: StorageArea, reason: String },

    #[error("Invalid backend URL: {0}")]
    InvalidBackendUrl(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
