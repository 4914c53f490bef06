use thiserror::Error;
use vidsage_store::StoreError;

/// Failure of a gateway operation
///
/// `Display` is the short sentence shown to the user; transport details are
/// only logged.
#[derive(Error, Debug)]
pub enum GatewayError {
    #[error("Backend URL not configured")]
    Configuration,

    #[error("{0}")]
    Validation(String),

    #[error("Cannot connect to backend: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("{message}")]
    Protocol { status: u16, message: String },

    #[error("{0}")]
    Application(String),

    #[error("No video_id returned from backend")]
    MissingVideoId,

    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),

    #[error("Stream interrupted: {0}")]
    Stream(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatewayError {
    /// HTTP status of a protocol error
    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Protocol { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether the failure happened before anything was sent to the backend
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            GatewayError::Configuration | GatewayError::Validation(_) | GatewayError::Storage(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, GatewayError>;
