use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::error::Result;

/// Storage scope
///
/// `Sync` holds small user configuration that follows the user across
/// installs; `Local` holds bulkier per-machine data such as the mapping table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    Sync,
    Local,
}

impl StorageArea {
    pub fn as_str(&self) -> &'static str {
        match self {
            StorageArea::Sync => "sync",
            StorageArea::Local => "local",
        }
    }
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key-value storage with two areas
///
/// Implementations must survive process restarts unless documented otherwise.
/// Reading a key that was never written is not an error: it is simply absent
/// from the returned map.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Read the given keys; absent keys are omitted from the result
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>>;

    /// Merge `items` into the area, overwriting existing keys
    async fn set(&self, area: StorageArea, items: Map<String, Value>) -> Result<()>;

    /// Whether nothing has ever been written to the area
    async fn is_empty(&self, area: StorageArea) -> Result<bool>;
}
