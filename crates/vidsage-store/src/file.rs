use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use crate::error::{Result, StoreError};
use crate::store::{SettingsStore, StorageArea};

/// Durable store keeping one JSON document per area inside a data directory
///
/// Layout: `<dir>/sync.json` and `<dir>/local.json`. Writes go to a temporary
/// file that is renamed over the previous document, so a crash mid-write
/// leaves the old contents in place.
pub struct JsonFileStore {
    dir: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    /// Open (and create if needed) the data directory
    pub async fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "Opened JSON settings store");

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, area: StorageArea) -> PathBuf {
        self.dir.join(format!("{}.json", area.as_str()))
    }

    async fn read_area(&self, area: StorageArea) -> Result<Map<String, Value>> {
        let path = self.path_for(area);
        let raw = match tokio::fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => return Err(e.into()),
        };

        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(Map::new());
        }

        match serde_json::from_slice::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(other) => Err(StoreError::Corrupt {
                area,
                reason: format!("expected a JSON object, found {}", json_kind(&other)),
            }),
            Err(e) => Err(StoreError::Corrupt {
                area,
                reason: e.to_string(),
            }),
        }
    }

    async fn write_area(&self, area: StorageArea, items: &Map<String, Value>) -> Result<()> {
        let path = self.path_for(area);
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(items)?;

        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[async_trait]
impl SettingsStore for JsonFileStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>> {
        let mut items = self.read_area(area).await?;
        Ok(keys
            .iter()
            .filter_map(|key| items.remove(*key).map(|v| (key.to_string(), v)))
            .collect())
    }

    async fn set(&self, area: StorageArea, items: Map<String, Value>) -> Result<()> {
        // Read-merge-write must not interleave with another writer
        let _guard = self.write_lock.lock().await;

        let mut current = self.read_area(area).await?;
        current.extend(items);
        self.write_area(area, &current).await
    }

    async fn is_empty(&self, area: StorageArea) -> Result<bool> {
        Ok(self.read_area(area).await?.is_empty())
    }
}
