use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::Result;
use crate::store::{SettingsStore, StorageArea};

/// Process-local store, lost on restart. Used in tests and for dry runs.
#[derive(Default)]
pub struct MemoryStore {
    areas: RwLock<HashMap<StorageArea, Map<String, Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemoryStore {
    async fn get(&self, area: StorageArea, keys: &[&str]) -> Result<Map<String, Value>> {
        let areas = self.areas.read().await;
        let Some(items) = areas.get(&area) else {
            return Ok(Map::new());
        };

        Ok(keys
            .iter()
            .filter_map(|key| items.get(*key).map(|v| (key.to_string(), v.clone())))
            .collect())
    }

    async fn set(&self, area: StorageArea, items: Map<String, Value>) -> Result<()> {
        let mut areas = self.areas.write().await;
        areas.entry(area).or_default().extend(items);
        Ok(())
    }

    async fn is_empty(&self, area: StorageArea) -> Result<bool> {
        let areas = self.areas.read().await;
        Ok(areas.get(&area).map_or(true, Map::is_empty))
    }
}
