use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use vidsage_types::{
    BackendUrl, ConfigPatch, MappingTable, Settings, MAPPINGS_KEY, SETTINGS_KEYS,
    UNCONFIGURED_BACKEND,
};

use crate::error::{Result, StoreError};
use crate::store::{SettingsStore, StorageArea};

/// Typed view over a [`SettingsStore`]
///
/// Cheap to clone; all clones share the same backend and mapping lock.
#[derive(Clone)]
pub struct Storage {
    store: Arc<dyn SettingsStore>,
    mappings_lock: Arc<Mutex<()>>,
}

impl Storage {
    pub fn new(store: Arc<dyn SettingsStore>) -> Self {
        Self {
            store,
            mappings_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn builder() -> crate::StorageBuilder {
        crate::StorageBuilder::new()
    }

    pub fn raw(&self) -> &Arc<dyn SettingsStore> {
        &self.store
    }

    /// Current settings, defaults substituted for every unset key
    pub async fn settings(&self) -> Result<Settings> {
        let items = self.store.get(StorageArea::Sync, &SETTINGS_KEYS).await?;
        Ok(serde_json::from_value(Value::Object(items))?)
    }

    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        match serde_json::to_value(settings)? {
            Value::Object(items) => self.store.set(StorageArea::Sync, items).await,
            _ => Err(StoreError::Internal("settings did not serialize to an object".to_string())),
        }
    }

    pub async fn backend_url(&self) -> Result<BackendUrl> {
        Ok(self.settings().await?.backend_url)
    }

    /// Persist a new backend URL in canonical form
    ///
    /// An empty value or the sentinel clears the configuration. Anything else
    /// must be an absolute http(s) URL.
    pub async fn save_backend_url(&self, backend_url: &str) -> Result<BackendUrl> {
        let raw = backend_url.trim();
        let parsed = BackendUrl::parse(raw);
        if !parsed.is_configured() && !raw.is_empty() && raw != UNCONFIGURED_BACKEND {
            return Err(StoreError::InvalidBackendUrl(raw.to_string()));
        }

        let mut items = Map::new();
        items.insert("backendUrl".to_string(), Value::String(parsed.as_str().to_string()));
        self.store.set(StorageArea::Sync, items).await?;

        tracing::info!(backend_url = %parsed, configured = parsed.is_configured(), "Saved backend URL");
        Ok(parsed)
    }

    pub async fn save_config(&self, patch: ConfigPatch) -> Result<Settings> {
        let mut settings = self.settings().await?;
        settings.apply(patch);
        self.save_settings(&settings).await?;
        Ok(settings)
    }

    /// Write first-run defaults if the synced area has never been written
    ///
    /// Returns `true` when defaults were installed.
    pub async fn install_defaults(&self, backend_url: BackendUrl) -> Result<bool> {
        if !self.store.is_empty(StorageArea::Sync).await? {
            return Ok(false);
        }

        let settings = Settings::installed(backend_url);
        self.save_settings(&settings).await?;
        tracing::info!(backend_url = %settings.backend_url, "Installed default settings");
        Ok(true)
    }

    pub async fn mappings(&self) -> Result<MappingTable> {
        let mut items = self.store.get(StorageArea::Local, &[MAPPINGS_KEY]).await?;
        match items.remove(MAPPINGS_KEY) {
            Some(Value::Null) | None => Ok(MappingTable::new()),
            Some(value) => Ok(serde_json::from_value(value)?),
        }
    }

    /// Read-modify-write the mapping table
    ///
    /// Serialised within this process so updates for different videos never
    /// drop each other; updates for the same video are last-writer-wins.
    pub async fn update_mappings<F>(&self, update: F) -> Result<()>
    where
        F: FnOnce(&mut MappingTable) + Send,
    {
        let _guard = self.mappings_lock.lock().await;

        let mut table = self.mappings().await?;
        update(&mut table);

        let mut items = Map::new();
        items.insert(MAPPINGS_KEY.to_string(), serde_json::to_value(&table)?);
        self.store.set(StorageArea::Local, items).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use vidsage_types::{Theme, VideoMapping};

    fn storage() -> Storage {
        Storage::new(Arc::new(MemoryStore::new()))
    }

    #[tokio::test]
    async fn test_defaults_when_empty() {
        let storage = storage();
        let settings = storage.settings().await.unwrap();

        assert_eq!(settings, Settings::default());
        assert!(!storage.backend_url().await.unwrap().is_configured());
    }

    #[tokio::test]
    async fn test_install_defaults_only_once() {
        let storage = storage();

        assert!(storage.install_defaults(BackendUrl::Unconfigured).await.unwrap());
        storage.save_backend_url("http://localhost:5000").await.unwrap();
        assert!(!storage
            .install_defaults(BackendUrl::parse("http://other:1"))
            .await
            .unwrap());

        let settings = storage.settings().await.unwrap();
        assert_eq!(settings.backend_url.as_str(), "http://localhost:5000");
        assert_eq!(settings.theme, Theme::Light);
        assert!(settings.auto_index);
        assert!(settings.auto_configured);
    }

    #[tokio::test]
    async fn test_installed_sentinel_is_stored_verbatim() {
        let storage = storage();
        storage.install_defaults(BackendUrl::Unconfigured).await.unwrap();

        let raw = storage
            .raw()
            .get(StorageArea::Sync, &["backendUrl"])
            .await
            .unwrap();
        assert_eq!(raw["backendUrl"], UNCONFIGURED_BACKEND);
    }

    #[tokio::test]
    async fn test_save_backend_url_stores_canonical_form() {
        let storage = storage();
        storage.save_backend_url(" http://localhost:5000/ ").await.unwrap();

        let raw = storage.raw().get(StorageArea::Sync, &["backendUrl"]).await.unwrap();
        assert_eq!(raw["backendUrl"], "http://localhost:5000");

        let cleared = storage.save_backend_url("").await.unwrap();
        assert_eq!(cleared, BackendUrl::Unconfigured);
        let raw = storage.raw().get(StorageArea::Sync, &["backendUrl"]).await.unwrap();
        assert_eq!(raw["backendUrl"], UNCONFIGURED_BACKEND);
    }

    #[tokio::test]
    async fn test_save_backend_url_rejects_relative_value() {
        let storage = storage();
        storage.save_backend_url("http://localhost:5000").await.unwrap();

        let err = storage.save_backend_url("localhost:5000").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidBackendUrl(ref raw) if raw == "localhost:5000"));

        assert_eq!(
            storage.backend_url().await.unwrap().as_str(),
            "http://localhost:5000"
        );
    }

    #[tokio::test]
    async fn test_save_config_patch() {
        let storage = storage();
        let settings = storage
            .save_config(ConfigPatch {
                api_key: Some("tlk_123".to_string()),
                theme: Some(Theme::Dark),
                ..ConfigPatch::default()
            })
            .await
            .unwrap();

        assert_eq!(settings.api_key.as_deref(), Some("tlk_123"));
        assert_eq!(storage.settings().await.unwrap().theme, Theme::Dark);
    }

    #[tokio::test]
    async fn test_mappings_live_in_local_area() {
        let storage = storage();
        storage
            .update_mappings(|table| {
                table.insert("abc123".to_string(), VideoMapping::new("tl_42", "https://youtu.be/x"));
            })
            .await
            .unwrap();

        let sync = storage.raw().get(StorageArea::Sync, &[MAPPINGS_KEY]).await.unwrap();
        assert!(sync.is_empty());
        assert_eq!(storage.mappings().await.unwrap()["abc123"].backend_video_id, "tl_42");
    }

    #[tokio::test]
    async fn test_concurrent_updates_keep_both_entries() {
        let storage = storage();
        let a = storage.clone();
        let b = storage.clone();

        let (ra, rb) = tokio::join!(
            a.update_mappings(|t| {
                t.insert("one".to_string(), VideoMapping::new("tl_1", "u1"));
            }),
            b.update_mappings(|t| {
                t.insert("two".to_string(), VideoMapping::new("tl_2", "u2"));
            }),
        );
        ra.unwrap();
        rb.unwrap();

        let table = storage.mappings().await.unwrap();
        assert_eq!(table.len(), 2);
    }
}
