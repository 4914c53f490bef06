use std::path::PathBuf;
use std::sync::Arc;

use crate::error::Result;
use crate::file::JsonFileStore;
use crate::memory::MemoryStore;
use crate::storage::Storage;

pub struct StorageBuilder {
    data_dir: Option<PathBuf>,
    in_memory: bool,
}

impl StorageBuilder {
    pub fn new() -> Self {
        Self {
            data_dir: None,
            in_memory: false,
        }
    }

    /// Directory holding `sync.json` / `local.json`
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Keep everything in memory (nothing survives a restart)
    pub fn in_memory(mut self) -> Self {
        self.in_memory = true;
        self
    }

    pub async fn build(self) -> Result<Storage> {
        if self.in_memory {
            return Ok(Storage::new(Arc::new(MemoryStore::new())));
        }

        let dir = self.data_dir.unwrap_or_else(default_data_dir);
        let store = JsonFileStore::open(dir).await?;
        Ok(Storage::new(Arc::new(store)))
    }
}

impl Default for StorageBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".vidsage")
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidsage_types::BackendUrl;

    #[tokio::test]
    async fn test_build_file_backed() {
        let dir = tempfile::tempdir().unwrap();
        let storage = StorageBuilder::new().data_dir(dir.path()).build().await.unwrap();
        storage.save_backend_url("https://api.example.com").await.unwrap();

        let reopened = Storage::builder().data_dir(dir.path()).build().await.unwrap();
        assert_eq!(
            reopened.backend_url().await.unwrap(),
            BackendUrl::parse("https://api.example.com")
        );
    }

    #[tokio::test]
    async fn test_build_in_memory() {
        let storage = StorageBuilder::new().in_memory().build().await.unwrap();
        assert!(!storage.backend_url().await.unwrap().is_configured());
    }
}
