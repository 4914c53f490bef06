pub mod builder;
pub mod error;
pub mod file;
pub mod mapper;
pub mod memory;
pub mod storage;
pub mod store;

pub use builder::StorageBuilder;
pub use error::{Result, StoreError};
pub use file::JsonFileStore;
pub use mapper::{platform_video_id, VideoMapper};
pub use memory::MemoryStore;
pub use storage::Storage;
pub use store::{SettingsStore, StorageArea};
