pub mod analysis;
pub mod chat;
pub mod events;
pub mod mapping;
pub mod protocol;
pub mod settings;

pub use analysis::{AnalysisKind, AnalyzeParams, BackendAnalysisType};
pub use chat::{ChatParams, ChatPayload, ChatStatus, ConversationContext, FoundVideo, IndexedVideo};
pub use events::{ProgressStep, RelayEvent};
pub use mapping::{MappingTable, VideoMapping, MAPPINGS_KEY};
pub use protocol::{
    AnalysisOutcome, ChatOutcome, Command, IndexOutcome, Pong, Reply, Resolved,
};
pub use settings::{BackendUrl, ConfigPatch, Settings, Theme, SETTINGS_KEYS, UNCONFIGURED_BACKEND};
