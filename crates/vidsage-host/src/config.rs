use config::{Config as ConfigLoader, ConfigError, File};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use vidsage_client::GatewayConfig;
use vidsage_types::BackendUrl;

/// Environment variables that override single config keys
const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("SERVER_HOST", "server.host"),
    ("SERVER_PORT", "server.port"),
    ("STORAGE_DATA_DIR", "storage.data_dir"),
    ("STORAGE_IN_MEMORY", "storage.in_memory"),
    ("BACKEND_URL", "backend.url"),
    ("BACKEND_REQUEST_TIMEOUT_SECS", "backend.request_timeout_secs"),
    ("BACKEND_CONNECT_TIMEOUT_SECS", "backend.connect_timeout_secs"),
    ("LOG_LEVEL", "logging.level"),
    ("LOG_FORMAT", "logging.format"),
];

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cors: CorsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5151,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CorsConfig {
    pub enabled: bool,
    pub origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            origins: vec!["*".to_string()],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub in_memory: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".vidsage"),
            in_memory: false,
        }
    }
}

/// Backend the gateway talks to
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendConfig {
    /// Written into the settings on first start only; the saved setting wins afterwards
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
    #[serde(default)]
    pub connect_timeout_secs: Option<u64>,
}

impl BackendConfig {
    pub fn default_url(&self) -> BackendUrl {
        self.url.as_deref().map(BackendUrl::parse).unwrap_or_default()
    }

    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            request_timeout_secs: self.request_timeout_secs,
            connect_timeout_secs: self.connect_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. config/default.toml
    /// 2. config/{ENV}.toml (if ENV is set)
    /// 3. SERVER_*, STORAGE_*, BACKEND_*, LOG_* environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config"), |key| std::env::var(key).ok())
    }

    /// Load from an explicit config directory and variable lookup
    pub fn load_from<F>(dir: &Path, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let profile = env("ENV").unwrap_or_else(|| "dev".to_string());

        let mut builder = ConfigLoader::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()).required(false))
            .add_source(File::with_name(&dir.join(&profile).to_string_lossy()).required(false));

        for &(var, key) in ENV_OVERRIDES {
            builder = builder.set_override_option(key, env(var))?;
        }

        builder.build()?.try_deserialize()
    }

    /// Load config from a specific file (useful for testing)
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from(path.as_ref()))
            .build()?
            .try_deserialize()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
