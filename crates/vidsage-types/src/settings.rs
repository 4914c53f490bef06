use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use url::Url;

/// Placeholder written on install when no backend has been configured yet.
pub const UNCONFIGURED_BACKEND: &str = "REPLACE_WITH_BACKEND_URL";

/// Keys of the synced settings area. Every field of [`Settings`] lives under its own key.
pub const SETTINGS_KEYS: [&str; 7] = [
    "backendUrl",
    "theme",
    "autoIndex",
    "apiKey",
    "indexId",
    "autoConfigured",
    "configuredAt",
];

/// Location of the remote backend
///
/// Anything that is not an absolute http(s) URL with a host, including the
/// install-time placeholder and the empty string, reads as `Unconfigured`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum BackendUrl {
    #[default]
    Unconfigured,
    Configured(Url),
}

impl BackendUrl {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.is_empty() || raw == UNCONFIGURED_BACKEND {
            return BackendUrl::Unconfigured;
        }

        match Url::parse(raw) {
            Ok(url) if url.has_host() && matches!(url.scheme(), "http" | "https") => {
                BackendUrl::Configured(url)
            }
            _ => BackendUrl::Unconfigured,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            BackendUrl::Configured(url) => Some(url),
            BackendUrl::Unconfigured => None,
        }
    }

    pub fn is_configured(&self) -> bool {
        matches!(self, BackendUrl::Configured(_))
    }

    /// Base URL without the trailing slash `Url` adds to bare hosts
    pub fn as_str(&self) -> &str {
        match self {
            BackendUrl::Configured(url) => url.as_str().trim_end_matches('/'),
            BackendUrl::Unconfigured => UNCONFIGURED_BACKEND,
        }
    }

    /// Absolute URL of an API path, e.g. `endpoint("/api/health")`
    pub fn endpoint(&self, path: &str) -> Option<String> {
        self.as_url()
            .map(|_| format!("{}/{}", self.as_str(), path.trim_start_matches('/')))
    }
}

impl fmt::Display for BackendUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for BackendUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BackendUrl {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| BackendUrl::parse(&s)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

/// User configuration kept in the synced storage area
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub backend_url: BackendUrl,
    pub theme: Theme,
    pub auto_index: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
    pub auto_configured: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub configured_at: Option<DateTime<Utc>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            backend_url: BackendUrl::Unconfigured,
            theme: Theme::Light,
            auto_index: true,
            api_key: None,
            index_id: None,
            auto_configured: false,
            configured_at: None,
        }
    }
}

impl Settings {
    /// Settings written the first time the service starts against empty storage
    pub fn installed(backend_url: BackendUrl) -> Self {
        Self {
            backend_url,
            auto_configured: true,
            configured_at: Some(Utc::now()),
            ..Self::default()
        }
    }

    pub fn with_backend_url(mut self, backend_url: BackendUrl) -> Self {
        self.backend_url = backend_url;
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn apply(&mut self, patch: ConfigPatch) {
        if let Some(api_key) = patch.api_key {
            self.api_key = Some(api_key);
        }
        if let Some(index_id) = patch.index_id {
            self.index_id = Some(index_id);
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(auto_index) = patch.auto_index {
            self.auto_index = auto_index;
        }
    }
}

/// Partial update sent by the popup's save button
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<Theme>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_index: Option<bool>,
}
