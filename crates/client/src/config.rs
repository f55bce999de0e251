use std::path::PathBuf;

/// Default API root used by the web client in development.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root including the `/api` prefix, without a trailing slash.
    pub base_url: String,
    /// File backing the local key/value store. `None` keeps state in memory.
    pub storage_path: Option<PathBuf>,
    /// Reported to the session manager for device detection.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            storage_path: None,
            user_agent: concat!("emerald-client/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    pub fn with_storage_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.storage_path = Some(path.into());
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
