//! Client configuration sourced from the environment.
//!
//! All settings are read once at startup; there is no hot reload. The
//! consuming application is expected to call `dotenvy::dotenv()` before
//! constructing a [`ClientConfig`] if it wants `.env` support.

use std::path::PathBuf;

/// Application name used for the local data directory.
const APP_NAME: &str = "alumnet";

/// Default API base URL for local development.
const DEFAULT_API_URL: &str = "http://localhost:4000";

/// Identity-provider key values that mean "not configured".
const IDP_KEY_PLACEHOLDERS: &[&str] = &["", "disabled", "your-key-here"];

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the backend; requests go to `{api_base_url}/api{endpoint}`.
    pub api_base_url: String,
    /// Operator/config intent: prefer the real backend when healthy.
    pub prefer_real_api: bool,
    /// Presumed backend availability at startup, before any probe.
    pub backend_available: bool,
    /// Identity-provider publishable key; absent or placeholder means
    /// local-identity mode (dev token from the persisted session blob).
    pub identity_provider_key: Option<String>,
    /// Override for the local data directory (session blob location).
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_URL.to_string(),
            prefer_real_api: false,
            backend_available: true,
            identity_provider_key: None,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary lookup function.
    /// Lets tests supply settings without mutating the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            api_base_url: lookup("ALUMNET_API_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            prefer_real_api: lookup("ALUMNET_USE_REAL_API")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.prefer_real_api),
            backend_available: lookup("ALUMNET_BACKEND_AVAILABLE")
                .map(|v| parse_bool(&v))
                .unwrap_or(defaults.backend_available),
            identity_provider_key: lookup("ALUMNET_IDP_KEY"),
            data_dir: lookup("ALUMNET_DATA_DIR").map(PathBuf::from),
        }
    }

    /// True when no usable identity-provider key is configured, in which
    /// case the client runs with a locally persisted dev session.
    pub fn is_local_identity(&self) -> bool {
        match self.identity_provider_key.as_deref() {
            Some(key) => IDP_KEY_PLACEHOLDERS.contains(&key.trim()),
            None => true,
        }
    }

    /// Directory for locally persisted client state (session blob).
    /// `None` when the platform exposes no data directory.
    pub fn data_dir(&self) -> Option<PathBuf> {
        if let Some(ref dir) = self.data_dir {
            return Some(dir.clone());
        }
        dirs::data_dir().map(|d| d.join(APP_NAME))
    }
}

fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
