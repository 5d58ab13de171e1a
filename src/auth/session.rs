use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session blob file name in the data directory.
const SESSION_FILE: &str = "session.json";

/// A locally persisted pseudo-session, used in local-identity mode where
/// no real identity provider is configured. The raw JSON blob doubles as
/// the dev token the server-side middleware decodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub email: String,
    #[serde(rename = "displayName")]
    pub display_name: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Reads and writes the session blob on disk.
pub struct SessionStore {
    data_dir: PathBuf,
}

impl SessionStore {
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    fn session_path(&self) -> PathBuf {
        self.data_dir.join(SESSION_FILE)
    }

    /// Load and parse the stored session, if any.
    pub fn load(&self) -> Result<Option<SessionData>> {
        let Some(raw) = self.load_raw()? else {
            return Ok(None);
        };
        let data: SessionData =
            serde_json::from_str(&raw).context("Failed to parse session file")?;
        Ok(Some(data))
    }

    /// Load the session blob verbatim. The dev-token header carries this
    /// string unmodified, so it is validated as JSON but not reshaped.
    pub fn load_raw(&self) -> Result<Option<String>> {
        let path = self.session_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents =
            std::fs::read_to_string(&path).context("Failed to read session file")?;
        serde_json::from_str::<serde_json::Value>(&contents)
            .context("Session file is not valid JSON")?;
        Ok(Some(contents))
    }

    pub fn save(&self, data: &SessionData) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        // Single line: the blob travels verbatim in the x-dev-token header,
        // and header values cannot contain newlines.
        let contents = serde_json::to_string(data)?;
        std::fs::write(self.session_path(), contents)?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        let path = self.session_path();
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_session() -> SessionData {
        SessionData {
            user_id: "u_123".to_string(),
            email: "grad@alumnet.example".to_string(),
            display_name: "Test Grad".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_load_missing_session_is_none() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        assert!(store.load().unwrap().is_none());
        assert!(store.load_raw().unwrap().is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&sample_session()).unwrap();

        let loaded = store.load().unwrap().unwrap();
        assert_eq!(loaded.user_id, "u_123");
        assert_eq!(loaded.email, "grad@alumnet.example");
    }

    #[test]
    fn test_load_raw_returns_blob_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&sample_session()).unwrap();

        let raw = store.load_raw().unwrap().unwrap();
        let on_disk = std::fs::read_to_string(dir.path().join(SESSION_FILE)).unwrap();
        assert_eq!(raw, on_disk);
    }

    #[test]
    fn test_corrupt_blob_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(SESSION_FILE), "not json{").unwrap();
        let store = SessionStore::new(dir.path());
        assert!(store.load_raw().is_err());
    }

    #[test]
    fn test_clear_removes_file() {
        let dir = TempDir::new().unwrap();
        let store = SessionStore::new(dir.path());
        store.save(&sample_session()).unwrap();
        store.clear().unwrap();
        assert!(store.load_raw().unwrap().is_none());
    }
}
