// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use anyhow::{Context, Result};
use common::{Filter, Theme};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Client-side state that survives restarts independently of the remote store.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Session {
    /// Empty means "no key set".
    pub sync_key: String,
    pub filter: Filter,
    pub search_query: String,
    pub theme: Theme,
}

impl Session {
    pub fn active_key(&self) -> Option<&str> {
        if self.sync_key.is_empty() {
            None
        } else {
            Some(&self.sync_key)
        }
    }

    // Function to load the session from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read session file {}", path.display()))?;
        let session = serde_json::from_str(&data)
            .with_context(|| format!("Failed to parse session file {}", path.display()))?;
        Ok(session)
    }

    /// Loads the session at `path`, falling back to defaults when the file
    /// is missing or unreadable.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            info!("No session file at {}, starting fresh.", path.display());
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            warn!("Could not load session, using defaults: {:?}", e);
            Self::default()
        })
    }

    // Function to save the session to a JSON file
    pub fn save(&self, path: &Path) -> Result<()> {
        // Ensure the directory exists before saving the file
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let data = serde_json::to_string_pretty(self).context("Failed to serialize session")?;
        fs::write(path, data)
            .with_context(|| format!("Failed to write session file {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_session_has_no_key() {
        let session = Session::default();

        assert_eq!(session.active_key(), None);
        assert_eq!(session.filter, Filter::All);
        assert_eq!(session.theme, Theme::Dark);
    }

    #[test]
    fn test_save_then_load_in_nested_directory() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");
        let session = Session {
            sync_key: "abc123".to_string(),
            filter: Filter::Completed,
            search_query: "milk".to_string(),
            theme: Theme::Light,
        };

        session.save(&path).unwrap();

        assert_eq!(Session::load(&path).unwrap(), session);
    }

    #[test]
    fn test_missing_or_corrupt_file_falls_back_to_default() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        let corrupt = dir.path().join("corrupt.json");
        fs::write(&corrupt, "{ not json").unwrap();

        assert_eq!(Session::load_or_default(&missing), Session::default());
        assert_eq!(Session::load_or_default(&corrupt), Session::default());
        assert!(Session::load(&corrupt).is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults_for_missing_fields() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("session.json");
        fs::write(&path, r#"{"syncKey": "k", "theme": "light"}"#).unwrap();

        let session = Session::load(&path).unwrap();

        assert_eq!(session.active_key(), Some("k"));
        assert_eq!(session.theme, Theme::Light);
        assert_eq!(session.filter, Filter::All);
    }
}
