// Copyright (c) 2025 sbksba
//
// This software is licensed under the terms of the MIT License.
// See the LICENSE file in the project root for the full license text.
use crate::cli::Cli;

use std::path::PathBuf;

const APP_DIR: &str = "taskdeck";
// Used when the platform has no data/config directory.
const FALLBACK_DIR: &str = "database";
const DATABASE_FILE_NAME: &str = "tasks.db";
const SESSION_FILE_NAME: &str = "session.json";

/// Resolved settings: CLI flag, then environment (handled by clap), then defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub database_url: String,
    pub session_path: PathBuf,
    pub offline: bool,
    pub color: bool,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            database_url: cli
                .database_url
                .clone()
                .unwrap_or_else(default_database_url),
            session_path: cli
                .session_file
                .clone()
                .unwrap_or_else(default_session_path),
            offline: cli.offline,
            color: !cli.no_color,
        }
    }
}

pub fn default_database_url() -> String {
    let mut path = dirs::data_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR));
    path.push(DATABASE_FILE_NAME);
    format!("sqlite://{}", path.display())
}

pub fn default_session_path() -> PathBuf {
    let mut path = dirs::config_dir()
        .map(|dir| dir.join(APP_DIR))
        .unwrap_or_else(|| PathBuf::from(FALLBACK_DIR));
    path.push(SESSION_FILE_NAME);
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "taskdeck",
            "--database-url",
            "sqlite::memory:",
            "--session-file",
            "/tmp/s.json",
            "--no-color",
            "list",
        ])
        .unwrap();

        let config = Config::from_cli(&cli);

        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.session_path, PathBuf::from("/tmp/s.json"));
        assert!(!config.color);
        assert!(!config.offline);
    }

    #[test]
    fn test_defaults_point_at_app_files() {
        assert!(default_database_url().starts_with("sqlite://"));
        assert!(default_database_url().ends_with(DATABASE_FILE_NAME));
        assert!(default_session_path().ends_with(SESSION_FILE_NAME));
    }
}
