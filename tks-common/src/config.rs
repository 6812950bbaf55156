//! Configuration file loading
//!
//! TKS settings resolve CLI → environment → TOML config file → default.
//! This module owns the TOML tier; the CLI and environment tiers live with
//! the binary's argument parsing.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// TOML config file contents.
///
/// Every field is optional here; whether a missing value is an error is
/// decided by the consumer after all tiers have been consulted.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct FileConfig {
    pub content_dir: Option<String>,
    pub database_path: Option<String>,
    pub github_token: Option<String>,
    pub github_repository: Option<String>,
    pub discussion_category: Option<String>,
    pub site_base_url: Option<String>,
}

/// Locate the config file for the platform.
///
/// Linux: `~/.config/tks/config.toml`, then `/etc/tks/config.toml`.
/// macOS/Windows: the user config directory equivalent.
pub fn config_file_path() -> Option<PathBuf> {
    let user_config = dirs::config_dir().map(|d| d.join("tks").join("config.toml"));

    if let Some(path) = &user_config {
        if path.exists() {
            return user_config;
        }
    }

    if cfg!(target_os = "linux") {
        let system_config = PathBuf::from("/etc/tks/config.toml");
        if system_config.exists() {
            return Some(system_config);
        }
    }

    user_config
}

/// Load the config file if one exists. A missing file is not an error; an
/// unreadable or unparseable one is.
pub fn load_file_config() -> Result<FileConfig> {
    let path = match config_file_path() {
        Some(path) => path,
        None => return Ok(FileConfig::default()),
    };

    if !path.exists() {
        return Ok(FileConfig::default());
    }

    load_file_config_from(&path)
}

/// Load a config file from an explicit path.
pub fn load_file_config_from(path: &Path) -> Result<FileConfig> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))
}

/// Validate a credential-ish setting (non-empty, non-whitespace)
pub fn is_configured(value: &str) -> bool {
    !value.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_full_config_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
content_dir = "content/troubleshooting"
github_token = "ghp_test"
github_repository = "example/help-center"
discussion_category = "Troubleshooting"
site_base_url = "https://docs.example.com/troubleshooting"
"#
        )
        .unwrap();

        let config = load_file_config_from(file.path()).unwrap();
        assert_eq!(config.content_dir.as_deref(), Some("content/troubleshooting"));
        assert_eq!(config.github_repository.as_deref(), Some("example/help-center"));
        assert!(config.database_path.is_none());
    }

    #[test]
    fn rejects_invalid_toml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "github_token = [broken").unwrap();

        let result = load_file_config_from(file.path());
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn blank_values_are_not_configured() {
        assert!(!is_configured(""));
        assert!(!is_configured("   "));
        assert!(is_configured("ghp_abc123"));
    }
}
