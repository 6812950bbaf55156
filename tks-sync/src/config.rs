//! Configuration resolution for tks-sync
//!
//! Settings resolve CLI → environment → TOML config file → default. The CLI
//! and environment tiers arrive pre-merged from clap (`env = "TKS_..."`
//! attributes); this module folds in the file tier and applies defaults.
//! Credentials still missing after all tiers is a fatal configuration error,
//! raised before any entry is touched.

use std::path::PathBuf;

use tks_common::config::{is_configured, FileConfig};
use tks_common::{Error, Result};

/// Fully resolved run configuration.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    pub content_dir: PathBuf,
    pub database_path: PathBuf,
    pub github_token: String,
    pub github_owner: String,
    pub github_repo: String,
    pub discussion_category: String,
    pub site_base_url: String,
}

/// Raw settings as they arrive from the CLI layer (CLI and ENV tiers).
#[derive(Debug, Default, Clone)]
pub struct CliSettings {
    pub content_dir: Option<PathBuf>,
    pub database_path: Option<PathBuf>,
    pub github_token: Option<String>,
    pub github_repository: Option<String>,
    pub discussion_category: Option<String>,
    pub site_base_url: Option<String>,
}

impl SyncConfig {
    pub fn resolve(cli: CliSettings, file: &FileConfig) -> Result<Self> {
        let content_dir = cli
            .content_dir
            .or_else(|| file.content_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("content/troubleshooting"));

        let database_path = cli
            .database_path
            .or_else(|| file.database_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from("tks.db"));

        let github_token = cli
            .github_token
            .or_else(|| file.github_token.clone())
            .filter(|t| is_configured(t))
            .ok_or_else(|| {
                Error::Config(
                    "GitHub token not configured. Provide one of:\n\
                     1. --github-token\n\
                     2. Environment: TKS_GITHUB_TOKEN=your-token\n\
                     3. TOML config: github_token = \"your-token\""
                        .to_string(),
                )
            })?;

        let repository = cli
            .github_repository
            .or_else(|| file.github_repository.clone())
            .filter(|r| is_configured(r))
            .ok_or_else(|| {
                Error::Config(
                    "GitHub repository not configured. Provide one of:\n\
                     1. --github-repository owner/name\n\
                     2. Environment: TKS_GITHUB_REPOSITORY=owner/name\n\
                     3. TOML config: github_repository = \"owner/name\""
                        .to_string(),
                )
            })?;

        let (github_owner, github_repo) = repository
            .split_once('/')
            .map(|(owner, repo)| (owner.to_string(), repo.to_string()))
            .filter(|(owner, repo)| is_configured(owner) && is_configured(repo))
            .ok_or_else(|| {
                Error::Config(format!(
                    "GitHub repository must be owner/name, got '{}'",
                    repository
                ))
            })?;

        let discussion_category = cli
            .discussion_category
            .or_else(|| file.discussion_category.clone())
            .unwrap_or_else(|| "Troubleshooting".to_string());

        let site_base_url = cli
            .site_base_url
            .or_else(|| file.site_base_url.clone())
            .filter(|u| is_configured(u))
            .ok_or_else(|| {
                Error::Config(
                    "Site base URL not configured (needed for attribution footers). Provide one of:\n\
                     1. --site-base-url\n\
                     2. Environment: TKS_SITE_BASE_URL=https://docs.example.com/troubleshooting\n\
                     3. TOML config: site_base_url = \"...\""
                        .to_string(),
                )
            })?;

        Ok(Self {
            content_dir,
            database_path,
            github_token,
            github_owner,
            github_repo,
            discussion_category,
            site_base_url,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_cli() -> CliSettings {
        CliSettings {
            content_dir: Some(PathBuf::from("articles")),
            database_path: Some(PathBuf::from("data/entries.db")),
            github_token: Some("ghp_cli".to_string()),
            github_repository: Some("example/help-center".to_string()),
            discussion_category: Some("Help".to_string()),
            site_base_url: Some("https://docs.example.com/troubleshooting".to_string()),
        }
    }

    fn full_file() -> FileConfig {
        FileConfig {
            content_dir: Some("file-articles".to_string()),
            database_path: Some("file.db".to_string()),
            github_token: Some("ghp_file".to_string()),
            github_repository: Some("file/repo".to_string()),
            discussion_category: Some("FileCat".to_string()),
            site_base_url: Some("https://file.example.com".to_string()),
        }
    }

    #[test]
    fn cli_tier_wins_over_file_tier() {
        let config = SyncConfig::resolve(full_cli(), &full_file()).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("articles"));
        assert_eq!(config.github_token, "ghp_cli");
        assert_eq!(config.github_owner, "example");
        assert_eq!(config.github_repo, "help-center");
        assert_eq!(config.discussion_category, "Help");
    }

    #[test]
    fn file_tier_fills_gaps() {
        let config = SyncConfig::resolve(CliSettings::default(), &full_file()).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("file-articles"));
        assert_eq!(config.github_token, "ghp_file");
        assert_eq!(config.github_owner, "file");
    }

    #[test]
    fn defaults_apply_last() {
        let mut file = full_file();
        file.content_dir = None;
        file.database_path = None;
        file.discussion_category = None;

        let config = SyncConfig::resolve(CliSettings::default(), &file).unwrap();
        assert_eq!(config.content_dir, PathBuf::from("content/troubleshooting"));
        assert_eq!(config.database_path, PathBuf::from("tks.db"));
        assert_eq!(config.discussion_category, "Troubleshooting");
    }

    #[test]
    fn missing_token_is_a_config_error() {
        let mut file = full_file();
        file.github_token = None;

        let result = SyncConfig::resolve(CliSettings::default(), &file);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn blank_token_is_a_config_error() {
        let mut cli = full_cli();
        cli.github_token = Some("   ".to_string());
        let mut file = full_file();
        file.github_token = None;

        let result = SyncConfig::resolve(cli, &file);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn repository_must_be_owner_slash_name() {
        let mut cli = full_cli();
        cli.github_repository = Some("just-a-name".to_string());
        let mut file = full_file();
        file.github_repository = None;

        let result = SyncConfig::resolve(cli, &file);
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
