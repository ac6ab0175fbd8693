use crate::error::{Error, Result};
use crate::validate::Validator;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const APP_NAME: &str = "gh-selfupdate";
pub const CONFIG_FILE_NAME: &str = "config.json";

pub const ENV_CONFIG_PATH: &str = "GH_SELFUPDATE_CONFIG";
pub const ENV_TOKEN: &str = "GITHUB_TOKEN";
pub const ENV_ENTERPRISE_BASE_URL: &str = "GH_SELFUPDATE_ENTERPRISE_BASE_URL";
pub const ENV_ENTERPRISE_UPLOAD_URL: &str = "GH_SELFUPDATE_ENTERPRISE_UPLOAD_URL";
pub const ENV_FILTERS: &str = "GH_SELFUPDATE_FILTERS";

/// Settings an [`Updater`](crate::Updater) is built from.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Token sent to the GitHub API. Never written back to disk.
    #[serde(default, skip_serializing)]
    pub api_token: Option<String>,
    /// Base URL of a GitHub Enterprise installation.
    #[serde(default)]
    pub enterprise_base_url: Option<String>,
    /// Upload URL of a GitHub Enterprise installation.
    #[serde(default)]
    pub enterprise_upload_url: Option<String>,
    /// Regular expressions; an asset must match at least one of them.
    #[serde(default)]
    pub filters: Vec<String>,
    /// Draw a progress bar while downloading.
    #[serde(default)]
    pub show_progress: bool,
    #[serde(skip)]
    pub validator: Option<Arc<dyn Validator>>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("enterprise_base_url", &self.enterprise_base_url)
            .field("enterprise_upload_url", &self.enterprise_upload_url)
            .field("filters", &self.filters)
            .field("show_progress", &self.show_progress)
            .field("validator", &self.validator.as_ref().map(|v| v.suffix()))
            .finish()
    }
}

impl Config {
    pub fn with_validator<V: Validator + 'static>(mut self, validator: V) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    /// Build the configuration from the environment: the config file, then
    /// `GH_SELFUPDATE_*` variables, then a token from `GITHUB_TOKEN` or
    /// `~/.gitconfig`.
    pub fn discover() -> Result<Self> {
        let mut config = match config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };

        config.apply_env(|key| std::env::var(key).ok());

        if config.api_token.is_none() {
            config.api_token = dirs::home_dir()
                .map(|home| home.join(".gitconfig"))
                .and_then(|path| fs::read_to_string(path).ok())
                .and_then(|content| github_token_from_gitconfig(&content));
            if config.api_token.is_some() {
                tracing::debug!("Using github.token from ~/.gitconfig");
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Config file path: {}", path.display());
        let content = fs::read_to_string(path).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| Error::Config {
            path: path.to_path_buf(),
            reason: format!("could not parse config file as JSON: {}", e),
        })
    }

    /// Apply environment variable overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_TOKEN).filter(|t| !t.is_empty()) {
            self.api_token = Some(token);
        }

        if let Some(url) = lookup(ENV_ENTERPRISE_BASE_URL) {
            self.enterprise_base_url = Some(url);
        }

        if let Some(url) = lookup(ENV_ENTERPRISE_UPLOAD_URL) {
            self.enterprise_upload_url = Some(url);
        }

        if let Some(filters) = lookup(ENV_FILTERS) {
            self.filters = filters
                .split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string)
                .collect();
        }
    }
}

pub fn config_file_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG_PATH) {
        return Some(PathBuf::from(path));
    }
    let path = dirs::config_dir()?.join(APP_NAME).join(CONFIG_FILE_NAME);
    Some(path)
}

/// `token` from the `[github]` section of a git config file.
pub fn github_token_from_gitconfig(content: &str) -> Option<String> {
    let mut in_github = false;
    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            in_github = line.trim_start_matches('[').trim_end_matches(']').trim() == "github";
            continue;
        }
        if !in_github || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            if key.trim() == "token" {
                let value = value.trim().trim_matches('"');
                if !value.is_empty() {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}
