use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

const APP_DIR_NAME: &str = "ticket-lens";
const CONFIG_FILE_NAME: &str = "config.json";

pub const DEFAULT_DASHBOARD_URL: &str = "http://localhost:5000";
pub const DEFAULT_JIRA_URL: &str = "https://your-company.atlassian.net";
pub const DEFAULT_GITLAB_URL: &str = "https://gitlab.com";

pub fn config_directory() -> AppResult<PathBuf> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .ok_or_else(|| {
            AppError::Configuration("unable to determine the user config directory".to_string())
        })
}

pub fn config_file_path() -> AppResult<PathBuf> {
    Ok(config_directory()?.join(CONFIG_FILE_NAME))
}

/// Where ticket graphs come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SourceKind {
    /// The dashboard backend's `/api/jira/*` endpoints.
    #[default]
    Dashboard,
    /// Jira's REST API, walked directly.
    Jira,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Dashboard => "dashboard",
            SourceKind::Jira => "jira",
        }
    }
}

impl FromStr for SourceKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "dashboard" | "backend" => Ok(SourceKind::Dashboard),
            "jira" | "direct" => Ok(SourceKind::Jira),
            other => Err(AppError::Configuration(format!(
                "unknown ticket source '{other}' (expected dashboard or jira)"
            ))),
        }
    }
}

/// Settings as persisted in the config file. Every field is optional so
/// that `config init` can leave values unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dashboard_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jira_api_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gitlab_token: Option<String>,
}

impl StoredConfig {
    pub fn load() -> AppResult<Self> {
        Self::load_from(&config_file_path()?)
    }

    pub fn load_from(path: &Path) -> AppResult<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => serde_json::from_str(&contents).map_err(|err| {
                AppError::Configuration(format!("invalid config file {}: {err}", path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(AppError::Io(err)),
        }
    }

    pub fn save(&self) -> AppResult<()> {
        self.save_to(&config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> AppResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JiraSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub api_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitLabSettings {
    pub base_url: String,
    pub token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub source: SourceKind,
    pub dashboard_url: String,
    pub jira: JiraSettings,
    pub gitlab: GitLabSettings,
}

impl AppConfig {
    pub fn load() -> AppResult<Self> {
        let stored = StoredConfig::load()?;
        Self::resolve(stored, |name| env::var(name).ok())
    }

    /// Merges the stored file with environment overrides. `lookup` reads a
    /// variable by name; the environment always wins over the file.
    pub fn resolve<F>(stored: StoredConfig, lookup: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |var: &str, stored: Option<String>| {
            non_empty(lookup(var)).or_else(|| non_empty(stored))
        };

        let source = match pick("TICKET_LENS_SOURCE", stored.source) {
            Some(value) => value.parse()?,
            None => SourceKind::default(),
        };

        Ok(Self {
            source,
            dashboard_url: pick("TICKET_LENS_DASHBOARD_URL", stored.dashboard_url)
                .unwrap_or_else(|| DEFAULT_DASHBOARD_URL.to_string()),
            jira: JiraSettings {
                base_url: pick("JIRA_URL", stored.jira_url)
                    .unwrap_or_else(|| DEFAULT_JIRA_URL.to_string()),
                username: pick("JIRA_USERNAME", stored.jira_username),
                api_token: pick("JIRA_API_TOKEN", stored.jira_api_token),
            },
            gitlab: GitLabSettings {
                base_url: pick("GITLAB_URL", stored.gitlab_url)
                    .unwrap_or_else(|| DEFAULT_GITLAB_URL.to_string()),
                token: pick("GITLAB_TOKEN", stored.gitlab_token),
            },
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
