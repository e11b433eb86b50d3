//! Configuration management for `ib`.
//!
//! Layers, lowest to highest precedence:
//! - Built-in defaults
//! - Workspace config (`.issueboard/config.yaml`)
//! - Environment variables (`IB_TEAM`, `IB_DATA`, `IB_RANK_SPACING`,
//!   `IB_MIN_RANK_GAP`, `IB_REMOTE_TIMEOUT_MS`)
//! - Command-line flags

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use issue_store::StoreConfig;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AppError, Result};

pub const WORKSPACE_DIR: &str = ".issueboard";
pub const CONFIG_FILE: &str = "config.yaml";
pub const DATA_FILE: &str = "issues.jsonl";
pub const DEFAULT_TEAM: &str = "ENG";

/// Contents of `config.yaml`. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<PathBuf>,
    pub store: StoreConfig,
}

/// Values supplied by global CLI flags.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub team: Option<String>,
    pub data: Option<PathBuf>,
}

/// Fully resolved configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub team: String,
    pub data_file: PathBuf,
    pub store: StoreConfig,
}

impl Config {
    /// Resolve configuration for the workspace rooted at `root`, reading
    /// the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid, or an
    /// override does not parse.
    pub fn load(root: &Path, overrides: &CliOverrides) -> Result<Self> {
        Self::load_with_env(root, overrides, |key| std::env::var(key).ok())
    }

    /// Like [`Config::load`] with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file is unreadable or invalid, or an
    /// override does not parse.
    pub fn load_with_env(
        root: &Path,
        overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self> {
        let config_path = workspace_dir(root).join(CONFIG_FILE);
        let file = if config_path.exists() {
            let text = fs::read_to_string(&config_path)?;
            if text.trim().is_empty() {
                ConfigFile::default()
            } else {
                serde_yaml::from_str(&text)?
            }
        } else {
            ConfigFile::default()
        };
        debug!(path = %config_path.display(), ?file, "Read config file");

        let mut team = file.team.unwrap_or_else(|| DEFAULT_TEAM.to_string());
        let mut data = file.data;
        let mut store = file.store;

        // Environment
        if let Some(value) = env("IB_TEAM") {
            team = value;
        }
        if let Some(value) = env("IB_DATA") {
            data = Some(PathBuf::from(value));
        }
        if let Some(value) = env("IB_RANK_SPACING") {
            store.rank_spacing = parse_env("IB_RANK_SPACING", &value)?;
        }
        if let Some(value) = env("IB_MIN_RANK_GAP") {
            store.min_rank_gap = parse_env("IB_MIN_RANK_GAP", &value)?;
        }
        if let Some(value) = env("IB_REMOTE_TIMEOUT_MS") {
            store.remote_timeout_ms = parse_env("IB_REMOTE_TIMEOUT_MS", &value)?;
        }

        // Flags
        if let Some(value) = &overrides.team {
            team.clone_from(value);
        }
        if let Some(value) = &overrides.data {
            data = Some(value.clone());
        }

        let team = team.trim().to_string();
        if team.is_empty() || !team.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(AppError::Config(format!(
                "team key must be non-empty and alphanumeric, got '{team}'"
            )));
        }
        store.validate()?;

        let data_file = match data {
            Some(path) if path.is_absolute() => path,
            Some(path) => root.join(path),
            None => workspace_dir(root).join(DATA_FILE),
        };

        Ok(Self {
            team: team.to_ascii_uppercase(),
            data_file,
            store,
        })
    }
}

/// The `.issueboard/` directory under `root`.
#[must_use]
pub fn workspace_dir(root: &Path) -> PathBuf {
    root.join(WORKSPACE_DIR)
}

/// Template written by `ib init`.
#[must_use]
pub fn default_config_yaml() -> String {
    format!(
        "# Issue board configuration\n\
         team: {DEFAULT_TEAM}\n\
         # data: .issueboard/issues.jsonl\n\
         store:\n  \
           rank_spacing: {}\n  \
           min_rank_gap: {:e}\n  \
           remote_timeout_ms: {}\n",
        issue_store::config::DEFAULT_RANK_SPACING,
        issue_store::config::DEFAULT_MIN_RANK_GAP,
        issue_store::config::DEFAULT_REMOTE_TIMEOUT_MS,
    )
}

fn parse_env<T: FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{key}: cannot parse '{value}'")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn write_config(root: &Path, yaml: &str) {
        fs::create_dir_all(workspace_dir(root)).unwrap();
        fs::write(workspace_dir(root).join(CONFIG_FILE), yaml).unwrap();
    }

    #[test]
    fn test_defaults_without_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_with_env(dir.path(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(config.team, "ENG");
        assert_eq!(config.data_file, dir.path().join(".issueboard/issues.jsonl"));
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_generated_template_parses_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), &default_config_yaml());
        let config = Config::load_with_env(dir.path(), &CliOverrides::default(), no_env).unwrap();
        assert_eq!(config.team, DEFAULT_TEAM);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        write_config(
            dir.path(),
            "team: web\nstore:\n  rank_spacing: 64\n  remote_timeout_ms: 500\n",
        );
        let env: HashMap<&str, &str> = [("IB_TEAM", "ops"), ("IB_REMOTE_TIMEOUT_MS", "750")]
            .into_iter()
            .collect();
        let overrides = CliOverrides {
            team: Some("mob".to_string()),
            data: Some(PathBuf::from("board.jsonl")),
        };

        let config = Config::load_with_env(dir.path(), &overrides, |k| {
            env.get(k).map(|v| (*v).to_string())
        })
        .unwrap();
        assert_eq!(config.team, "MOB");
        assert_eq!(config.data_file, dir.path().join("board.jsonl"));
        assert!((config.store.rank_spacing - 64.0).abs() < f64::EPSILON);
        assert_eq!(config.store.remote_timeout_ms, 750);
    }

    #[test]
    fn test_bad_env_value() {
        let dir = tempfile::tempdir().unwrap();
        let result = Config::load_with_env(dir.path(), &CliOverrides::default(), |k| {
            (k == "IB_MIN_RANK_GAP").then(|| "tiny".to_string())
        });
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_invalid_store_config_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write_config(dir.path(), "store:\n  remote_timeout_ms: 0\n");
        let result = Config::load_with_env(dir.path(), &CliOverrides::default(), no_env);
        assert!(matches!(result, Err(AppError::Store(_))));
    }

    #[test]
    fn test_rejects_bad_team_key() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            team: Some("a b".to_string()),
            data: None,
        };
        let result = Config::load_with_env(dir.path(), &overrides, no_env);
        assert!(matches!(result, Err(AppError::Config(_))));
    }
}
