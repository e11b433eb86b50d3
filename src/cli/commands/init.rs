//! Init command implementation.

use std::fs;
use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::config::{CONFIG_FILE, CliOverrides, DATA_FILE, default_config_yaml, workspace_dir};
use crate::error::{AppError, Result};
use crate::format::print_json;

/// Execute the init command.
///
/// Creates `.issueboard/` with a config template and an empty data file.
/// A `--data` override moves only the data file.
///
/// # Errors
///
/// Returns `AlreadyInitialized` if a data file exists and `force` is not
/// set, or an I/O error if files cannot be written.
pub fn execute(root: &Path, overrides: &CliOverrides, force: bool, json: bool) -> Result<()> {
    let dir = workspace_dir(root);
    let data_file = match &overrides.data {
        Some(path) if path.is_absolute() => path.clone(),
        Some(path) => root.join(path),
        None => dir.join(DATA_FILE),
    };

    if data_file.exists() && !force {
        return Err(AppError::AlreadyInitialized { path: data_file });
    }
    fs::create_dir_all(&dir)?;
    if let Some(parent) = data_file.parent() {
        fs::create_dir_all(parent)?;
    }

    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() || force {
        let mut template = default_config_yaml();
        if let Some(team) = &overrides.team {
            template = template.replacen(
                &format!("team: {}", crate::config::DEFAULT_TEAM),
                &format!("team: {}", team.trim().to_ascii_uppercase()),
                1,
            );
        }
        fs::write(&config_path, template)?;
    }
    fs::write(&data_file, "")?;
    info!(path = %data_file.display(), "Initialized workspace");

    if json {
        print_json(&json!({
            "workspace": dir,
            "data_file": data_file,
        }))?;
    } else {
        println!("Initialized issue board in {}", dir.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_workspace() {
        let dir = tempfile::tempdir().unwrap();
        execute(dir.path(), &CliOverrides::default(), false, true).unwrap();

        let ws = workspace_dir(dir.path());
        assert!(ws.join(DATA_FILE).exists());
        let config = fs::read_to_string(ws.join(CONFIG_FILE)).unwrap();
        assert!(config.contains("team: ENG"));
    }

    #[test]
    fn test_init_twice_requires_force() {
        let dir = tempfile::tempdir().unwrap();
        execute(dir.path(), &CliOverrides::default(), false, true).unwrap();
        let err = execute(dir.path(), &CliOverrides::default(), false, true).unwrap_err();
        assert!(matches!(err, AppError::AlreadyInitialized { .. }));
        execute(dir.path(), &CliOverrides::default(), true, true).unwrap();
    }

    #[test]
    fn test_init_writes_team_override() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = CliOverrides {
            team: Some("ops".to_string()),
            data: None,
        };
        execute(dir.path(), &overrides, false, true).unwrap();
        let config =
            fs::read_to_string(workspace_dir(dir.path()).join(CONFIG_FILE)).unwrap();
        assert!(config.contains("team: OPS"));
    }
}
