//! # Settings
//!
//! User configuration, stored as JSON in `firebat.json`.
//!
//! ## Lookup order
//!
//! 1. An explicit path (e.g. `--config`)
//! 2. The `FIREBAT_CONFIG` environment variable
//! 3. `firebat.json` in the working directory
//! 4. Built-in defaults
//!
//! A missing file means defaults; a file that exists but does not parse is
//! an error.
//!
//! ```json
//! {
//!   "engine_command": ["fireball-bridge", "--stdio"],
//!   "log_capacity": 500,
//!   "dark_mode": true
//! }
//! ```

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{FirebatError, FirebatResult};
use crate::layout::Layout;
use crate::log_sink::DEFAULT_CAPACITY;

/// Environment variable naming a settings file
pub const CONFIG_ENV: &str = "FIREBAT_CONFIG";

/// Settings file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "firebat.json";

/// Engine executable used when none is configured
pub const DEFAULT_ENGINE: &str = "fireball-bridge";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Program and arguments of the engine bridge process
    pub engine_command: Vec<String>,

    /// Maximum number of log console entries
    pub log_capacity: usize,

    /// Initial panel placement
    pub layout: Layout,

    pub dark_mode: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            engine_command: vec![DEFAULT_ENGINE.to_string()],
            log_capacity: DEFAULT_CAPACITY,
            layout: Layout::default(),
            dark_mode: false,
        }
    }
}

impl Settings {
    /// Resolve the settings file per the lookup order and load it.
    pub fn load(explicit: Option<&Path>) -> FirebatResult<Self> {
        Settings::load_from(&Settings::config_path(explicit))
    }

    /// File that [`Settings::load`] reads and front ends save back to.
    /// The working-directory file is returned even when it does not exist
    /// yet; loading it then yields defaults.
    pub fn config_path(explicit: Option<&Path>) -> PathBuf {
        resolve_config_path(explicit, std::env::var_os(CONFIG_ENV))
    }

    /// Load from `path`; a missing file yields defaults.
    pub fn load_from(path: &Path) -> FirebatResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Settings::default());
        }

        let text = fs::read_to_string(path)
            .map_err(|e| FirebatError::config(path.display().to_string(), e.to_string()))?;
        let settings: Settings = serde_json::from_str(&text)
            .map_err(|e| FirebatError::config(path.display().to_string(), e.to_string()))?;

        if settings.engine_command.is_empty() {
            return Err(FirebatError::config(
                path.display().to_string(),
                "engine_command must name a program",
            ));
        }

        tracing::info!(path = %path.display(), "settings loaded");
        Ok(settings)
    }

    pub fn save_to(&self, path: &Path) -> FirebatResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)
            .map_err(|e| FirebatError::config(path.display().to_string(), e.to_string()))
    }
}

fn resolve_config_path(explicit: Option<&Path>, env: Option<OsString>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env.filter(|value| !value.is_empty()).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{ContainerId, PanelId};

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(&dir.path().join("absent.json")).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.engine_command, vec![DEFAULT_ENGINE.to_string()]);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebat.json");
        fs::write(&path, r#"{ "log_capacity": 25, "layout": [
            { "id": "top", "panels": ["ast-panel"] },
            { "id": "bottom", "panels": ["section-panel", "asm-panel", "ir-panel"] }
        ] }"#)
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.log_capacity, 25);
        assert!(!settings.dark_mode);
        assert_eq!(settings.layout.panels_in(&ContainerId::top()).unwrap(), &[PanelId::Ast]);
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebat.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load_from(&path).unwrap_err().error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_invalid_layout_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebat.json");
        fs::write(&path, r#"{ "layout": [{ "id": "top", "panels": [] }] }"#).unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_empty_engine_command_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebat.json");
        fs::write(&path, r#"{ "engine_command": [] }"#).unwrap();
        assert!(Settings::load_from(&path).is_err());
    }

    #[test]
    fn test_config_path_lookup_order() {
        let explicit = Path::new("/etc/firebat/custom.json");
        let from_env = Some(OsString::from("/home/user/.firebat.json"));

        assert_eq!(resolve_config_path(Some(explicit), from_env.clone()), explicit);
        assert_eq!(
            resolve_config_path(None, from_env),
            PathBuf::from("/home/user/.firebat.json")
        );
        assert_eq!(resolve_config_path(None, None), PathBuf::from(DEFAULT_CONFIG_FILE));
        assert_eq!(
            resolve_config_path(None, Some(OsString::new())),
            PathBuf::from(DEFAULT_CONFIG_FILE)
        );
    }

    #[test]
    fn test_env_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("from-env.json");
        fs::write(&path, r#"{ "dark_mode": true }"#).unwrap();

        let resolved = resolve_config_path(None, Some(path.clone().into_os_string()));
        assert!(Settings::load_from(&resolved).unwrap().dark_mode);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("firebat.json");
        let settings = Settings {
            engine_command: vec!["engine".into(), "--stdio".into()],
            dark_mode: true,
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path).unwrap(), settings);
    }
}
