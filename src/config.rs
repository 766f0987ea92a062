//! TOML configuration for the demo host and the engine it embeds.
//!
//! ```toml
//! layout_mode = "master-stack"
//! wraparound = true
//! workspace_dir = "~/.local/state/tilefocus"
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use indoc::indoc;
use serde::{Deserialize, Serialize};

use crate::constants::{
    BOUNDARY_FLASH_MS, DEFAULT_MASTER_RATIO, MASTER_RATIO_MAX, MASTER_RATIO_MIN, MIN_PANE_SIZE,
    WORKSPACE_SLOTS,
};
use crate::error::ConfigError;
use crate::layout::LayoutMode;
use crate::window::ManagerConfig;

/// Commented config file matching [`Config::default`].
pub const DEFAULT_CONFIG_TOML: &str = indoc! {r#"
    # Layout used for new workspaces: auto, grid, master-stack, wide or tall.
    layout_mode = "auto"

    # Share of the canvas given to the master pane (0.05 to 0.95).
    master_ratio = 0.6

    # Smallest pane edge a manual resize may leave, in cells.
    min_pane_size = 4

    # How long a pane flashes when navigation hits the layout edge.
    boundary_flash_ms = 200

    # Jump to the far side when navigating past the last pane.
    wraparound = false

    # Number of workspace slots, switched with Alt+1..Alt+9.
    workspace_slots = 9

    # Write workspace files from a worker thread.
    background_save = true

    # Directory for workspace-<n>.json files. Unset keeps workspaces in memory.
    # workspace_dir = "/path/to/workspaces"

    # tracing level: error, warn, info, debug or trace.
    log_level = "info"
"#};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub layout_mode: LayoutMode,
    pub master_ratio: f32,
    pub min_pane_size: u16,
    pub boundary_flash_ms: u64,
    pub wraparound: bool,
    pub workspace_slots: usize,
    pub background_save: bool,
    pub workspace_dir: Option<PathBuf>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Auto,
            master_ratio: DEFAULT_MASTER_RATIO,
            min_pane_size: MIN_PANE_SIZE,
            boundary_flash_ms: BOUNDARY_FLASH_MS,
            wraparound: false,
            workspace_slots: WORKSPACE_SLOTS,
            background_save: true,
            workspace_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load `path`, or the defaults when no path is given or the file does
    /// not exist.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "config file missing, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let config: Self = toml::from_str(&text).map_err(|source| ConfigError::Toml {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Toml {
            path: PathBuf::from("<inline>"),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MASTER_RATIO_MIN..=MASTER_RATIO_MAX).contains(&self.master_ratio) {
            return Err(ConfigError::Value {
                key: "master_ratio",
                reason: format!(
                    "{} is outside {MASTER_RATIO_MIN}..={MASTER_RATIO_MAX}",
                    self.master_ratio
                ),
            });
        }
        if self.min_pane_size == 0 {
            return Err(ConfigError::Value {
                key: "min_pane_size",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.workspace_slots == 0 {
            return Err(ConfigError::Value {
                key: "workspace_slots",
                reason: "must be at least 1".to_string(),
            });
        }
        if self.log_level.parse::<tracing::Level>().is_err() {
            return Err(ConfigError::Value {
                key: "log_level",
                reason: format!("unknown level `{}`", self.log_level),
            });
        }
        Ok(())
    }

    pub fn manager_config(&self) -> ManagerConfig {
        ManagerConfig {
            layout_mode: self.layout_mode,
            master_ratio: self.master_ratio,
            min_pane_size: self.min_pane_size,
            flash_duration: Duration::from_millis(self.boundary_flash_ms),
            wraparound: self.wraparound,
            ..ManagerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn template_matches_defaults() {
        assert_eq!(Config::from_toml_str(DEFAULT_CONFIG_TOML).unwrap(), Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(indoc! {r#"
            layout_mode = "master-stack"
            wraparound = true
            workspace_dir = "/tmp/ws"
        "#})
        .unwrap();
        assert_eq!(config.layout_mode, LayoutMode::MasterStack);
        assert!(config.wraparound);
        assert_eq!(config.workspace_dir, Some(PathBuf::from("/tmp/ws")));
        assert_eq!(config.min_pane_size, MIN_PANE_SIZE);
        let manager = config.manager_config();
        assert!(manager.wraparound);
        assert_eq!(manager.flash_duration, Duration::from_millis(200));
    }

    #[test]
    fn rejects_bad_values() {
        let err = Config::from_toml_str("master_ratio = 1.5").unwrap_err();
        assert!(matches!(err, ConfigError::Value { key: "master_ratio", .. }));
        let err = Config::from_toml_str("layout_mode = \"spiral\"").unwrap_err();
        assert!(matches!(err, ConfigError::Toml { .. }));
        let err = Config::from_toml_str("log_level = \"loud\"").unwrap_err();
        assert!(matches!(err, ConfigError::Value { key: "log_level", .. }));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(&dir.path().join("nope.toml"))).unwrap();
        assert_eq!(config, Config::default());
        let path = dir.path().join("tilefocus.toml");
        fs::write(&path, "min_pane_size = 0").unwrap();
        assert!(Config::load(Some(&path)).is_err());
    }
}
