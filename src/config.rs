use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PlenumError, Result};

const CONFIG_FILE: &str = "config.yaml";

/// Workspace configuration, stored as `config.yaml` in the data directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The acting user, as known to the server. Used for moderator checks;
    /// there is no authentication on this side.
    pub current_user: Option<String>,
    /// Apply queued calls to the local cache right after each command.
    pub autosync: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            current_user: None,
            autosync: true,
        }
    }
}

impl Config {
    /// Load the workspace config, falling back to defaults when the file
    /// does not exist yet.
    pub fn load(plenum_dir: &Path) -> Result<Config> {
        let path = plenum_dir.join(CONFIG_FILE);
        if !path.exists() {
            return Ok(Config::default());
        }

        let text = fs::read_to_string(&path)?;
        serde_yaml::from_str(&text).map_err(|e| PlenumError::Config(e.to_string()))
    }

    pub fn save(&self, plenum_dir: &Path) -> Result<()> {
        let text =
            serde_yaml::to_string(self).map_err(|e| PlenumError::Config(e.to_string()))?;
        fs::write(plenum_dir.join(CONFIG_FILE), text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_loads_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = Config::load(tmp.path()).unwrap();
        assert!(config.current_user.is_none());
        assert!(config.autosync);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let tmp = TempDir::new().unwrap();

        let config = Config {
            current_user: Some("alice".to_string()),
            autosync: false,
        };
        config.save(tmp.path()).unwrap();

        let loaded = Config::load(tmp.path()).unwrap();
        assert_eq!(loaded.current_user.as_deref(), Some("alice"));
        assert!(!loaded.autosync);
    }

    #[test]
    fn test_partial_file_fills_in_defaults() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.yaml"), "current_user: bob\n").unwrap();

        let config = Config::load(tmp.path()).unwrap();
        assert_eq!(config.current_user.as_deref(), Some("bob"));
        assert!(config.autosync);
    }
}
