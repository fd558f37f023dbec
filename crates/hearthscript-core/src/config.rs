//! Runtime configuration: callback subscriptions, threading, sandbox
//! selection. Stored as TOML next to the script directory and written
//! back when the sandbox selection changes.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// One declared subscription: an event id, the scripts to run for it in
/// order, and whether they run on detached workers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackBean {
    pub event: String,
    pub scripts: Vec<String>,
    #[serde(default)]
    pub threaded: bool,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Global switch for detached execution; when false, the
    /// per-callback `threaded` flag is ignored and everything runs
    /// inline.
    pub threading_enabled: bool,

    /// Named sandbox strategy applied at script load; `None` selects
    /// the permissive fallback. Takes effect on the next reload.
    pub sandbox_strategy: Option<String>,

    /// Log level filter (trace, debug, info, warn, error).
    pub log_level: String,

    #[serde(rename = "callback")]
    pub callbacks: Vec<CallbackBean>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            threading_enabled: true,
            sandbox_strategy: None,
            log_level: "info".to_string(),
            callbacks: Vec::new(),
        }
    }
}

impl RuntimeConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Load the file if present, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
threading_enabled = false
sandbox_strategy = "restricted"

[[callback]]
event = "tick"
scripts = ["heartbeat", "spawner"]

[[callback]]
event = "on_nightfall"
scripts = ["lights"]
threaded = true
"#;

    #[test]
    fn parses_callback_beans_in_order() {
        let config: RuntimeConfig = toml::from_str(SAMPLE).unwrap();
        assert!(!config.threading_enabled);
        assert_eq!(config.sandbox_strategy.as_deref(), Some("restricted"));
        assert_eq!(config.callbacks.len(), 2);
        assert_eq!(config.callbacks[0].event, "tick");
        assert_eq!(config.callbacks[0].scripts, vec!["heartbeat", "spawner"]);
        assert!(!config.callbacks[0].threaded);
        assert!(config.callbacks[1].threaded);
    }

    #[test]
    fn defaults_apply_for_empty_input() {
        let config: RuntimeConfig = toml::from_str("").unwrap();
        assert_eq!(config, RuntimeConfig::default());
        assert!(config.threading_enabled);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hearthscript.toml");

        let mut config: RuntimeConfig = toml::from_str(SAMPLE).unwrap();
        config.sandbox_strategy = None;
        config.save(&path).unwrap();

        let loaded = RuntimeConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_or_default_for_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = RuntimeConfig::load_or_default(&dir.path().join("nope.toml")).unwrap();
        assert_eq!(config, RuntimeConfig::default());
    }
}
