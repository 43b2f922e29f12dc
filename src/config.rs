use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::editor::history::DEFAULT_HISTORY_DEPTH;
use crate::slash::DEFAULT_TRIGGER;

fn default_trigger_char() -> String {
    DEFAULT_TRIGGER.to_string()
}

fn default_history_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Character that opens the slash menu.
    #[serde(default = "default_trigger_char")]
    pub trigger_char: String,
    #[serde(default = "default_history_depth")]
    pub history_depth: usize,
    /// `tracing` filter directive, e.g. `debug` or `slashpad=trace`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            trigger_char: default_trigger_char(),
            history_depth: default_history_depth(),
            log_level: None,
            log_dir: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    NotFound(PathBuf),
    InvalidJson(String),
    InvalidTrigger(String),
    IoError(std::io::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(path) => write!(f, "Config file not found: {}", path.display()),
            ConfigError::InvalidJson(msg) => write!(f, "Invalid JSON in config: {}", msg),
            ConfigError::InvalidTrigger(t) => {
                write!(f, "Invalid trigger {:?}: expected one non-whitespace character", t)
            }
            ConfigError::IoError(e) => write!(f, "IO error reading config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config").join("slashpad.json"))
}

/// Load the config from the default location.
pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path()
        .ok_or_else(|| ConfigError::NotFound(PathBuf::from("~/.config/slashpad.json")))?;
    load_config_from(&path)
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    let config: Config =
        serde_json::from_str(&content).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
    config.trigger()?;
    Ok(config)
}

/// Parse a trigger string: exactly one non-whitespace character.
pub fn parse_trigger(raw: &str) -> Result<char, ConfigError> {
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if !c.is_whitespace() => Ok(c),
        _ => Err(ConfigError::InvalidTrigger(raw.to_string())),
    }
}

impl Config {
    pub fn trigger(&self) -> Result<char, ConfigError> {
        parse_trigger(&self.trigger_char)
    }

    /// Apply command line values on top of the file values.
    pub fn merge_cli(&mut self, trigger: Option<String>, log_level: Option<String>) {
        if let Some(trigger) = trigger {
            self.trigger_char = trigger;
        }
        if let Some(level) = log_level {
            self.log_level = Some(level);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_config() {
        let json = r#"{
            "trigger_char": ";",
            "history_depth": 20,
            "log_level": "debug"
        }"#;

        let config: Config = serde_json::from_str(json).unwrap();
        assert_eq!(config.trigger().unwrap(), ';');
        assert_eq!(config.history_depth, 20);
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert_eq!(config.log_dir, None);
    }

    #[test]
    fn empty_object_uses_defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.trigger().unwrap(), '/');
        assert_eq!(config.history_depth, 100);
    }

    #[test]
    fn trigger_must_be_one_visible_char() {
        assert_eq!(parse_trigger("@").unwrap(), '@');
        assert!(matches!(parse_trigger(""), Err(ConfigError::InvalidTrigger(_))));
        assert!(matches!(parse_trigger("ab"), Err(ConfigError::InvalidTrigger(_))));
        assert!(matches!(parse_trigger(" "), Err(ConfigError::InvalidTrigger(_))));
    }

    #[test]
    fn cli_overrides_file_values() {
        let mut config = Config::default();
        config.merge_cli(Some("#".into()), None);
        assert_eq!(config.trigger().unwrap(), '#');
        assert_eq!(config.log_level, None);

        config.merge_cli(None, Some("trace".into()));
        assert_eq!(config.trigger_char, "#");
        assert_eq!(config.log_level.as_deref(), Some("trace"));
    }

    #[test]
    fn missing_file_is_not_found() {
        let path = std::env::temp_dir().join("slashpad-missing-config.json");
        assert!(matches!(load_config_from(&path), Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn load_rejects_bad_trigger_and_json() {
        let dir = std::env::temp_dir().join(format!("slashpad-config-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let bad_trigger = dir.join("trigger.json");
        fs::write(&bad_trigger, r#"{ "trigger_char": "//" }"#).unwrap();
        assert!(matches!(load_config_from(&bad_trigger), Err(ConfigError::InvalidTrigger(_))));

        let bad_json = dir.join("json.json");
        fs::write(&bad_json, "{ not json").unwrap();
        assert!(matches!(load_config_from(&bad_json), Err(ConfigError::InvalidJson(_))));

        let good = dir.join("good.json");
        fs::write(&good, r#"{ "history_depth": 5 }"#).unwrap();
        assert_eq!(load_config_from(&good).unwrap().history_depth, 5);

        fs::remove_dir_all(&dir).unwrap();
    }
}
