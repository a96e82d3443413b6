//! TOML-based widget configuration.
//!
//! Stores per-widget settings:
//! - Door knocker sound toggle, rare chance, idle expiry and asset manifests
//! - Countdown target and display text
//! - Header/footer include sources and page titles
//! - Clicker game data file
//!
//! Configuration is stored at `~/.config/pagetoys/config.toml`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::{ConfigError, Result};

/// Door-knock widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoorConfig {
    /// Sound playback toggle. Off until the visitor opts in.
    #[serde(default)]
    pub sound_enabled: bool,
    #[serde(default = "default_rare_chance")]
    pub rare_chance: f64,
    #[serde(default = "default_expiry_secs")]
    pub expiry_secs: u64,
    #[serde(default = "default_counter_label")]
    pub counter_label: String,
    /// Optional `door-stages.json` manifest. Built-in tiers when unset.
    #[serde(default)]
    pub stages_path: Option<String>,
    /// Optional `door-sounds.json` manifest. Built-in buckets when unset.
    #[serde(default)]
    pub sounds_path: Option<String>,
    /// Fixed RNG seed for reproducible sound picks.
    #[serde(default)]
    pub seed: Option<u64>,
}

/// Countdown widget configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownConfig {
    /// RFC 3339 or `YYYY-MM-DD HH:MM:SS`.
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default = "default_end_text")]
    pub end_text: String,
    #[serde(default = "default_countdown_format")]
    pub format: String,
}

/// Header/footer include configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncludeConfig {
    #[serde(default = "default_header")]
    pub header: String,
    #[serde(default = "default_footer")]
    pub footer: String,
    #[serde(default = "default_page_title")]
    pub default_title: String,
    /// Page file name to `<h1>` title.
    #[serde(default = "default_titles")]
    pub titles: BTreeMap<String, String>,
}

/// Clicker game configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClickerConfig {
    /// Optional `items.json`. Built-in sample data when unset.
    #[serde(default)]
    pub data_path: Option<String>,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/pagetoys/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub door: DoorConfig,
    #[serde(default)]
    pub countdown: CountdownConfig,
    #[serde(default)]
    pub include: IncludeConfig,
    #[serde(default)]
    pub clicker: ClickerConfig,
}

// Default functions
fn default_rare_chance() -> f64 {
    0.05
}
fn default_expiry_secs() -> u64 {
    60 * 60
}
fn default_counter_label() -> String {
    "拍門次數：{count}".into()
}
fn default_end_text() -> String {
    "時間到！".into()
}
fn default_countdown_format() -> String {
    crate::countdown::DEFAULT_FORMAT.into()
}
fn default_header() -> String {
    "header.html".into()
}
fn default_footer() -> String {
    "footer.html".into()
}
fn default_page_title() -> String {
    "活動倒數計時器".into()
}
fn default_titles() -> BTreeMap<String, String> {
    BTreeMap::from([
        ("index.html".to_string(), "活動倒數計時器".to_string()),
        ("fried-chips.html".to_string(), "倒薯計時器".to_string()),
        ("custom-chips.html".to_string(), "自訂倒數計時器".to_string()),
    ])
}

impl Default for DoorConfig {
    fn default() -> Self {
        Self {
            sound_enabled: false,
            rare_chance: default_rare_chance(),
            expiry_secs: default_expiry_secs(),
            counter_label: default_counter_label(),
            stages_path: None,
            sounds_path: None,
            seed: None,
        }
    }
}

impl Default for CountdownConfig {
    fn default() -> Self {
        Self {
            target: None,
            end_text: default_end_text(),
            format: default_countdown_format(),
        }
    }
}

impl Default for IncludeConfig {
    fn default() -> Self {
        Self {
            header: default_header(),
            footer: default_footer(),
            default_title: default_page_title(),
            titles: default_titles(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    // Unset optionals take whatever the value parses as.
                    serde_json::Value::Null => serde_json::from_str(value)
                        .unwrap_or_else(|_| serde_json::Value::String(value.into())),
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    /// Load from an explicit path, writing defaults if the file is missing.
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                Ok(cfg)
            }
            Err(_) => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. Returns error if key is unknown.
    pub fn apply(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        *self = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.apply(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "falling back to default config");
            Self::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert!(!parsed.door.sound_enabled);
        assert_eq!(parsed.door.expiry_secs, 3600);
        assert_eq!(parsed.include.titles.len(), 3);
    }

    #[test]
    fn empty_file_uses_defaults() {
        let parsed: Config = toml::from_str("").unwrap();
        assert_eq!(parsed.door.rare_chance, 0.05);
        assert_eq!(parsed.countdown.format, crate::countdown::DEFAULT_FORMAT);
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("door.sound_enabled").as_deref(), Some("false"));
        assert_eq!(cfg.get("door.expiry_secs").as_deref(), Some("3600"));
        assert_eq!(cfg.get("include.default_title").as_deref(), Some("活動倒數計時器"));
        assert!(cfg.get("door.missing_key").is_none());
    }

    #[test]
    fn apply_updates_nested_bool() {
        let mut cfg = Config::default();
        cfg.apply("door.sound_enabled", "true").unwrap();
        assert!(cfg.door.sound_enabled);
    }

    #[test]
    fn apply_updates_nested_float() {
        let mut cfg = Config::default();
        cfg.apply("door.rare_chance", "0.5").unwrap();
        assert_eq!(cfg.door.rare_chance, 0.5);
    }

    #[test]
    fn apply_fills_unset_optionals() {
        let mut cfg = Config::default();
        cfg.apply("door.seed", "42").unwrap();
        assert_eq!(cfg.door.seed, Some(42));

        cfg.apply("countdown.target", "2026-12-31 23:59:59").unwrap();
        assert_eq!(cfg.countdown.target.as_deref(), Some("2026-12-31 23:59:59"));
    }

    #[test]
    fn apply_rejects_unknown_key() {
        let mut cfg = Config::default();
        let err = cfg.apply("door.nonexistent_key", "value").unwrap_err();
        assert!(err.to_string().contains("unknown config key"));
    }

    #[test]
    fn apply_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.apply("door.sound_enabled", "not_a_bool").is_err());
        assert!(cfg.apply("door.expiry_secs", "soon").is_err());
        assert!(!cfg.door.sound_enabled);
    }

    #[test]
    fn load_from_missing_file_writes_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg.door.expiry_secs, 3600);
        assert!(path.exists());
    }

    #[test]
    fn load_from_reports_parse_failure() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "door = 3").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn save_and_reload_preserves_changes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        let mut cfg = Config::default();
        cfg.apply("countdown.end_text", "開賣囉").unwrap();
        cfg.save_to(&path).unwrap();

        let reloaded = Config::load_from(&path).unwrap();
        assert_eq!(reloaded.countdown.end_text, "開賣囉");
    }
}
