//! KB-040: Tool configuration — `tchitchen.toml` plus environment overrides.
//!
//! ```toml
//! kitchen = "kitchen.yaml"
//! journal = "journal/activity.jsonl"
//!
//! [pins.1111]
//! initials = "CH"
//! role = "admin"
//! ```
//!
//! The file is optional. Relative paths resolve against the directory holding
//! the config file. `TCHITCHEN_KITCHEN` and `TCHITCHEN_JOURNAL` override the
//! paths.

use super::auth::{Identity, PinTable};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

pub const ENV_KITCHEN: &str = "TCHITCHEN_KITCHEN";
pub const ENV_JOURNAL: &str = "TCHITCHEN_JOURNAL";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Kitchen YAML file
    #[serde(default = "default_kitchen")]
    pub kitchen: PathBuf,

    /// Activity journal (JSONL)
    #[serde(default = "default_journal")]
    pub journal: PathBuf,

    /// Access codes → identities
    #[serde(default)]
    pub pins: HashMap<String, Identity>,
}

fn default_kitchen() -> PathBuf {
    PathBuf::from("kitchen.yaml")
}

fn default_journal() -> PathBuf {
    PathBuf::from("journal").join("activity.jsonl")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            kitchen: default_kitchen(),
            journal: default_journal(),
            pins: HashMap::new(),
        }
    }
}

impl Config {
    /// Parse a config from TOML text.
    pub fn parse(text: &str) -> Result<Self, String> {
        toml::from_str(text).map_err(|e| format!("config parse error: {}", e))
    }

    /// Load from `path` if it exists, then apply environment overrides.
    pub fn load(path: &Path) -> Result<Self, String> {
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load from `path` without looking at the environment. A missing file
    /// yields the defaults.
    pub fn load_file(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read config {}: {}", path.display(), e))?;
        let mut config = Self::parse(&text)?;

        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.kitchen = base.join(&config.kitchen);
            config.journal = base.join(&config.journal);
        }
        debug!(
            kitchen = %config.kitchen.display(),
            journal = %config.journal.display(),
            pins = config.pins.len(),
            "config loaded"
        );
        Ok(config)
    }

    /// Apply path overrides from a variable lookup.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(kitchen) = lookup(ENV_KITCHEN) {
            info!("{ENV_KITCHEN} set, using {kitchen}");
            self.kitchen = PathBuf::from(kitchen);
        }
        if let Some(journal) = lookup(ENV_JOURNAL) {
            info!("{ENV_JOURNAL} set, using {journal}");
            self.journal = PathBuf::from(journal);
        }
    }

    /// The configured access codes as an auth provider.
    pub fn pin_table(&self) -> PinTable {
        PinTable::new(self.pins.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::auth::{AuthProvider, Role};

    #[test]
    fn test_kb040_defaults() {
        let c = Config::default();
        assert_eq!(c.kitchen, PathBuf::from("kitchen.yaml"));
        assert_eq!(c.journal, PathBuf::from("journal/activity.jsonl"));
        assert!(c.pins.is_empty());
    }

    #[test]
    fn test_kb040_parse() {
        let c = Config::parse(
            r#"
kitchen = "data/kitchen.yaml"

[pins.1111]
initials = "CH"
role = "admin"

[pins.2222]
initials = "CM"
"#,
        )
        .unwrap();
        assert_eq!(c.kitchen, PathBuf::from("data/kitchen.yaml"));
        assert_eq!(c.journal, PathBuf::from("journal/activity.jsonl"));
        let pins = c.pin_table();
        assert_eq!(pins.authenticate("1111").unwrap().role, Role::Admin);
        assert_eq!(pins.authenticate("2222").unwrap().role, Role::Cook);
    }

    #[test]
    fn test_kb040_parse_error() {
        assert!(Config::parse("kitchen = [").is_err());
    }

    #[test]
    fn test_kb040_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let c = Config::load_file(&dir.path().join("tchitchen.toml")).unwrap();
        assert_eq!(c.kitchen, PathBuf::from("kitchen.yaml"));
    }

    #[test]
    fn test_kb040_relative_paths_resolve_to_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tchitchen.toml");
        std::fs::write(&path, "kitchen = \"k.yaml\"\n").unwrap();
        let c = Config::load_file(&path).unwrap();
        assert_eq!(c.kitchen, dir.path().join("k.yaml"));
        assert_eq!(c.journal, dir.path().join("journal/activity.jsonl"));
    }

    #[test]
    fn test_kb040_overrides() {
        let mut c = Config::default();
        c.apply_overrides(|key| match key {
            ENV_KITCHEN => Some("/srv/kitchen.yaml".to_string()),
            _ => None,
        });
        assert_eq!(c.kitchen, PathBuf::from("/srv/kitchen.yaml"));
        assert_eq!(c.journal, PathBuf::from("journal/activity.jsonl"));
    }
}
