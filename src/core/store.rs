//! KB-013: Kitchen storage — the repository seam between commands and data.
//!
//! Commands never touch files directly: they load a [`Kitchen`] snapshot
//! through a [`Store`], mutate it in memory, and hand it back to `save`.

use super::parser;
use super::types::{Kitchen, Recipe, Task};
use indexmap::IndexMap;
use std::path::PathBuf;
use tracing::debug;

/// Load/save access to a kitchen snapshot.
pub trait Store {
    /// Load the full snapshot.
    fn load(&self) -> Result<Kitchen, String>;

    /// Replace the stored snapshot.
    fn save(&mut self, kitchen: &Kitchen) -> Result<(), String>;

    /// Recipe library, keyed by id.
    fn recipes(&self) -> Result<IndexMap<String, Recipe>, String> {
        Ok(self.load()?.recipes)
    }

    /// Task board, in display order.
    fn tasks(&self) -> Result<Vec<Task>, String> {
        Ok(self.load()?.tasks)
    }
}

/// A kitchen persisted as a single YAML file.
#[derive(Debug, Clone)]
pub struct YamlStore {
    path: PathBuf,
}

impl YamlStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl Store for YamlStore {
    fn load(&self) -> Result<Kitchen, String> {
        debug!(path = %self.path.display(), "loading kitchen");
        parser::parse_kitchen_file(&self.path)
    }

    /// Save atomically (write to temp, then rename).
    fn save(&mut self, kitchen: &Kitchen) -> Result<(), String> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("cannot create dir {}: {}", parent.display(), e))?;
        }

        let yaml = serde_yaml_ng::to_string(kitchen).map_err(|e| format!("serialize error: {}", e))?;

        let tmp_path = self.path.with_extension("yaml.tmp");
        std::fs::write(&tmp_path, &yaml)
            .map_err(|e| format!("cannot write {}: {}", tmp_path.display(), e))?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| {
            format!(
                "cannot rename {} → {}: {}",
                tmp_path.display(),
                self.path.display(),
                e
            )
        })?;

        debug!(
            path = %self.path.display(),
            recipes = kitchen.recipes.len(),
            tasks = kitchen.tasks.len(),
            "kitchen saved"
        );
        Ok(())
    }
}

/// An in-process kitchen, for tests and embedding.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    kitchen: Kitchen,
}

impl MemoryStore {
    pub fn new(kitchen: Kitchen) -> Self {
        Self { kitchen }
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Kitchen, String> {
        Ok(self.kitchen.clone())
    }

    fn save(&mut self, kitchen: &Kitchen) -> Result<(), String> {
        self.kitchen = kitchen.clone();
        Ok(())
    }
}
