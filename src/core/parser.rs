//! KB-002: Kitchen YAML parsing and validation.
//!
//! Parses kitchen.yaml and validates structural constraints:
//! - Version must be "1.0"
//! - Recipes need a title and a positive base yield
//! - Ingredient lines need an item, a unit and a non-negative quantity
//! - Task ids must be unique and names non-empty
//!
//! Stale task → recipe links are not validation errors; see
//! [`crate::core::board::stale_links`].

use super::types::*;
use super::yield_engine;
use std::collections::HashSet;
use std::path::Path;

/// Validation error.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

fn err(message: String) -> ValidationError {
    ValidationError { message }
}

/// Parse a kitchen.yaml file from disk.
pub fn parse_kitchen_file(path: &Path) -> Result<Kitchen, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {}", path.display(), e))?;
    parse_kitchen(&content)
}

/// Parse a kitchen.yaml from a string.
pub fn parse_kitchen(yaml: &str) -> Result<Kitchen, String> {
    serde_yaml_ng::from_str(yaml).map_err(|e| format!("YAML parse error: {}", e))
}

/// Validate a parsed kitchen. Returns a list of errors (empty = valid).
pub fn validate_kitchen(kitchen: &Kitchen) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if kitchen.version != "1.0" {
        errors.push(err(format!(
            "version must be \"1.0\", got \"{}\"",
            kitchen.version
        )));
    }

    if kitchen.name.trim().is_empty() {
        errors.push(err("name must not be empty".to_string()));
    }

    for (id, recipe) in &kitchen.recipes {
        errors.extend(validate_recipe(id, recipe));
    }

    let mut seen = HashSet::new();
    for task in &kitchen.tasks {
        if !seen.insert(task.id.as_str()) {
            errors.push(err(format!("duplicate task id '{}'", task.id)));
        }
        if task.display_name.trim().is_empty() {
            errors.push(err(format!("task '{}' has an empty name", task.id)));
        }
        if let Some(target) = task.target_yield {
            if !(target.is_finite() && target > 0.0) {
                errors.push(err(format!(
                    "task '{}' target yield must be positive, got {}",
                    task.id, target
                )));
            }
        }
    }

    errors
}

/// Validate one recipe sheet.
pub fn validate_recipe(id: &str, recipe: &Recipe) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if recipe.title.trim().is_empty() {
        errors.push(err(format!("recipe '{}' has no title", id)));
    }

    // plating sheets are never scaled
    if recipe.is_production() {
        if let Err(e) = yield_engine::check_recipe(recipe) {
            errors.push(err(format!("recipe '{}': {}", id, e)));
        }
    }

    for (i, line) in recipe.ingredients.iter().enumerate() {
        if line.item.trim().is_empty() {
            errors.push(err(format!("recipe '{}' ingredient #{} has no item", id, i + 1)));
        }
        if line.unit.trim().is_empty() {
            errors.push(err(format!(
                "recipe '{}' ingredient '{}' has no unit",
                id, line.item
            )));
        }
        if !(line.qty.is_finite() && line.qty >= 0.0) {
            errors.push(err(format!(
                "recipe '{}' ingredient '{}' has invalid quantity {}",
                id, line.item, line.qty
            )));
        }
    }

    errors
}
