//! KB-001: Kitchen data model.
//!
//! Defines the YAML schema for recipes and the task board, the engine's
//! input/output records, and activity journal entries. Persisted types derive
//! Serialize/Deserialize for YAML roundtripping.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Top-level kitchen.yaml
// ============================================================================

/// Root document — the brigade's recipes and task board.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Kitchen {
    /// Schema version (must be "1.0")
    pub version: String,

    /// Kitchen / brigade name
    pub name: String,

    /// Recipe library, keyed by recipe id (order-preserving)
    #[serde(default)]
    pub recipes: IndexMap<String, Recipe>,

    /// Task board, in display order
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Kitchen {
    /// An empty kitchen with the current schema version.
    pub fn new(name: &str) -> Self {
        Self {
            version: "1.0".to_string(),
            name: name.to_string(),
            recipes: IndexMap::new(),
            tasks: Vec::new(),
        }
    }
}

// ============================================================================
// Recipes
// ============================================================================

/// A recipe sheet ("fiche technique").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Display title
    pub title: String,

    /// Production or plating
    #[serde(default)]
    pub category: Category,

    /// Kitchen post responsible (e.g. "Saucier")
    #[serde(default)]
    pub station: Option<String>,

    /// Output quantity the ingredient list is calibrated for
    pub base_yield: f64,

    /// Display unit of the yield (kg, L, portions...)
    #[serde(default = "default_yield_unit")]
    pub yield_unit: String,

    /// Ingredient lines, in display order
    #[serde(default)]
    pub ingredients: Vec<IngredientLine>,

    /// Free-text method
    #[serde(default)]
    pub instructions: Option<String>,

    /// Public photo URL
    #[serde(default)]
    pub image_url: Option<String>,
}

fn default_yield_unit() -> String {
    "kg".to_string()
}

impl Recipe {
    /// Whether this recipe takes part in scaling and procurement.
    pub fn is_production(&self) -> bool {
        self.category == Category::Production
    }
}

/// Recipe category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Mise en place: carries a scalable ingredient list.
    #[default]
    Production,
    /// Presentation at the pass; no meaningful ingredient list.
    Plating,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Production => write!(f, "production"),
            Self::Plating => write!(f, "plating"),
        }
    }
}

impl std::str::FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "plating" | "pass" => Ok(Self::Plating),
            other => Err(format!("unknown category '{}' (expected production or plating)", other)),
        }
    }
}

/// One ingredient of a recipe, relative to the recipe's base yield.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IngredientLine {
    pub item: String,
    pub qty: f64,
    pub unit: String,
}

/// Parses `item:qty:unit`, e.g. `Os de veau:3:kg`. The item may itself
/// contain colons.
impl std::str::FromStr for IngredientLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.rsplitn(3, ':');
        let (Some(unit), Some(qty), Some(item)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(format!("ingredient '{}' must look like item:qty:unit", s));
        };
        let qty: f64 = qty
            .trim()
            .parse()
            .map_err(|_| format!("ingredient '{}' has a non-numeric quantity", s))?;
        Ok(Self {
            item: item.trim().to_string(),
            qty,
            unit: unit.trim().to_string(),
        })
    }
}

// ============================================================================
// Yield engine records
// ============================================================================

/// A request to scale one recipe to a target yield.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingRequest {
    pub recipe_id: String,
    pub target_yield: f64,
}

impl ScalingRequest {
    pub fn new(recipe_id: &str, target_yield: f64) -> Self {
        Self {
            recipe_id: recipe_id.to_string(),
            target_yield,
        }
    }
}

/// An ingredient line after scaling. `quantity` is never rounded.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledIngredientLine {
    pub item: String,
    pub unit: String,
    pub quantity: f64,
}

/// One consolidated procurement line.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedLine {
    pub item: String,
    pub unit: String,
    pub quantity: f64,
}

// ============================================================================
// Task board
// ============================================================================

/// A mise en place task on the board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Stable task id (UUID v4)
    pub id: String,

    /// What to do, as shown on the board
    pub display_name: String,

    /// Board status
    #[serde(default)]
    pub status: TaskStatus,

    /// Linked recipe id (may be stale)
    #[serde(default)]
    pub recipe: Option<String>,

    /// Yield to produce; defaults to the recipe's base yield
    #[serde(default)]
    pub target_yield: Option<f64>,
}

/// Task status, cycled by tapping the task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TaskStatus {
    /// Next status in the pending → in progress → completed → pending cycle.
    pub fn next(self) -> Self {
        match self {
            Self::Pending => Self::InProgress,
            Self::InProgress => Self::Completed,
            Self::Completed => Self::Pending,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "TO DO"),
            Self::InProgress => write!(f, "IN PROGRESS"),
            Self::Completed => write!(f, "DONE"),
        }
    }
}

// ============================================================================
// Activity journal
// ============================================================================

/// One line of the activity journal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityEntry {
    /// RFC 3339 UTC timestamp
    pub ts: String,

    /// Initials of the cook who acted
    pub user: String,

    /// What happened
    pub action: Action,

    /// Display name of the task or recipe acted upon
    pub target: String,
}

/// Journaled action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    TaskAdded,
    TaskAdvanced,
    TaskMoved,
    TaskRemoved,
    RecipeAdded,
    RecipeEdited,
    RecipeRemoved,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TaskAdded => write!(f, "ADDED"),
            Self::TaskAdvanced => write!(f, "ADVANCED"),
            Self::TaskMoved => write!(f, "MOVED"),
            Self::TaskRemoved => write!(f, "REMOVED"),
            Self::RecipeAdded => write!(f, "NEW RECIPE"),
            Self::RecipeEdited => write!(f, "EDITED RECIPE"),
            Self::RecipeRemoved => write!(f, "DELETED RECIPE"),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
