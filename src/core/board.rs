//! KB-020: Task board — the brigade's mise en place wall.
//!
//! All operations work on an in-memory [`Kitchen`] snapshot; persistence is
//! the caller's job (see [`crate::core::store`]).

use super::error::BoardError;
use super::parser;
use super::types::{Category, IngredientLine, Kitchen, Recipe, ScalingRequest, Task, TaskStatus};

fn task_index(kitchen: &Kitchen, task_id: &str) -> Result<usize, BoardError> {
    kitchen
        .tasks
        .iter()
        .position(|t| t.id == task_id)
        .ok_or_else(|| BoardError::UnknownTask(task_id.to_string()))
}

/// Resolve a full task id or a unique prefix of one (as printed by the
/// board) to the full id.
pub fn resolve_task_id(kitchen: &Kitchen, id_or_prefix: &str) -> Result<String, BoardError> {
    if let Some(t) = kitchen.tasks.iter().find(|t| t.id == id_or_prefix) {
        return Ok(t.id.clone());
    }
    let mut matches = kitchen
        .tasks
        .iter()
        .filter(|t| !id_or_prefix.is_empty() && t.id.starts_with(id_or_prefix));
    match (matches.next(), matches.next()) {
        (Some(t), None) => Ok(t.id.clone()),
        (Some(_), Some(_)) => Err(BoardError::AmbiguousTask(id_or_prefix.to_string())),
        _ => Err(BoardError::UnknownTask(id_or_prefix.to_string())),
    }
}

/// Append a pending task at the bottom of the board. Returns the new task.
pub fn add_task(
    kitchen: &mut Kitchen,
    name: &str,
    recipe: Option<&str>,
    target_yield: Option<f64>,
) -> Result<Task, BoardError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BoardError::EmptyTaskName);
    }
    let task = Task {
        id: uuid::Uuid::new_v4().to_string(),
        display_name: name.to_string(),
        status: TaskStatus::Pending,
        recipe: recipe.map(str::to_string),
        target_yield,
    };
    kitchen.tasks.push(task.clone());
    Ok(task)
}

/// Move a task to its next status. Returns the updated task.
pub fn advance(kitchen: &mut Kitchen, task_id: &str) -> Result<Task, BoardError> {
    let idx = task_index(kitchen, task_id)?;
    let task = &mut kitchen.tasks[idx];
    task.status = task.status.next();
    Ok(task.clone())
}

/// Move a task to `position` (0 = top). Positions past the end clamp to
/// the bottom.
pub fn move_task(kitchen: &mut Kitchen, task_id: &str, position: usize) -> Result<Task, BoardError> {
    let idx = task_index(kitchen, task_id)?;
    let task = kitchen.tasks.remove(idx);
    let position = position.min(kitchen.tasks.len());
    kitchen.tasks.insert(position, task.clone());
    Ok(task)
}

/// Take a task off the board. Returns the removed task.
pub fn remove_task(kitchen: &mut Kitchen, task_id: &str) -> Result<Task, BoardError> {
    let idx = task_index(kitchen, task_id)?;
    Ok(kitchen.tasks.remove(idx))
}

/// Changes to apply to an existing recipe. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct RecipeEdit {
    pub title: Option<String>,
    pub category: Option<Category>,
    pub station: Option<String>,
    pub base_yield: Option<f64>,
    pub yield_unit: Option<String>,
    pub instructions: Option<String>,
    pub image_url: Option<String>,
    /// Replaces the whole ingredient list
    pub ingredients: Option<Vec<IngredientLine>>,
    /// Upserted by case-insensitive item name, after `ingredients`
    pub set_ingredients: Vec<IngredientLine>,
    /// Item names to drop (case-insensitive), applied last
    pub drop_ingredients: Vec<String>,
}

fn check_sheet(id: &str, recipe: &Recipe) -> Result<(), BoardError> {
    let errors = parser::validate_recipe(id, recipe);
    if errors.is_empty() {
        return Ok(());
    }
    let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
    Err(BoardError::InvalidRecipe(messages.join("; ")))
}

/// Add a new recipe sheet at the end of the library.
pub fn add_recipe(kitchen: &mut Kitchen, recipe_id: &str, recipe: Recipe) -> Result<(), BoardError> {
    let recipe_id = recipe_id.trim();
    if recipe_id.is_empty() {
        return Err(BoardError::EmptyRecipeId);
    }
    if kitchen.recipes.contains_key(recipe_id) {
        return Err(BoardError::DuplicateRecipe(recipe_id.to_string()));
    }
    check_sheet(recipe_id, &recipe)?;
    kitchen.recipes.insert(recipe_id.to_string(), recipe);
    Ok(())
}

/// Apply an edit to a recipe in place. The kitchen is untouched if the
/// edited sheet does not validate. Returns the updated recipe.
pub fn edit_recipe(kitchen: &mut Kitchen, recipe_id: &str, edit: RecipeEdit) -> Result<Recipe, BoardError> {
    let current = kitchen
        .recipes
        .get_mut(recipe_id)
        .ok_or_else(|| BoardError::UnknownRecipe(recipe_id.to_string()))?;

    let mut updated = current.clone();
    if let Some(title) = edit.title {
        updated.title = title;
    }
    if let Some(category) = edit.category {
        updated.category = category;
    }
    if let Some(station) = edit.station {
        updated.station = Some(station).filter(|s| !s.trim().is_empty());
    }
    if let Some(base_yield) = edit.base_yield {
        updated.base_yield = base_yield;
    }
    if let Some(yield_unit) = edit.yield_unit {
        updated.yield_unit = yield_unit;
    }
    if let Some(instructions) = edit.instructions {
        updated.instructions = Some(instructions).filter(|s| !s.trim().is_empty());
    }
    if let Some(image_url) = edit.image_url {
        updated.image_url = Some(image_url).filter(|s| !s.trim().is_empty());
    }
    if let Some(ingredients) = edit.ingredients {
        updated.ingredients = ingredients;
    }
    for line in edit.set_ingredients {
        let key = line.item.to_lowercase();
        match updated
            .ingredients
            .iter_mut()
            .find(|l| l.item.to_lowercase() == key)
        {
            Some(existing) => *existing = line,
            None => updated.ingredients.push(line),
        }
    }
    for item in &edit.drop_ingredients {
        let key = item.trim().to_lowercase();
        updated.ingredients.retain(|l| l.item.to_lowercase() != key);
    }

    check_sheet(recipe_id, &updated)?;
    *current = updated.clone();
    Ok(updated)
}

/// Delete a recipe. Tasks linked to it keep their (now stale) link.
pub fn remove_recipe(kitchen: &mut Kitchen, recipe_id: &str) -> Result<Recipe, BoardError> {
    kitchen
        .recipes
        .shift_remove(recipe_id)
        .ok_or_else(|| BoardError::UnknownRecipe(recipe_id.to_string()))
}

/// The procurement request for everything currently in progress.
///
/// Every in-progress task with a recipe link contributes one request; the
/// target defaults to the recipe's base yield. Stale links still produce a
/// request, which the yield engine skips.
pub fn prep_requests(kitchen: &Kitchen) -> Vec<ScalingRequest> {
    kitchen
        .tasks
        .iter()
        .filter(|t| t.status == TaskStatus::InProgress)
        .filter_map(|t| {
            let recipe_id = t.recipe.as_deref()?;
            let target = t
                .target_yield
                .or_else(|| kitchen.recipes.get(recipe_id).map(|r| r.base_yield))
                .unwrap_or(0.0);
            Some(ScalingRequest::new(recipe_id, target))
        })
        .collect()
}

/// Tasks whose recipe link points at a recipe that no longer exists.
pub fn stale_links(kitchen: &Kitchen) -> Vec<&Task> {
    kitchen
        .tasks
        .iter()
        .filter(|t| {
            t.recipe
                .as_deref()
                .is_some_and(|id| !kitchen.recipes.contains_key(id))
        })
        .collect()
}

/// Recipe library view: one category, optionally narrowed by a
/// case-insensitive title search.
pub fn filter_recipes<'a>(
    kitchen: &'a Kitchen,
    category: Category,
    search: Option<&str>,
) -> Vec<(&'a str, &'a Recipe)> {
    let needle = search.map(str::to_lowercase).unwrap_or_default();
    kitchen
        .recipes
        .iter()
        .filter(|(_, r)| r.category == category && r.title.to_lowercase().contains(&needle))
        .map(|(id, r)| (id.as_str(), r))
        .collect()
}
