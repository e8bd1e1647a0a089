//! KB-017: CLI subcommands — recipes, scale, prep, task board, journal.

use crate::core::auth::{AuthProvider, Identity};
use crate::core::config::Config;
use crate::core::store::{Store, YamlStore};
use crate::core::types::{
    Action, AggregatedLine, Category, IngredientLine, Kitchen, Recipe, TaskStatus,
};
use crate::core::{board, parser, yield_engine};
use crate::journal::eventlog;
use clap::Subcommand;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a new kitchen (kitchen.yaml + tchitchen.toml)
    Init {
        /// Directory to initialize (default: current)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Validate the kitchen file
    Validate,

    /// List recipes (recipe library)
    Recipes {
        /// production or plating
        #[arg(short, long, default_value = "production")]
        category: Category,

        /// Case-insensitive title search
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Scale a recipe to a target yield
    Scale {
        /// Recipe id
        recipe: String,

        /// Target yield, in the recipe's yield unit
        #[arg(long, conflicts_with = "percent")]
        to: Option<f64>,

        /// Target as a percentage of base yield
        #[arg(long)]
        percent: Option<f64>,
    },

    /// Procurement list for every in-progress task
    Prep,

    /// Show the task board
    Tasks,

    /// Add a task to the board
    AddTask {
        /// What to do
        name: String,

        /// Linked recipe id
        #[arg(short, long)]
        recipe: Option<String>,

        /// Yield to produce (default: recipe base yield)
        #[arg(long = "yield")]
        target_yield: Option<f64>,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Move a task to its next status
    Advance {
        /// Task id or unique prefix
        task: String,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Reorder a task (0 = top)
    MoveTask {
        /// Task id or unique prefix
        task: String,

        /// New position
        position: usize,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Remove a task from the board
    RemoveTask {
        /// Task id or unique prefix
        task: String,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Add a recipe sheet to the library
    AddRecipe {
        /// Recipe id (e.g. fond-brun)
        recipe: String,

        /// Display title
        #[arg(long)]
        title: String,

        /// production or plating
        #[arg(short, long, default_value = "production")]
        category: Category,

        /// Kitchen post responsible
        #[arg(long)]
        station: Option<String>,

        /// Base yield the ingredient list is written for
        #[arg(long = "yield")]
        base_yield: f64,

        /// Yield unit
        #[arg(long, default_value = "kg")]
        unit: String,

        /// Ingredient as item:qty:unit (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<IngredientLine>,

        /// Method text
        #[arg(long)]
        instructions: Option<String>,

        /// Photo URL
        #[arg(long)]
        image_url: Option<String>,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Edit a recipe sheet
    EditRecipe {
        /// Recipe id
        recipe: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(short, long)]
        category: Option<Category>,

        /// Kitchen post ("" clears it)
        #[arg(long)]
        station: Option<String>,

        #[arg(long = "yield")]
        base_yield: Option<f64>,

        #[arg(long)]
        unit: Option<String>,

        /// Replace the ingredient list, item:qty:unit (repeatable)
        #[arg(short, long = "ingredient")]
        ingredients: Vec<IngredientLine>,

        /// Add or update one ingredient by name, item:qty:unit (repeatable)
        #[arg(long = "set-ingredient")]
        set_ingredients: Vec<IngredientLine>,

        /// Remove an ingredient by name (repeatable)
        #[arg(long = "drop-ingredient")]
        drop_ingredients: Vec<String>,

        /// Method text ("" clears it)
        #[arg(long)]
        instructions: Option<String>,

        /// Photo URL ("" clears it)
        #[arg(long)]
        image_url: Option<String>,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Delete a recipe (admin only)
    RemoveRecipe {
        /// Recipe id
        recipe: String,

        /// Access code
        #[arg(long)]
        pin: String,
    },

    /// Show recent activity
    Log {
        /// Number of entries
        #[arg(short = 'n', long, default_value_t = eventlog::DEFAULT_LIMIT)]
        limit: usize,
    },
}

/// Dispatch a CLI command.
pub fn dispatch(cmd: Commands, config: &Config) -> Result<(), String> {
    match cmd {
        Commands::Init { path } => cmd_init(&path),
        Commands::Validate => cmd_validate(&config.kitchen),
        Commands::Recipes { category, search } => {
            cmd_recipes(&config.kitchen, category, search.as_deref())
        }
        Commands::Scale {
            recipe,
            to,
            percent,
        } => cmd_scale(&config.kitchen, &recipe, to, percent),
        Commands::Prep => cmd_prep(&config.kitchen),
        Commands::Tasks => cmd_tasks(&config.kitchen),
        Commands::AddTask {
            name,
            recipe,
            target_yield,
            pin,
        } => cmd_add_task(config, &pin, &name, recipe.as_deref(), target_yield),
        Commands::Advance { task, pin } => cmd_advance(config, &pin, &task),
        Commands::MoveTask {
            task,
            position,
            pin,
        } => cmd_move_task(config, &pin, &task, position),
        Commands::RemoveTask { task, pin } => cmd_remove_task(config, &pin, &task),
        Commands::AddRecipe {
            recipe,
            title,
            category,
            station,
            base_yield,
            unit,
            ingredients,
            instructions,
            image_url,
            pin,
        } => {
            let sheet = Recipe {
                title,
                category,
                station,
                base_yield,
                yield_unit: unit,
                ingredients,
                instructions,
                image_url,
            };
            cmd_add_recipe(config, &pin, &recipe, sheet)
        }
        Commands::EditRecipe {
            recipe,
            title,
            category,
            station,
            base_yield,
            unit,
            ingredients,
            set_ingredients,
            drop_ingredients,
            instructions,
            image_url,
            pin,
        } => {
            let edit = board::RecipeEdit {
                title,
                category,
                station,
                base_yield,
                yield_unit: unit,
                instructions,
                image_url,
                ingredients: Some(ingredients).filter(|v| !v.is_empty()),
                set_ingredients,
                drop_ingredients,
            };
            cmd_edit_recipe(config, &pin, &recipe, edit)
        }
        Commands::RemoveRecipe { recipe, pin } => cmd_remove_recipe(config, &pin, &recipe),
        Commands::Log { limit } => cmd_log(&config.journal, limit),
    }
}

const KITCHEN_TEMPLATE: &str = r#"version: "1.0"
name: my-kitchen

recipes:
  vinaigrette:
    title: Vinaigrette
    category: production
    station: Garde-manger
    base_yield: 1
    yield_unit: L
    ingredients:
      - { item: Huile, qty: 750, unit: mL }
      - { item: Vinaigre, qty: 250, unit: mL }
      - { item: Moutarde, qty: 30, unit: g }

tasks: []
"#;

const CONFIG_TEMPLATE: &str = r#"kitchen = "kitchen.yaml"
journal = "journal/activity.jsonl"

# Access codes for attributing changes
# [pins.1234]
# initials = "CH"
# role = "admin"
"#;

fn cmd_init(path: &Path) -> Result<(), String> {
    let kitchen_path = path.join("kitchen.yaml");
    if kitchen_path.exists() {
        return Err(format!("{} already exists", kitchen_path.display()));
    }

    std::fs::create_dir_all(path.join("journal"))
        .map_err(|e| format!("cannot create journal dir: {}", e))?;
    std::fs::write(&kitchen_path, KITCHEN_TEMPLATE)
        .map_err(|e| format!("cannot write {}: {}", kitchen_path.display(), e))?;

    let config_path = path.join("tchitchen.toml");
    if !config_path.exists() {
        std::fs::write(&config_path, CONFIG_TEMPLATE)
            .map_err(|e| format!("cannot write {}: {}", config_path.display(), e))?;
    }

    println!("Initialized kitchen at {}", path.display());
    println!("  Created: {}", kitchen_path.display());
    println!("  Config:  {}", config_path.display());
    Ok(())
}

fn cmd_validate(file: &Path) -> Result<(), String> {
    let kitchen = parser::parse_kitchen_file(file)?;
    let errors = parser::validate_kitchen(&kitchen);

    for task in board::stale_links(&kitchen) {
        eprintln!(
            "  WARNING: task '{}' links unknown recipe '{}'",
            task.display_name,
            task.recipe.as_deref().unwrap_or_default()
        );
    }

    if errors.is_empty() {
        println!(
            "OK: {} ({} recipes, {} tasks)",
            kitchen.name,
            kitchen.recipes.len(),
            kitchen.tasks.len()
        );
        Ok(())
    } else {
        for e in &errors {
            eprintln!("  ERROR: {}", e);
        }
        Err(format!("{} validation error(s)", errors.len()))
    }
}

/// Load a kitchen and refuse to work on an invalid one.
fn load_valid(file: &Path) -> Result<Kitchen, String> {
    let kitchen = YamlStore::new(file).load()?;
    let errors = parser::validate_kitchen(&kitchen);
    if errors.is_empty() {
        return Ok(kitchen);
    }
    for e in &errors {
        eprintln!("  ERROR: {}", e);
    }
    Err("validation failed".to_string())
}

fn cmd_recipes(file: &Path, category: Category, search: Option<&str>) -> Result<(), String> {
    let kitchen = load_valid(file)?;
    let found = board::filter_recipes(&kitchen, category, search);

    if found.is_empty() {
        println!("No {} recipes.", category);
        return Ok(());
    }
    for (id, recipe) in found {
        println!(
            "  {:<20} {} [{}] ({} {})",
            id,
            recipe.title,
            recipe.station.as_deref().unwrap_or("General"),
            recipe.base_yield,
            recipe.yield_unit
        );
    }
    Ok(())
}

fn cmd_scale(file: &Path, recipe_id: &str, to: Option<f64>, percent: Option<f64>) -> Result<(), String> {
    let kitchen = load_valid(file)?;
    let recipe = kitchen
        .recipes
        .get(recipe_id)
        .ok_or_else(|| format!("unknown recipe '{}'", recipe_id))?;

    let (target, scaled) = match (to, percent) {
        (Some(t), _) => (t, yield_engine::scale(recipe, t)),
        (None, Some(p)) => (
            yield_engine::percent_target(recipe, p),
            yield_engine::scale_percent(recipe, p),
        ),
        (None, None) => (recipe.base_yield, yield_engine::scale(recipe, recipe.base_yield)),
    };
    let lines = scaled.map_err(|e| e.to_string())?;
    if !yield_engine::within_slider(recipe, target) {
        let (lo, hi) = yield_engine::slider_bounds(recipe);
        warn!(
            "target {} {} is outside the usual range {}-{}",
            target, recipe.yield_unit, lo, hi
        );
    }

    println!(
        "{}: {} {} (base {} {}, x{})",
        recipe.title,
        yield_engine::format_quantity(target),
        recipe.yield_unit,
        recipe.base_yield,
        recipe.yield_unit,
        yield_engine::format_quantity(target / recipe.base_yield)
    );
    if lines.is_empty() {
        println!("  (no ingredients)");
    }
    for line in &lines {
        println!(
            "  {:<24} {:>8} {}",
            line.item,
            yield_engine::format_quantity(line.quantity),
            line.unit
        );
    }
    if let Some(ref instructions) = recipe.instructions {
        println!();
        println!("{}", instructions);
    }
    Ok(())
}

/// The sorted procurement list and the number of recipes feeding it.
fn prep_list(kitchen: &Kitchen) -> (usize, Vec<AggregatedLine>) {
    let requests = board::prep_requests(kitchen);
    let contributing = requests
        .iter()
        .filter(|r| yield_engine::contributes(r, &kitchen.recipes))
        .count();
    let mut lines = yield_engine::aggregate(&requests, &kitchen.recipes);
    lines.sort_by_key(|l| (l.item.to_lowercase(), l.unit.to_lowercase()));
    (contributing, lines)
}

/// Best effort: an invalid sheet is reported and skipped, never fatal.
fn cmd_prep(file: &Path) -> Result<(), String> {
    let kitchen = YamlStore::new(file).load()?;
    for e in parser::validate_kitchen(&kitchen) {
        warn!("{}", e);
    }
    for task in board::stale_links(&kitchen) {
        warn!(
            task = %task.display_name,
            "linked recipe '{}' not found, skipped",
            task.recipe.as_deref().unwrap_or_default()
        );
    }

    let (contributing, lines) = prep_list(&kitchen);
    if lines.is_empty() {
        println!("Nothing to prep: no in-progress task links a production recipe.");
        return Ok(());
    }

    println!("Prep list ({} recipe(s) in progress):", contributing);
    for line in &lines {
        println!("  {}", line);
    }
    Ok(())
}

fn cmd_tasks(file: &Path) -> Result<(), String> {
    let kitchen = load_valid(file)?;
    println!("{} ({} tasks)", kitchen.name, kitchen.tasks.len());
    println!();

    for (pos, task) in kitchen.tasks.iter().enumerate() {
        let symbol = match task.status {
            TaskStatus::Pending => " ",
            TaskStatus::InProgress => "~",
            TaskStatus::Completed => "x",
        };
        let short_id: String = task.id.chars().take(8).collect();
        let link = task
            .recipe
            .as_deref()
            .map(|r| format!(" -> {}", r))
            .unwrap_or_default();
        println!(
            "  {:>2}. [{}] {} {} ({}){}",
            pos, symbol, short_id, task.display_name, task.status, link
        );
    }
    Ok(())
}

/// Run one board change: authenticate, load, mutate, save, then journal.
///
/// Nothing is journaled unless the save succeeded. A failed journal append
/// does not fail the command.
fn apply_change<S, F>(
    store: &mut S,
    journal: &Path,
    identity: &Identity,
    action: Action,
    change: F,
) -> Result<String, String>
where
    S: Store,
    F: FnOnce(&mut Kitchen) -> Result<String, String>,
{
    let mut kitchen = store.load()?;
    let target = change(&mut kitchen)?;
    store.save(&kitchen)?;

    info!(user = %identity.initials, action = ?action, target = %target, "board updated");
    let entry = eventlog::entry(&identity.initials, action, &target);
    if let Err(e) = eventlog::append(journal, &entry) {
        warn!("journal append failed: {}", e);
    }
    Ok(target)
}

fn authenticate(config: &Config, pin: &str) -> Result<Identity, String> {
    let pins = config.pin_table();
    if pins.is_empty() {
        return Err("no access codes configured (add a [pins] table to the config)".to_string());
    }
    pins.authenticate(pin).map_err(|e| e.to_string())
}

fn cmd_add_task(
    config: &Config,
    pin: &str,
    name: &str,
    recipe: Option<&str>,
    target_yield: Option<f64>,
) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    if let Some(t) = target_yield {
        if !(t.is_finite() && t > 0.0) {
            return Err(format!("target yield must be positive, got {}", t));
        }
    }

    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::TaskAdded, |k| {
        if let Some(id) = recipe {
            if !k.recipes.contains_key(id) {
                return Err(format!("unknown recipe '{}'", id));
            }
        }
        let task = board::add_task(k, name, recipe, target_yield).map_err(|e| e.to_string())?;
        Ok(task.display_name)
    })?;
    println!("Added: {}", target);
    Ok(())
}

fn cmd_advance(config: &Config, pin: &str, task: &str) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    let mut store = YamlStore::new(&config.kitchen);
    let mut status = None;
    let target = apply_change(&mut store, &config.journal, &identity, Action::TaskAdvanced, |k| {
        let id = board::resolve_task_id(k, task).map_err(|e| e.to_string())?;
        let t = board::advance(k, &id).map_err(|e| e.to_string())?;
        status = Some(t.status);
        Ok(t.display_name)
    })?;
    if let Some(status) = status {
        println!("{}: {}", target, status);
    }
    Ok(())
}

fn cmd_move_task(config: &Config, pin: &str, task: &str, position: usize) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::TaskMoved, |k| {
        let id = board::resolve_task_id(k, task).map_err(|e| e.to_string())?;
        let t = board::move_task(k, &id, position).map_err(|e| e.to_string())?;
        Ok(t.display_name)
    })?;
    println!("Moved: {}", target);
    Ok(())
}

fn cmd_remove_task(config: &Config, pin: &str, task: &str) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::TaskRemoved, |k| {
        let id = board::resolve_task_id(k, task).map_err(|e| e.to_string())?;
        let t = board::remove_task(k, &id).map_err(|e| e.to_string())?;
        Ok(t.display_name)
    })?;
    println!("Removed: {}", target);
    Ok(())
}

fn cmd_add_recipe(config: &Config, pin: &str, recipe_id: &str, sheet: Recipe) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::RecipeAdded, |k| {
        let title = sheet.title.clone();
        board::add_recipe(k, recipe_id, sheet).map_err(|e| e.to_string())?;
        Ok(title)
    })?;
    println!("Added recipe: {}", target);
    Ok(())
}

fn cmd_edit_recipe(
    config: &Config,
    pin: &str,
    recipe_id: &str,
    edit: board::RecipeEdit,
) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::RecipeEdited, |k| {
        let r = board::edit_recipe(k, recipe_id, edit).map_err(|e| e.to_string())?;
        Ok(r.title)
    })?;
    println!("Updated recipe: {}", target);
    Ok(())
}

fn cmd_remove_recipe(config: &Config, pin: &str, recipe: &str) -> Result<(), String> {
    let identity = authenticate(config, pin)?;
    identity
        .require_admin("delete recipes")
        .map_err(|e| e.to_string())?;

    let mut store = YamlStore::new(&config.kitchen);
    let target = apply_change(&mut store, &config.journal, &identity, Action::RecipeRemoved, |k| {
        let r = board::remove_recipe(k, recipe).map_err(|e| e.to_string())?;
        Ok(r.title)
    })?;
    println!("Deleted recipe: {}", target);
    Ok(())
}

fn cmd_log(journal: &Path, limit: usize) -> Result<(), String> {
    let entries = eventlog::recent(journal, limit)?;
    if entries.is_empty() {
        println!("No activity.");
        return Ok(());
    }
    for e in &entries {
        println!("  {}  {:<3} {} {}", e.ts, e.user, e.action, e.target);
    }
    Ok(())
}
