//! Typed errors for the yield engine, the task board and authentication.

use thiserror::Error;

/// Yield engine failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum YieldError {
    /// The recipe's base yield is not a positive, finite number.
    #[error("invalid recipe: base yield must be a positive number, got {base_yield}")]
    InvalidRecipe { base_yield: f64 },

    /// The requested target yield is not a positive, finite number.
    #[error("invalid request: target yield must be a positive number, got {target_yield}")]
    InvalidRequest { target_yield: f64 },
}

/// Task board operation failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("unknown task '{0}'")]
    UnknownTask(String),

    #[error("task id '{0}' matches more than one task")]
    AmbiguousTask(String),

    #[error("unknown recipe '{0}'")]
    UnknownRecipe(String),

    #[error("recipe '{0}' already exists")]
    DuplicateRecipe(String),

    #[error("recipe id must not be empty")]
    EmptyRecipeId,

    #[error("invalid recipe: {0}")]
    InvalidRecipe(String),

    #[error("task name must not be empty")]
    EmptyTaskName,
}

/// Authentication failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid code")]
    InvalidCode,

    #[error("'{initials}' is not allowed to {action}")]
    Forbidden { initials: String, action: String },
}
