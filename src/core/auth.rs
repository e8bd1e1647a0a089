//! KB-030: Who is acting — pluggable identity lookup for attributing changes.
//!
//! This is attribution for the activity journal, not a security boundary.

use super::error::AuthError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Role of a brigade member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    #[default]
    Cook,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Admin => write!(f, "admin"),
            Self::Cook => write!(f, "cook"),
        }
    }
}

/// An authenticated brigade member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub initials: String,
    #[serde(default)]
    pub role: Role,
}

impl Identity {
    /// Fail unless this identity is an admin.
    pub fn require_admin(&self, action: &str) -> Result<(), AuthError> {
        if self.role == Role::Admin {
            Ok(())
        } else {
            Err(AuthError::Forbidden {
                initials: self.initials.clone(),
                action: action.to_string(),
            })
        }
    }
}

/// Resolve an access code to an identity.
pub trait AuthProvider {
    fn authenticate(&self, code: &str) -> Result<Identity, AuthError>;
}

/// Fixed table of unit codes, typically loaded from configuration.
#[derive(Debug, Clone, Default)]
pub struct PinTable {
    entries: HashMap<String, Identity>,
}

impl PinTable {
    pub fn new(entries: HashMap<String, Identity>) -> Self {
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl AuthProvider for PinTable {
    fn authenticate(&self, code: &str) -> Result<Identity, AuthError> {
        self.entries
            .get(code.trim())
            .cloned()
            .ok_or(AuthError::InvalidCode)
    }
}
