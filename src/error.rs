//! Setup-time errors for encoded values and import resolution
//!
//! Every variant is fatal: it aborts resolution before a single way is parsed.
//! Per-way data problems never surface here, parsers fall back to defaults instead.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EvError>;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EvError {
    /// Name is not in the registry at all
    #[error("unknown encoded value '{name}'{}", unknown_hint(.required_by, .suggestion))]
    UnknownName {
        name: String,
        required_by: Option<String>,
        suggestion: Option<String>,
    },

    /// Name was retired on purpose; carries migration guidance
    #[error("encoded value '{name}' is obsolete: {guidance}")]
    Obsolete { name: String, guidance: String },

    /// Dependency cycle, listed from the first repeated name back to itself
    #[error("cyclic dependency: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("encoded value '{0}' is already registered")]
    Duplicate(String),

    #[error("invalid definition for '{name}': {reason}")]
    InvalidDefinition { name: String, reason: String },

    #[error("encoded value '{name}' is {actual}, expected {expected}")]
    TypeMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("encoded value '{0}' is not registered")]
    NotRegistered(String),

    #[error("cannot place '{0}': edge record layout is frozen")]
    AllocatorFrozen(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

fn unknown_hint(required_by: &Option<String>, suggestion: &Option<String>) -> String {
    let mut hint = String::new();
    if let Some(r) = required_by {
        hint.push_str(&format!(" (required by '{r}')"));
    }
    if let Some(s) = suggestion {
        hint.push_str(&format!(", did you mean '{s}'?"));
    }
    hint
}

impl EvError {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        EvError::InvalidDefinition {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}
