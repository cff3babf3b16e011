//! Error types for the spec engine.
//!
//! The taxonomy separates grammar errors (one bad assertion sequence),
//! matcher errors (bad arguments or a panicking matcher), and setup
//! errors (hook registration, matcher registration, configuration).

use crate::matcher::MatchError;
use crate::parser::GrammarError;
use crate::runner::{HookPos, Quantifier};
use thiserror::Error;

/// Errors that can occur while declaring or evaluating specs.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A malformed assertion sequence. Aborts that one assertion.
    #[error(transparent)]
    Grammar(#[from] GrammarError),

    /// A matcher rejected its arguments or panicked while running.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// A structurally invalid hook registration.
    #[error("bad trigger {position} {quantifier}")]
    Trigger {
        position: HookPos,
        quantifier: Quantifier,
    },

    /// A hook or spec was declared outside any open scope.
    #[error("no open describe scope")]
    NoScope,

    /// Registering a matcher with an invalid shape or duplicate name.
    #[error("matcher registration: {0}")]
    Registration(String),

    /// The selection pattern failed to compile. Fatal to the whole run.
    #[error("cannot compile spec pattern {pattern:?}: {message}")]
    Pattern { pattern: String, message: String },

    /// Error loading a configuration file.
    #[error("failed to load config: {path}: {message}")]
    Config { path: String, message: String },
}

/// Result type for spec operations.
pub type SpecResult<T> = Result<T, SpecError>;
