//! Error taxonomy shared by every stage of a run.

use std::fmt;

use crate::literal::SyntaxError;

/// Which loop-guard counter tripped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopScope {
    /// One logical node was dequeued more than the per-node threshold.
    Node,
    /// The dispatcher ran more than the global threshold.
    Matcher,
}

impl fmt::Display for LoopScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node => write!(f, "json"),
            Self::Matcher => write!(f, "matcher"),
        }
    }
}

/// Errors raised by configuration, parsing, expansion or user templates.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    Configuration(String),
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error("infinite {scope} loop detected at \"{path}\"")]
    LoopDetected { scope: LoopScope, path: String },
    #[error("template failed: {0}")]
    Template(String),
}

impl Error {
    /// Build the error a template returns to abort the whole call.
    pub fn template(message: impl Into<String>) -> Self {
        Self::Template(message.into())
    }

    /// Whether this error came from the loop guard.
    pub fn is_loop(&self) -> bool {
        matches!(self, Self::LoopDetected { .. })
    }
}

/// Crate-wide result alias.
pub type Result<T, E = Error> = std::result::Result<T, E>;
