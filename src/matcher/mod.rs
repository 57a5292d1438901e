//! Template registry and the dispatcher compiled from it.
//!
//! [`Registry`] keeps `(selector, template)` pairs in registration order.
//! [`Dispatcher::compile`] turns it into a block → element → candidates
//! lookup plus the global `$before` / `$after` hook lists.

mod compiler;
mod registry;

pub use compiler::Dispatcher;
pub use registry::{Registry, Selectors, Template};

use std::fmt;

/// Identity of one registered `(selector, template)` pair.
///
/// Strictly increasing in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MatcherId(u32);

impl MatcherId {
    pub(crate) fn new(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for MatcherId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}
