//! Expansion engine: step arena, worklist, template context, loop guard.

mod context;
mod expand;
mod guard;
mod step;

pub use context::Context;
pub(crate) use context::IdGenerator;
pub(crate) use expand::Expander;
