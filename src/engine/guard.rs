//! Runaway-recursion detection.
//!
//! Two counters: visits of one logical node (carried in its marks, so clones
//! keep counting) and node visits across the whole dispatcher.

use crate::error::{Error, LoopScope, Result};

/// Visits of one logical node before it counts as looping.
pub(crate) const NODE_VISIT_LIMIT: u32 = 100;
/// Dispatcher-wide visits before the run counts as looping.
pub(crate) const DISPATCH_LIMIT: u32 = 1000;

/// Fail when either counter is past its limit.
pub(crate) fn check(node_visits: u32, dispatches: u32, path: impl FnOnce() -> String) -> Result<()> {
    let scope = if node_visits > NODE_VISIT_LIMIT {
        LoopScope::Node
    } else if dispatches > DISPATCH_LIMIT {
        LoopScope::Matcher
    } else {
        return Ok(());
    };
    let path = path();
    tracing::warn!(%scope, %path, node_visits, dispatches, "loop guard tripped");
    Err(Error::LoopDetected { scope, path })
}
