//! Registry → dispatch table.
//!
//! Candidates are grouped by block, then by element (`None` for block-level
//! rules). Inside a bucket, and in the hook lists, later registrations come
//! first so an override registered after a generic rule gets the first say.

use std::cell::Cell;
use std::collections::HashMap;

use super::registry::{Registry, Template};
use super::MatcherId;
use crate::engine::Context;
use crate::error::Result;
use crate::options::Options;
use crate::selector::{self, Declaration, Selector};
use crate::tree::Node;

/// A rule waiting in a bucket.
struct Candidate {
    id: MatcherId,
    decl: Declaration,
    template: Template,
}

type ElemBuckets = HashMap<Option<String>, Vec<Candidate>>;

/// Compiled, immutable dispatch table.
pub struct Dispatcher {
    blocks: HashMap<String, ElemBuckets>,
    before: Vec<Template>,
    after: Vec<Template>,
    stop_skips_after_hooks: bool,
    /// Dispatches since compile or the last reset, for the loop guard.
    calls: Cell<u32>,
}

impl Dispatcher {
    /// Build the table from the current registry contents.
    pub fn compile(registry: &Registry, options: &Options) -> Self {
        let mut blocks: HashMap<String, ElemBuckets> = HashMap::new();
        let mut before = Vec::new();
        let mut after = Vec::new();

        for entry in registry.entries().iter().rev() {
            match selector::parse(&entry.selector, &options.naming) {
                Selector::Before => before.push(entry.template.clone()),
                Selector::After => after.push(entry.template.clone()),
                Selector::Entity(decl) => {
                    blocks
                        .entry(decl.block.clone())
                        .or_default()
                        .entry(decl.elem.clone())
                        .or_default()
                        .push(Candidate {
                            id: entry.id,
                            decl,
                            template: entry.template.clone(),
                        });
                }
            }
        }

        tracing::debug!(
            rules = registry.len(),
            blocks = blocks.len(),
            before = before.len(),
            after = after.len(),
            "compiled dispatcher"
        );

        Self {
            blocks,
            before,
            after,
            stop_skips_after_hooks: options.stop_skips_after_hooks,
            calls: Cell::new(0),
        }
    }

    /// Run hooks and the matching rules against the context's node.
    ///
    /// Returns the replacement a rule produced, if any. A falsy replacement
    /// becomes empty text so it still counts as "replaced".
    pub fn dispatch(&self, ctx: &mut Context<'_>) -> Result<Option<Node>> {
        self.run_hooks(&self.before, ctx)?;

        let mut result = None;
        if let Some(candidates) = self.candidates_for(ctx) {
            for candidate in candidates {
                let Some(el) = ctx.element_mut() else {
                    break;
                };
                if el.marks.applied.contains(&candidate.id) || !candidate.decl.mods_match(el) {
                    continue;
                }
                el.marks.applied.insert(candidate.id);
                tracing::trace!(matcher = %candidate.id, block = %candidate.decl.block, "applying template");

                if let Some(node) = (candidate.template)(ctx)? {
                    result = Some(if node.is_falsy() { Node::text("") } else { node });
                    break;
                }
                if ctx.is_stopped() {
                    break;
                }
            }
        }

        if !(self.stop_skips_after_hooks && ctx.is_stopped()) {
            self.run_hooks(&self.after, ctx)?;
        }
        Ok(result)
    }

    /// Hooks are not re-entered: an `apply_base()` inside a hook dispatches
    /// rules only.
    fn run_hooks(&self, hooks: &[Template], ctx: &mut Context<'_>) -> Result<()> {
        if ctx.in_hook {
            return Ok(());
        }
        ctx.in_hook = true;
        let outcome = hooks.iter().try_for_each(|hook| hook(ctx).map(drop));
        ctx.in_hook = false;
        outcome
    }

    fn candidates_for(&self, ctx: &Context<'_>) -> Option<&[Candidate]> {
        let el = ctx.element()?;
        let block = el.block.as_deref()?;
        let bucket = self.blocks.get(block)?.get(&el.elem)?;
        Some(bucket)
    }

    /// Count one node visit; returns the new total.
    pub(crate) fn tick(&self) -> u32 {
        let n = self.calls.get() + 1;
        self.calls.set(n);
        n
    }

    pub(crate) fn reset_counter(&self) {
        self.calls.set(0);
    }

    /// Number of block-level rules compiled (hooks excluded).
    pub fn rule_count(&self) -> usize {
        self.blocks
            .values()
            .flat_map(HashMap::values)
            .map(Vec::len)
            .sum()
    }
}
