//! Worklist expansion of a node tree to its fixed point.
//!
//! Steps are processed in FIFO order. A collection fans out into one step per
//! element item. An element resolves its block, gets dispatched, and then
//! either is re-queued with its replacement or has its content fanned out.
//! Scalars are left where they are.

use std::collections::VecDeque;

use indexmap::IndexMap;

use super::context::{Context, IdGenerator};
use super::guard;
use super::step::{Placement, Slot, Step, StepId, Walk};
use crate::error::Result;
use crate::matcher::Dispatcher;
use crate::options::Options;
use crate::tree::node::flatten_items;
use crate::tree::normalize::normalize;
use crate::tree::{ElementNode, Mods, Node};

/// Everything a run needs besides the tree itself.
pub(crate) struct Expander<'a> {
    pub(crate) options: &'a Options,
    pub(crate) dispatcher: &'a Dispatcher,
    pub(crate) ids: &'a IdGenerator,
}

impl<'a> Expander<'a> {
    /// Expand `root`, inheriting `block` / `block_mods` for element-only nodes.
    pub(crate) fn expand(
        &self,
        root: Node,
        block: Option<String>,
        block_mods: Option<Mods>,
    ) -> Result<Node> {
        let mut walk = Walk::new();
        let root = walk.insert(Step {
            node: normalize(root),
            slot: Slot::Root,
            placement: Placement::Root,
            block,
            block_mods,
            tparams: IndexMap::new(),
        });

        let mut queue = VecDeque::from([root]);
        while let Some(id) = queue.pop_front() {
            let node = &walk[id].node;
            let (is_list, is_element) = (
                matches!(node, Node::Collection(_)),
                matches!(node, Node::Element(_)),
            );
            if is_list {
                self.fan_out_items(&mut walk, id, &mut queue);
            } else if is_element {
                self.visit_element(&mut walk, id, &mut queue)?;
            }
        }
        Ok(walk.reassemble())
    }

    fn visit_element(&self, walk: &mut Walk, id: StepId, queue: &mut VecDeque<StepId>) -> Result<()> {
        let step = &mut walk[id];
        let Node::Element(el) = &mut step.node else {
            return Ok(());
        };
        resolve_entity(el, step.block.as_deref(), step.block_mods.as_ref());

        if !el.marks.stopped {
            if self.options.infinite_loop_detection {
                el.marks.visits += 1;
                let dispatches = self.dispatcher.tick();
                guard::check(el.marks.visits, dispatches, || {
                    el.path(&self.options.naming.elem)
                })?;
            }
            let resolved = el.block.clone().map(|block| (block, el.mods.clone()));

            let (result, replaced) = {
                let mut ctx = Context::new(self, walk, id);
                let result = self.dispatcher.dispatch(&mut ctx)?;
                (result, ctx.replaced)
            };

            if result.is_some() || replaced {
                let step = &mut walk[id];
                if let Some(node) = result {
                    step.node = normalize(node);
                }
                if let Some((block, mods)) = resolved {
                    step.block = Some(block);
                    step.block_mods = mods;
                }
                queue.push_back(id);
                return Ok(());
            }
        }

        self.fan_out_content(walk, id, queue);
        Ok(())
    }

    fn fan_out_items(&self, walk: &mut Walk, id: StepId, queue: &mut VecDeque<StepId>) {
        let step = &mut walk[id];
        let (block, block_mods) = (step.block.clone(), step.block_mods.clone());
        let Node::Collection(items) = &mut step.node else {
            return;
        };
        let children = take_elements(items);
        let length = children.len();
        for (position, (index, node)) in children.into_iter().enumerate() {
            let child = walk.insert(Step {
                node,
                slot: Slot::Item { parent: id, index },
                placement: Placement::Item {
                    position: position + 1,
                    length,
                },
                block: block.clone(),
                block_mods: block_mods.clone(),
                tparams: IndexMap::new(),
            });
            queue.push_back(child);
        }
    }

    fn fan_out_content(&self, walk: &mut Walk, id: StepId, queue: &mut VecDeque<StepId>) {
        let step = &mut walk[id];
        let Node::Element(el) = &mut step.node else {
            // A template rewrote the node in place; look at it again.
            queue.push_back(id);
            return;
        };
        let (block, block_mods) = if el.block.is_some() {
            (el.block.clone(), el.mods.clone())
        } else {
            (step.block.clone(), step.block_mods.clone())
        };

        let spawned: Vec<(Slot, Placement, Node)> = if let Node::Collection(items) = &mut el.content {
            let children = take_elements(items);
            let length = children.len();
            children
                .into_iter()
                .enumerate()
                .map(|(position, (index, node))| {
                    let placement = Placement::Item {
                        position: position + 1,
                        length,
                    };
                    (Slot::ContentItem { parent: id, index }, placement, node)
                })
                .collect()
        } else if matches!(el.content, Node::Element(_)) {
            vec![(
                Slot::Content { parent: id },
                Placement::Content,
                std::mem::take(&mut el.content),
            )]
        } else {
            Vec::new()
        };

        for (slot, placement, node) in spawned {
            let child = walk.insert(Step {
                node,
                slot,
                placement,
                block: block.clone(),
                block_mods: block_mods.clone(),
                tparams: IndexMap::new(),
            });
            queue.push_back(child);
        }
    }
}

/// Fill in the block for elements and settle which modifier map is which.
///
/// For an element, the modifiers written on it are its element modifiers and
/// `mods` becomes the enclosing block's modifiers.
fn resolve_entity(el: &mut ElementNode, block: Option<&str>, block_mods: Option<&Mods>) {
    if el.elem.is_some() {
        if el.block.is_none() {
            el.block = block.map(str::to_owned);
        }
        if el.elem_mods.is_none() {
            el.elem_mods = Some(el.mods.take().unwrap_or_default());
        }
        if el.mods.is_none() {
            el.mods = block_mods.cloned();
        }
    } else if el.block.is_some() && el.mods.is_none() {
        el.mods = Some(Mods::new());
    }
}

/// Flatten `items` and move every element out, leaving holes to refill.
fn take_elements(items: &mut Vec<Node>) -> Vec<(usize, Node)> {
    *items = flatten_items(std::mem::take(items));
    items
        .iter_mut()
        .enumerate()
        .filter(|(_, item)| matches!(item, Node::Element(_)))
        .map(|(index, item)| (index, std::mem::take(item)))
        .collect()
}
