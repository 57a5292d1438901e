//! Step arena for one expansion run.
//!
//! Each step binds a node to the slot it was taken from. Nodes are moved out
//! of their parent while they are being expanded and moved back in
//! [`Walk::reassemble`], children before parents.

use std::ops::{Index, IndexMut};

use indexmap::IndexMap;
use slotmap::{new_key_type, SlotMap};

use crate::tree::{Mods, Node};

new_key_type! {
    /// Handle to a [`Step`] inside a [`Walk`].
    pub struct StepId;
}

/// Where a step's node goes back to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Slot {
    Root,
    /// Item of the parent step's own collection.
    Item { parent: StepId, index: usize },
    /// Item of the parent element's content list.
    ContentItem { parent: StepId, index: usize },
    /// The parent element's single content node.
    Content { parent: StepId },
}

/// Sibling placement, as seen by `position()` / `is_first()` / `is_last()`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Placement {
    Root,
    /// 1-based position among element siblings.
    Item { position: usize, length: usize },
    Content,
}

impl Placement {
    pub(crate) fn position(self) -> Option<usize> {
        match self {
            Self::Root => None,
            Self::Item { position, .. } => Some(position),
            Self::Content => Some(1),
        }
    }

    pub(crate) fn is_first(self) -> bool {
        matches!(self, Self::Content | Self::Item { position: 1, .. })
    }

    pub(crate) fn is_last(self) -> bool {
        match self {
            Self::Root => false,
            Self::Item { position, length } => position == length,
            Self::Content => true,
        }
    }
}

#[derive(Debug)]
pub(crate) struct Step {
    pub(crate) node: Node,
    pub(crate) slot: Slot,
    pub(crate) placement: Placement,
    /// Block name inherited from the enclosing block.
    pub(crate) block: Option<String>,
    pub(crate) block_mods: Option<Mods>,
    pub(crate) tparams: IndexMap<String, Node>,
}

impl Step {
    pub(crate) fn parent(&self) -> Option<StepId> {
        match self.slot {
            Slot::Root => None,
            Slot::Item { parent, .. } | Slot::ContentItem { parent, .. } | Slot::Content { parent } => {
                Some(parent)
            }
        }
    }
}

/// All steps created while expanding one tree.
#[derive(Debug, Default)]
pub(crate) struct Walk {
    steps: SlotMap<StepId, Step>,
    /// Creation order; parents always precede their children.
    order: Vec<StepId>,
}

impl Walk {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, step: Step) -> StepId {
        let id = self.steps.insert(step);
        self.order.push(id);
        id
    }

    /// Steps from `id` up to the root, starting with `id` itself.
    pub(crate) fn ancestry(&self, id: StepId) -> impl Iterator<Item = &Step> + '_ {
        std::iter::successors(self.steps.get(id), |step| {
            step.parent().and_then(|p| self.steps.get(p))
        })
    }

    /// Move every node back into its slot and return the root node.
    pub(crate) fn reassemble(mut self) -> Node {
        let mut root = Node::Absent;
        for &id in self.order.iter().rev() {
            let Some(step) = self.steps.get_mut(id) else {
                continue;
            };
            let node = std::mem::take(&mut step.node);
            let slot = step.slot;
            match slot {
                Slot::Root => root = node,
                Slot::Item { parent, index } => {
                    if let Some(Node::Collection(items)) = self.steps.get_mut(parent).map(|p| &mut p.node) {
                        if let Some(item) = items.get_mut(index) {
                            *item = node;
                        }
                    }
                }
                Slot::ContentItem { parent, index } => {
                    let content = self
                        .steps
                        .get_mut(parent)
                        .and_then(|p| p.node.as_element_mut())
                        .map(|el| &mut el.content);
                    if let Some(Node::Collection(items)) = content {
                        if let Some(item) = items.get_mut(index) {
                            *item = node;
                        }
                    }
                }
                Slot::Content { parent } => {
                    if let Some(el) = self.steps.get_mut(parent).and_then(|p| p.node.as_element_mut()) {
                        el.content = node;
                    }
                }
            }
        }
        root
    }
}

impl Index<StepId> for Walk {
    type Output = Step;

    fn index(&self, id: StepId) -> &Step {
        &self.steps[id]
    }
}

impl IndexMut<StepId> for Walk {
    fn index_mut(&mut self, id: StepId) -> &mut Step {
        &mut self.steps[id]
    }
}
