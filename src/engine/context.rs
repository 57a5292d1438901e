//! The mutation API handed to templates.
//!
//! A [`Context`] is bound to one step for the duration of one dispatch.
//! Setters keep the first value written unless `force` is set, so a template
//! registered later (and therefore run earlier) wins over generic ones.
//! Setters called while the current node is not an element do nothing.

use std::cell::Cell;

use super::expand::Expander;
use super::step::{Step, StepId, Walk};
use crate::error::Result;
use crate::options::Options;
use crate::tree::normalize::normalize;
use crate::tree::{AttrValue, Attrs, ElementNode, Js, ModValue, Mods, Node};

static ABSENT: Node = Node::Absent;

/// Source of `generate_id()` values for one engine instance.
#[derive(Debug)]
pub(crate) struct IdGenerator {
    seed: u64,
    counter: Cell<u64>,
}

impl IdGenerator {
    pub(crate) fn new(seed: u64) -> Self {
        Self {
            seed,
            counter: Cell::new(0),
        }
    }

    pub(crate) fn next(&self) -> String {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        format!("uniq{}{}", self.seed, n)
    }
}

/// Template-facing view of the node being dispatched.
pub struct Context<'a> {
    expander: &'a Expander<'a>,
    walk: &'a mut Walk,
    step: StepId,
    pub(crate) replaced: bool,
    /// Set while a `$before`/`$after` hook runs; nested dispatches skip hooks.
    pub(crate) in_hook: bool,
}

impl<'a> Context<'a> {
    pub(crate) fn new(expander: &'a Expander<'a>, walk: &'a mut Walk, step: StepId) -> Self {
        Self {
            expander,
            walk,
            step,
            replaced: false,
            in_hook: false,
        }
    }

    fn current(&self) -> &Step {
        &self.walk[self.step]
    }

    // -----------------------------------------------------------------------
    // Node access
    // -----------------------------------------------------------------------

    /// The live node.
    pub fn json(&self) -> &Node {
        &self.current().node
    }

    /// The live node, mutably.
    pub fn json_mut(&mut self) -> &mut Node {
        &mut self.walk[self.step].node
    }

    /// An owned copy of the live node.
    ///
    /// The copy keeps the node's identity: rules already applied to it will
    /// not fire again when it is returned as a replacement.
    pub fn snapshot(&self) -> Node {
        self.json().clone()
    }

    pub fn element(&self) -> Option<&ElementNode> {
        self.json().as_element()
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementNode> {
        self.json_mut().as_element_mut()
    }

    /// Engine options for this run.
    pub fn options(&self) -> &Options {
        self.expander.options
    }

    /// Whether `node` is a scalar or absent.
    pub fn is_simple(node: &Node) -> bool {
        node.is_simple()
    }

    /// A new id, unique within this engine instance.
    pub fn generate_id(&self) -> String {
        self.expander.ids.next()
    }

    // -----------------------------------------------------------------------
    // Position
    // -----------------------------------------------------------------------

    /// 1-based position among element siblings; `None` for the root.
    pub fn position(&self) -> Option<usize> {
        self.current().placement.position()
    }

    pub fn is_first(&self) -> bool {
        self.current().placement.is_first()
    }

    pub fn is_last(&self) -> bool {
        self.current().placement.is_last()
    }

    // -----------------------------------------------------------------------
    // Tag, class, bem
    // -----------------------------------------------------------------------

    pub fn tag(&self) -> Option<&str> {
        self.element()?.tag.as_deref()
    }

    /// Set the tag; `""` renders content without any wrapping tag.
    pub fn set_tag(&mut self, tag: impl Into<String>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.tag.is_none() {
                el.tag = Some(tag.into());
            }
        }
        self
    }

    pub fn cls(&self) -> Option<&str> {
        self.element()?.cls.as_deref()
    }

    pub fn set_cls(&mut self, cls: impl AsRef<str>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.cls.as_deref().map_or(true, str::is_empty) {
                el.cls = Some(cls.as_ref().trim().to_owned());
            }
        }
        self
    }

    pub fn bem(&self) -> Option<bool> {
        self.element()?.bem
    }

    /// `false` disables BEM classes and JS for this node only.
    pub fn set_bem(&mut self, bem: bool, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.bem != Some(true) {
                el.bem = Some(bem);
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Modifiers
    // -----------------------------------------------------------------------

    /// A modifier of the active map (element modifiers for elements).
    pub fn mod_(&self, name: &str) -> Option<&ModValue> {
        self.mods()?.get(name)
    }

    pub fn set_mod(&mut self, name: &str, value: impl Into<ModValue>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            el.own_mods_mut().set(name, value.into(), force);
        }
        self
    }

    pub fn mods(&self) -> Option<&Mods> {
        self.element()?.own_mods()
    }

    /// Merge a modifier map. Unforced, existing values win.
    pub fn set_mods(&mut self, mods: Mods, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            el.own_mods_mut().merge(mods, force);
        }
        self
    }

    // -----------------------------------------------------------------------
    // Attributes
    // -----------------------------------------------------------------------

    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.element()?.attrs.get(name)
    }

    pub fn set_attr(&mut self, name: &str, value: impl Into<AttrValue>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || !el.attrs.contains_key(name) {
                el.attrs.insert(name.to_owned(), value.into());
            }
        }
        self
    }

    pub fn attrs(&self) -> Option<&Attrs> {
        self.element().map(|el| &el.attrs)
    }

    /// Merge an attribute map.
    ///
    /// Unforced: existing keys keep their value and position, new keys are
    /// appended. Forced: `attrs` comes first, untouched existing keys follow.
    pub fn set_attrs(&mut self, attrs: Attrs, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force {
                let mut merged = attrs;
                for (k, v) in std::mem::take(&mut el.attrs) {
                    merged.entry(k).or_insert(v);
                }
                el.attrs = merged;
            } else {
                for (k, v) in attrs {
                    el.attrs.entry(k).or_insert(v);
                }
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Content
    // -----------------------------------------------------------------------

    pub fn content(&self) -> &Node {
        self.element().map_or(&ABSENT, |el| &el.content)
    }

    pub fn set_content(&mut self, content: impl Into<Node>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.content.is_absent() {
                el.content = content.into();
            }
        }
        self
    }

    /// Take the content out, leaving it absent.
    ///
    /// Handy for wrapping: `let inner = ctx.take_content(); ctx.set_content(..., true)`.
    pub fn take_content(&mut self) -> Node {
        self.element_mut()
            .map(|el| std::mem::take(&mut el.content))
            .unwrap_or_default()
    }

    pub fn html(&self) -> Option<&str> {
        self.element()?.html.as_deref()
    }

    /// Set raw markup; it wins over `content` at render time.
    pub fn set_html(&mut self, html: impl Into<String>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.html.is_none() {
                el.html = Some(html.into());
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Mix, JS
    // -----------------------------------------------------------------------

    pub fn mix(&self) -> &[ElementNode] {
        match self.element() {
            Some(el) => &el.mix,
            None => &[],
        }
    }

    /// Add one element or a list of elements to the mix.
    ///
    /// Unforced appends, forced replaces. Non-element entries are ignored.
    pub fn set_mix(&mut self, mix: impl Into<Node>, force: bool) -> &mut Self {
        let entries = mix_entries(mix.into());
        if let Some(el) = self.element_mut() {
            if force {
                el.mix = entries;
            } else {
                el.mix.extend(entries);
            }
        }
        self
    }

    pub fn js(&self) -> Option<&Js> {
        self.element()?.js.as_ref()
    }

    /// Enable JS or add params. Unforced, existing params win.
    pub fn set_js(&mut self, js: impl Into<Js>, force: bool) -> &mut Self {
        let js = js.into();
        if let Some(el) = self.element_mut() {
            match &mut el.js {
                Some(current) if !force => current.merge(js),
                slot => *slot = Some(js),
            }
        }
        self
    }

    pub fn js_attr(&self) -> Option<&str> {
        self.element()?.js_attr.as_deref()
    }

    pub fn set_js_attr(&mut self, name: impl Into<String>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || el.js_attr.is_none() {
                el.js_attr = Some(name.into());
            }
        }
        self
    }

    // -----------------------------------------------------------------------
    // Params
    // -----------------------------------------------------------------------

    /// Caller data stored on the node.
    pub fn param(&self, key: &str) -> Option<&Node> {
        self.element()?.params.get(key)
    }

    pub fn set_param(&mut self, key: &str, value: impl Into<Node>, force: bool) -> &mut Self {
        if let Some(el) = self.element_mut() {
            if force || !el.params.contains_key(key) {
                el.params.insert(key.to_owned(), value.into());
            }
        }
        self
    }

    /// Template param from the nearest step, starting at this one and
    /// walking up through the ancestors.
    pub fn tparam(&self, key: &str) -> Option<&Node> {
        self.walk
            .ancestry(self.step)
            .find_map(|step| step.tparams.get(key))
    }

    /// Store a template param on this step, visible to all descendants.
    pub fn set_tparam(&mut self, key: &str, value: impl Into<Node>, force: bool) -> &mut Self {
        let tparams = &mut self.walk[self.step].tparams;
        if force || !tparams.contains_key(key) {
            tparams.insert(key.to_owned(), value.into());
        }
        self
    }

    // -----------------------------------------------------------------------
    // Flow control
    // -----------------------------------------------------------------------

    /// Skip the remaining rules for this node, now and on later visits.
    pub fn stop(&mut self) -> &mut Self {
        if let Some(el) = self.element_mut() {
            el.marks.stopped = true;
        }
        self
    }

    pub fn is_stopped(&self) -> bool {
        self.element().is_some_and(ElementNode::is_stopped)
    }

    /// Run the rules that have not fired yet against the node as it is now.
    ///
    /// If one of them returns a replacement, the live node becomes that
    /// replacement. Called from a hook, only the rules run.
    pub fn apply_base(&mut self) -> Result<&mut Self> {
        let dispatcher = self.expander.dispatcher;
        if let Some(node) = dispatcher.dispatch(self)? {
            *self.json_mut() = normalize(node);
            self.replaced = true;
        }
        Ok(self)
    }

    /// Expand a detached tree with the full engine.
    ///
    /// Elements without a block inherit the current node's block.
    pub fn process(&self, node: impl Into<Node>) -> Result<Node> {
        let (block, mods) = match self.element() {
            Some(el) if el.block.is_some() => (el.block.clone(), el.mods.clone()),
            _ => {
                let step = self.current();
                (step.block.clone(), step.block_mods.clone())
            }
        };
        self.expander.expand(node.into(), block, mods)
    }
}

fn mix_entries(node: Node) -> Vec<ElementNode> {
    match node {
        Node::Element(el) => vec![*el],
        Node::Collection(items) => items.into_iter().flat_map(mix_entries).collect(),
        _ => Vec::new(),
    }
}
