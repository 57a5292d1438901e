//! Ordered store of registered templates.

use std::fmt;
use std::rc::Rc;

use super::MatcherId;
use crate::engine::Context;
use crate::error::Result;
use crate::tree::Node;

/// A template callback.
///
/// Returning `Ok(Some(node))` replaces the current node; `Ok(None)` keeps it
/// (with whatever the callback changed through the context).
pub type Template = Rc<dyn Fn(&mut Context<'_>) -> Result<Option<Node>>>;

/// One accepted registration.
#[derive(Clone)]
pub(crate) struct Entry {
    pub(crate) id: MatcherId,
    pub(crate) selector: String,
    pub(crate) template: Template,
}

impl fmt::Debug for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entry")
            .field("id", &self.id)
            .field("selector", &self.selector)
            .finish_non_exhaustive()
    }
}

/// One or many selector strings for a single template.
pub trait Selectors {
    fn into_selectors(self) -> Vec<String>;
}

impl Selectors for &str {
    fn into_selectors(self) -> Vec<String> {
        vec![self.to_owned()]
    }
}

impl Selectors for String {
    fn into_selectors(self) -> Vec<String> {
        vec![self]
    }
}

impl Selectors for &[&str] {
    fn into_selectors(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl<const N: usize> Selectors for [&str; N] {
    fn into_selectors(self) -> Vec<String> {
        self.iter().map(|s| (*s).to_owned()).collect()
    }
}

impl Selectors for Vec<&str> {
    fn into_selectors(self) -> Vec<String> {
        self.into_iter().map(str::to_owned).collect()
    }
}

impl Selectors for Vec<String> {
    fn into_selectors(self) -> Vec<String> {
        self
    }
}

/// Registration-ordered `(selector, template)` pairs.
#[derive(Debug, Default)]
pub struct Registry {
    entries: Vec<Entry>,
    next_id: u32,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `template` under every non-empty selector.
    ///
    /// Returns the identities assigned, in order. Empty selectors are skipped.
    pub fn register(&mut self, selectors: impl Selectors, template: Template) -> Vec<MatcherId> {
        selectors
            .into_selectors()
            .into_iter()
            .filter_map(|selector| self.push(selector, Rc::clone(&template)))
            .collect()
    }

    fn push(&mut self, selector: String, template: Template) -> Option<MatcherId> {
        let selector = selector.trim().to_owned();
        if selector.is_empty() {
            return None;
        }
        let id = MatcherId::new(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            selector,
            template,
        });
        Some(id)
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
