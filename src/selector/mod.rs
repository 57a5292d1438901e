//! Selector model: what a registered template applies to.
//!
//! A selector names a block, optionally an element, and at most one modifier
//! on each: `button`, `button_disabled`, `button__text_size_s`. The two
//! pseudo-selectors `$before` and `$after` address the global hooks.

mod parser;

pub use parser::parse;

use crate::tree::{ElementNode, ModValue, Mods};

/// Pseudo-selector for hooks that run before every rule.
pub const BEFORE: &str = "$before";
/// Pseudo-selector for hooks that run after every rule.
pub const AFTER: &str = "$after";

/// Required modifier value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModMatch {
    /// Modifier given without value; matches only `true`.
    Flag,
    Value(String),
}

impl ModMatch {
    /// Exact match: a flag wants `Bool(true)`, a value wants that string.
    pub fn matches(&self, value: Option<&ModValue>) -> bool {
        match (self, value) {
            (Self::Flag, Some(ModValue::Bool(true))) => true,
            (Self::Value(want), Some(ModValue::Str(got))) => want == got,
            _ => false,
        }
    }
}

/// A parsed block/element selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub block: String,
    pub block_mod: Option<(String, ModMatch)>,
    pub elem: Option<String>,
    pub elem_mod: Option<(String, ModMatch)>,
}

impl Declaration {
    /// Whether the modifier constraints hold for `node`.
    ///
    /// Block constraints read the block modifiers, element constraints the
    /// element modifiers.
    pub fn mods_match(&self, node: &ElementNode) -> bool {
        fn check(constraint: &Option<(String, ModMatch)>, mods: Option<&Mods>) -> bool {
            match constraint {
                None => true,
                Some((name, want)) => want.matches(mods.and_then(|m| m.get(name))),
            }
        }
        check(&self.block_mod, node.mods.as_ref()) && check(&self.elem_mod, node.elem_mods.as_ref())
    }
}

/// What a selector string addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    Before,
    After,
    Entity(Declaration),
}
