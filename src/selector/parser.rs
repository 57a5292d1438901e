//! Selector string → [`Selector`] under a [`Naming`] scheme.

use super::{Declaration, ModMatch, Selector, AFTER, BEFORE};
use crate::options::Naming;

/// Parse a selector.
///
/// The string is split once on the element separator. Each half is then split
/// into entity name and modifier: with classic naming (modifier separator equal
/// to value separator) `name_mod_val` splits twice on the same separator,
/// otherwise `name--mod_val` splits on each separator in turn. A modifier
/// without a value becomes [`ModMatch::Flag`].
pub fn parse(selector: &str, naming: &Naming) -> Selector {
    match selector {
        BEFORE => return Selector::Before,
        AFTER => return Selector::After,
        _ => {}
    }

    let (block_part, elem_part) = match selector.split_once(naming.elem.as_str()) {
        Some((block, elem)) => (block, Some(elem)),
        None => (selector, None),
    };

    let (block, block_mod) = split_entity(block_part, naming);
    let (elem, elem_mod) = match elem_part {
        Some(part) => {
            let (elem, elem_mod) = split_entity(part, naming);
            (Some(elem), elem_mod)
        }
        None => (None, None),
    };

    Selector::Entity(Declaration {
        block,
        block_mod,
        elem,
        elem_mod,
    })
}

fn split_entity(part: &str, naming: &Naming) -> (String, Option<(String, ModMatch)>) {
    let Some((name, modifier)) = part.split_once(naming.modifier.as_str()) else {
        return (part.to_owned(), None);
    };
    let (mod_name, mod_val) = match modifier.split_once(naming.value.as_str()) {
        Some((mod_name, val)) if !val.is_empty() => (mod_name, Some(val)),
        Some((mod_name, _)) => (mod_name, None),
        None => (modifier, None),
    };
    let matcher = match mod_val {
        Some(val) => ModMatch::Value(val.to_owned()),
        None => ModMatch::Flag,
    };
    (name.to_owned(), Some((mod_name.to_owned(), matcher)))
}
