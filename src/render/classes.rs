//! BEM class tokens and JS init params for one element.

use serde_json::{Map, Value};

use crate::options::{Naming, Options};
use crate::tree::{ElementNode, ModValue};

/// Classes and JS params collected from a host element and its mixes.
#[derive(Debug, Default, PartialEq)]
pub struct BemClasses {
    pub tokens: Vec<String>,
    /// `{ base: params }` for every entity with JS enabled.
    pub js: Option<Map<String, Value>>,
}

impl BemClasses {
    /// Collect the classes of `el`.
    ///
    /// Elements with `bem: false` get nothing; mixes with `bem: false` or no
    /// resolvable block are skipped.
    pub fn collect(el: &ElementNode, options: &Options) -> Self {
        let mut out = Self::default();
        if el.bem == Some(false) {
            return out;
        }
        let naming = &options.naming;
        let base = el.path(&naming.elem);

        if el.block.is_some() {
            out.tokens.push(base.clone());
            out.push_mods(el, &base, naming, options.no_base_mods);
            if let Some(params) = el.js.as_ref().and_then(|js| js.to_value()) {
                out.js.get_or_insert_with(Map::new).insert(base.clone(), params);
            }
        }

        let mut js_cls_wanted = options.js_elem || el.elem.is_none();
        for mix in &el.mix {
            if mix.bem == Some(false) {
                continue;
            }
            let Some(mix_block) = mix.block.as_deref().or(el.block.as_deref()) else {
                continue;
            };
            let mix_elem = match (&mix.elem, &mix.block) {
                (Some(elem), _) => Some(elem.as_str()),
                (None, None) if el.block.is_some() => el.elem.as_deref(),
                _ => None,
            };
            let mix_base = match mix_elem {
                Some(elem) => format!("{mix_block}{}{elem}", naming.elem),
                None => mix_block.to_owned(),
            };

            if mix_base != base {
                out.tokens.push(mix_base.clone());
            }
            out.push_mods(mix, &mix_base, naming, options.no_base_mods);

            if let Some(params) = mix.js.as_ref().and_then(|js| js.to_value()) {
                out.js.get_or_insert_with(Map::new).insert(mix_base, params);
                js_cls_wanted |= mix_elem.is_none();
            }
        }

        if out.js.is_some() && js_cls_wanted {
            if let Some(js_cls) = &options.js_cls {
                out.tokens.push(js_cls.clone());
            }
        }
        out
    }

    fn push_mods(&mut self, el: &ElementNode, base: &str, naming: &Naming, no_base: bool) {
        let Some(mods) = el.own_mods() else {
            return;
        };
        let prefix = if no_base { "" } else { base };
        for (name, value) in mods.iter() {
            match value {
                ModValue::Bool(true) => {
                    self.tokens.push(format!("{prefix}{}{name}", naming.modifier));
                }
                ModValue::Str(val) if !val.is_empty() => {
                    self.tokens.push(format!(
                        "{prefix}{}{name}{}{val}",
                        naming.modifier, naming.value
                    ));
                }
                _ => {}
            }
        }
    }
}
