//! Engine options: naming delimiters, JS attribute rendering, guards.
//!
//! [`Options`] is set once on a [`crate::Bh`] and read-only during a run.
//! It derives serde traits so hosts can keep it alongside their own config.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// ---------------------------------------------------------------------------
// Naming
// ---------------------------------------------------------------------------

/// BEM naming delimiters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Naming {
    /// Separates block and element: `block__elem`.
    pub elem: String,
    /// Separates an entity and its modifier name: `block_mod`.
    #[serde(rename = "mod")]
    pub modifier: String,
    /// Separates a modifier name and its value: `block_mod_val`.
    #[serde(rename = "val")]
    pub value: String,
}

impl Default for Naming {
    fn default() -> Self {
        Self {
            elem: "__".into(),
            modifier: "_".into(),
            value: "_".into(),
        }
    }
}

impl Naming {
    /// Create the classic `__` / `_` / `_` naming.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the element separator (builder).
    pub fn with_elem(mut self, sep: impl Into<String>) -> Self {
        self.elem = sep.into();
        self
    }

    /// Set the modifier separator (builder).
    pub fn with_mod(mut self, sep: impl Into<String>) -> Self {
        self.modifier = sep.into();
        self
    }

    /// Set the modifier value separator (builder).
    pub fn with_val(mut self, sep: impl Into<String>) -> Self {
        self.value = sep.into();
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, sep) in [
            ("elem", &self.elem),
            ("mod", &self.modifier),
            ("val", &self.value),
        ] {
            if sep.is_empty() {
                return Err(Error::Configuration(format!(
                    "naming separator `{name}` must not be empty"
                )));
            }
        }
        if self.elem == self.modifier || self.elem == self.value {
            return Err(Error::Configuration(format!(
                "element separator `{}` must differ from modifier separators",
                self.elem
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// How the collected JS parameters are written into the JS attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsAttrScheme {
    /// `onclick="return {...}"`.
    #[default]
    Js,
    /// `data-bem="{...}"`.
    Json,
}

/// Engine configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Options {
    pub naming: Naming,
    /// Attribute that receives the JS parameters.
    pub js_attr_name: String,
    pub js_attr_scheme: JsAttrScheme,
    /// Class token added to nodes that carry JS parameters. `None` disables it.
    pub js_cls: Option<String>,
    /// Whether elements (not only blocks) receive the JS class.
    pub js_elem: bool,
    /// Render modifier classes without the repeated base (`_disabled`).
    pub no_base_mods: bool,
    /// Escape scalar text content.
    pub escape_content: bool,
    /// Abort runaway template recursion with [`Error::LoopDetected`].
    pub infinite_loop_detection: bool,
    /// Skip `$after` hooks for a node whose template called `stop()`.
    pub stop_skips_after_hooks: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            naming: Naming::default(),
            js_attr_name: "onclick".into(),
            js_attr_scheme: JsAttrScheme::Js,
            js_cls: Some("i-bem".into()),
            js_elem: true,
            no_base_mods: false,
            escape_content: false,
            infinite_loop_detection: false,
            stop_skips_after_hooks: false,
        }
    }
}

impl Options {
    /// Create the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the naming scheme (builder).
    pub fn with_naming(mut self, naming: Naming) -> Self {
        self.naming = naming;
        self
    }

    /// Set the JS attribute name (builder).
    pub fn with_js_attr_name(mut self, name: impl Into<String>) -> Self {
        self.js_attr_name = name.into();
        self
    }

    /// Set the JS attribute scheme (builder).
    pub fn with_js_attr_scheme(mut self, scheme: JsAttrScheme) -> Self {
        self.js_attr_scheme = scheme;
        self
    }

    /// Set or disable the JS class token (builder).
    pub fn with_js_cls(mut self, cls: Option<&str>) -> Self {
        self.js_cls = cls.filter(|c| !c.is_empty()).map(str::to_owned);
        self
    }

    /// Set whether elements receive the JS class (builder).
    pub fn with_js_elem(mut self, enabled: bool) -> Self {
        self.js_elem = enabled;
        self
    }

    /// Set the no-base modifier class mode (builder).
    pub fn with_no_base_mods(mut self, enabled: bool) -> Self {
        self.no_base_mods = enabled;
        self
    }

    /// Set scalar content escaping (builder).
    pub fn with_escape_content(mut self, enabled: bool) -> Self {
        self.escape_content = enabled;
        self
    }

    /// Enable or disable the loop guard (builder).
    pub fn with_infinite_loop_detection(mut self, enabled: bool) -> Self {
        self.infinite_loop_detection = enabled;
        self
    }

    /// Set whether `stop()` also suppresses `$after` hooks (builder).
    pub fn with_stop_skips_after_hooks(mut self, enabled: bool) -> Self {
        self.stop_skips_after_hooks = enabled;
        self
    }

    /// Check the options for malformed values.
    pub fn validate(&self) -> Result<()> {
        self.naming.validate()?;
        let name = &self.js_attr_name;
        let bad_char = |c: char| c.is_whitespace() || matches!(c, '"' | '\'' | '=' | '<' | '>' | '/');
        if name.is_empty() || name.chars().any(bad_char) {
            return Err(Error::Configuration(format!(
                "invalid JS attribute name `{name}`"
            )));
        }
        if let Some(cls) = &self.js_cls {
            if cls.chars().any(char::is_whitespace) {
                return Err(Error::Configuration(format!(
                    "JS class `{cls}` must be a single token"
                )));
            }
        }
        Ok(())
    }
}
