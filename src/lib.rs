//! # bemforge
//!
//! A rule-based BEMJSON → HTML template engine.
//!
//! Templates are closures registered against BEM selectors (`button`,
//! `button_disabled`, `button__text_size_s`). [`Bh::apply`] expands an input
//! tree by running every matching template on every node until nothing is
//! left to rewrite, then serializes the result with BEM classes, attributes
//! and JS init data.
//!
//! ## Core Systems
//!
//! - **[`tree`]** — Node model (`Node`, `ElementNode`, `Mods`) and input normalization
//! - **[`selector`]** — Selector strings → declarations under a naming scheme
//! - **[`matcher`]** — Template registry and the compiled dispatcher
//! - **[`engine`]** — Worklist expansion, template [`Context`], loop guard
//! - **[`render`]** — HTML serializer, BEM class generation, escaping
//! - **[`literal`]** — Lenient object/array literal parser
//! - **[`options`]** — Naming, JS attribute, and guard configuration
//! - **[`bh`]** — The [`Bh`] façade tying everything together

// Foundation
pub mod error;
pub mod options;
pub mod tree;

// Matching
pub mod matcher;
pub mod selector;

// Expansion and output
pub mod engine;
pub mod render;

// Input
pub mod literal;

// Façade
pub mod bh;

pub use bh::Bh;
pub use engine::Context;
pub use error::{Error, LoopScope, Result};
pub use matcher::Template;
pub use options::{JsAttrScheme, Naming, Options};
pub use tree::{AttrValue, Attrs, ElementNode, Js, ModValue, Mods, Node, Scalar};
