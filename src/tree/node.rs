//! Node types: Node, Scalar, ElementNode, Js.

use std::collections::BTreeSet;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Number, Value};

use super::mods::{AttrValue, Attrs, ModValue, Mods};
use crate::matcher::MatcherId;

// ---------------------------------------------------------------------------
// Node
// ---------------------------------------------------------------------------

/// A loosely-typed BEMJSON tree node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Node {
    #[default]
    Absent,
    Scalar(Scalar),
    Element(Box<ElementNode>),
    Collection(Vec<Node>),
}

impl Node {
    /// Build a collection from anything convertible to nodes.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Node>,
    {
        Self::Collection(items.into_iter().map(Into::into).collect())
    }

    /// Shorthand for a plain text scalar.
    pub fn text(s: impl Into<String>) -> Self {
        Self::Scalar(Scalar::Text(s.into()))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    /// `Absent` or `false`: renders nothing and is skipped inside lists.
    pub fn is_empty_value(&self) -> bool {
        matches!(self, Self::Absent | Self::Scalar(Scalar::Bool(false)))
    }

    /// Falsy values a template may return to mean "produced nothing".
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Absent => true,
            Self::Scalar(Scalar::Bool(b)) => !b,
            Self::Scalar(Scalar::Text(s)) => s.is_empty(),
            Self::Scalar(Scalar::Number(n)) => n.as_f64() == Some(0.0),
            _ => false,
        }
    }

    /// Whether this is a scalar or absent (no structure to expand).
    pub fn is_simple(&self) -> bool {
        matches!(self, Self::Absent | Self::Scalar(_))
    }

    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Node]> {
        match self {
            Self::Collection(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Scalar(Scalar::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Scalar(Scalar::Number(n)) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Inline nested collections into their parent, recursively.
    ///
    /// Only list nesting is removed; element content is left untouched.
    pub fn flatten(self) -> Self {
        match self {
            Self::Collection(items) => Self::Collection(flatten_items(items)),
            other => other,
        }
    }
}

/// Flatten nested collections into one list, preserving order.
pub(crate) fn flatten_items(items: Vec<Node>) -> Vec<Node> {
    if !items.iter().any(|n| matches!(n, Node::Collection(_))) {
        return items;
    }
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Node::Collection(inner) => out.extend(flatten_items(inner)),
            other => out.push(other),
        }
    }
    out
}

impl From<ElementNode> for Node {
    fn from(el: ElementNode) -> Self {
        Self::Element(Box::new(el))
    }
}

impl From<Scalar> for Node {
    fn from(s: Scalar) -> Self {
        Self::Scalar(s)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Self::Collection(items)
    }
}

impl From<Vec<ElementNode>> for Node {
    fn from(items: Vec<ElementNode>) -> Self {
        Self::list(items)
    }
}

impl From<&str> for Node {
    fn from(s: &str) -> Self {
        Self::text(s)
    }
}

impl From<String> for Node {
    fn from(s: String) -> Self {
        Self::text(s)
    }
}

impl From<bool> for Node {
    fn from(b: bool) -> Self {
        Self::Scalar(Scalar::Bool(b))
    }
}

macro_rules! node_from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for Node {
            fn from(n: $t) -> Self {
                Self::Scalar(Scalar::Number(Number::from(n)))
            }
        })*
    };
}

node_from_int!(i32, i64, u32, u64, usize);

impl From<f64> for Node {
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Self::Absent, |n| Self::Scalar(Scalar::Number(n)))
    }
}

impl<T: Into<Node>> From<Option<T>> for Node {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Absent, Into::into)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        super::normalize::from_json(value)
    }
}

// ---------------------------------------------------------------------------
// Scalar
// ---------------------------------------------------------------------------

/// A leaf value.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Number(Number),
    Bool(bool),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Js
// ---------------------------------------------------------------------------

/// Client-side initialisation payload of a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Js {
    /// Explicit `false`: no JS, but the slot counts as written.
    Off,
    /// `true`: initialise with empty params.
    On,
    Params(Map<String, Value>),
}

impl Js {
    /// Whether this payload emits JS init data.
    pub fn is_enabled(&self) -> bool {
        !matches!(self, Self::Off)
    }

    /// Params as a JSON value (`{}` for [`Js::On`]).
    pub fn to_value(&self) -> Option<Value> {
        match self {
            Self::Off => None,
            Self::On => Some(Value::Object(Map::new())),
            Self::Params(map) => Some(Value::Object(map.clone())),
        }
    }

    /// Combine with a later unforced write: existing params win, new keys are
    /// appended. An `Off` write leaves the current value alone.
    pub(crate) fn merge(&mut self, other: Js) {
        match other {
            Self::Off => {}
            Self::On => {
                if matches!(self, Self::Off) {
                    *self = Self::On;
                }
            }
            Self::Params(extra) => match self {
                Self::Params(map) => {
                    for (k, v) in extra {
                        map.entry(k).or_insert(v);
                    }
                }
                _ => *self = Self::Params(extra),
            },
        }
    }
}

impl From<bool> for Js {
    fn from(b: bool) -> Self {
        if b {
            Self::On
        } else {
            Self::Off
        }
    }
}

impl From<Map<String, Value>> for Js {
    fn from(map: Map<String, Value>) -> Self {
        Self::Params(map)
    }
}

impl From<Value> for Js {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(map) => Self::Params(map),
            Value::Null | Value::Bool(false) => Self::Off,
            _ => Self::On,
        }
    }
}

// ---------------------------------------------------------------------------
// ElementNode
// ---------------------------------------------------------------------------

/// Engine bookkeeping carried by a node and its clones.
///
/// Never participates in equality.
#[derive(Debug, Clone, Default)]
pub(crate) struct Marks {
    pub(crate) applied: BTreeSet<MatcherId>,
    pub(crate) visits: u32,
    pub(crate) stopped: bool,
}

impl PartialEq for Marks {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

/// A BEM entity: block, element, or plain tag.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ElementNode {
    pub block: Option<String>,
    pub elem: Option<String>,
    /// Block modifiers (for elements: the inherited block's modifiers).
    pub mods: Option<Mods>,
    pub elem_mods: Option<Mods>,
    pub attrs: Attrs,
    pub content: Node,
    /// Raw markup; wins over `content` at render time.
    pub html: Option<String>,
    /// `None` renders `div`; `Some("")` renders no tag at all.
    pub tag: Option<String>,
    pub mix: Vec<ElementNode>,
    pub cls: Option<String>,
    /// `Some(false)` disables BEM classes and JS for this node.
    pub bem: Option<bool>,
    pub js: Option<Js>,
    pub js_attr: Option<String>,
    /// Arbitrary caller data.
    pub params: IndexMap<String, Node>,
    pub(crate) marks: Marks,
}

impl ElementNode {
    /// A node with no BEM entity (renders a bare tag).
    pub fn new() -> Self {
        Self::default()
    }

    /// A block node.
    pub fn block(name: impl Into<String>) -> Self {
        Self {
            block: Some(name.into()),
            ..Self::default()
        }
    }

    /// An element node; the block is inherited during expansion.
    pub fn elem(name: impl Into<String>) -> Self {
        Self {
            elem: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the element name (builder).
    pub fn with_elem(mut self, name: impl Into<String>) -> Self {
        self.elem = Some(name.into());
        self
    }

    /// Add a block modifier (builder).
    pub fn with_mod(mut self, name: impl Into<String>, value: impl Into<ModValue>) -> Self {
        self.mods.get_or_insert_with(Mods::new).insert(name, value);
        self
    }

    /// Add an element modifier (builder).
    pub fn with_elem_mod(mut self, name: impl Into<String>, value: impl Into<ModValue>) -> Self {
        self.elem_mods.get_or_insert_with(Mods::new).insert(name, value);
        self
    }

    /// Set the content (builder).
    pub fn with_content(mut self, content: impl Into<Node>) -> Self {
        self.content = content.into();
        self
    }

    /// Set raw html (builder).
    pub fn with_html(mut self, html: impl Into<String>) -> Self {
        self.html = Some(html.into());
        self
    }

    /// Set the tag; `""` suppresses it (builder).
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Add an attribute (builder).
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    /// Append a mix entry (builder).
    pub fn with_mix(mut self, mix: ElementNode) -> Self {
        self.mix.push(mix);
        self
    }

    /// Set the free class suffix (builder).
    pub fn with_cls(mut self, cls: impl Into<String>) -> Self {
        self.cls = Some(cls.into());
        self
    }

    /// Set the `bem` flag (builder).
    pub fn with_bem(mut self, bem: bool) -> Self {
        self.bem = Some(bem);
        self
    }

    /// Set the JS payload (builder).
    pub fn with_js(mut self, js: impl Into<Js>) -> Self {
        self.js = Some(js.into());
        self
    }

    /// Set the JS attribute name override (builder).
    pub fn with_js_attr(mut self, name: impl Into<String>) -> Self {
        self.js_attr = Some(name.into());
        self
    }

    /// Set a caller parameter (builder).
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Node>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Modifiers that describe this entity for classes and `mod()`:
    /// element modifiers for elements, block modifiers otherwise.
    pub fn own_mods(&self) -> Option<&Mods> {
        if self.elem.is_some() {
            self.elem_mods.as_ref().or(self.mods.as_ref())
        } else {
            self.mods.as_ref()
        }
    }

    /// Mutable access to the map `mod()` writes to, created on demand.
    pub(crate) fn own_mods_mut(&mut self) -> &mut Mods {
        if self.elem.is_some() {
            self.elem_mods.get_or_insert_with(Mods::new)
        } else {
            self.mods.get_or_insert_with(Mods::new)
        }
    }

    /// `block` or `block__elem` under the given element separator.
    pub fn path(&self, elem_sep: &str) -> String {
        let block = self.block.as_deref().unwrap_or_default();
        match &self.elem {
            Some(elem) => format!("{block}{elem_sep}{elem}"),
            None => block.to_owned(),
        }
    }

    /// Whether a template called `stop()` on this node.
    pub fn is_stopped(&self) -> bool {
        self.marks.stopped
    }
}
