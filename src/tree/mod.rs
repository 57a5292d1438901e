//! BEMJSON tree model: nodes, modifiers, attributes, and input normalization.

pub mod mods;
pub mod node;
pub(crate) mod normalize;

pub use mods::{AttrValue, Attrs, ModValue, Mods};
pub use node::{ElementNode, Js, Node, Scalar};
