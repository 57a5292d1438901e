//! Rendering: HTML serializer, BEM class generation, escaping.

pub mod classes;
pub mod escape;
pub mod html;

pub use classes::BemClasses;
pub use escape::{attr_escape, xml_escape};
pub use html::{HtmlRenderer, SELF_CLOSING_TAGS};
