//! Expanded tree → HTML string.

use super::classes::BemClasses;
use super::escape::{attr_escape, xml_escape};
use crate::options::{JsAttrScheme, Options};
use crate::tree::{AttrValue, ElementNode, Node, Scalar};

/// Tags rendered as `<tag/>` without a body.
pub const SELF_CLOSING_TAGS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "menuitem", "meta", "param", "source", "track", "wbr",
];

const DEFAULT_TAG: &str = "div";

/// Depth-first HTML serializer.
#[derive(Debug, Clone, Copy)]
pub struct HtmlRenderer<'a> {
    options: &'a Options,
}

impl<'a> HtmlRenderer<'a> {
    pub fn new(options: &'a Options) -> Self {
        Self { options }
    }

    /// Render a whole tree.
    pub fn render(&self, node: &Node) -> String {
        let mut out = String::new();
        self.write_node(&mut out, node);
        out
    }

    fn write_node(&self, out: &mut String, node: &Node) {
        match node {
            Node::Absent => {}
            Node::Scalar(scalar) => self.write_scalar(out, scalar),
            Node::Collection(items) => {
                for item in items {
                    self.write_node(out, item);
                }
            }
            Node::Element(el) => self.write_element(out, el),
        }
    }

    fn write_scalar(&self, out: &mut String, scalar: &Scalar) {
        match scalar {
            Scalar::Bool(false) => {}
            Scalar::Text(text) if self.options.escape_content => out.push_str(&xml_escape(text)),
            Scalar::Text(text) => out.push_str(text),
            other => out.push_str(&other.to_string()),
        }
    }

    fn write_element(&self, out: &mut String, el: &ElementNode) {
        if el.tag.as_deref() == Some("") {
            self.write_body(out, el);
            return;
        }

        let classes = BemClasses::collect(el, self.options);
        let mut class = classes.tokens.join(" ");
        if let Some(cls) = el.cls.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
            if !class.is_empty() {
                class.push(' ');
            }
            class.push_str(cls);
        }

        let tag = el.tag.as_deref().unwrap_or(DEFAULT_TAG);
        out.push('<');
        out.push_str(tag);
        if !class.is_empty() {
            out.push_str(" class=\"");
            out.push_str(&attr_escape(&class));
            out.push('"');
        }
        self.write_attrs(out, el);
        if let Some(params) = classes.js {
            let data = serde_json::Value::Object(params).to_string();
            let value = match self.options.js_attr_scheme {
                JsAttrScheme::Js => format!("return {data}"),
                JsAttrScheme::Json => data,
            };
            let name = el.js_attr.as_deref().unwrap_or(&self.options.js_attr_name);
            out.push(' ');
            out.push_str(name);
            out.push_str("=\"");
            out.push_str(&attr_escape(&value));
            out.push('"');
        }

        if SELF_CLOSING_TAGS.contains(&tag) {
            out.push_str("/>");
            return;
        }
        out.push('>');
        self.write_body(out, el);
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }

    fn write_attrs(&self, out: &mut String, el: &ElementNode) {
        for (name, value) in &el.attrs {
            match value {
                AttrValue::Null | AttrValue::Bool(false) => {}
                AttrValue::Bool(true) => {
                    out.push(' ');
                    out.push_str(name);
                }
                AttrValue::Str(s) => {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&attr_escape(s));
                    out.push('"');
                }
            }
        }
    }

    /// Raw html if present, otherwise the rendered content.
    fn write_body(&self, out: &mut String, el: &ElementNode) {
        match el.html.as_deref() {
            Some(html) if !html.is_empty() => out.push_str(html),
            _ => self.write_node(out, &el.content),
        }
    }
}
