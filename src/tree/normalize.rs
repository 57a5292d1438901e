//! Raw input → typed [`Node`] trees.
//!
//! Accepts the loose shapes BEMJSON allows: nested lists are flattened, a
//! single object becomes an element, `mix` may be one object or a list, and
//! unknown keys are kept as caller params.

use serde_json::{Map, Value};

use super::mods::{AttrValue, Attrs, ModValue, Mods};
use super::node::{flatten_items, ElementNode, Js, Node, Scalar};

/// Convert a JSON value into a node tree.
pub(crate) fn from_json(value: Value) -> Node {
    match value {
        Value::Null => Node::Absent,
        Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
        Value::Number(n) => Node::Scalar(Scalar::Number(n)),
        Value::String(s) => Node::Scalar(Scalar::Text(s)),
        Value::Array(items) => Node::Collection(list_items(items)),
        Value::Object(map) if map.is_empty() => Node::Absent,
        Value::Object(map) => Node::from(element_from_map(map)),
    }
}

/// Bring a template result into canonical shape.
pub(crate) fn normalize(node: Node) -> Node {
    match node {
        Node::Collection(items) => Node::Collection(flatten_items(items)),
        other => other,
    }
}

fn list_items(items: Vec<Value>) -> Vec<Node> {
    let mut out = Vec::with_capacity(items.len());
    for item in items {
        match item {
            Value::Array(inner) => out.extend(list_items(inner)),
            Value::Object(map) if map.is_empty() => {}
            other => out.push(from_json(other)),
        }
    }
    out
}

fn element_from_map(map: Map<String, Value>) -> ElementNode {
    let mut el = ElementNode::new();
    for (key, value) in map {
        match key.as_str() {
            "block" => el.block = string_field(value),
            "elem" => el.elem = string_field(value),
            "mods" => el.mods = mods_field(value),
            "elemMods" => el.elem_mods = mods_field(value),
            "attrs" => el.attrs = attrs_field(value),
            "content" => el.content = from_json(value),
            "html" => el.html = string_field(value),
            "tag" => {
                el.tag = match value {
                    Value::Bool(false) => Some(String::new()),
                    other => string_field(other),
                }
            }
            "mix" => el.mix = mix_field(value),
            "cls" => el.cls = string_field(value),
            "bem" => el.bem = value.as_bool(),
            "js" => {
                el.js = match value {
                    Value::Null => None,
                    other => Some(Js::from(other)),
                }
            }
            "jsAttr" => el.js_attr = string_field(value),
            _ => {
                el.params.insert(key, from_json(value));
            }
        }
    }
    el
}

fn string_field(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn mods_field(value: Value) -> Option<Mods> {
    let Value::Object(map) = value else {
        return None;
    };
    Some(
        map.into_iter()
            .map(|(name, v)| {
                let v = match v {
                    Value::Null => ModValue::Null,
                    Value::Bool(b) => ModValue::Bool(b),
                    Value::String(s) => ModValue::Str(s),
                    Value::Number(n) => ModValue::Str(n.to_string()),
                    other => ModValue::Str(other.to_string()),
                };
                (name, v)
            })
            .collect(),
    )
}

fn attrs_field(value: Value) -> Attrs {
    let Value::Object(map) = value else {
        return Attrs::new();
    };
    map.into_iter()
        .map(|(name, v)| {
            let v = match v {
                Value::Null => AttrValue::Null,
                Value::Bool(b) => AttrValue::Bool(b),
                Value::String(s) => AttrValue::Str(s),
                Value::Number(n) => AttrValue::Str(n.to_string()),
                other => AttrValue::Str(other.to_string()),
            };
            (name, v)
        })
        .collect()
}

fn mix_field(value: Value) -> Vec<ElementNode> {
    match value {
        Value::Object(map) => vec![element_from_map(map)],
        Value::Array(items) => items
            .into_iter()
            .flat_map(|item| match item {
                Value::Array(_) => mix_field(item),
                Value::Object(map) => vec![element_from_map(map)],
                _ => Vec::new(),
            })
            .collect(),
        _ => Vec::new(),
    }
}
