//! Lenient object/array literal parser.
//!
//! Accepts the relaxed syntax hand-written BEMJSON tends to use: unquoted
//! keys, single-quoted strings, `undefined`, hex integers, holes between
//! commas, and comments. Produces a [`serde_json::Value`].

mod parser;
pub mod tokenizer;

pub use parser::parse;

/// A parse failure with its 1-based source location.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("syntax error at line {line}, column {column}: {message}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl SyntaxError {
    /// Locate byte `offset` of `input` and build the error there.
    pub(crate) fn at(input: &str, offset: usize, message: impl Into<String>) -> Self {
        let before = &input[..offset.min(input.len())];
        let line = before.matches('\n').count() + 1;
        let line_start = before.rfind('\n').map_or(0, |i| i + 1);
        let column = before[line_start..].chars().count() + 1;
        Self {
            line,
            column,
            message: message.into(),
        }
    }
}

/// The literal inside `text` if it looks like one.
///
/// After trimming (and dropping one pair of wrapping parentheses) the text
/// must start and end with a matching `{}` or `[]` pair.
pub fn as_literal(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    let inner = trimmed
        .strip_prefix('(')
        .and_then(|t| t.strip_suffix(')'))
        .map_or(trimmed, str::trim);
    let bracketed = (inner.starts_with('{') && inner.ends_with('}'))
        || (inner.starts_with('[') && inner.ends_with(']'));
    bracketed.then_some(trimmed)
}
