//! logos-based tokenizer for relaxed object/array literals.
//!
//! Keywords (`true`, `false`, `null`, `undefined`) lex as [`Token::Ident`]
//! and are told apart by the parser, so `true_ly` stays one identifier.

use std::ops::Range;

use logos::Logos;

/// Literal token.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\n\r\f]+")]
pub enum Token {
    // ── Comments ─────────────────────────────────────────────────────
    #[regex(r"//[^\n]*", logos::skip)]
    #[regex(r"/\*([^*]|\*+[^*/])*\*+/", logos::skip)]
    Comment,

    // ── Values ───────────────────────────────────────────────────────

    /// `0x1F`.
    #[regex(r"0[xX][0-9a-fA-F]+")]
    HexNumber,

    /// Unsigned decimal: `12`, `1.5`, `.5`, `1e3`.
    #[regex(r"([0-9]+(\.[0-9]*)?|\.[0-9]+)([eE][+-]?[0-9]+)?")]
    Number,

    #[regex(r#""([^"\\\n]|\\.)*""#)]
    DoubleQuoted,

    #[regex(r"'([^'\\\n]|\\.)*'")]
    SingleQuoted,

    #[regex(r"[a-zA-Z_$][a-zA-Z0-9_$]*")]
    Ident,

    // ── Punctuation ──────────────────────────────────────────────────
    #[token("{")]
    BraceOpen,

    #[token("}")]
    BraceClose,

    #[token("[")]
    BracketOpen,

    #[token("]")]
    BracketClose,

    #[token("(")]
    ParenOpen,

    #[token(")")]
    ParenClose,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,
}

/// A token with its source span.
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned {
    pub token: Token,
    pub span: Range<usize>,
}

/// Tokenize `input`; `Err` carries the byte offset of the first bad character.
pub fn tokenize(input: &str) -> Result<Vec<Spanned>, usize> {
    let mut tokens = Vec::new();
    for (result, span) in Token::lexer(input).spanned() {
        match result {
            Ok(token) => tokens.push(Spanned { token, span }),
            Err(()) => return Err(span.start),
        }
    }
    Ok(tokens)
}
