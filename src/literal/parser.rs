//! Recursive descent parser over [`tokenizer`](super::tokenizer) output.

use serde_json::{Map, Number, Value};

use super::tokenizer::{tokenize, Spanned, Token};
use super::SyntaxError;

/// Deepest array/object nesting accepted.
pub const MAX_DEPTH: usize = 128;

/// Parse a relaxed literal into a JSON value.
///
/// The whole input must be one value, optionally wrapped in parentheses.
pub fn parse(input: &str) -> Result<Value, SyntaxError> {
    let tokens = tokenize(input).map_err(|offset| {
        let found = input[offset..].chars().next().unwrap_or(' ');
        SyntaxError::at(input, offset, format!("unexpected character `{found}`"))
    })?;
    let mut parser = Parser {
        input,
        tokens,
        cursor: 0,
        depth: 0,
    };

    let value = if parser.eat(Token::ParenOpen) {
        let value = parser.parse_value()?;
        parser.expect(Token::ParenClose, "`)`")?;
        value
    } else {
        parser.parse_value()?
    };
    if let Some(extra) = parser.peek() {
        return Err(parser.error_at(extra.span.start, "unexpected trailing input"));
    }
    Ok(value)
}

struct Parser<'a> {
    input: &'a str,
    tokens: Vec<Spanned>,
    cursor: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Spanned> {
        self.tokens.get(self.cursor)
    }

    fn peek_token(&self) -> Option<Token> {
        self.peek().map(|t| t.token)
    }

    fn advance(&mut self) -> Option<Spanned> {
        let tok = self.tokens.get(self.cursor).cloned();
        if tok.is_some() {
            self.cursor += 1;
        }
        tok
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek_token() == Some(token) {
            self.cursor += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<(), SyntaxError> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error_here(format!("expected {what}")))
        }
    }

    fn text(&self, tok: &Spanned) -> &'a str {
        &self.input[tok.span.clone()]
    }

    fn error_at(&self, offset: usize, message: impl Into<String>) -> SyntaxError {
        SyntaxError::at(self.input, offset, message)
    }

    /// Error at the current token, or at end of input.
    fn error_here(&self, message: impl Into<String>) -> SyntaxError {
        let offset = self.peek().map_or(self.input.len(), |t| t.span.start);
        self.error_at(offset, message)
    }

    // -----------------------------------------------------------------------
    // Grammar
    // -----------------------------------------------------------------------

    fn parse_value(&mut self) -> Result<Value, SyntaxError> {
        let Some(tok) = self.advance() else {
            return Err(self.error_here("unexpected end of input"));
        };
        match tok.token {
            Token::BraceOpen | Token::BracketOpen => {
                if self.depth == MAX_DEPTH {
                    return Err(self.error_at(
                        tok.span.start,
                        format!("nesting deeper than {MAX_DEPTH} levels"),
                    ));
                }
                self.depth += 1;
                let value = if tok.token == Token::BraceOpen {
                    self.parse_object()
                } else {
                    self.parse_array()
                };
                self.depth -= 1;
                value
            }
            Token::DoubleQuoted | Token::SingleQuoted => {
                let raw = self.text(&tok);
                Ok(Value::String(unescape(&raw[1..raw.len() - 1])))
            }
            Token::Number | Token::HexNumber => self.number(&tok, false),
            Token::Plus | Token::Minus => {
                let negative = tok.token == Token::Minus;
                match self.advance() {
                    Some(num) if matches!(num.token, Token::Number | Token::HexNumber) => {
                        self.number(&num, negative)
                    }
                    _ => Err(self.error_at(tok.span.end, "expected a number after sign")),
                }
            }
            Token::Ident => match self.text(&tok) {
                "true" => Ok(Value::Bool(true)),
                "false" => Ok(Value::Bool(false)),
                "null" | "undefined" => Ok(Value::Null),
                other => Err(self.error_at(
                    tok.span.start,
                    format!("unexpected identifier `{other}`"),
                )),
            },
            _ => Err(self.error_at(
                tok.span.start,
                format!("unexpected `{}`", self.text(&tok)),
            )),
        }
    }

    /// Array body after `[`. A comma with no value before it is a hole.
    fn parse_array(&mut self) -> Result<Value, SyntaxError> {
        let mut items = Vec::new();
        loop {
            match self.peek_token() {
                Some(Token::BracketClose) => {
                    self.cursor += 1;
                    return Ok(Value::Array(items));
                }
                Some(Token::Comma) => {
                    self.cursor += 1;
                    items.push(Value::Null);
                }
                Some(_) => {
                    items.push(self.parse_value()?);
                    if !self.eat(Token::Comma) && self.peek_token() != Some(Token::BracketClose) {
                        return Err(self.error_here("expected `,` or `]`"));
                    }
                }
                None => return Err(self.error_here("unterminated array")),
            }
        }
    }

    /// Object body after `{`. Empty entries between commas are skipped.
    fn parse_object(&mut self) -> Result<Value, SyntaxError> {
        let mut map = Map::new();
        loop {
            let Some(tok) = self.advance() else {
                return Err(self.error_here("unterminated object"));
            };
            let key = match tok.token {
                Token::BraceClose => return Ok(Value::Object(map)),
                Token::Comma => continue,
                Token::Ident | Token::Number => self.text(&tok).to_owned(),
                Token::DoubleQuoted | Token::SingleQuoted => {
                    let raw = self.text(&tok);
                    unescape(&raw[1..raw.len() - 1])
                }
                _ => {
                    return Err(self.error_at(
                        tok.span.start,
                        format!("expected a key, found `{}`", self.text(&tok)),
                    ))
                }
            };
            self.expect(Token::Colon, "`:`")?;
            let value = self.parse_value()?;
            map.insert(key, value);
            if !self.eat(Token::Comma) && self.peek_token() != Some(Token::BraceClose) {
                return Err(self.error_here("expected `,` or `}`"));
            }
        }
    }

    fn number(&self, tok: &Spanned, negative: bool) -> Result<Value, SyntaxError> {
        let text = self.text(tok);
        let invalid = || self.error_at(tok.span.start, format!("invalid number `{text}`"));

        if tok.token == Token::HexNumber {
            let n = i64::from_str_radix(&text[2..], 16).map_err(|_| invalid())?;
            return Ok(Value::from(if negative { -n } else { n }));
        }
        if !text.contains(['.', 'e', 'E']) {
            if let Ok(n) = text.parse::<i64>() {
                return Ok(Value::from(if negative { -n } else { n }));
            }
        }
        let f: f64 = text.parse().map_err(|_| invalid())?;
        let f = if negative { -f } else { f };
        Number::from_f64(f).map(Value::Number).ok_or_else(invalid)
    }
}

/// Resolve backslash escapes in a quoted string body.
fn unescape(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('b') => out.push('\u{8}'),
            Some('f') => out.push('\u{c}'),
            Some('v') => out.push('\u{b}'),
            Some('0') => out.push('\0'),
            Some('u') => {
                let hex: String = chars.clone().take(4).collect();
                match u32::from_str_radix(&hex, 16).ok().and_then(char::from_u32) {
                    Some(ch) if hex.len() == 4 => {
                        out.push(ch);
                        chars.nth(3);
                    }
                    _ => out.push('u'),
                }
            }
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}
