//! Token cursor shared by the statement decoders in [`super::core`].

use std::str::FromStr;

use crate::dbc::lexer::{Token, TokenKind};
use crate::types::errors::SyntaxError;

pub(crate) struct Cursor<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> Cursor<'t> {
    pub(crate) fn new(tokens: &'t [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    pub(crate) fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    pub(crate) fn peek_kind(&self) -> Option<&'t TokenKind> {
        self.peek().map(|t| &t.kind)
    }

    pub(crate) fn peek_nth(&self, n: usize) -> Option<&'t Token> {
        self.tokens.get(self.pos + n)
    }

    pub(crate) fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub(crate) fn next(&mut self) -> Option<&'t Token> {
        let tok = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(tok)
    }

    /// Builds a [`SyntaxError`] pointing at the current token (or past the last one).
    pub(crate) fn error(&self, expected: &str) -> SyntaxError {
        match self.peek() {
            Some(tok) => SyntaxError {
                line: tok.line,
                column: tok.column,
                found: tok.kind.describe(),
                expected: expected.to_string(),
            },
            None => {
                let (line, column) = self
                    .tokens
                    .last()
                    .map(|t| (t.line, t.column))
                    .unwrap_or((1, 1));
                SyntaxError {
                    line,
                    column,
                    found: "end of input".into(),
                    expected: expected.to_string(),
                }
            }
        }
    }

    /// Consumes the next token if it equals `kind`.
    pub(crate) fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> Result<(), SyntaxError> {
        if self.eat(&kind) {
            Ok(())
        } else {
            Err(self.error(&kind.describe()))
        }
    }

    /// Consumes the exact keyword `word`.
    pub(crate) fn expect_keyword(&mut self, word: &str) -> Result<(), SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(s)) if s == word => {
                self.pos += 1;
                Ok(())
            }
            _ => Err(self.error(&format!("'{}'", word))),
        }
    }

    pub(crate) fn expect_ident(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Ident(s)) => {
                self.pos += 1;
                Ok(s.clone())
            }
            _ => Err(self.error(what)),
        }
    }

    pub(crate) fn expect_str(&mut self, what: &str) -> Result<String, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Str(s)) => {
                self.pos += 1;
                Ok(s.clone())
            }
            _ => Err(self.error(what)),
        }
    }

    /// Parses the next number token as `T`, reporting `what` on mismatch.
    pub(crate) fn expect_number<T: FromStr>(&mut self, what: &str) -> Result<T, SyntaxError> {
        match self.peek_kind() {
            Some(TokenKind::Number(s)) => match s.parse::<T>() {
                Ok(v) => {
                    self.pos += 1;
                    Ok(v)
                }
                Err(_) => Err(self.error(what)),
            },
            _ => Err(self.error(what)),
        }
    }

    /// Like [`Self::expect_number`] but also accepts a float literal with no
    /// fractional part (`8.0`), as some editors write integers that way.
    pub(crate) fn expect_integer<T: TryFrom<i64>>(&mut self, what: &str) -> Result<T, SyntaxError> {
        let value: Option<i64> = match self.peek_kind() {
            Some(TokenKind::Number(s)) => s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e18)
                    .map(|f| f as i64)
            }),
            _ => None,
        };
        match value.and_then(|v| T::try_from(v).ok()) {
            Some(v) => {
                self.pos += 1;
                Ok(v)
            }
            None => Err(self.error(what)),
        }
    }

    /// Skips everything up to and including the next `;`.
    pub(crate) fn skip_statement(&mut self) {
        while let Some(tok) = self.next() {
            if tok.kind == TokenKind::Semicolon {
                break;
            }
        }
    }
}
