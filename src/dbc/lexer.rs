//! Tokenizer for DBC text.
//!
//! Produces a flat token stream with 1-based line/column positions. Whitespace
//! (including `\r`) and `//` comments outside string literals are dropped.

use crate::types::errors::SyntaxError;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum TokenKind {
    Ident(String),
    /// Numeric literal as written (`-40`, `0.1`, `1e-05`).
    Number(String),
    /// Quoted string with escapes resolved.
    Str(String),
    Colon,
    Semicolon,
    Comma,
    Pipe,
    At,
    LParen,
    RParen,
    LBracket,
    RBracket,
    Plus,
    Minus,
}

impl TokenKind {
    /// Source-like rendering used in error messages.
    pub(crate) fn describe(&self) -> String {
        match self {
            TokenKind::Ident(s) => format!("'{}'", s),
            TokenKind::Number(s) => format!("'{}'", s),
            TokenKind::Str(s) => format!("\"{}\"", s),
            TokenKind::Colon => "':'".into(),
            TokenKind::Semicolon => "';'".into(),
            TokenKind::Comma => "','".into(),
            TokenKind::Pipe => "'|'".into(),
            TokenKind::At => "'@'".into(),
            TokenKind::LParen => "'('".into(),
            TokenKind::RParen => "')'".into(),
            TokenKind::LBracket => "'['".into(),
            TokenKind::RBracket => "']'".into(),
            TokenKind::Plus => "'+'".into(),
            TokenKind::Minus => "'-'".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) line: usize,
    pub(crate) column: usize,
}

struct Lexer<'a> {
    chars: std::iter::Peekable<std::str::Chars<'a>>,
    line: usize,
    column: usize,
    // Char right before the cursor (None after whitespace), used to tell a
    // sign from a range dash.
    prev: Option<char>,
}

impl<'a> Lexer<'a> {
    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.next()?;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().copied()
    }

    fn peek2(&self) -> Option<char> {
        let mut it = self.chars.clone();
        it.next();
        it.next()
    }

    fn error(&self, line: usize, column: usize, found: String, expected: &str) -> SyntaxError {
        SyntaxError {
            line,
            column,
            found,
            expected: expected.to_string(),
        }
    }

    fn sign_starts_number(&self) -> bool {
        let next_is_numeric = matches!(self.peek2(), Some(c) if c.is_ascii_digit() || c == '.');
        let after_operand = matches!(self.prev, Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == ')' || c == '.');
        next_is_numeric && !after_operand
    }

    fn number(&mut self) -> String {
        let mut text = String::new();
        if let Some(sign @ ('+' | '-')) = self.peek() {
            text.push(sign);
            self.bump();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() || c == '.' {
                text.push(c);
                self.bump();
            } else if (c == 'e' || c == 'E') && !text.contains(['e', 'E']) {
                // exponent, optionally signed
                let follows = self.peek2();
                if matches!(follows, Some(d) if d.is_ascii_digit() || d == '+' || d == '-') {
                    text.push(c);
                    self.bump();
                    if let Some(s @ ('+' | '-')) = self.peek() {
                        text.push(s);
                        self.bump();
                    }
                } else {
                    break;
                }
            } else {
                break;
            }
        }
        text
    }

    fn ident(&mut self) -> String {
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c.is_ascii_alphanumeric() || c == '_' {
                text.push(c);
                self.bump();
            } else {
                break;
            }
        }
        text
    }

    fn string(&mut self, line: usize, column: usize) -> Result<String, SyntaxError> {
        self.bump(); // opening quote
        let mut text = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(text),
                Some('\\') => match self.bump() {
                    Some(esc @ ('"' | '\\')) => text.push(esc),
                    Some(other) => {
                        text.push('\\');
                        text.push(other);
                    }
                    None => break,
                },
                Some(c) => text.push(c),
                None => break,
            }
        }
        Err(self.error(line, column, "end of input".into(), "closing '\"'"))
    }
}

/// Splits DBC text into tokens.
///
/// Fails on unterminated strings and on characters that are not part of the
/// DBC grammar.
pub(crate) fn tokenize(text: &str) -> Result<Vec<Token>, SyntaxError> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lx = Lexer {
        chars: text.chars().peekable(),
        line: 1,
        column: 1,
        prev: None,
    };
    let mut tokens: Vec<Token> = Vec::new();

    while let Some(c) = lx.peek() {
        let (line, column) = (lx.line, lx.column);

        if c.is_whitespace() {
            lx.bump();
            lx.prev = None;
            continue;
        }
        if c == '/' && lx.peek2() == Some('/') {
            while let Some(ch) = lx.peek() {
                if ch == '\n' {
                    break;
                }
                lx.bump();
            }
            lx.prev = None;
            continue;
        }

        let kind: TokenKind = match c {
            '"' => TokenKind::Str(lx.string(line, column)?),
            '+' | '-' if lx.sign_starts_number() => TokenKind::Number(lx.number()),
            '0'..='9' => TokenKind::Number(lx.number()),
            '.' if matches!(lx.peek2(), Some(d) if d.is_ascii_digit()) => {
                TokenKind::Number(lx.number())
            }
            c if c.is_ascii_alphabetic() || c == '_' => TokenKind::Ident(lx.ident()),
            _ => {
                lx.bump();
                match c {
                    ':' => TokenKind::Colon,
                    ';' => TokenKind::Semicolon,
                    ',' => TokenKind::Comma,
                    '|' => TokenKind::Pipe,
                    '@' => TokenKind::At,
                    '(' => TokenKind::LParen,
                    ')' => TokenKind::RParen,
                    '[' => TokenKind::LBracket,
                    ']' => TokenKind::RBracket,
                    '+' => TokenKind::Plus,
                    '-' => TokenKind::Minus,
                    other => {
                        return Err(lx.error(line, column, format!("'{}'", other), "a DBC token"));
                    }
                }
            }
        };

        lx.prev = match &kind {
            TokenKind::Ident(_) | TokenKind::Number(_) => Some('0'),
            TokenKind::Str(_) => Some('"'),
            _ => Some(c),
        };
        tokens.push(Token { kind, line, column });
    }

    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<TokenKind> {
        tokenize(text).unwrap().into_iter().map(|t| t.kind).collect()
    }

    fn num(s: &str) -> TokenKind {
        TokenKind::Number(s.into())
    }

    #[test]
    fn signal_line_tokens() {
        let toks = kinds(r#"SG_ Speed : 0|16@1- (0.1,-40) [-40|6513.5] "km/h" A,B"#);
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("SG_".into()),
                TokenKind::Ident("Speed".into()),
                TokenKind::Colon,
                num("0"),
                TokenKind::Pipe,
                num("16"),
                TokenKind::At,
                num("1"),
                TokenKind::Minus,
                TokenKind::LParen,
                num("0.1"),
                TokenKind::Comma,
                num("-40"),
                TokenKind::RParen,
                TokenKind::LBracket,
                num("-40"),
                TokenKind::Pipe,
                num("6513.5"),
                TokenKind::RBracket,
                TokenKind::Str("km/h".into()),
                TokenKind::Ident("A".into()),
                TokenKind::Comma,
                TokenKind::Ident("B".into()),
            ]
        );
    }

    #[test]
    fn ranges_and_exponents() {
        assert_eq!(kinds("0-3"), vec![num("0"), TokenKind::Minus, num("3")]);
        assert_eq!(kinds("(1e-05,0)")[1], num("1e-05"));
        assert_eq!(kinds("@0+")[2], TokenKind::Plus);
    }

    #[test]
    fn strings_keep_comment_markers_and_span_lines() {
        let toks = tokenize("CM_ \"see // here\r\nand \\\"there\\\"\"; // trailing\r\nBU_:").unwrap();
        assert_eq!(
            toks[1].kind,
            TokenKind::Str("see // here\r\nand \"there\"".into())
        );
        assert_eq!(toks[2].kind, TokenKind::Semicolon);
        assert_eq!(toks[3].kind, TokenKind::Ident("BU_".into()));
        assert_eq!((toks[3].line, toks[3].column), (3, 1));
    }

    #[test]
    fn unterminated_string_reports_position() {
        let err = tokenize("VERSION \"1.0").unwrap_err();
        assert_eq!((err.line, err.column), (1, 9));
    }

    #[test]
    fn stray_character_is_rejected() {
        let err = tokenize("BU_: A\n  B $").unwrap_err();
        assert_eq!((err.line, err.column), (2, 5));
        assert_eq!(err.found, "'$'");
    }
}
