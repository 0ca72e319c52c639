use crate::dbc::{
    cursor::Cursor,
    declarations::{DeclarationKind, Literal},
    lexer::TokenKind,
};
use crate::types::errors::SyntaxError;

/// Decode an attribute default: `BA_DEF_DEF_ "<name>" <value>;`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("BA_DEF_DEF_")?;
    let name: String = cur.expect_str("attribute name")?;
    let value: Literal = literal(cur)?;
    cur.expect(TokenKind::Semicolon)?;
    Ok(DeclarationKind::AttributeDefault { name, value })
}

/// A number or a quoted string, as used for attribute values.
pub(crate) fn literal(cur: &mut Cursor) -> Result<Literal, SyntaxError> {
    match cur.peek_kind() {
        Some(TokenKind::Number(n)) => {
            cur.next();
            Ok(Literal::Number(n.clone()))
        }
        Some(TokenKind::Str(s)) => {
            cur.next();
            Ok(Literal::Str(s.clone()))
        }
        _ => Err(cur.error("attribute value")),
    }
}
