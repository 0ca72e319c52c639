use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::errors::SyntaxError;

/// Decode `VAL_TABLE_ <name> <value> "<desc>" ... ;`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("VAL_TABLE_")?;
    let name: String = cur.expect_ident("value table name")?;
    let entries: Vec<(i64, String)> = entries(cur)?;
    cur.expect(TokenKind::Semicolon)?;
    Ok(DeclarationKind::ValueTable { name, entries })
}

/// Pairs of `<value> "<description>"` up to (not including) the closing `;`.
pub(crate) fn entries(cur: &mut Cursor) -> Result<Vec<(i64, String)>, SyntaxError> {
    let mut out: Vec<(i64, String)> = Vec::new();
    while let Some(TokenKind::Number(_)) = cur.peek_kind() {
        let value: i64 = cur.expect_integer("integer value")?;
        let desc: String = cur.expect_str("value description")?;
        out.push((value, desc));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize(r#"VAL_TABLE_ OnOff 1 "On" 0 "Off" -1 "SNA" ;"#).unwrap();
        assert_eq!(
            decode(&mut Cursor::new(&tokens)).unwrap(),
            DeclarationKind::ValueTable {
                name: "OnOff".into(),
                entries: vec![(1, "On".into()), (0, "Off".into()), (-1, "SNA".into())]
            }
        );
    }
}
