use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::errors::SyntaxError;

use super::val_table_;

/// Decode a VAL_ statement that defines value descriptions for a signal:
/// `VAL_ <MessageID> <SignalName> <value> "<desc>" ... ;`
///
/// The environment-variable form `VAL_ <EnvVar> ...;` is skipped (`Ok(None)`).
pub(crate) fn decode(cur: &mut Cursor) -> Result<Option<DeclarationKind>, SyntaxError> {
    cur.expect_keyword("VAL_")?;
    if let Some(TokenKind::Ident(_)) = cur.peek_kind() {
        cur.skip_statement();
        return Ok(None);
    }

    let message_id: u32 = cur.expect_number("message id")?;
    let signal: String = cur.expect_ident("signal name")?;
    let entries: Vec<(i64, String)> = val_table_::entries(cur)?;
    cur.expect(TokenKind::Semicolon)?;

    Ok(Some(DeclarationKind::ValueDescriptions {
        message_id,
        signal,
        entries,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens =
            tokenize(r#"VAL_ 2527679645 Status 1 "On" 0 "Off" ;"#).unwrap();
        assert_eq!(
            decode(&mut Cursor::new(&tokens)).unwrap(),
            Some(DeclarationKind::ValueDescriptions {
                message_id: 2527679645,
                signal: "Status".into(),
                entries: vec![(1, "On".into()), (0, "Off".into())]
            })
        );
    }

    #[test]
    fn environment_variable_form_is_skipped() {
        let tokens = tokenize("VAL_ EnvMode 0 \"Off\" 1 \"On\";\nBU_:").unwrap();
        let mut cur = Cursor::new(&tokens);
        assert_eq!(decode(&mut cur).unwrap(), None);
        assert_eq!(cur.peek_kind(), Some(&TokenKind::Ident("BU_".into())));
    }

    #[test]
    fn unterminated_statement_fails() {
        let tokens = tokenize(r#"VAL_ 1 Status 1 "On" 0"#).unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!(err.found, "end of input");
    }
}
