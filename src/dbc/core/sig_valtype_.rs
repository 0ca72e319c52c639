use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::errors::SyntaxError;

/// Decodes a `SIG_VALTYPE_` statement assigning floating-point encodings to a signal.
///
/// Shape: `SIG_VALTYPE_ <MsgID> <SignalName> : <Value>;`
/// where `<Value>` is `1` (IEEE float, 32-bit) or `2` (IEEE double, 64-bit).
/// `0` (integer) is accepted as well.
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("SIG_VALTYPE_")?;
    let message_id: u32 = cur.expect_number("message id")?;
    let signal: String = cur.expect_ident("signal name")?;
    cur.eat(&TokenKind::Colon);

    let code_error: SyntaxError = cur.error("value type (0, 1 or 2)");
    let code: u8 = cur.expect_integer("value type (0, 1 or 2)")?;
    if code > 2 {
        return Err(code_error);
    }
    cur.expect(TokenKind::Semicolon)?;

    Ok(DeclarationKind::SignalValueType {
        message_id,
        signal,
        code,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize("SIG_VALTYPE_ 100 Pressure : 1;").unwrap();
        assert_eq!(
            decode(&mut Cursor::new(&tokens)).unwrap(),
            DeclarationKind::SignalValueType {
                message_id: 100,
                signal: "Pressure".into(),
                code: 1
            }
        );
    }

    #[test]
    fn invalid_code() {
        let tokens = tokenize("SIG_VALTYPE_ 100 Pressure : 3;").unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!(err.found, "'3'");
    }
}
