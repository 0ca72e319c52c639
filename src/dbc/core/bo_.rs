use crate::dbc::{
    cursor::Cursor,
    declarations::RawMessage,
    lexer::TokenKind,
    parse,
};
use crate::types::errors::SyntaxError;

/// Decode a `BO_` header.
/// Format: `BO_ <id> <name>: <byte_length> <sender>`
///
/// The sender is optional in a few hand-written files; it then defaults to
/// the `Vector__XXX` placeholder.
pub(crate) fn decode(cur: &mut Cursor) -> Result<RawMessage, SyntaxError> {
    cur.expect_keyword("BO_")?;
    let id: u32 = cur.expect_number("message id")?;
    let name: String = cur.expect_ident("message name")?;
    cur.expect(TokenKind::Colon)?;
    let byte_length: u32 = cur.expect_integer("message byte length")?;

    let sender: String = match cur.peek_kind() {
        Some(TokenKind::Ident(s)) if !parse::is_keyword(s) => {
            cur.next();
            s.clone()
        }
        _ => parse::PLACEHOLDER_NODE.to_string(),
    };

    Ok(RawMessage {
        id,
        name,
        byte_length,
        sender,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize("BO_ 2527679645 Motor_01: 8 Motor").unwrap();
        let msg = decode(&mut Cursor::new(&tokens)).unwrap();
        assert_eq!(msg.id, 2527679645);
        assert_eq!(msg.name, "Motor_01");
        assert_eq!(msg.byte_length, 8);
        assert_eq!(msg.sender, "Motor");
    }

    #[test]
    fn missing_sender_defaults_to_placeholder() {
        let tokens = tokenize("BO_ 100 Status: 2\n SG_ A : 0|1@1+ (1,0) [0|1] \"\" X").unwrap();
        let mut cur = Cursor::new(&tokens);
        let msg = decode(&mut cur).unwrap();
        assert_eq!(msg.sender, "Vector__XXX");
        assert_eq!(cur.peek_kind(), Some(&TokenKind::Ident("SG_".into())));
    }

    #[test]
    fn missing_colon_is_reported() {
        let tokens = tokenize("BO_ 100 Status 2 ECU1").unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!(err.found, "'2'");
        assert_eq!(err.expected, "':'");
    }
}
