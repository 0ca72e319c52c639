use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::{errors::SyntaxError, signal::MuxSelector};

/// Decode an extended multiplexing statement:
/// `SG_MUL_VAL_ <MsgID> <Signal> <Switch> <min>-<max>, <min>-<max> ...;`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("SG_MUL_VAL_")?;
    let message_id: u32 = cur.expect_number("message id")?;
    let signal: String = cur.expect_ident("signal name")?;
    let switch: String = cur.expect_ident("multiplexer switch name")?;

    let mut selectors: Vec<MuxSelector> = Vec::new();
    while let Some(TokenKind::Number(_)) = cur.peek_kind() {
        let min: u64 = cur.expect_integer("range start")?;
        cur.expect(TokenKind::Minus)?;
        let reversed: SyntaxError = cur.error(&format!("a range end not below {min}"));
        let max: u64 = cur.expect_integer("range end")?;
        if max < min {
            return Err(reversed);
        }
        selectors.push(if min == max {
            MuxSelector::Value(min)
        } else {
            MuxSelector::Range { min, max }
        });
        if !cur.eat(&TokenKind::Comma) {
            break;
        }
    }
    cur.expect(TokenKind::Semicolon)?;

    Ok(DeclarationKind::ExtendedMultiplexing {
        message_id,
        signal,
        switch,
        selectors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize("SG_MUL_VAL_ 100 Sub Mux 0-3, 5-5;").unwrap();
        assert_eq!(
            decode(&mut Cursor::new(&tokens)).unwrap(),
            DeclarationKind::ExtendedMultiplexing {
                message_id: 100,
                signal: "Sub".into(),
                switch: "Mux".into(),
                selectors: vec![MuxSelector::Range { min: 0, max: 3 }, MuxSelector::Value(5)]
            }
        );
    }

    #[test]
    fn reversed_range_is_rejected() {
        let tokens = tokenize("SG_MUL_VAL_ 1 P1 Sel 0-1,\n 5-3;").unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!((err.line, err.column), (2, 4));
        assert_eq!(err.found, "'3'");
        assert_eq!(err.expected, "a range end not below 5");
    }
}
