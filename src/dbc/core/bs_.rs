use crate::dbc::{cursor::Cursor, lexer::TokenKind};
use crate::types::errors::SyntaxError;

/// Skip `BS_: [<baudrate> : <btr1> , <btr2>]` (bit timing, obsolete).
pub(crate) fn skip(cur: &mut Cursor) -> Result<(), SyntaxError> {
    cur.expect_keyword("BS_")?;
    cur.expect(TokenKind::Colon)?;
    if matches!(cur.peek_kind(), Some(TokenKind::Number(_))) {
        cur.expect_number::<u64>("baudrate")?;
        cur.expect(TokenKind::Colon)?;
        cur.expect_number::<u64>("BTR1")?;
        cur.expect(TokenKind::Comma)?;
        cur.expect_number::<u64>("BTR2")?;
    }
    Ok(())
}
