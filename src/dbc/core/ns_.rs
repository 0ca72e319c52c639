use crate::dbc::{cursor::Cursor, lexer::TokenKind};
use crate::types::errors::SyntaxError;

/// Skip the `NS_ :` new-symbols block.
///
/// The block is a list of keywords, one per line. A keyword is part of the
/// list only while it stands alone on its line, so a real statement right
/// after the block (e.g. `BS_:`) ends it.
pub(crate) fn skip(cur: &mut Cursor) -> Result<(), SyntaxError> {
    cur.expect_keyword("NS_")?;
    cur.expect(TokenKind::Colon)?;

    while let Some(tok) = cur.peek() {
        if !matches!(tok.kind, TokenKind::Ident(_)) {
            break;
        }
        let alone = cur.peek_nth(1).is_none_or(|next| next.line != tok.line);
        if !alone {
            break;
        }
        cur.next();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_skip() {
        let tokens = tokenize("NS_ :\n\tNS_DESC_\n\tCM_\n\tBA_DEF_\n\nBS_:\nBU_: A").unwrap();
        let mut cur = Cursor::new(&tokens);
        skip(&mut cur).unwrap();
        assert_eq!(cur.peek_kind(), Some(&TokenKind::Ident("BS_".into())));
    }
}
