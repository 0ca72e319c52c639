use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::errors::SyntaxError;

/// Decode `BO_TX_BU_` statements assigning additional transmitters to a message.
/// Example: `BO_TX_BU_ 123 : NodeA,NodeB;`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("BO_TX_BU_")?;
    let message_id: u32 = cur.expect_number("message id")?;
    cur.expect(TokenKind::Colon)?;

    let mut nodes: Vec<String> = Vec::new();
    while let Some(TokenKind::Ident(name)) = cur.peek_kind() {
        nodes.push(name.clone());
        cur.next();
        cur.eat(&TokenKind::Comma);
    }
    cur.expect(TokenKind::Semicolon)?;

    Ok(DeclarationKind::MessageTransmitters { message_id, nodes })
}
