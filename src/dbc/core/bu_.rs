use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind, parse};
use crate::types::errors::SyntaxError;

/// Decode the BU_ line listing node names.
/// Example: `BU_: ECU1 ECU2 ECU3`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("BU_")?;
    cur.expect(TokenKind::Colon)?;

    let mut nodes: Vec<String> = Vec::new();
    while let Some(TokenKind::Ident(name)) = cur.peek_kind() {
        if parse::is_keyword(name) {
            break;
        }
        nodes.push(name.clone());
        cur.next();
    }
    Ok(DeclarationKind::Nodes(nodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize("BU_: Motor Infotainment Gateway\n\nBO_ 1 A: 8 Motor").unwrap();
        let mut cur = Cursor::new(&tokens);
        assert_eq!(
            decode(&mut cur).unwrap(),
            DeclarationKind::Nodes(vec![
                "Motor".into(),
                "Infotainment".into(),
                "Gateway".into()
            ])
        );
        assert_eq!(cur.peek_kind(), Some(&TokenKind::Ident("BO_".into())));
    }

    #[test]
    fn empty_node_list() {
        let tokens = tokenize("BU_:\nVAL_TABLE_ T 0 \"x\";").unwrap();
        let mut cur = Cursor::new(&tokens);
        assert_eq!(decode(&mut cur).unwrap(), DeclarationKind::Nodes(vec![]));
    }
}
