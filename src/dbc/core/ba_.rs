use crate::dbc::{
    cursor::Cursor,
    declarations::{DeclarationKind, Literal, Target},
    lexer::TokenKind,
};
use crate::types::errors::SyntaxError;

use super::ba_def_def_::literal;

/// Decode an attribute assignment.
///
/// Expected formats:
/// - `BA_ "DBName" "TestCAN";`
/// - `BA_ "NmAsrNode" BU_ Motor 1;`
/// - `BA_ "GenMsgCycleTime" BO_ 2527679645 100;`
/// - `BA_ "GenSigStartValue" SG_ 2527679645 Status 0;`
/// - `BA_ "X" EV_ EnvVar 0;`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("BA_")?;
    let name: String = cur.expect_str("attribute name")?;

    let target: Target = match cur.peek_kind() {
        Some(TokenKind::Ident(kw)) => {
            if !matches!(kw.as_str(), "BU_" | "BO_" | "SG_" | "EV_") {
                return Err(cur.error("object type (BU_, BO_, SG_, EV_) or attribute value"));
            }
            cur.next();
            match kw.as_str() {
                "BU_" => Target::Node(cur.expect_ident("node name")?),
                "BO_" => Target::Message(cur.expect_number("message id")?),
                "SG_" => {
                    let message_id: u32 = cur.expect_number("message id")?;
                    let signal: String = cur.expect_ident("signal name")?;
                    Target::Signal { message_id, signal }
                }
                _ => Target::EnvironmentVariable(cur.expect_ident("environment variable name")?),
            }
        }
        _ => Target::Network,
    };

    let value: Literal = literal(cur)?;
    cur.expect(TokenKind::Semicolon)?;
    Ok(DeclarationKind::AttributeAssignment {
        name,
        target,
        value,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    fn assignment(text: &str) -> DeclarationKind {
        let tokens = tokenize(text).unwrap();
        decode(&mut Cursor::new(&tokens)).unwrap()
    }

    #[test]
    fn test_decode() {
        assert_eq!(
            assignment(r#"BA_ "DBName" "TestCAN";"#),
            DeclarationKind::AttributeAssignment {
                name: "DBName".into(),
                target: Target::Network,
                value: Literal::Str("TestCAN".into())
            }
        );
        assert_eq!(
            assignment(r#"BA_ "GenMsgCycleTime" BO_ 2527679645 100;"#),
            DeclarationKind::AttributeAssignment {
                name: "GenMsgCycleTime".into(),
                target: Target::Message(2527679645),
                value: Literal::Number("100".into())
            }
        );
        assert_eq!(
            assignment(r#"BA_ "GenSigStartValue" SG_ 7 Status 0.5;"#),
            DeclarationKind::AttributeAssignment {
                name: "GenSigStartValue".into(),
                target: Target::Signal {
                    message_id: 7,
                    signal: "Status".into()
                },
                value: Literal::Number("0.5".into())
            }
        );
    }

    #[test]
    fn unknown_object_type() {
        let tokens = tokenize(r#"BA_ "X" XX_ 1;"#).unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!(err.found, "'XX_'");
    }
}
