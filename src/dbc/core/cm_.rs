use crate::dbc::{
    cursor::Cursor,
    declarations::{DeclarationKind, Target},
    lexer::TokenKind,
};
use crate::types::errors::SyntaxError;

/// Decode a `CM_` statement.
///
/// Expected formats:
/// - `CM_ "Comment regarding the network";`
/// - `CM_ BU_ <node> "...";`
/// - `CM_ BO_ <id> "...";`
/// - `CM_ SG_ <id> <signal> "...";`
/// - `CM_ EV_ <envvar> "...";`
///
/// The closing `;` is optional, as some editors drop it.
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("CM_")?;

    let target: Target = match cur.peek_kind() {
        Some(TokenKind::Str(_)) => Target::Network,
        Some(TokenKind::Ident(kw)) => match kw.as_str() {
            "BU_" => {
                cur.next();
                Target::Node(cur.expect_ident("node name")?)
            }
            "BO_" => {
                cur.next();
                Target::Message(cur.expect_number("message id")?)
            }
            "SG_" => {
                cur.next();
                let message_id: u32 = cur.expect_number("message id")?;
                let signal: String = cur.expect_ident("signal name")?;
                Target::Signal { message_id, signal }
            }
            "EV_" => {
                cur.next();
                Target::EnvironmentVariable(cur.expect_ident("environment variable name")?)
            }
            _ => return Err(cur.error("comment target (BU_, BO_, SG_, EV_) or string")),
        },
        _ => return Err(cur.error("comment target (BU_, BO_, SG_, EV_) or string")),
    };

    let text: String = cur.expect_str("comment string")?;
    cur.eat(&TokenKind::Semicolon);
    Ok(DeclarationKind::Comment { target, text })
}
