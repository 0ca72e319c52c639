use crate::dbc::{cursor::Cursor, declarations::DeclarationKind, lexer::TokenKind};
use crate::types::{
    attributes::{AttrKind, AttrObject},
    errors::SyntaxError,
};

/// Decode an attribute definition.
///
/// Expected formats:
/// - `BA_DEF_  "DBName" STRING;`
/// - `BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;`
/// - `BA_DEF_ BU_ "NmhBaseAddress" HEX 0 536870911;`
/// - `BA_DEF_ SG_ "GenSigStartValue" FLOAT 0 100000;`
/// - `BA_DEF_ "IsCan" ENUM "No","Yes";`
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("BA_DEF_")?;

    let object: AttrObject = match cur.peek_kind() {
        Some(TokenKind::Ident(kw)) => {
            let object = match kw.as_str() {
                "BU_" => AttrObject::Node,
                "BO_" => AttrObject::Message,
                "SG_" => AttrObject::Signal,
                "EV_" => AttrObject::EnvironmentVariable,
                _ => return Err(cur.error("object type (BU_, BO_, SG_, EV_) or attribute name")),
            };
            cur.next();
            object
        }
        _ => AttrObject::Database,
    };

    let name: String = cur.expect_str("attribute name")?;
    let kind: AttrKind = decode_kind(cur)?;
    cur.expect(TokenKind::Semicolon)?;

    Ok(DeclarationKind::AttributeDefinition { object, name, kind })
}

fn decode_kind(cur: &mut Cursor) -> Result<AttrKind, SyntaxError> {
    let type_error = cur.error("attribute type (INT, HEX, FLOAT, STRING, ENUM)");
    let value_type: String = cur.expect_ident("attribute type (INT, HEX, FLOAT, STRING, ENUM)")?;

    let kind: AttrKind = match value_type.as_str() {
        "INT" => AttrKind::Int {
            min: cur.expect_integer("minimum")?,
            max: cur.expect_integer("maximum")?,
        },
        "HEX" => AttrKind::Hex {
            min: cur.expect_integer("minimum")?,
            max: cur.expect_integer("maximum")?,
        },
        "FLOAT" => AttrKind::Float {
            min: cur.expect_number("minimum")?,
            max: cur.expect_number("maximum")?,
        },
        "STRING" => AttrKind::String,
        "ENUM" => {
            let mut labels: Vec<String> = Vec::new();
            while let Some(TokenKind::Str(label)) = cur.peek_kind() {
                labels.push(label.clone());
                cur.next();
                if !cur.eat(&TokenKind::Comma) {
                    break;
                }
            }
            AttrKind::Enum(labels)
        }
        _ => return Err(type_error),
    };
    Ok(kind)
}
