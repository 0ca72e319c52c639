use crate::dbc::{
    core,
    cursor::Cursor,
    declarations::{Declaration, DeclarationKind},
    lexer::{Token, TokenKind, tokenize},
};
use crate::types::errors::SyntaxError;

/// Node name DBC editors write where no real node is meant.
pub const PLACEHOLDER_NODE: &str = "Vector__XXX";

// Statements with a decoder in `core`.
const DECODED: &[&str] = &[
    "VERSION",
    "NS_",
    "BS_",
    "BU_",
    "BO_",
    "SG_",
    "CM_",
    "VAL_TABLE_",
    "VAL_",
    "BA_DEF_",
    "BA_DEF_DEF_",
    "BA_",
    "BO_TX_BU_",
    "SIG_VALTYPE_",
    "SG_MUL_VAL_",
];

// Known statements that carry nothing the database keeps; skipped up to `;`.
const SKIPPED: &[&str] = &[
    "EV_",
    "ENVVAR_DATA_",
    "EV_DATA_",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "SIG_GROUP_",
    "SIG_TYPE_REF_",
    "SIGTYPE_VALTYPE_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "BA_DEF_REL_",
    "BA_REL_",
    "BA_DEF_DEF_REL_",
    "BA_DEF_SGTYPE_",
    "BA_SGTYPE_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
    "NS_DESC_",
];

/// `true` for words that start a DBC statement; they end node and receiver lists.
pub(crate) fn is_keyword(word: &str) -> bool {
    DECODED.contains(&word) || SKIPPED.contains(&word)
}

/// Parses DBC text into raw declarations, in source order.
///
/// Pure: nothing is cross-referenced here, see [`crate::dbc::from_str`] for
/// the full pipeline.
///
/// # Errors
/// A [`SyntaxError`] for the first malformed statement, an unknown top-level
/// token, or an `SG_` that appears before any `BO_`.
pub fn parse_declarations(text: &str) -> Result<Vec<Declaration>, SyntaxError> {
    let tokens: Vec<Token> = tokenize(text)?;
    let mut cur: Cursor = Cursor::new(&tokens);
    let mut out: Vec<Declaration> = Vec::new();

    // Parsing state: last message seen (used by SG_ decoder)
    let mut current_msg: Option<u32> = None;

    while let Some(tok) = cur.peek() {
        let line: usize = tok.line;
        let TokenKind::Ident(keyword) = &tok.kind else {
            return Err(cur.error("a DBC keyword"));
        };

        let kind: Option<DeclarationKind> = match keyword.as_str() {
            "VERSION" => Some(core::version::decode(&mut cur)?),
            "NS_" => {
                core::ns_::skip(&mut cur)?;
                None
            }
            "BS_" => {
                core::bs_::skip(&mut cur)?;
                None
            }
            // Some DBCs use "BU_:" while others use "BU_ :". The lexer accepts both.
            "BU_" => Some(core::bu_::decode(&mut cur)?),
            "BO_" => {
                let msg = core::bo_::decode(&mut cur)?;
                current_msg = Some(msg.id);
                Some(DeclarationKind::Message(msg))
            }
            "SG_" => {
                let Some(message_id) = current_msg else {
                    return Err(cur.error("a BO_ statement before the first SG_"));
                };
                Some(DeclarationKind::Signal(core::sg_::decode(
                    &mut cur, message_id,
                )?))
            }
            "CM_" => Some(core::cm_::decode(&mut cur)?),
            "VAL_TABLE_" => Some(core::val_table_::decode(&mut cur)?),
            "VAL_" => core::val_::decode(&mut cur)?,
            "BA_DEF_" => Some(core::ba_def_::decode(&mut cur)?),
            "BA_DEF_DEF_" => Some(core::ba_def_def_::decode(&mut cur)?),
            "BA_" => Some(core::ba_::decode(&mut cur)?),
            "BO_TX_BU_" => Some(core::bo_tx_bu_::decode(&mut cur)?),
            "SIG_VALTYPE_" => Some(core::sig_valtype_::decode(&mut cur)?),
            "SG_MUL_VAL_" => Some(core::sg_mul_val_::decode(&mut cur)?),
            kw if SKIPPED.contains(&kw) => {
                tracing::debug!(line, keyword = kw, "skipping statement");
                cur.skip_statement();
                None
            }
            _ => return Err(cur.error("a DBC keyword")),
        };

        if let Some(kind) = kind {
            out.push(Declaration { line, kind });
        }
    }

    Ok(out)
}
