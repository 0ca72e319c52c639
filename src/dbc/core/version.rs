use crate::dbc::{cursor::Cursor, declarations::DeclarationKind};
use crate::types::errors::SyntaxError;

/// Decode `VERSION "<text>"`.
pub(crate) fn decode(cur: &mut Cursor) -> Result<DeclarationKind, SyntaxError> {
    cur.expect_keyword("VERSION")?;
    let version: String = cur.expect_str("version string")?;
    Ok(DeclarationKind::Version(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    #[test]
    fn test_decode() {
        let tokens = tokenize(r#"VERSION "1.0.2""#).unwrap();
        let mut cur = Cursor::new(&tokens);
        assert_eq!(
            decode(&mut cur).unwrap(),
            DeclarationKind::Version("1.0.2".into())
        );
        assert!(cur.is_at_end());
    }

    #[test]
    fn missing_string_is_an_error() {
        let tokens = tokenize("VERSION 12").unwrap();
        let err = decode(&mut Cursor::new(&tokens)).unwrap_err();
        assert_eq!(err.found, "'12'");
        assert_eq!(err.column, 9);
    }
}
