//! # dbc
//!
//! `dbc` is the module to work with .dbc files: text → declarations → [`Database`].

pub(crate) mod build;
pub(crate) mod core;
pub(crate) mod cursor;
pub mod declarations;
pub(crate) mod lexer;
pub(crate) mod parse;

pub use parse::{PLACEHOLDER_NODE, parse_declarations};

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::WINDOWS_1252;

use crate::types::{database::Database, errors::DbcParseError, options::ParseOptions};

/// Parses DBC text with the default [`ParseOptions`].
///
/// # Example
/// ```
/// let db = dbc_codec::dbc::from_str(
///     "BU_: ECU1\nBO_ 100 Status: 2 ECU1\n SG_ Speed : 0|16@1+ (0.1,0) [0|6553.5] \"km/h\" ECU2\n",
/// )
/// .unwrap();
/// let values = db.decode_frame(100, &[0x64, 0x00]).unwrap();
/// assert!((values["Speed"] - 10.0).abs() < 1e-9);
/// ```
pub fn from_str(text: &str) -> Result<Database, DbcParseError> {
    from_str_with(text, &ParseOptions::default())
}

/// Parses DBC text into a validated [`Database`].
///
/// # Errors
/// [`DbcParseError::Syntax`] for malformed text, [`DbcParseError::Semantic`]
/// for broken references or layout invariants. No partial database is returned.
pub fn from_str_with(text: &str, opts: &ParseOptions) -> Result<Database, DbcParseError> {
    let declarations = parse_declarations(text)?;
    Ok(build::build(declarations, opts)?)
}

/// Parses the raw bytes of a DBC file.
///
/// UTF-8 input is taken as is; anything else is decoded as Windows-1252,
/// the encoding DBC editors write. With [`ParseOptions::transliterate`] German
/// umlauts and `ß` are replaced by ASCII fallbacks.
pub fn from_bytes(bytes: &[u8], opts: &ParseOptions) -> Result<Database, DbcParseError> {
    let text: Cow<'_, str> = match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s),
        Err(_) => {
            let (decoded, _, _) = WINDOWS_1252.decode(bytes);
            decoded
        }
    };
    let text: Cow<'_, str> = if opts.transliterate {
        transliterate(text)
    } else {
        text
    };
    from_str_with(&text, opts)
}

/// Reads and parses a `.dbc` file with the default [`ParseOptions`].
pub fn from_file(path: impl AsRef<Path>) -> Result<Database, DbcParseError> {
    from_file_with(path, &ParseOptions::default())
}

/// Reads and parses a `.dbc` file.
///
/// # Errors
/// [`DbcParseError::InvalidExtension`] when the path does not end in `.dbc`,
/// [`DbcParseError::OpenFile`]/[`DbcParseError::Read`] on I/O failures, then
/// anything [`from_str_with`] returns.
pub fn from_file_with(path: impl AsRef<Path>, opts: &ParseOptions) -> Result<Database, DbcParseError> {
    let path: &Path = path.as_ref();
    let shown: String = path.display().to_string();

    // check if provided file has .dbc format
    let is_dbc: bool = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("dbc"));
    if !is_dbc {
        return Err(DbcParseError::InvalidExtension { path: shown });
    }

    let bytes: Vec<u8> = fs::read(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => {
            DbcParseError::OpenFile {
                path: shown.clone(),
                source,
            }
        }
        _ => DbcParseError::Read {
            path: shown.clone(),
            source,
        },
    })?;

    tracing::debug!(path = %shown, bytes = bytes.len(), "loading DBC file");
    from_bytes(&bytes, opts)
}

// Swap german chars with ASCII ones
fn transliterate(text: Cow<'_, str>) -> Cow<'_, str> {
    if text.is_ascii() {
        return text;
    }
    let mut out: String = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            'ü' => out.push('u'),
            'ö' => out.push('o'),
            'ä' => out.push('a'),
            'ß' => out.push_str("ss"),
            'Ü' => out.push('U'),
            'Ö' => out.push('O'),
            'Ä' => out.push('A'),
            '¿' => out.push('?'),
            _ => out.push(ch),
        }
    }
    Cow::Owned(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = "VERSION \"\"\nBU_: A\nBO_ 1 M: 1 A\n SG_ S : 0|8@1+ (1,0) [0|255] \"\" A\nCM_ SG_ 1 S \"Temperatur über Grenze\";\n";

    #[test]
    fn windows_1252_bytes_are_decoded() {
        let (bytes, _, _) = WINDOWS_1252.encode(SMALL);
        assert!(std::str::from_utf8(&bytes).is_err());

        let db = from_bytes(&bytes, &ParseOptions::default()).unwrap();
        let s = db.signal_by_name("M", "S").unwrap();
        assert_eq!(s.comment.as_deref(), Some("Temperatur uber Grenze"));

        let opts = ParseOptions {
            transliterate: false,
            ..ParseOptions::default()
        };
        let db = from_bytes(&bytes, &opts).unwrap();
        let s = db.signal_by_name("M", "S").unwrap();
        assert_eq!(s.comment.as_deref(), Some("Temperatur über Grenze"));
    }

    #[test]
    fn file_loading() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("dbc_codec_{}.dbc", std::process::id()));
        fs::write(&path, SMALL).unwrap();
        let db = from_file(&path).unwrap();
        assert_eq!(db.messages().count(), 1);
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            from_file(dir.join("network.txt")),
            Err(DbcParseError::InvalidExtension { .. })
        ));
        assert!(matches!(
            from_file(dir.join("dbc_codec_missing_file.dbc")),
            Err(DbcParseError::OpenFile { .. })
        ));
    }

    #[test]
    fn errors_are_wrapped() {
        assert!(matches!(
            from_str("BU_: A\nBO_ 1 M 1 A\n"),
            Err(DbcParseError::Syntax(_))
        ));
        assert!(matches!(
            from_str("BU_: A\nBO_ 1 M: 1 B\n"),
            Err(DbcParseError::Semantic(_))
        ));
    }
}
