use crate::dbc::{
    cursor::Cursor,
    declarations::{RawMux, RawSignal},
    lexer::TokenKind,
    parse,
};
use crate::types::{errors::SyntaxError, signal::ByteOrder};

/// Decode a `SG_` line belonging to the message `message_id` (the last parsed BO_).
/// Format (typical):
/// SG_ <name> [M|mX|mXM] : <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
pub(crate) fn decode(cur: &mut Cursor, message_id: u32) -> Result<RawSignal, SyntaxError> {
    cur.expect_keyword("SG_")?;
    let name: String = cur.expect_ident("signal name")?;

    // multiplexing tag decoding (if present)
    let mux: RawMux = match cur.peek_kind() {
        Some(TokenKind::Ident(tag)) => {
            let mux = decode_mux_tag(tag).ok_or_else(|| cur.error("multiplexer indicator"))?;
            cur.next();
            mux
        }
        _ => RawMux::None,
    };
    cur.expect(TokenKind::Colon)?;

    // bit info: "63|1@1+"
    let start_bit: u16 = cur.expect_integer("start bit")?;
    cur.expect(TokenKind::Pipe)?;
    let bit_length: u16 = cur.expect_integer("bit length")?;
    cur.expect(TokenKind::At)?;
    let order_error: SyntaxError = cur.error("byte order (0 or 1)");
    let byte_order: ByteOrder = match cur.expect_integer::<u8>("byte order (0 or 1)")? {
        0 => ByteOrder::BigEndian,
        1 => ByteOrder::LittleEndian,
        _ => return Err(order_error),
    };
    let signed: bool = if cur.eat(&TokenKind::Minus) {
        true
    } else if cur.eat(&TokenKind::Plus) {
        false
    } else {
        return Err(cur.error("value type ('+' or '-')"));
    };

    // "(factor,offset)"
    cur.expect(TokenKind::LParen)?;
    let factor: f64 = cur.expect_number("factor")?;
    cur.expect(TokenKind::Comma)?;
    let offset: f64 = cur.expect_number("offset")?;
    cur.expect(TokenKind::RParen)?;

    // "[min|max]"
    cur.expect(TokenKind::LBracket)?;
    let min: f64 = cur.expect_number("minimum")?;
    cur.expect(TokenKind::Pipe)?;
    let max: f64 = cur.expect_number("maximum")?;
    cur.expect(TokenKind::RBracket)?;

    let unit: String = cur.expect_str("unit string")?;

    // receivers, comma separated (some tools use blanks)
    let mut receivers: Vec<String> = Vec::new();
    while let Some(TokenKind::Ident(node)) = cur.peek_kind() {
        if parse::is_keyword(node) {
            break;
        }
        receivers.push(node.clone());
        cur.next();
        cur.eat(&TokenKind::Comma);
    }

    Ok(RawSignal {
        message_id,
        name,
        mux,
        start_bit,
        bit_length,
        byte_order,
        signed,
        factor,
        offset,
        min,
        max,
        unit,
        receivers,
    })
}

fn decode_mux_tag(tag: &str) -> Option<RawMux> {
    if tag == "M" {
        return Some(RawMux::Multiplexor);
    }
    let rest: &str = tag.strip_prefix('m')?;
    match rest.strip_suffix('M') {
        Some(value) => value.parse().ok().map(RawMux::MultiplexedMultiplexor),
        None => rest.parse().ok().map(RawMux::Multiplexed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::lexer::tokenize;

    fn signal(text: &str) -> RawSignal {
        let tokens = tokenize(text).unwrap();
        decode(&mut Cursor::new(&tokens), 100).unwrap()
    }

    #[test]
    fn test_decode() {
        let sig = signal(r#"SG_ Engine_Speed : 48|8@1+ (1,0) [0|255] "km/h" Infotainment,Gateway"#);
        assert_eq!(sig.message_id, 100);
        assert_eq!(sig.name, "Engine_Speed");
        assert_eq!(sig.mux, RawMux::None);
        assert_eq!((sig.start_bit, sig.bit_length), (48, 8));
        assert_eq!(sig.byte_order, ByteOrder::LittleEndian);
        assert!(!sig.signed);
        assert_eq!((sig.factor, sig.offset), (1.0, 0.0));
        assert_eq!((sig.min, sig.max), (0.0, 255.0));
        assert_eq!(sig.unit, "km/h");
        assert_eq!(sig.receivers, vec!["Infotainment", "Gateway"]);
    }

    #[test]
    fn motorola_signed_with_scientific_factor() {
        let sig = signal(r#"SG_ Temp : 7|12@0- (1E-002,-40) [-60.5|100] "degC" Vector__XXX"#);
        assert_eq!(sig.byte_order, ByteOrder::BigEndian);
        assert!(sig.signed);
        assert_eq!(sig.factor, 0.01);
        assert_eq!(sig.offset, -40.0);
        assert_eq!(sig.min, -60.5);
        assert_eq!(sig.receivers, vec!["Vector__XXX"]);
    }

    #[test]
    fn multiplexer_tags() {
        assert_eq!(signal(r#"SG_ Mux M : 0|8@1+ (1,0) [0|0] "" A"#).mux, RawMux::Multiplexor);
        assert_eq!(
            signal(r#"SG_ Sub m12 : 8|8@1+ (1,0) [0|0] "" A"#).mux,
            RawMux::Multiplexed(12)
        );
        assert_eq!(
            signal(r#"SG_ Nested m3M : 8|8@1+ (1,0) [0|0] "" A"#).mux,
            RawMux::MultiplexedMultiplexor(3)
        );
    }

    #[test]
    fn receivers_stop_at_next_statement() {
        let tokens = tokenize("SG_ A : 0|1@1+ (1,0) [0|1] \"\" X Y\n SG_ B : 1|1@1+ (1,0) [0|1] \"\" X").unwrap();
        let mut cur = Cursor::new(&tokens);
        let a = decode(&mut cur, 1).unwrap();
        assert_eq!(a.receivers, vec!["X", "Y"]);
        assert_eq!(decode(&mut cur, 1).unwrap().name, "B");
    }

    #[test]
    fn bad_tokens_are_reported() {
        let tokens = tokenize(r#"SG_ A x7 : 0|1@1+ (1,0) [0|1] "" X"#).unwrap();
        let err = decode(&mut Cursor::new(&tokens), 1).unwrap_err();
        assert_eq!(err.expected, "multiplexer indicator");

        let tokens = tokenize(r#"SG_ A : 0|1@2+ (1,0) [0|1] "" X"#).unwrap();
        let err = decode(&mut Cursor::new(&tokens), 1).unwrap_err();
        assert_eq!(err.found, "'2'");
        assert_eq!(err.column, 13);

        let tokens = tokenize(r#"SG_ A : 0|1@1 (1,0) [0|1] "" X"#).unwrap();
        let err = decode(&mut Cursor::new(&tokens), 1).unwrap_err();
        assert_eq!(err.found, "'('");
    }
}
