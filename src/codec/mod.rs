//! # codec
//!
//! Converts CAN payloads to physical signal values and back, using the bit
//! layouts compiled when the [`Database`] was built.
//!
//! Decoding reads the multiplexor first (if the message has one) and skips
//! multiplexed signals whose selectors do not match. Encoding starts from an
//! all-zero payload of the message's byte length.

pub(crate) mod layout;

use serde::Serialize;
use std::collections::BTreeMap;

use crate::types::{
    database::Database,
    errors::CodecError,
    message::Message,
    signal::{Signal, ValueType},
};
use layout::sign_extend;

/// Raw field value, typed by the signal's [`ValueType`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub enum RawValue {
    Unsigned(u64),
    Signed(i64),
    Float(f32),
    Double(f64),
}

impl RawValue {
    pub fn as_f64(&self) -> f64 {
        match *self {
            RawValue::Unsigned(v) => v as f64,
            RawValue::Signed(v) => v as f64,
            RawValue::Float(v) => v as f64,
            RawValue::Double(v) => v,
        }
    }

    /// Integer view used for value descriptions (`None` for IEEE values).
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            RawValue::Unsigned(v) => i64::try_from(v).ok(),
            RawValue::Signed(v) => Some(v),
            RawValue::Float(_) | RawValue::Double(_) => None,
        }
    }
}

/// One signal out of a decoded frame.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DecodedSignal {
    pub name: String,
    pub raw: RawValue,
    /// `raw * factor + offset`
    pub physical: f64,
    /// Text from the signal's value descriptions, if the raw value has one.
    pub description: Option<String>,
}

/// Decodes `bytes` into physical values keyed by signal name.
///
/// Extra bytes beyond the message length are ignored.
pub fn decode(
    db: &Database,
    msg: &Message,
    bytes: &[u8],
) -> Result<BTreeMap<String, f64>, CodecError> {
    Ok(decode_signals(db, msg, bytes)?
        .into_iter()
        .map(|d| (d.name, d.physical))
        .collect())
}

/// Decodes `bytes` into one [`DecodedSignal`] per active signal, in message order.
pub fn decode_signals(
    db: &Database,
    msg: &Message,
    bytes: &[u8],
) -> Result<Vec<DecodedSignal>, CodecError> {
    if bytes.len() < msg.byte_length as usize {
        return Err(CodecError::BufferTooShort {
            message: msg.name.clone(),
            expected: msg.byte_length as usize,
            actual: bytes.len(),
        });
    }

    let switch: Option<u64> = match msg.multiplexor {
        Some(mk) => Some(db.signal(mk)?.layout.extract(bytes)),
        None => None,
    };

    let mut out: Vec<DecodedSignal> = Vec::with_capacity(msg.signals.len());
    for &sk in &msg.signals {
        let sig: &Signal = db.signal(sk)?;
        if let Some(sw) = switch
            && !sig.is_active_for(sw)
        {
            continue;
        }
        let raw: RawValue = raw_value(sig, bytes);
        out.push(DecodedSignal {
            name: sig.name.clone(),
            raw,
            physical: raw.as_f64() * sig.factor + sig.offset,
            description: raw
                .as_i64()
                .and_then(|r| sig.describe(r))
                .map(str::to_string),
        });
    }

    tracing::trace!(message = %msg.name, switch = ?switch, signals = out.len(), "decoded frame");
    Ok(out)
}

fn raw_value(sig: &Signal, bytes: &[u8]) -> RawValue {
    let bits: u64 = sig.layout.extract(bytes);
    match sig.value_type {
        ValueType::Unsigned => RawValue::Unsigned(bits),
        ValueType::Signed => RawValue::Signed(sign_extend(bits, sig.layout.bit_length())),
        ValueType::Float => RawValue::Float(f32::from_bits(bits as u32)),
        ValueType::Double => RawValue::Double(f64::from_bits(bits)),
    }
}

/// Encodes physical values into a payload of exactly `byte_length` bytes.
///
/// Signals not named in `values` are zero. Integer signals round half away
/// from zero. The multiplexor must be given when the message has one, and
/// every multiplexed signal given must be selected by it.
pub fn encode(
    db: &Database,
    msg: &Message,
    values: &BTreeMap<String, f64>,
) -> Result<Vec<u8>, CodecError> {
    for name in values.keys() {
        db.signal_in(msg.key, name)?;
    }

    let switch: Option<(&Signal, u64)> = match msg.multiplexor {
        Some(mk) => {
            let mux: &Signal = db.signal(mk)?;
            let value: f64 = *values.get(&mux.name).ok_or_else(|| {
                CodecError::MissingMultiplexor {
                    message: msg.name.clone(),
                    multiplexor: mux.name.clone(),
                }
            })?;
            let raw: u64 = to_raw(mux, value)?;
            Some((mux, raw & field_mask(mux.bit_length)))
        }
        None => None,
    };

    let mut bytes: Vec<u8> = vec![0; msg.byte_length as usize];
    for &sk in &msg.signals {
        let sig: &Signal = db.signal(sk)?;
        let Some(&value) = values.get(&sig.name) else {
            continue;
        };
        if let Some((mux, sw)) = switch
            && !sig.is_active_for(sw)
        {
            return Err(CodecError::MultiplexerMismatch {
                signal: sig.name.clone(),
                multiplexor: mux.name.clone(),
                switch: sw,
            });
        }
        sig.layout.insert(&mut bytes, to_raw(sig, value)?);
    }
    Ok(bytes)
}

fn field_mask(bits: u16) -> u64 {
    if bits >= 64 { u64::MAX } else { (1u64 << bits) - 1 }
}

/// Physical value → raw bits (two's complement for signed, IEEE for floats).
fn to_raw(sig: &Signal, physical: f64) -> Result<u64, CodecError> {
    let scaled: f64 = (physical - sig.offset) / sig.factor;
    let bits: u16 = sig.bit_length;
    let out_of_range = |value: f64, min: f64, max: f64| CodecError::ValueOutOfRange {
        signal: sig.name.clone(),
        value,
        min,
        max,
    };

    match sig.value_type {
        ValueType::Unsigned => {
            let r: f64 = scaled.round();
            let limit: f64 = 2f64.powi(bits as i32);
            if !r.is_finite() || r < 0.0 || r >= limit {
                return Err(out_of_range(r, 0.0, limit - 1.0));
            }
            Ok(r as u64)
        }
        ValueType::Signed => {
            let r: f64 = scaled.round();
            let limit: f64 = 2f64.powi(bits as i32 - 1);
            if !r.is_finite() || r < -limit || r >= limit {
                return Err(out_of_range(r, -limit, limit - 1.0));
            }
            Ok((r as i64) as u64)
        }
        ValueType::Float => {
            let v: f32 = scaled as f32;
            if !v.is_finite() {
                return Err(out_of_range(scaled, f32::MIN as f64, f32::MAX as f64));
            }
            Ok(v.to_bits() as u64)
        }
        ValueType::Double => {
            if !scaled.is_finite() {
                return Err(out_of_range(scaled, f64::MIN, f64::MAX));
            }
            Ok(scaled.to_bits())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc;
    use crate::types::errors::LookupError;
    use std::sync::Arc;
    use std::thread;

    fn values(pairs: &[(&str, f64)]) -> BTreeMap<String, f64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    const VEHICLE: &str = r#"
VERSION ""

BU_: ECU1

BO_ 100 Status: 2 ECU1
 SG_ Speed : 0|16@1+ (0.1,0) [0|6553.5] "km/h" ECU2

BO_ 200 Endian: 4 ECU1
 SG_ Little : 0|16@1+ (1,0) [0|65535] "" ECU2
 SG_ Big : 23|16@0+ (1,0) [0|65535] "" ECU2

BO_ 300 Climate: 8 ECU1
 SG_ Temp : 0|8@1- (0.5,-10) [-74|53.5] "degC" ECU2
 SG_ Gear : 8|3@1+ (1,0) [0|7] "" ECU2
 SG_ Torque : 32|32@1- (0.01,0) [-2e7|2e7] "Nm" ECU2

BO_ 400 Mux: 8 ECU1
 SG_ Selector M : 0|8@1+ (1,0) [0|255] "" ECU2
 SG_ PageA m1 : 8|16@1+ (1,0) [0|65535] "" ECU2
 SG_ PageB m2 : 8|16@1+ (1,0) [0|65535] "" ECU2
 SG_ Always : 24|8@1+ (1,0) [0|255] "" ECU2

BO_ 500 Floats: 12 ECU1
 SG_ Ratio : 0|32@1- (1,0) [0|0] "" ECU2
 SG_ Precise : 32|64@1- (2,1) [0|0] "" ECU2

VAL_ 300 Gear 0 "Park" 1 "Reverse" 2 "Neutral" 3 "Drive" ;
SIG_VALTYPE_ 500 Ratio : 1;
SIG_VALTYPE_ 500 Precise : 2;
"#;

    fn db() -> Database {
        dbc::from_str(VEHICLE).unwrap()
    }

    #[test]
    fn speed_scenario() {
        let db = dbc::from_str(
            "BU_: ECU1\nBO_ 100 Status: 2 ECU1\n SG_ Speed : 0|16@1+ (0.1,0) [0|6553.5] \"km/h\" ECU2\n",
        )
        .unwrap();
        let decoded = db.decode_frame(100, &[0x64, 0x00]).unwrap();
        assert_eq!(decoded.len(), 1);
        assert!((decoded["Speed"] - 10.0).abs() < 1e-9);

        let bytes = db.encode_frame(100, &values(&[("Speed", 10.0)])).unwrap();
        assert_eq!(bytes, [0x64, 0x00]);
    }

    #[test]
    fn endianness_vectors() {
        let db = db();
        let decoded = db.decode_frame(200, &[0x34, 0x12, 0x12, 0x34]).unwrap();
        assert_eq!(decoded["Little"], 0x1234 as f64);
        // Big: start 23 is the MSB of byte 2
        assert_eq!(decoded["Big"], 0x1234 as f64);

        let bytes = db
            .encode_frame(200, &values(&[("Little", 4660.0), ("Big", 4660.0)]))
            .unwrap();
        assert_eq!(bytes, [0x34, 0x12, 0x12, 0x34]);
    }

    #[test]
    fn motorola_start_7_reads_first_two_bytes() {
        let db = dbc::from_str(
            "BU_: A\nBO_ 1 M: 2 A\n SG_ Be : 7|16@0+ (1,0) [0|65535] \"\" A\n",
        )
        .unwrap();
        assert_eq!(db.decode_frame(1, &[0x12, 0x34]).unwrap()["Be"], 4660.0);
    }

    #[test]
    fn signed_scaling_and_descriptions() {
        let db = db();
        let bytes = db
            .encode_frame(
                300,
                &values(&[("Temp", -20.0), ("Gear", 3.0), ("Torque", -1234.56)]),
            )
            .unwrap();
        assert_eq!(bytes.len(), 8);
        // (-20 - -10) / 0.5 = -20 -> 0xEC
        assert_eq!(bytes[0], 0xEC);
        assert_eq!(bytes[1], 0x03);

        let msg = db.message_by_id(300).unwrap();
        let decoded = decode_signals(&db, msg, &bytes).unwrap();
        assert_eq!(decoded[0].raw, RawValue::Signed(-20));
        assert_eq!(decoded[0].physical, -20.0);
        assert_eq!(decoded[1].description.as_deref(), Some("Drive"));
        assert_eq!(decoded[2].raw, RawValue::Signed(-123456));
        assert!((decoded[2].physical + 1234.56).abs() < 1e-9);
    }

    #[test]
    fn rounding_is_half_away_from_zero() {
        let db = db();
        let up = db.encode_frame(300, &values(&[("Gear", 2.5)])).unwrap();
        assert_eq!(up[1], 3);
        // Temp raw -2.5 rounds to -3
        let down = db.encode_frame(300, &values(&[("Temp", -11.25)])).unwrap();
        assert_eq!(down[0], (-3i8) as u8);
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let db = db();
        let err = db.encode_frame(300, &values(&[("Gear", 8.0)])).unwrap_err();
        assert_eq!(
            err,
            CodecError::ValueOutOfRange {
                signal: "Gear".into(),
                value: 8.0,
                min: 0.0,
                max: 7.0
            }
        );
        assert!(matches!(
            db.encode_frame(300, &values(&[("Gear", -1.0)])),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        // Temp raw range is -128..=127
        assert!(db.encode_frame(300, &values(&[("Temp", 53.5)])).is_ok());
        assert!(matches!(
            db.encode_frame(300, &values(&[("Temp", 54.0)])),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            db.encode_frame(300, &values(&[("Gear", f64::NAN)])),
            Err(CodecError::ValueOutOfRange { .. })
        ));
        assert!(matches!(
            db.encode_frame(500, &values(&[("Ratio", 1e40)])),
            Err(CodecError::ValueOutOfRange { .. })
        ));
    }

    #[test]
    fn multiplexed_signals_follow_the_switch() {
        let db = db();
        let page_a = db.decode_frame(400, &[1, 0x34, 0x12, 9, 0, 0, 0, 0]).unwrap();
        assert_eq!(page_a.get("PageA"), Some(&4660.0));
        assert!(!page_a.contains_key("PageB"));
        assert_eq!(page_a["Always"], 9.0);

        let none = db.decode_frame(400, &[7, 0x34, 0x12, 9, 0, 0, 0, 0]).unwrap();
        assert_eq!(none.keys().collect::<Vec<_>>(), ["Always", "Selector"]);

        let bytes = db
            .encode_frame(400, &values(&[("Selector", 2.0), ("PageB", 513.0)]))
            .unwrap();
        assert_eq!(bytes, [2, 0x01, 0x02, 0, 0, 0, 0, 0]);

        assert_eq!(
            db.encode_frame(400, &values(&[("Selector", 1.0), ("PageB", 1.0)])),
            Err(CodecError::MultiplexerMismatch {
                signal: "PageB".into(),
                multiplexor: "Selector".into(),
                switch: 1
            })
        );
        assert_eq!(
            db.encode_frame(400, &values(&[("Always", 1.0)])),
            Err(CodecError::MissingMultiplexor {
                message: "Mux".into(),
                multiplexor: "Selector".into()
            })
        );
    }

    #[test]
    fn ieee_signals() {
        let db = db();
        let bytes = db
            .encode_frame(500, &values(&[("Ratio", 0.75), ("Precise", 7.5)]))
            .unwrap();
        assert_eq!(&bytes[0..4], &0.75f32.to_le_bytes());
        assert_eq!(&bytes[4..12], &3.25f64.to_le_bytes());

        let msg = db.message_by_id(500).unwrap();
        let decoded = decode_signals(&db, msg, &bytes).unwrap();
        assert_eq!(decoded[0].raw, RawValue::Float(0.75));
        assert_eq!(decoded[1].raw, RawValue::Double(3.25));
        assert_eq!(decoded[1].physical, 7.5);
        assert_eq!(decoded[1].description, None);
    }

    #[test]
    fn frame_errors_leave_the_database_usable() {
        let db = db();
        assert_eq!(
            db.decode_frame(100, &[0x64]),
            Err(CodecError::BufferTooShort {
                message: "Status".into(),
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            db.decode_frame(999, &[0; 8]),
            Err(CodecError::Lookup(LookupError::UnknownMessage("0x3E7".into())))
        );
        assert_eq!(
            db.encode_frame(100, &values(&[("Velocity", 1.0)])),
            Err(CodecError::Lookup(LookupError::UnknownSignal {
                message: "Status".into(),
                signal: "Velocity".into()
            }))
        );
        // longer payloads are accepted, the tail is ignored
        assert_eq!(db.decode_frame(100, &[0x64, 0x00, 0xFF]).unwrap()["Speed"], 10.0);
        assert_eq!(db.encode_frame(100, &BTreeMap::new()).unwrap(), [0, 0]);
    }

    #[test]
    fn round_trip_realistic_message() {
        let db = db();
        let input = values(&[("Temp", 21.5), ("Gear", 2.0), ("Torque", 310.25)]);
        let bytes = db.encode_frame(300, &input).unwrap();
        let output = db.decode_frame(300, &bytes).unwrap();
        for (name, value) in &input {
            assert!((output[name] - value).abs() < 1e-9, "{name}");
        }
    }

    #[test]
    fn concurrent_decoding() {
        let db = Arc::new(db());
        let handles: Vec<_> = (0..4u8)
            .map(|i| {
                let db = Arc::clone(&db);
                thread::spawn(move || {
                    for n in 0..100u16 {
                        let raw = n.wrapping_mul(i as u16 + 1);
                        let decoded = db.decode_frame(100, &raw.to_le_bytes()).unwrap();
                        assert!((decoded["Speed"] - raw as f64 * 0.1).abs() < 1e-6);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
