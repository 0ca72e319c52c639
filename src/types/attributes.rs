use std::fmt;

use serde::Serialize;

use crate::dbc::declarations::Literal;

/// Attribute definition from a `BA_DEF_` line, completed by its `BA_DEF_DEF_` default.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeDefinition {
    /// Attribute name.
    pub name: String,
    /// Entity kind the attribute applies to.
    pub object: AttrObject,
    /// Declared value type and bounds.
    pub kind: AttrKind,
    /// Default value from `BA_DEF_DEF_`, typed after `kind`.
    pub default: Option<AttributeValue>,
}

impl AttributeDefinition {
    /// Converts a literal from a `BA_`/`BA_DEF_DEF_` line into a typed value.
    ///
    /// Enum attributes accept either the label or its index. Returns `None`
    /// when the literal does not match the declared type.
    pub fn coerce(&self, literal: &Literal) -> Option<AttributeValue> {
        match (&self.kind, literal) {
            (AttrKind::Int { .. }, Literal::Number(n)) => {
                parse_int(n).map(AttributeValue::Int)
            }
            (AttrKind::Hex { .. }, Literal::Number(n)) => {
                parse_int(n).map(|v| AttributeValue::Hex(v as u64))
            }
            (AttrKind::Float { .. }, Literal::Number(n)) => {
                n.parse::<f64>().ok().map(AttributeValue::Float)
            }
            (AttrKind::String, Literal::Str(s)) => Some(AttributeValue::Str(s.clone())),
            (AttrKind::Enum(labels), Literal::Str(s)) => {
                labels.contains(s).then(|| AttributeValue::Enum(s.clone()))
            }
            (AttrKind::Enum(labels), Literal::Number(n)) => {
                let idx: usize = n.parse().ok()?;
                labels.get(idx).cloned().map(AttributeValue::Enum)
            }
            _ => None,
        }
    }
}

// Integer attributes are sometimes written as `10.0` by DBC editors.
fn parse_int(text: &str) -> Option<i64> {
    text.parse::<i64>().ok().or_else(|| {
        let f: f64 = text.parse().ok()?;
        (f.fract() == 0.0).then_some(f as i64)
    })
}

/// Attribute value types as declared by `BA_DEF_` lines in DBC.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttrKind {
    Int { min: i64, max: i64 },
    Hex { min: u64, max: u64 },
    Float { min: f64, max: f64 },
    String,
    Enum(Vec<String>),
}

impl fmt::Display for AttrKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttrKind::Int { min, max } => write!(f, "INT {} {}", min, max),
            AttrKind::Hex { min, max } => write!(f, "HEX {} {}", min, max),
            AttrKind::Float { min, max } => {
                write!(f, "FLOAT {} {}", compact_float(*min), compact_float(*max))
            }
            AttrKind::String => f.write_str("STRING"),
            AttrKind::Enum(labels) => write!(f, "ENUM {}", labels.join(",")),
        }
    }
}

/// Concrete attribute value stored on DB/Node/Message/Signal entities.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttributeValue {
    Str(String),
    Int(i64),
    Hex(u64), // memorize as a number, proper display later.
    Float(f64),
    Enum(String),
}

impl AttributeValue {
    /// Numeric view of the value (`None` for strings and enum labels).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            AttributeValue::Int(i) => Some(*i as f64),
            AttributeValue::Hex(h) => Some(*h as f64),
            AttributeValue::Float(x) => Some(*x),
            AttributeValue::Str(_) | AttributeValue::Enum(_) => None,
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AttributeValue::Str(s) => write!(f, "{}", s),
            AttributeValue::Int(i) => write!(f, "{}", i),
            AttributeValue::Hex(h) => write!(f, "0x{:X}", h),
            AttributeValue::Float(x) => f.write_str(&compact_float(*x)),
            AttributeValue::Enum(s) => write!(f, "{}", s),
        }
    }
}

// compact print, no superfluous trailing zeros
fn compact_float(x: f64) -> String {
    let mut s: String = x.to_string();
    if s.contains('.') {
        while s.ends_with('0') {
            s.pop();
        }
        if s.ends_with('.') {
            s.pop();
        }
    }
    s
}

/// Declares which entity kind an attribute targets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum AttrObject {
    #[default]
    Database,
    Node,
    Message,
    Signal,
    EnvironmentVariable,
}

impl fmt::Display for AttrObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AttrObject::Database => "Database",
            AttrObject::Node => "Node",
            AttrObject::Message => "Message",
            AttrObject::Signal => "Signal",
            AttrObject::EnvironmentVariable => "EnvironmentVariable",
        })
    }
}
