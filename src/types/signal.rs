use crate::codec::layout::BitLayout;
use crate::types::{
    attributes::AttributeValue,
    database::{MessageKey, NodeKey, SignalKey},
};
use std::collections::BTreeMap;
use std::fmt;

/// Definition of a signal within a CAN message (DBC).
///
/// Describes position/bit-length, byte order, value type, scaling (factor/offset),
/// valid range, unit of measure, value descriptions, receivers and multiplexing.
#[derive(Clone, PartialEq, Debug)]
pub struct Signal {
    /// Own key in [`Database::signals`](crate::Database).
    pub key: SignalKey,
    /// Parent message key.
    pub message: MessageKey,
    /// Signal name, unique within its message.
    pub name: String,
    /// Start bit as written in the DBC (LSB for Intel, MSB for Motorola).
    pub start_bit: u16,
    /// Bit length (1..=64).
    pub bit_length: u16,
    pub byte_order: ByteOrder,
    pub value_type: ValueType,
    /// Scaling factor.
    pub factor: f64,
    /// Scaling offset.
    pub offset: f64,
    /// Minimum physical value.
    pub min: f64,
    /// Maximum physical value.
    pub max: f64,
    /// Unit of measure (None when the DBC gives `""`).
    pub unit: Option<String>,
    /// Receiver nodes (placeholders such as `Vector__XXX` are not listed).
    pub receivers: Vec<NodeKey>,
    /// Associated comment (DBC `CM_ SG_` section).
    pub comment: Option<String>,
    pub multiplexing: Multiplexing,
    /// Value-to-text mapping (`VAL_`).
    pub value_descriptions: BTreeMap<i64, String>,

    // --- Signal Attribute Entry ---
    pub attributes: BTreeMap<String, AttributeValue>,

    // Precomputed extraction steps for fast decoding.
    pub(crate) layout: BitLayout,
}

impl Signal {
    /// Text from the value descriptions for a raw value, if any.
    pub fn describe(&self, raw: i64) -> Option<&str> {
        self.value_descriptions.get(&raw).map(|s| s.as_str())
    }

    pub fn is_multiplexor(&self) -> bool {
        matches!(self.multiplexing, Multiplexing::Multiplexor)
    }

    /// `true` when the signal is present in a frame whose multiplexor reads `switch`.
    ///
    /// Signals that are not multiplexed are always active.
    pub fn is_active_for(&self, switch: u64) -> bool {
        match &self.multiplexing {
            Multiplexing::None | Multiplexing::Multiplexor => true,
            Multiplexing::Multiplexed(selectors) => {
                selectors.iter().any(|sel| sel.matches(switch))
            }
        }
    }
}

/// Bit numbering convention of a signal (`@1` Intel, `@0` Motorola).
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ByteOrder {
    /// Intel (`@1`): start bit is the LSB, bits ascend into the next byte.
    #[default]
    LittleEndian,
    /// Motorola (`@0`): start bit is the MSB, bits descend and wrap to bit 7 of the next byte.
    BigEndian,
}

/// Raw value encoding, from the `+`/`-` flag and `SIG_VALTYPE_`.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ValueType {
    #[default]
    Unsigned, // +
    Signed,   // -
    Float,    // SIG_VALTYPE_ = 1
    Double,   // SIG_VALTYPE_ = 2
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ValueType::Unsigned => "unsigned",
            ValueType::Signed => "signed",
            ValueType::Float => "float",
            ValueType::Double => "double",
        })
    }
}

/// What role (if any) a signal plays in multiplexing.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Multiplexing {
    /// Not multiplexed (always present).
    #[default]
    None,
    /// This signal is the multiplexer switch (marked as `M` in DBC).
    Multiplexor,
    /// Present only when the switch matches one of the selectors (`mX`, `SG_MUL_VAL_`).
    Multiplexed(Vec<MuxSelector>),
}

/// A selector for multiplexed signals: either a single value or a closed range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MuxSelector {
    /// Active only when the switch == value.
    Value(u64),
    /// Active only when min <= switch <= max.
    Range { min: u64, max: u64 },
}

impl MuxSelector {
    pub fn matches(&self, switch: u64) -> bool {
        match *self {
            MuxSelector::Value(v) => v == switch,
            MuxSelector::Range { min, max } => (min..=max).contains(&switch),
        }
    }

    /// `true` when some switch value selects both.
    pub fn overlaps(&self, other: &MuxSelector) -> bool {
        let (a_min, a_max) = self.bounds();
        let (b_min, b_max) = other.bounds();
        a_min <= b_max && b_min <= a_max
    }

    /// Inclusive `(min, max)` switch values covered.
    pub fn bounds(&self) -> (u64, u64) {
        match *self {
            MuxSelector::Value(v) => (v, v),
            MuxSelector::Range { min, max } => (min, max),
        }
    }
}
