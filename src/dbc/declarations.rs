//! Raw declarations produced by the statement parser.
//!
//! These mirror the DBC text one statement at a time; nothing here is
//! cross-referenced yet. The builder turns a `Vec<Declaration>` into a
//! [`Database`](crate::Database).

use crate::types::{
    attributes::{AttrKind, AttrObject},
    signal::{ByteOrder, MuxSelector},
};

/// A number (kept as written) or a quoted string.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    Number(String),
    Str(String),
}

/// One parsed DBC statement together with the line it starts on.
#[derive(Clone, Debug, PartialEq)]
pub struct Declaration {
    pub line: usize,
    pub kind: DeclarationKind,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DeclarationKind {
    /// `VERSION "..."`
    Version(String),
    /// `BU_: A B C`
    Nodes(Vec<String>),
    /// `BO_ <id> <name>: <dlc> <sender>`
    Message(RawMessage),
    /// `SG_ ...`, bound to the preceding `BO_`.
    Signal(RawSignal),
    /// `CM_ ...;`
    Comment { target: Target, text: String },
    /// `VAL_TABLE_ <name> <value> "<desc>" ...;`
    ValueTable {
        name: String,
        entries: Vec<(i64, String)>,
    },
    /// `VAL_ <id> <signal> <value> "<desc>" ...;`
    ValueDescriptions {
        message_id: u32,
        signal: String,
        entries: Vec<(i64, String)>,
    },
    /// `BA_DEF_ [BU_|BO_|SG_|EV_] "<name>" <type>;`
    AttributeDefinition {
        object: AttrObject,
        name: String,
        kind: AttrKind,
    },
    /// `BA_DEF_DEF_ "<name>" <value>;`
    AttributeDefault { name: String, value: Literal },
    /// `BA_ "<name>" [target] <value>;`
    AttributeAssignment {
        name: String,
        target: Target,
        value: Literal,
    },
    /// `BO_TX_BU_ <id> : A,B;`
    MessageTransmitters { message_id: u32, nodes: Vec<String> },
    /// `SIG_VALTYPE_ <id> <signal> : <1|2>;`
    SignalValueType {
        message_id: u32,
        signal: String,
        code: u8,
    },
    /// `SG_MUL_VAL_ <id> <signal> <switch> a-b, c-d;`
    ExtendedMultiplexing {
        message_id: u32,
        signal: String,
        switch: String,
        selectors: Vec<MuxSelector>,
    },
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawMessage {
    /// Id as written, extended flag (bit 31) included.
    pub id: u32,
    pub name: String,
    pub byte_length: u32,
    pub sender: String,
}

/// Multiplexer indicator written between the signal name and the colon.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RawMux {
    #[default]
    None,
    /// `M`
    Multiplexor,
    /// `m<value>`
    Multiplexed(u64),
    /// `m<value>M`
    MultiplexedMultiplexor(u64),
}

#[derive(Clone, Debug, PartialEq)]
pub struct RawSignal {
    /// Id of the owning `BO_`.
    pub message_id: u32,
    pub name: String,
    pub mux: RawMux,
    pub start_bit: u16,
    pub bit_length: u16,
    pub byte_order: ByteOrder,
    pub signed: bool,
    pub factor: f64,
    pub offset: f64,
    pub min: f64,
    pub max: f64,
    pub unit: String,
    pub receivers: Vec<String>,
}

/// Entity a `CM_` or `BA_` statement is attached to.
#[derive(Clone, Debug, PartialEq)]
pub enum Target {
    Network,
    Node(String),
    Message(u32),
    Signal { message_id: u32, signal: String },
    EnvironmentVariable(String),
}
