use std::io;
use thiserror::Error;

/// Malformed DBC text. Positions are 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Syntax error at line {line}, column {column}: found {found}, expected {expected}")]
pub struct SyntaxError {
    pub line: usize,
    pub column: usize,
    /// Offending token as written in the source (`end of input` at EOF).
    pub found: String,
    pub expected: String,
}

/// Errors produced while verifying that a signal fits a CAN frame layout.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessageLayoutError {
    #[error("Signal Bit Length cannot be zero")]
    ZeroBitLength,
    #[error("Signal Bit Length {bit_length} exceeds 64 bits")]
    TooWide { bit_length: u16 },
    #[error(
        "Out of bounds (Intel)! \nSignal end bit = {end} \nMessage total bits = {total_bits} (bytes={byte_length})"
    )]
    IntelOutOfBounds {
        end: usize,
        total_bits: usize,
        byte_length: u16,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized start = {start} \nMessage total bits = {total_bits} (bytes={byte_length})"
    )]
    MotorolaStartOutOfBounds {
        start: usize,
        total_bits: usize,
        byte_length: u16,
    },
    #[error(
        "Out of bounds (Motorola)! \nSignal linearized end = {end} \nMessage total bits = {total_bits} (bytes={byte_length})"
    )]
    MotorolaEndOutOfBounds {
        end: usize,
        total_bits: usize,
        byte_length: u16,
    },
}

/// Broken cross-reference or invariant violation found while building a [`Database`](crate::Database).
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SemanticError {
    #[error("Line {line}: node '{node}' referenced by {referenced_by} is not declared in BU_")]
    UndefinedNode {
        line: usize,
        node: String,
        referenced_by: String,
    },
    #[error("Line {line}: node '{node}' declared twice")]
    DuplicateNode { line: usize, node: String },
    #[error("Line {line}: message '{name}' reuses frame id {id_hex} of message '{existing}'")]
    DuplicateFrameId {
        line: usize,
        name: String,
        id_hex: String,
        existing: String,
    },
    #[error("Line {line}: message name '{name}' already used by frame id {id_hex}")]
    DuplicateMessageName {
        line: usize,
        name: String,
        id_hex: String,
    },
    #[error("Line {line}: message '{message}' has byte length {byte_length}, maximum is 64")]
    InvalidByteLength {
        line: usize,
        message: String,
        byte_length: u32,
    },
    #[error("Line {line}: signal '{signal}' declared twice in message '{message}'")]
    DuplicateSignal {
        line: usize,
        message: String,
        signal: String,
    },
    #[error("Line {line}: signal '{signal}' does not fit message '{message}': {source}")]
    SignalOutOfBounds {
        line: usize,
        message: String,
        signal: String,
        #[source]
        source: MessageLayoutError,
    },
    #[error(
        "Signal '{signal}' in message '{message}' is declared {value_type} but has {bit_length} bits"
    )]
    InvalidFloatLength {
        message: String,
        signal: String,
        value_type: &'static str,
        bit_length: u16,
    },
    #[error("Line {line}: signal '{signal}' in message '{message}' is multiplexed but the message has no multiplexor")]
    MissingMultiplexor {
        line: usize,
        message: String,
        signal: String,
    },
    #[error("Message '{message}' declares more than one multiplexor ('{first}' and '{second}')")]
    MultipleMultiplexors {
        message: String,
        first: String,
        second: String,
    },
    #[error("Line {line}: signal '{signal}' in message '{message}' uses nested multiplexing, which is not supported")]
    NestedMultiplexing {
        line: usize,
        message: String,
        signal: String,
    },
    #[error("Line {line}: SG_MUL_VAL_ for '{signal}' names switch '{switch}', but the multiplexor of '{message}' is {actual}")]
    UnknownMultiplexor {
        line: usize,
        message: String,
        signal: String,
        switch: String,
        actual: String,
    },
    #[error("Signals '{first}' and '{second}' overlap in message '{message}'")]
    OverlappingSignals {
        message: String,
        first: String,
        second: String,
    },
}

/// Errors produced while parsing a `.dbc` file or text.
#[derive(Debug, Error)]
pub enum DbcParseError {
    #[error("Not a valid .dbc file: {path}")]
    InvalidExtension { path: String },
    #[error("Failed to open '{path}'. \nError: {source}")]
    OpenFile {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("Failed while reading '{path}'. \nError: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Syntax(#[from] SyntaxError),
    #[error(transparent)]
    Semantic(#[from] SemanticError),
}

/// A read-only lookup on a [`Database`](crate::Database) found nothing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("Unknown message {0}")]
    UnknownMessage(String),
    #[error("Unknown signal '{signal}' in message '{message}'")]
    UnknownSignal { message: String, signal: String },
    #[error("Unknown node '{0}'")]
    UnknownNode(String),
    #[error("Key does not belong to this database")]
    StaleKey,
}

/// Per-frame failures of the codec. They never affect the database.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    #[error("Frame for message '{message}' is {actual} bytes, expected at least {expected}")]
    BufferTooShort {
        message: String,
        expected: usize,
        actual: usize,
    },
    #[error("Value {value} of signal '{signal}' does not fit its raw range [{min}, {max}]")]
    ValueOutOfRange {
        signal: String,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("Message '{message}' is multiplexed by '{multiplexor}' but no value was supplied for it")]
    MissingMultiplexor {
        message: String,
        multiplexor: String,
    },
    #[error("Signal '{signal}' is not selected when multiplexor '{multiplexor}' = {switch}")]
    MultiplexerMismatch {
        signal: String,
        multiplexor: String,
        switch: u64,
    },
    #[error(transparent)]
    Lookup(#[from] LookupError),
}
