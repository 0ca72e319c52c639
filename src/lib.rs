//! # dbc_codec
//!
//! Rust utilities for reading **CAN DBC** databases and converting frames.
//!
//! ## Highlights
//! - **DBC parser**: load CAN databases from `.dbc` text, bytes or files into a SlotMap-backed [`Database`].
//! - **Stable keys**: Nodes/Messages/Signals use SlotMap keys; lookups by id or name return them.
//! - **Ordered iteration**: `Database::nodes()`/`messages()` follow declaration order.
//! - **Frame codec**: bit-exact [`codec::decode`]/[`codec::encode`] for Intel and Motorola layouts,
//!   IEEE floats and (extended) multiplexing.
//! - **Export**: serializable [`export::DatabaseSummary`] and the [`export::SourceGenerator`] seam.
//!

pub mod codec;
pub mod dbc;
pub mod export;
#[doc(hidden)]
pub mod types;

// Top-level re-exports (appear under Crate Items → Structs)
#[doc(inline)]
pub use crate::types::{
    attributes::{AttrKind, AttrObject, AttributeDefinition, AttributeValue},
    database::{Database, MessageKey, NodeKey, SignalKey, ValueTable},
    errors::{
        CodecError, DbcParseError, LookupError, MessageLayoutError, SemanticError, SyntaxError,
    },
    message::{EXTENDED_ID_FLAG, IdFormat, Message},
    node::Node,
    options::ParseOptions,
    signal::{ByteOrder, Multiplexing, MuxSelector, Signal, ValueType},
};

pub use crate::codec::{DecodedSignal, RawValue};
