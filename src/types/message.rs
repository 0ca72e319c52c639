use crate::types::{
    attributes::AttributeValue,
    database::{MessageKey, NodeKey, SignalKey},
};
use std::collections::BTreeMap;
use std::fmt;

/// CAN message defined in the database.
///
/// Maintains the numeric frame id (`frame_id`, extended flag stripped), its
/// `id_format`, the `name`, payload length (`byte_length`), the transmitting
/// nodes (`senders`) and the ordered list of composing signals (`signals`).
#[derive(Clone, PartialEq, Debug)]
pub struct Message {
    /// Own key in [`Database::messages`](crate::Database).
    pub key: MessageKey,
    /// ID Format (Standard or Extended)
    pub id_format: IdFormat,
    /// Numeric CAN id without the DBC extended flag (bit 31).
    pub frame_id: u32,
    /// Message name.
    pub name: String,
    /// Payload length in bytes (0..=64).
    pub byte_length: u16,
    /// Transmitting nodes (ECUs) for this message, `BO_` sender first.
    pub senders: Vec<NodeKey>,
    /// Signals that belong to this message, in declaration order.
    pub signals: Vec<SignalKey>,
    /// The multiplexer switch, if the message is multiplexed.
    pub multiplexor: Option<SignalKey>,
    /// Associated comment (DBC `CM_ BO_` section).
    pub comment: Option<String>,
    /// Cycle time in milliseconds from `GenMsgCycleTime` (None if unknown).
    pub cycle_time: Option<u32>,

    // --- Message Attribute Entry ---
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Message {
    /// The id as written in a DBC file (bit 31 set for extended frames).
    pub fn dbc_id(&self) -> u32 {
        match self.id_format {
            IdFormat::Standard => self.frame_id,
            IdFormat::Extended => self.frame_id | EXTENDED_ID_FLAG,
        }
    }

    /// Normalized hexadecimal frame id (`"0x..."`, uppercase).
    pub fn id_hex(&self) -> String {
        format!("0x{:X}", self.frame_id)
    }

    /// `true` when the payload exceeds the classic CAN 8 bytes.
    pub fn is_fd(&self) -> bool {
        self.byte_length > 8
    }
}

/// Flag DBC files set on extended (29-bit) ids.
pub const EXTENDED_ID_FLAG: u32 = 0x8000_0000;

const MAX_STANDARD_ID: u32 = 0x7FF;

#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum IdFormat {
    #[default]
    Standard,
    Extended,
}

impl IdFormat {
    /// Splits a DBC id into its format and bare frame id.
    ///
    /// Ids carrying bit 31 are extended; so are ids beyond the 11-bit range
    /// even when the flag is missing.
    pub fn split(dbc_id: u32) -> (IdFormat, u32) {
        let frame_id: u32 = dbc_id & !EXTENDED_ID_FLAG;
        if dbc_id & EXTENDED_ID_FLAG != 0 || frame_id > MAX_STANDARD_ID {
            (IdFormat::Extended, frame_id)
        } else {
            (IdFormat::Standard, frame_id)
        }
    }
}

impl fmt::Display for IdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IdFormat::Standard => "Standard",
            IdFormat::Extended => "Extended",
        })
    }
}
