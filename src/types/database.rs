//! Database model (SlotMap-backed).
//!
//! This module defines the in-memory **CAN database** built from a DBC file.
//! Storage uses **SlotMap** arenas with **stable keys**: [`NodeKey`], [`MessageKey`], [`SignalKey`].
//! Public iteration follows the declaration order via `nodes()`, `messages()` and `value_tables()`.
//!
//! **Lookups** are O(1) and exact: `message_by_id`, `message_by_name`, `node_by_name`,
//! `signal_by_name`. A built [`Database`] is never mutated again, so it can be shared
//! between threads behind an `Arc`.

use slotmap::{SlotMap, new_key_type};
use std::collections::{BTreeMap, HashMap};

use crate::codec::{self, DecodedSignal};
use crate::types::{
    attributes::{AttrObject, AttributeDefinition, AttributeValue},
    errors::{CodecError, LookupError},
    message::{IdFormat, Message},
    node::Node,
    signal::Signal,
};

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct NodeKey; }
new_key_type! { pub struct MessageKey; }
new_key_type! { pub struct SignalKey; }

/// Named value table (`VAL_TABLE_`).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValueTable {
    pub name: String,
    pub entries: BTreeMap<i64, String>,
}

/// In-memory representation of a CAN database (DBC).
///
/// Holds metadata (version, name, comment), the arenas of nodes/messages/signals
/// (SlotMaps with stable keys), order vectors preserving declaration order, and
/// lookup maps for efficient queries. Only [`crate::dbc`] can build one.
#[derive(Default, Clone, Debug)]
pub struct Database {
    // --- General information ---
    pub(crate) version: String,
    pub(crate) name: Option<String>,
    pub(crate) comment: Option<String>,

    // --- Main storage (stable-key maps) ---
    pub(crate) nodes: SlotMap<NodeKey, Node>,
    pub(crate) messages: SlotMap<MessageKey, Message>,
    pub(crate) signals: SlotMap<SignalKey, Signal>,

    // --- Order "views" ---
    pub(crate) nodes_order: Vec<NodeKey>,
    pub(crate) messages_order: Vec<MessageKey>,

    pub(crate) value_tables: Vec<ValueTable>,

    // --- DB Attribute Entry ---
    pub(crate) attributes: BTreeMap<String, AttributeValue>,

    // --- Attributes ---
    pub(crate) attribute_definitions: BTreeMap<AttrObject, BTreeMap<String, AttributeDefinition>>,

    // --- Lookups ---
    pub(crate) node_key_by_name: HashMap<String, NodeKey>,
    pub(crate) msg_key_by_id: HashMap<(IdFormat, u32), MessageKey>,
    pub(crate) msg_key_by_name: HashMap<String, MessageKey>,
    pub(crate) sig_key_by_name: HashMap<(MessageKey, String), SignalKey>,
}

impl Database {
    // --------- General --------
    /// `VERSION` string (empty when the file has none).
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Database name from the `DBName` attribute.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Network comment (`CM_ "..."`).
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    /// Network-level attribute values (`BA_ "name" value;`).
    pub fn attributes(&self) -> &BTreeMap<String, AttributeValue> {
        &self.attributes
    }

    /// Attribute definitions (`BA_DEF_`) for one kind of object, keyed by name.
    pub fn attribute_definitions(
        &self,
        object: AttrObject,
    ) -> impl Iterator<Item = &AttributeDefinition> + '_ {
        self.attribute_definitions
            .get(&object)
            .into_iter()
            .flat_map(|defs| defs.values())
    }

    // --------- Nodes --------
    /// Nodes in `BU_` order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> + '_ {
        self.nodes_order.iter().filter_map(|&k| self.nodes.get(k))
    }

    pub fn node(&self, key: NodeKey) -> Result<&Node, LookupError> {
        self.nodes.get(key).ok_or(LookupError::StaleKey)
    }

    pub fn node_by_name(&self, name: &str) -> Result<&Node, LookupError> {
        self.node_key_by_name
            .get(name)
            .and_then(|&k| self.nodes.get(k))
            .ok_or_else(|| LookupError::UnknownNode(name.to_string()))
    }

    // ------------- Messages ------------
    /// Messages in `BO_` order.
    pub fn messages(&self) -> impl Iterator<Item = &Message> + '_ {
        self.messages_order
            .iter()
            .filter_map(|&k| self.messages.get(k))
    }

    pub fn message(&self, key: MessageKey) -> Result<&Message, LookupError> {
        self.messages.get(key).ok_or(LookupError::StaleKey)
    }

    /// Returns a message given its id as written in a DBC file.
    ///
    /// Bit 31 marks an extended id; ids above `0x7FF` are extended as well.
    pub fn message_by_id(&self, dbc_id: u32) -> Result<&Message, LookupError> {
        let (format, frame_id) = IdFormat::split(dbc_id);
        self.message_by_frame_id(format, frame_id)
    }

    /// Returns a message given its bare frame id and format.
    pub fn message_by_frame_id(
        &self,
        format: IdFormat,
        frame_id: u32,
    ) -> Result<&Message, LookupError> {
        self.msg_key_by_id
            .get(&(format, frame_id))
            .and_then(|&k| self.messages.get(k))
            .ok_or_else(|| LookupError::UnknownMessage(format!("0x{:X}", frame_id)))
    }

    pub fn message_by_name(&self, name: &str) -> Result<&Message, LookupError> {
        self.msg_key_by_name
            .get(name)
            .and_then(|&k| self.messages.get(k))
            .ok_or_else(|| LookupError::UnknownMessage(name.to_string()))
    }

    /// Transmitting nodes of a message (`BO_` sender plus `BO_TX_BU_`).
    pub fn transmitters_of(&self, key: MessageKey) -> Result<Vec<&Node>, LookupError> {
        let msg: &Message = self.message(key)?;
        msg.senders.iter().map(|&nk| self.node(nk)).collect()
    }

    /// Messages `node` transmits or receives at least one signal of.
    pub fn messages_for_node(&self, node: &str) -> Result<Vec<&Message>, LookupError> {
        let nk: NodeKey = self.node_by_name(node)?.key;
        Ok(self
            .messages()
            .filter(|m| {
                m.senders.contains(&nk)
                    || m.signals.iter().any(|&sk| {
                        self.signals
                            .get(sk)
                            .is_some_and(|s| s.receivers.contains(&nk))
                    })
            })
            .collect())
    }

    // -------------- Signals ------------
    pub fn signal(&self, key: SignalKey) -> Result<&Signal, LookupError> {
        self.signals.get(key).ok_or(LookupError::StaleKey)
    }

    /// Signals of a message in declaration order.
    pub fn signals_of(&self, key: MessageKey) -> Result<Vec<&Signal>, LookupError> {
        let msg: &Message = self.message(key)?;
        msg.signals.iter().map(|&sk| self.signal(sk)).collect()
    }

    /// Returns a signal given its message name and its own name.
    pub fn signal_by_name(&self, message: &str, signal: &str) -> Result<&Signal, LookupError> {
        let mk: MessageKey = self.message_by_name(message)?.key;
        self.signal_in(mk, signal)
    }

    pub(crate) fn signal_in(&self, mk: MessageKey, signal: &str) -> Result<&Signal, LookupError> {
        self.sig_key_by_name
            .get(&(mk, signal.to_string()))
            .and_then(|&k| self.signals.get(k))
            .ok_or_else(|| LookupError::UnknownSignal {
                message: self
                    .messages
                    .get(mk)
                    .map(|m| m.name.clone())
                    .unwrap_or_default(),
                signal: signal.to_string(),
            })
    }

    pub fn receivers_of(&self, key: SignalKey) -> Result<Vec<&Node>, LookupError> {
        let sig: &Signal = self.signal(key)?;
        sig.receivers.iter().map(|&nk| self.node(nk)).collect()
    }

    // -------------- Value tables ------------
    /// Value tables in `VAL_TABLE_` order.
    pub fn value_tables(&self) -> impl Iterator<Item = &ValueTable> + '_ {
        self.value_tables.iter()
    }

    pub fn value_table(&self, name: &str) -> Option<&ValueTable> {
        self.value_tables.iter().find(|t| t.name == name)
    }

    // -------------- Frames ------------
    /// Decodes a frame by DBC id into physical values keyed by signal name.
    pub fn decode_frame(
        &self,
        dbc_id: u32,
        bytes: &[u8],
    ) -> Result<BTreeMap<String, f64>, CodecError> {
        let msg: &Message = self.message_by_id(dbc_id)?;
        codec::decode(self, msg, bytes)
    }

    /// Like [`Self::decode_frame`] with raw values and value-table text.
    pub fn decode_frame_signals(
        &self,
        dbc_id: u32,
        bytes: &[u8],
    ) -> Result<Vec<DecodedSignal>, CodecError> {
        let msg: &Message = self.message_by_id(dbc_id)?;
        codec::decode_signals(self, msg, bytes)
    }

    /// Encodes physical values into a payload of the message's byte length.
    pub fn encode_frame(
        &self,
        dbc_id: u32,
        values: &BTreeMap<String, f64>,
    ) -> Result<Vec<u8>, CodecError> {
        let msg: &Message = self.message_by_id(dbc_id)?;
        codec::encode(self, msg, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc;

    const POWERTRAIN: &str = r#"
VERSION "2.1"

BU_: Engine Gateway Dash

VAL_TABLE_ OnOff 1 "On" 0 "Off" ;

BO_ 100 EngineData: 8 Engine
 SG_ Rpm : 0|16@1+ (0.25,0) [0|16383.75] "rpm" Gateway,Dash
 SG_ Temp : 16|8@1- (1,0) [-128|127] "degC" Dash

BO_ 2364540158 ExtendedStatus: 8 Gateway
 SG_ Mode : 0|4@1+ (1,0) [0|15] "" Engine

BO_TX_BU_ 100 : Engine,Gateway;
"#;

    fn db() -> Database {
        dbc::from_str(POWERTRAIN).unwrap()
    }

    #[test]
    fn lookups_by_id_and_name() {
        let db = db();
        assert_eq!(db.version(), "2.1");
        assert_eq!(db.message_by_id(100).unwrap().name, "EngineData");
        assert_eq!(db.message_by_name("EngineData").unwrap().frame_id, 100);

        let ext = db.message_by_id(2364540158).unwrap();
        assert_eq!(ext.id_format, IdFormat::Extended);
        assert_eq!(ext.frame_id, 2364540158 & 0x7FFF_FFFF);
        assert_eq!(db.message_by_frame_id(IdFormat::Extended, ext.frame_id).unwrap().name, "ExtendedStatus");

        assert_eq!(
            db.message_by_id(101).unwrap_err(),
            LookupError::UnknownMessage("0x65".into())
        );
        // names are matched exactly
        assert!(db.message_by_name("enginedata").is_err());
    }

    #[test]
    fn signals_and_nodes() {
        let db = db();
        let msg = db.message_by_name("EngineData").unwrap();
        let names: Vec<&str> = db
            .signals_of(msg.key)
            .unwrap()
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        assert_eq!(names, ["Rpm", "Temp"]);

        let tx: Vec<&str> = db
            .transmitters_of(msg.key)
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(tx, ["Engine", "Gateway"]);

        let rpm = db.signal_by_name("EngineData", "Rpm").unwrap();
        let rx: Vec<&str> = db
            .receivers_of(rpm.key)
            .unwrap()
            .iter()
            .map(|n| n.name.as_str())
            .collect();
        assert_eq!(rx, ["Gateway", "Dash"]);

        assert_eq!(
            db.signal_by_name("EngineData", "Speed").unwrap_err(),
            LookupError::UnknownSignal {
                message: "EngineData".into(),
                signal: "Speed".into()
            }
        );
        assert_eq!(
            db.node_by_name("Brake").unwrap_err(),
            LookupError::UnknownNode("Brake".into())
        );
    }

    #[test]
    fn node_filter_and_order() {
        let db = db();
        let nodes: Vec<&str> = db.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(nodes, ["Engine", "Gateway", "Dash"]);

        let dash: Vec<&str> = db
            .messages_for_node("Dash")
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(dash, ["EngineData"]);

        let engine: Vec<&str> = db
            .messages_for_node("Engine")
            .unwrap()
            .iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(engine, ["EngineData", "ExtendedStatus"]);

        let table = db.value_table("OnOff").unwrap();
        assert_eq!(table.entries.get(&1).map(String::as_str), Some("On"));
        assert_eq!(db.value_tables().count(), 1);
    }

    #[test]
    fn stale_keys_are_reported() {
        let db = db();
        let other = dbc::from_str("BU_: A\nBO_ 1 M: 1 A\n SG_ S : 0|8@1+ (1,0) [0|255] \"\" A\n").unwrap();
        // the second message's slot does not exist in a one-message arena
        let second = db.message_by_id(2364540158).unwrap().key;
        assert_eq!(other.message(second).unwrap_err(), LookupError::StaleKey);
        assert_eq!(other.signals_of(second).unwrap_err(), LookupError::StaleKey);
    }

    #[test]
    fn database_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Database>();
    }
}
