//! Turns raw declarations into a validated [`Database`].
//!
//! Messages and their signals are created first, in declaration order. The
//! statements that decorate them (`BO_TX_BU_`, `SIG_VALTYPE_`, `SG_MUL_VAL_`,
//! `VAL_`, `CM_`, `BA_`) are applied afterwards, so their position in the file
//! does not matter. Cross-message invariants are checked last.

use std::collections::BTreeMap;

use crate::codec::layout::BitLayout;
use crate::dbc::{
    core::message_layout::{check_signal_fits, masks_intersect, occupied_bits},
    declarations::{Declaration, DeclarationKind, Literal, RawMessage, RawMux, RawSignal, Target},
};
use crate::types::{
    attributes::{AttrKind, AttrObject, AttributeDefinition, AttributeValue},
    database::{Database, MessageKey, NodeKey, SignalKey, ValueTable},
    errors::SemanticError,
    message::{IdFormat, Message},
    node::Node,
    options::ParseOptions,
    signal::{Multiplexing, MuxSelector, Signal, ValueType},
};

// BO_ line with the SG_ lines that follow it.
struct MessageBlock {
    line: usize,
    raw: RawMessage,
    signals: Vec<(usize, RawSignal)>,
}

struct Builder<'o> {
    db: Database,
    opts: &'o ParseOptions,
}

/// Builds a [`Database`] out of the declarations of one DBC file.
///
/// No partial database is returned: the first broken invariant aborts the build.
pub(crate) fn build(
    declarations: Vec<Declaration>,
    opts: &ParseOptions,
) -> Result<Database, SemanticError> {
    let mut b = Builder {
        db: Database::default(),
        opts,
    };

    // --- pass 1: group by owner ---
    let mut messages: Vec<MessageBlock> = Vec::new();
    let mut decorations: Vec<Declaration> = Vec::new();
    let mut definitions: Vec<(AttrObject, String, AttrKind)> = Vec::new();
    let mut defaults: Vec<(usize, String, Literal)> = Vec::new();

    for decl in declarations {
        match decl.kind {
            DeclarationKind::Version(v) => b.db.version = v,
            DeclarationKind::Nodes(names) => b.add_nodes(decl.line, names)?,
            DeclarationKind::Message(raw) => messages.push(MessageBlock {
                line: decl.line,
                raw,
                signals: Vec::new(),
            }),
            // the parser binds every SG_ to the BO_ right before it
            DeclarationKind::Signal(raw) => {
                if let Some(block) = messages.last_mut() {
                    block.signals.push((decl.line, raw));
                }
            }
            DeclarationKind::ValueTable { name, entries } => b.add_value_table(name, entries),
            DeclarationKind::AttributeDefinition { object, name, kind } => {
                definitions.push((object, name, kind))
            }
            DeclarationKind::AttributeDefault { name, value } => {
                defaults.push((decl.line, name, value))
            }
            kind => decorations.push(Declaration {
                line: decl.line,
                kind,
            }),
        }
    }

    b.add_attribute_definitions(definitions, defaults);

    for block in messages {
        b.add_message(block)?;
    }

    // --- pass 2: decorations, in an order that keeps later steps consistent ---
    decorations.sort_by_key(|d| decoration_rank(&d.kind));
    for decl in decorations {
        b.apply(decl)?;
    }

    b.validate()?;

    let db: Database = b.db;
    tracing::debug!(
        nodes = db.nodes.len(),
        messages = db.messages.len(),
        signals = db.signals.len(),
        value_tables = db.value_tables.len(),
        "database built"
    );
    Ok(db)
}

// Value types and extended multiplexing change how signals are validated, so
// they go before comments and attributes. The sort is stable.
fn decoration_rank(kind: &DeclarationKind) -> u8 {
    match kind {
        DeclarationKind::MessageTransmitters { .. } => 0,
        DeclarationKind::SignalValueType { .. } => 1,
        DeclarationKind::ExtendedMultiplexing { .. } => 2,
        DeclarationKind::ValueDescriptions { .. } => 3,
        DeclarationKind::Comment { .. } => 4,
        _ => 5,
    }
}

impl Builder<'_> {
    // --------- Nodes --------
    fn add_nodes(&mut self, line: usize, names: Vec<String>) -> Result<(), SemanticError> {
        for name in names {
            if self.opts.is_placeholder(&name) {
                continue;
            }
            if self.db.node_key_by_name.contains_key(&name) {
                return Err(SemanticError::DuplicateNode { line, node: name });
            }
            self.insert_node(name);
        }
        Ok(())
    }

    fn insert_node(&mut self, name: String) -> NodeKey {
        let key: NodeKey = self.db.nodes.insert_with_key(|key| Node {
            key,
            name: name.clone(),
            comment: None,
            attributes: BTreeMap::new(),
        });
        self.db.nodes_order.push(key);
        self.db.node_key_by_name.insert(name, key);
        key
    }

    /// Resolves a node reference. Placeholders resolve to `None`.
    fn resolve_node(
        &mut self,
        name: &str,
        line: usize,
        referenced_by: impl FnOnce() -> String,
    ) -> Result<Option<NodeKey>, SemanticError> {
        if self.opts.is_placeholder(name) {
            return Ok(None);
        }
        if let Some(&key) = self.db.node_key_by_name.get(name) {
            return Ok(Some(key));
        }
        if self.opts.strict_node_references {
            return Err(SemanticError::UndefinedNode {
                line,
                node: name.to_string(),
                referenced_by: referenced_by(),
            });
        }
        tracing::debug!(line, node = name, "creating undeclared node");
        Ok(Some(self.insert_node(name.to_string())))
    }

    /// Resolves a signal receiver. Receivers missing from `BU_` are created
    /// whatever the strictness, DBC editors routinely leave them out.
    fn resolve_receiver(&mut self, name: &str, line: usize, signal: &str) -> Option<NodeKey> {
        if self.opts.is_placeholder(name) {
            return None;
        }
        if let Some(&key) = self.db.node_key_by_name.get(name) {
            return Some(key);
        }
        tracing::warn!(line, node = name, signal, "receiver not declared in BU_, node created");
        Some(self.insert_node(name.to_string()))
    }

    // --------- Value tables and attribute definitions --------
    fn add_value_table(&mut self, name: String, entries: Vec<(i64, String)>) {
        let entries: BTreeMap<i64, String> = entries.into_iter().collect();
        match self.db.value_tables.iter_mut().find(|t| t.name == name) {
            Some(table) => {
                tracing::debug!(table = %name, "value table redefined, keeping the last one");
                table.entries = entries;
            }
            None => self.db.value_tables.push(ValueTable { name, entries }),
        }
    }

    fn add_attribute_definitions(
        &mut self,
        definitions: Vec<(AttrObject, String, AttrKind)>,
        defaults: Vec<(usize, String, Literal)>,
    ) {
        for (object, name, kind) in definitions {
            self.db.attribute_definitions.entry(object).or_default().insert(
                name.clone(),
                AttributeDefinition {
                    name,
                    object,
                    kind,
                    default: None,
                },
            );
        }

        for (line, name, literal) in defaults {
            let mut found: bool = false;
            for defs in self.db.attribute_definitions.values_mut() {
                let Some(def) = defs.get_mut(&name) else {
                    continue;
                };
                found = true;
                match def.coerce(&literal) {
                    Some(value) => def.default = Some(value),
                    None => tracing::warn!(
                        line,
                        attribute = %name,
                        kind = %def.kind,
                        "BA_DEF_DEF_ value does not match the attribute type, ignored"
                    ),
                }
            }
            if !found {
                tracing::warn!(line, attribute = %name, "BA_DEF_DEF_ for an undefined attribute, ignored");
            }
        }
    }

    // ------------- Messages ------------
    fn add_message(&mut self, block: MessageBlock) -> Result<(), SemanticError> {
        let MessageBlock { line, raw, signals } = block;

        let (id_format, frame_id) = IdFormat::split(raw.id);
        let id_hex: String = format!("0x{:X}", frame_id);

        if let Some(existing) = self
            .db
            .msg_key_by_id
            .get(&(id_format, frame_id))
            .and_then(|&k| self.db.messages.get(k))
        {
            return Err(SemanticError::DuplicateFrameId {
                line,
                name: raw.name,
                id_hex,
                existing: existing.name.clone(),
            });
        }
        if let Some(existing) = self
            .db
            .msg_key_by_name
            .get(&raw.name)
            .and_then(|&k| self.db.messages.get(k))
        {
            return Err(SemanticError::DuplicateMessageName {
                line,
                name: raw.name,
                id_hex: existing.id_hex(),
            });
        }
        let byte_length: u16 = match u16::try_from(raw.byte_length) {
            Ok(len) if len <= 64 => len,
            _ => {
                return Err(SemanticError::InvalidByteLength {
                    line,
                    message: raw.name,
                    byte_length: raw.byte_length,
                });
            }
        };

        let sender: Option<NodeKey> =
            self.resolve_node(&raw.sender, line, || format!("message '{}'", raw.name))?;

        let msg_key: MessageKey = self.db.messages.insert_with_key(|key| Message {
            key,
            id_format,
            frame_id,
            name: raw.name.clone(),
            byte_length,
            senders: sender.into_iter().collect(),
            signals: Vec::new(),
            multiplexor: None,
            comment: None,
            cycle_time: None,
            attributes: BTreeMap::new(),
        });
        self.db.messages_order.push(msg_key);
        self.db.msg_key_by_id.insert((id_format, frame_id), msg_key);
        self.db.msg_key_by_name.insert(raw.name.clone(), msg_key);

        let mut first_multiplexed: Option<(usize, String)> = None;
        for (sig_line, sig) in signals {
            if matches!(sig.mux, RawMux::Multiplexed(_)) && first_multiplexed.is_none() {
                first_multiplexed = Some((sig_line, sig.name.clone()));
            }
            self.add_signal(msg_key, &raw.name, byte_length, sig_line, sig)?;
        }

        let has_multiplexor: bool = self
            .db
            .messages
            .get(msg_key)
            .is_some_and(|m| m.multiplexor.is_some());
        if let Some((line, signal)) = first_multiplexed
            && !has_multiplexor
        {
            return Err(SemanticError::MissingMultiplexor {
                line,
                message: raw.name,
                signal,
            });
        }
        Ok(())
    }

    // -------------- Signals ------------
    fn add_signal(
        &mut self,
        msg_key: MessageKey,
        msg_name: &str,
        byte_length: u16,
        line: usize,
        raw: RawSignal,
    ) -> Result<(), SemanticError> {
        if self
            .db
            .sig_key_by_name
            .contains_key(&(msg_key, raw.name.clone()))
        {
            return Err(SemanticError::DuplicateSignal {
                line,
                message: msg_name.to_string(),
                signal: raw.name,
            });
        }

        check_signal_fits(byte_length, raw.start_bit, raw.bit_length, raw.byte_order).map_err(
            |source| SemanticError::SignalOutOfBounds {
                line,
                message: msg_name.to_string(),
                signal: raw.name.clone(),
                source,
            },
        )?;

        let multiplexing: Multiplexing = match raw.mux {
            RawMux::None => Multiplexing::None,
            RawMux::Multiplexor => {
                let current: Option<SignalKey> =
                    self.db.messages.get(msg_key).and_then(|m| m.multiplexor);
                if let Some(first) = current.and_then(|k| self.db.signals.get(k)) {
                    return Err(SemanticError::MultipleMultiplexors {
                        message: msg_name.to_string(),
                        first: first.name.clone(),
                        second: raw.name,
                    });
                }
                Multiplexing::Multiplexor
            }
            RawMux::Multiplexed(value) => Multiplexing::Multiplexed(vec![MuxSelector::Value(value)]),
            RawMux::MultiplexedMultiplexor(_) => {
                return Err(SemanticError::NestedMultiplexing {
                    line,
                    message: msg_name.to_string(),
                    signal: raw.name,
                });
            }
        };

        let mut receivers: Vec<NodeKey> = Vec::with_capacity(raw.receivers.len());
        for name in &raw.receivers {
            if let Some(key) = self.resolve_receiver(name, line, &raw.name)
                && !receivers.contains(&key)
            {
                receivers.push(key);
            }
        }

        let is_multiplexor: bool = multiplexing == Multiplexing::Multiplexor;
        let sig_key: SignalKey = self.db.signals.insert_with_key(|key| Signal {
            key,
            message: msg_key,
            name: raw.name.clone(),
            start_bit: raw.start_bit,
            bit_length: raw.bit_length,
            byte_order: raw.byte_order,
            value_type: if raw.signed {
                ValueType::Signed
            } else {
                ValueType::Unsigned
            },
            factor: raw.factor,
            offset: raw.offset,
            min: raw.min,
            max: raw.max,
            unit: (!raw.unit.is_empty()).then(|| raw.unit.clone()),
            receivers,
            comment: None,
            multiplexing,
            value_descriptions: BTreeMap::new(),
            attributes: BTreeMap::new(),
            layout: BitLayout::compile(raw.start_bit, raw.bit_length, raw.byte_order),
        });

        if let Some(m) = self.db.messages.get_mut(msg_key) {
            m.signals.push(sig_key);
            if is_multiplexor {
                m.multiplexor = Some(sig_key);
            }
        }
        self.db.sig_key_by_name.insert((msg_key, raw.name), sig_key);
        Ok(())
    }

    // -------------- Decorations ------------
    fn message_key(&self, dbc_id: u32, line: usize, statement: &str) -> Option<MessageKey> {
        let key = self.db.msg_key_by_id.get(&IdFormat::split(dbc_id)).copied();
        if key.is_none() {
            tracing::warn!(line, statement, id = dbc_id, "unknown message, statement ignored");
        }
        key
    }

    fn signal_key(
        &self,
        dbc_id: u32,
        signal: &str,
        line: usize,
        statement: &str,
    ) -> Option<SignalKey> {
        let mk: MessageKey = self.message_key(dbc_id, line, statement)?;
        let key = self
            .db
            .sig_key_by_name
            .get(&(mk, signal.to_string()))
            .copied();
        if key.is_none() {
            tracing::warn!(line, statement, id = dbc_id, signal, "unknown signal, statement ignored");
        }
        key
    }

    fn apply(&mut self, decl: Declaration) -> Result<(), SemanticError> {
        let line: usize = decl.line;
        match decl.kind {
            DeclarationKind::MessageTransmitters { message_id, nodes } => {
                let Some(mk) = self.message_key(message_id, line, "BO_TX_BU_") else {
                    return Ok(());
                };
                for name in nodes {
                    let key = self.resolve_node(&name, line, || {
                        format!("BO_TX_BU_ {}", message_id)
                    })?;
                    if let Some(key) = key
                        && let Some(m) = self.db.messages.get_mut(mk)
                        && !m.senders.contains(&key)
                    {
                        m.senders.push(key);
                    }
                }
            }
            DeclarationKind::SignalValueType {
                message_id,
                signal,
                code,
            } => {
                let Some(sk) = self.signal_key(message_id, &signal, line, "SIG_VALTYPE_") else {
                    return Ok(());
                };
                if let Some(s) = self.db.signals.get_mut(sk) {
                    s.value_type = match code {
                        1 => ValueType::Float,
                        2 => ValueType::Double,
                        _ if s.value_type == ValueType::Signed => ValueType::Signed,
                        _ => ValueType::Unsigned,
                    };
                }
            }
            DeclarationKind::ExtendedMultiplexing {
                message_id,
                signal,
                switch,
                selectors,
            } => self.apply_extended_mux(line, message_id, signal, switch, selectors)?,
            DeclarationKind::ValueDescriptions {
                message_id,
                signal,
                entries,
            } => {
                let Some(sk) = self.signal_key(message_id, &signal, line, "VAL_") else {
                    return Ok(());
                };
                if let Some(s) = self.db.signals.get_mut(sk) {
                    if !s.value_descriptions.is_empty() {
                        tracing::debug!(line, signal = %s.name, "value descriptions replaced");
                    }
                    s.value_descriptions = entries.into_iter().collect();
                }
            }
            DeclarationKind::Comment { target, text } => self.apply_comment(line, target, text)?,
            DeclarationKind::AttributeAssignment {
                name,
                target,
                value,
            } => self.apply_attribute(line, name, target, value)?,
            // grouped in pass 1
            _ => {}
        }
        Ok(())
    }

    fn apply_extended_mux(
        &mut self,
        line: usize,
        message_id: u32,
        signal: String,
        switch: String,
        selectors: Vec<MuxSelector>,
    ) -> Result<(), SemanticError> {
        let Some(sk) = self.signal_key(message_id, &signal, line, "SG_MUL_VAL_") else {
            return Ok(());
        };
        let Some(msg) = self
            .db
            .signals
            .get(sk)
            .and_then(|s| self.db.messages.get(s.message))
        else {
            return Ok(());
        };

        let actual: Option<&str> = msg
            .multiplexor
            .and_then(|k| self.db.signals.get(k))
            .map(|s| s.name.as_str());
        if actual != Some(switch.as_str()) {
            return Err(SemanticError::UnknownMultiplexor {
                line,
                message: msg.name.clone(),
                signal,
                switch,
                actual: actual.map_or_else(|| "not defined".to_string(), |a| format!("'{a}'")),
            });
        }

        if let Some(s) = self.db.signals.get_mut(sk) {
            match &mut s.multiplexing {
                Multiplexing::Multiplexed(current) => *current = selectors,
                _ => tracing::warn!(
                    line,
                    signal = %s.name,
                    "SG_MUL_VAL_ for a signal that is not multiplexed, ignored"
                ),
            }
        }
        Ok(())
    }

    fn apply_comment(&mut self, line: usize, target: Target, text: String) -> Result<(), SemanticError> {
        let slot: Option<&mut Option<String>> = match target {
            Target::Network => Some(&mut self.db.comment),
            Target::Node(name) => {
                match self.resolve_node(&name, line, || "CM_ BU_".to_string())? {
                    Some(nk) => self.db.nodes.get_mut(nk).map(|n| &mut n.comment),
                    None => None,
                }
            }
            Target::Message(id) => match self.message_key(id, line, "CM_ BO_") {
                Some(mk) => self.db.messages.get_mut(mk).map(|m| &mut m.comment),
                None => None,
            },
            Target::Signal { message_id, signal } => {
                match self.signal_key(message_id, &signal, line, "CM_ SG_") {
                    Some(sk) => self.db.signals.get_mut(sk).map(|s| &mut s.comment),
                    None => None,
                }
            }
            Target::EnvironmentVariable(_) => None,
        };
        if let Some(slot) = slot
            && slot.replace(text).is_some()
        {
            tracing::debug!(line, "comment replaced by a later CM_");
        }
        Ok(())
    }

    fn apply_attribute(
        &mut self,
        line: usize,
        name: String,
        target: Target,
        literal: Literal,
    ) -> Result<(), SemanticError> {
        let object: AttrObject = match &target {
            Target::Network => AttrObject::Database,
            Target::Node(_) => AttrObject::Node,
            Target::Message(_) => AttrObject::Message,
            Target::Signal { .. } => AttrObject::Signal,
            Target::EnvironmentVariable(_) => return Ok(()),
        };

        let value: AttributeValue = match self
            .db
            .attribute_definitions
            .get(&object)
            .and_then(|defs| defs.get(&name))
        {
            Some(def) => match def.coerce(&literal) {
                Some(v) => v,
                None => {
                    tracing::warn!(line, attribute = %name, kind = %def.kind, "BA_ value does not match the attribute type, ignored");
                    return Ok(());
                }
            },
            None => {
                tracing::warn!(line, attribute = %name, "BA_ without a matching BA_DEF_");
                untyped(&literal)
            }
        };

        let attributes: Option<&mut BTreeMap<String, AttributeValue>> = match target {
            Target::Network => {
                if name == "DBName"
                    && let AttributeValue::Str(db_name) = &value
                {
                    self.db.name = Some(db_name.clone());
                }
                Some(&mut self.db.attributes)
            }
            Target::Node(node) => {
                match self.resolve_node(&node, line, || format!("BA_ \"{}\"", name))? {
                    Some(nk) => self.db.nodes.get_mut(nk).map(|n| &mut n.attributes),
                    None => None,
                }
            }
            Target::Message(id) => match self.message_key(id, line, "BA_ BO_") {
                Some(mk) => self.db.messages.get_mut(mk).map(|m| {
                    if name == "GenMsgCycleTime" {
                        m.cycle_time = value
                            .as_f64()
                            .filter(|ms| *ms >= 0.0 && *ms <= u32::MAX as f64)
                            .map(|ms| ms as u32);
                    }
                    &mut m.attributes
                }),
                None => None,
            },
            Target::Signal { message_id, signal } => {
                match self.signal_key(message_id, &signal, line, "BA_ SG_") {
                    Some(sk) => self.db.signals.get_mut(sk).map(|s| &mut s.attributes),
                    None => None,
                }
            }
            Target::EnvironmentVariable(_) => None,
        };

        if let Some(attributes) = attributes
            && attributes.insert(name.clone(), value).is_some()
        {
            tracing::debug!(line, attribute = %name, "attribute value replaced by a later BA_");
        }
        Ok(())
    }

    // -------------- Validation ------------
    fn validate(&self) -> Result<(), SemanticError> {
        for msg in self.db.messages() {
            let signals: Vec<&Signal> = msg
                .signals
                .iter()
                .filter_map(|&k| self.db.signals.get(k))
                .collect();

            for s in &signals {
                let (expected, label) = match s.value_type {
                    ValueType::Float => (32, "float"),
                    ValueType::Double => (64, "double"),
                    _ => continue,
                };
                if s.bit_length != expected {
                    return Err(SemanticError::InvalidFloatLength {
                        message: msg.name.clone(),
                        signal: s.name.clone(),
                        value_type: label,
                        bit_length: s.bit_length,
                    });
                }
            }

            let masks: Vec<[u64; 8]> = signals
                .iter()
                .map(|s| occupied_bits(s.start_bit, s.bit_length, s.byte_order))
                .collect();
            for i in 0..signals.len() {
                for j in i + 1..signals.len() {
                    if coexist(signals[i], signals[j]) && masks_intersect(&masks[i], &masks[j]) {
                        return Err(SemanticError::OverlappingSignals {
                            message: msg.name.clone(),
                            first: signals[i].name.clone(),
                            second: signals[j].name.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// Two signals can be present in the same frame unless both are multiplexed
// on disjoint switch values.
fn coexist(a: &Signal, b: &Signal) -> bool {
    match (&a.multiplexing, &b.multiplexing) {
        (Multiplexing::Multiplexed(sa), Multiplexing::Multiplexed(sb)) => {
            sa.iter().any(|x| sb.iter().any(|y| x.overlaps(y)))
        }
        _ => true,
    }
}

// Value for an attribute nobody declared: integers stay integers.
fn untyped(literal: &Literal) -> AttributeValue {
    match literal {
        Literal::Str(s) => AttributeValue::Str(s.clone()),
        Literal::Number(n) => match n.parse::<i64>() {
            Ok(i) => AttributeValue::Int(i),
            Err(_) => n
                .parse::<f64>()
                .map(AttributeValue::Float)
                .unwrap_or_else(|_| AttributeValue::Str(n.clone())),
        },
    }
}
