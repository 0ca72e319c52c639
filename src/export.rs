//! # export
//!
//! Read-only views of a [`Database`] for the outer tools: a serializable
//! summary of nodes, messages and signals, and the seam a code generator
//! plugs into. Writing files is left to the caller.

use serde::Serialize;
use std::fmt;

use crate::types::{
    database::Database,
    errors::LookupError,
    message::Message,
    signal::{Multiplexing, MuxSelector, Signal},
};

/// Node entry of a [`DatabaseSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NodeSummary {
    pub name: String,
    pub comment: Option<String>,
}

/// Signal entry of a [`MessageSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SignalSummary {
    pub name: String,
    pub start_bit: u16,
    pub length: u16,
    pub scaling: f64,
    pub offset: f64,
    pub unit: Option<String>,
    /// Name of the multiplexor selecting this signal.
    pub multiplexer_signal: Option<String>,
    /// Switch values selecting this signal, as sorted inclusive `[min, max]` ranges.
    pub multiplexer_ids: Option<Vec<[u64; 2]>>,
    pub receivers: Vec<String>,
    pub comment: Option<String>,
}

/// Message entry of a [`DatabaseSummary`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MessageSummary {
    /// Bare frame id (extended flag stripped).
    pub id: u32,
    pub name: String,
    pub length: u16,
    pub senders: Vec<String>,
    pub signals: Vec<SignalSummary>,
    pub comment: Option<String>,
}

/// Flat, serializable view of a database, in declaration order.
///
/// ```
/// let db = dbc_codec::dbc::from_str(
///     "BU_: ECU1\nBO_ 100 Status: 2 ECU1\n SG_ Speed : 0|16@1+ (0.1,0) [0|6553.5] \"km/h\" ECU2\n",
/// )
/// .unwrap();
/// let summary = dbc_codec::export::DatabaseSummary::from_database(&db);
/// assert_eq!(summary.messages[0].signals[0].receivers, ["ECU2"]);
/// ```
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DatabaseSummary {
    pub messages: Vec<MessageSummary>,
    pub nodes: Vec<NodeSummary>,
}

impl DatabaseSummary {
    pub fn from_database(db: &Database) -> Self {
        Self::collect(db, db.messages())
    }

    /// Summary restricted to the messages `node` sends or receives.
    pub fn for_node(db: &Database, node: &str) -> Result<Self, LookupError> {
        Ok(Self::collect(db, db.messages_for_node(node)?))
    }

    fn collect<'a>(db: &'a Database, messages: impl IntoIterator<Item = &'a Message>) -> Self {
        DatabaseSummary {
            messages: messages
                .into_iter()
                .map(|m| summarize_message(db, m))
                .collect(),
            nodes: db
                .nodes()
                .map(|n| NodeSummary {
                    name: n.name.clone(),
                    comment: n.comment.clone(),
                })
                .collect(),
        }
    }
}

fn node_names(db: &Database, keys: &[crate::NodeKey]) -> Vec<String> {
    keys.iter()
        .filter_map(|&k| db.node(k).ok())
        .map(|n| n.name.clone())
        .collect()
}

fn summarize_message(db: &Database, msg: &Message) -> MessageSummary {
    let multiplexor: Option<&Signal> = msg.multiplexor.and_then(|k| db.signal(k).ok());
    MessageSummary {
        id: msg.frame_id,
        name: msg.name.clone(),
        length: msg.byte_length,
        senders: node_names(db, &msg.senders),
        signals: msg
            .signals
            .iter()
            .filter_map(|&k| db.signal(k).ok())
            .map(|s| summarize_signal(db, s, multiplexor))
            .collect(),
        comment: msg.comment.clone(),
    }
}

fn summarize_signal(db: &Database, sig: &Signal, multiplexor: Option<&Signal>) -> SignalSummary {
    let (multiplexer_signal, multiplexer_ids) = match (&sig.multiplexing, multiplexor) {
        (Multiplexing::Multiplexed(selectors), Some(mux)) => {
            (Some(mux.name.clone()), Some(switch_ranges(selectors, mux.bit_length)))
        }
        _ => (None, None),
    };

    SignalSummary {
        name: sig.name.clone(),
        start_bit: sig.start_bit,
        length: sig.bit_length,
        scaling: sig.factor,
        offset: sig.offset,
        unit: sig.unit.clone(),
        multiplexer_signal,
        multiplexer_ids,
        receivers: node_names(db, &sig.receivers),
        comment: sig.comment.clone(),
    }
}

// Merges selectors into disjoint ranges, clipped to what the switch can carry.
fn switch_ranges(selectors: &[MuxSelector], switch_bits: u16) -> Vec<[u64; 2]> {
    let top: u64 = if switch_bits >= 64 {
        u64::MAX
    } else {
        (1u64 << switch_bits) - 1
    };
    let mut ranges: Vec<[u64; 2]> = selectors
        .iter()
        .map(MuxSelector::bounds)
        .filter(|&(min, _)| min <= top)
        .map(|(min, max)| [min, max.min(top)])
        .collect();
    ranges.sort_unstable();

    let mut merged: Vec<[u64; 2]> = Vec::with_capacity(ranges.len());
    for [min, max] in ranges {
        match merged.last_mut() {
            Some(last) if min <= last[1].saturating_add(1) => last[1] = last[1].max(max),
            _ => merged.push([min, max]),
        }
    }
    merged
}

impl fmt::Display for DatabaseSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Nodes:")?;
        for node in &self.nodes {
            writeln!(f, "  - {}: {}", node.name, node.comment.as_deref().unwrap_or(""))?;
        }
        writeln!(f)?;
        writeln!(f, "Messages and Signals:")?;
        for msg in &self.messages {
            writeln!(f, "  Message ID: {} ({})", msg.id, msg.name)?;
            writeln!(f, "    Comment: {}", msg.comment.as_deref().unwrap_or(""))?;
            for s in &msg.signals {
                writeln!(
                    f,
                    "    Signal: {} Start: {} Length: {} Scaling: {} Offset: {} Unit: {}",
                    s.name,
                    s.start_bit,
                    s.length,
                    s.scaling,
                    s.offset,
                    s.unit.as_deref().unwrap_or("")
                )?;
            }
        }
        Ok(())
    }
}

/// Knobs handed to a [`SourceGenerator`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct GeneratorOptions {
    /// Base name of the generated files (defaults to the database name).
    pub database_name: Option<String>,
    /// Use single precision floats for physical values.
    pub use_float: bool,
    /// Emit no floating point code at all.
    pub no_floating_point: bool,
    /// Only generate code for the messages this node sends or receives.
    pub node: Option<String>,
}

/// One generated source file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub contents: String,
}

/// Seam for code generators (C sources, bindings, ...) living outside this crate.
pub trait SourceGenerator {
    type Error: std::error::Error;

    fn generate(
        &self,
        db: &Database,
        opts: &GeneratorOptions,
    ) -> Result<Vec<GeneratedFile>, Self::Error>;
}
