use serde::{Deserialize, Serialize};

/// Knobs for [`crate::dbc::from_str_with`] and friends.
///
/// Deserializable so tools can keep them next to their own configuration:
///
/// ```
/// let opts: dbc_codec::ParseOptions =
///     serde_json::from_str(r#"{ "strict_node_references": false }"#).unwrap();
/// assert!(!opts.strict_node_references);
/// assert_eq!(opts.placeholder_nodes, ["Vector__XXX"]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Reject senders (`BO_`, `BO_TX_BU_`) and `CM_`/`BA_` node targets missing
    /// from `BU_`. When `false` such nodes are created on first use. Signal
    /// receivers missing from `BU_` are always created.
    pub strict_node_references: bool,
    /// Node names that stand for "no node" and never create a reference.
    pub placeholder_nodes: Vec<String>,
    /// Replace German umlauts and `ß` with ASCII when loading raw bytes.
    pub transliterate: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            strict_node_references: true,
            placeholder_nodes: vec![crate::dbc::PLACEHOLDER_NODE.to_string()],
            transliterate: true,
        }
    }
}

impl ParseOptions {
    pub(crate) fn is_placeholder(&self, node: &str) -> bool {
        self.placeholder_nodes.iter().any(|p| p == node)
    }
}
