use crate::types::{attributes::AttributeValue, database::NodeKey};
use std::collections::BTreeMap;

/// Node/ECU declared in the `BU_` list.
///
/// # Example
/// ```
/// let db = dbc_codec::dbc::from_str("BU_: Motor Gateway\n").unwrap();
/// let node = db.node_by_name("Motor").unwrap();
/// assert_eq!(node.name, "Motor");
/// assert!(node.comment.is_none());
/// ```
#[derive(Clone, PartialEq, Debug)]
pub struct Node {
    /// Own key in [`Database::nodes`](crate::Database).
    pub key: NodeKey,
    /// Node/ECU name, unique in the database.
    pub name: String,
    /// Associated comment (DBC `CM_ BU_` section).
    pub comment: Option<String>,

    // --- Attributes ---
    pub attributes: BTreeMap<String, AttributeValue>,
}
