use serde::{Deserialize, Serialize};
use std::fmt;

/// A boundary node, keyed by the tile it was digitized in and its sequence
/// number inside that tile's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId {
    pub tile_id: i64,
    pub node_sequence: i64,
}

impl NodeId {
    pub const fn new(tile_id: i64, node_sequence: i64) -> Self {
        Self {
            tile_id,
            node_sequence,
        }
    }

    /// Adjacency attributes of zero mean "no partner in a neighbouring tile".
    pub fn is_declared(&self) -> bool {
        self.tile_id != 0 || self.node_sequence != 0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.tile_id, self.node_sequence)
    }
}

/// Position of a link feature inside its layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LinkId(pub usize);

impl fmt::Display for LinkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "link #{}", self.0)
    }
}
