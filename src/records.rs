use crate::node_id::{LinkId, NodeId};
use geo_types::{Coord, LineString};

/// Node locations are compared for exact equality; two nodes are connected
/// only when their coordinates are bit-for-bit identical.
pub type Coordinate = Coord<f64>;

#[derive(Debug, Clone, PartialEq)]
pub struct NodeRecord {
    pub id: NodeId,
    /// Claimed partner in the neighbouring tile. `(0, 0)` for interior nodes.
    pub adjacent: NodeId,
    pub coordinate: Coordinate,
}

impl NodeRecord {
    pub fn new(id: NodeId, adjacent: NodeId, coordinate: Coordinate) -> Self {
        Self {
            id,
            adjacent,
            coordinate,
        }
    }

    pub fn is_boundary(&self) -> bool {
        self.adjacent.is_declared()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LinkRecord {
    pub id: LinkId,
    pub tile_id: i64,
    pub start_node_sequence: i64,
    pub end_node_sequence: i64,
    pub polyline: LineString<f64>,
}

impl LinkRecord {
    pub fn start_node(&self) -> NodeId {
        NodeId::new(self.tile_id, self.start_node_sequence)
    }

    pub fn end_node(&self) -> NodeId {
        NodeId::new(self.tile_id, self.end_node_sequence)
    }
}
