use crate::node_id::NodeId;
use crate::records::Coordinate;
use ahash::AHashMap;

/// Current canonical location of every boundary node.
#[derive(Debug, Clone, Default)]
pub struct CoordinateStore {
    points: AHashMap<NodeId, Coordinate>,
}

impl CoordinateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, node: &NodeId) -> Option<Coordinate> {
        self.points.get(node).copied()
    }

    pub fn set(&mut self, node: NodeId, coordinate: Coordinate) {
        self.points.insert(node, coordinate);
    }

    /// Records a location only for nodes not seen before. Returns whether it
    /// was inserted.
    pub fn insert_if_absent(&mut self, node: NodeId, coordinate: Coordinate) -> bool {
        if self.points.contains_key(&node) {
            return false;
        }
        self.points.insert(node, coordinate);
        true
    }

    pub fn remove(&mut self, node: &NodeId) {
        self.points.remove(node);
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.points.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
