use crate::coordinate_store::CoordinateStore;
use crate::node_id::NodeId;
use crate::records::NodeRecord;
use ahash::{AHashMap, AHashSet};
use itertools::Itertools;
use tracing::info;

/// Claimed cross-tile partner of each boundary node.
///
/// Built once from the node layer, then edited only by the resolver. An entry
/// `a -> b` is healthy when `b -> a` is present as well.
#[derive(Debug, Clone, Default)]
pub struct PairGraph {
    partners: AHashMap<NodeId, NodeId>,
}

impl PairGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn partner(&self, node: &NodeId) -> Option<NodeId> {
        self.partners.get(node).copied()
    }

    pub fn contains(&self, node: &NodeId) -> bool {
        self.partners.contains_key(node)
    }

    /// Sets or replaces the partner of `node`, returning the previous one.
    pub fn set_partner(&mut self, node: NodeId, partner: NodeId) -> Option<NodeId> {
        self.partners.insert(node, partner)
    }

    pub fn remove(&mut self, node: &NodeId) -> Option<NodeId> {
        self.partners.remove(node)
    }

    pub fn is_symmetric(&self, node: &NodeId) -> bool {
        match self.partners.get(node) {
            Some(target) => self.partners.get(target) == Some(node),
            None => false,
        }
    }

    /// Both the node and the partner it points at are still in the graph.
    pub fn is_live_pair(&self, node: &NodeId) -> bool {
        match self.partners.get(node) {
            Some(target) => self.partners.contains_key(target),
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NodeId, &NodeId)> {
        self.partners.iter()
    }

    pub fn len(&self) -> usize {
        self.partners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.partners.is_empty()
    }

    /// Every entry whose target is missing or does not point back.
    ///
    /// Pure scan. Callers must collect the whole set before editing the graph,
    /// otherwise a repair could change how later entries are classified.
    pub fn find_orphans(&self) -> Vec<NodeId> {
        self.partners
            .keys()
            .filter(|source| !self.is_symmetric(source))
            .copied()
            .sorted()
            .collect()
    }
}

/// The boundary nodes of a node layer, ready for repair.
#[derive(Debug, Clone, Default)]
pub struct BoundaryNodes {
    pub pairs: PairGraph,
    pub coordinates: CoordinateStore,
    /// Tiles seen anywhere in the layer, interior nodes included.
    pub tiles: AHashSet<i64>,
}

/// Keeps only nodes that declare a neighbour-tile partner.
///
/// Every key of the resulting pair graph has a stored coordinate. Only the
/// resolver's lookup of orphans relies on that; graphs assembled by hand may
/// still lack one and are handled there.
pub fn build_boundary_nodes<'a, I>(nodes: I) -> BoundaryNodes
where
    I: IntoIterator<Item = &'a NodeRecord>,
{
    let mut boundary = BoundaryNodes::default();

    for node in nodes {
        boundary.tiles.insert(node.id.tile_id);

        if !node.is_boundary() {
            continue;
        }

        boundary.pairs.set_partner(node.id, node.adjacent);
        boundary.coordinates.set(node.id, node.coordinate);
    }

    info!(
        edge_nodes = boundary.pairs.len(),
        tiles = boundary.tiles.len(),
        "{} edge nodes found",
        boundary.pairs.len()
    );

    boundary
}
