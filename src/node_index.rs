use crate::node_id::NodeId;
use crate::records::{Coordinate, NodeRecord};
use geo::{Rect, coord};
use rstar::{AABB, RTree, primitives::GeomWithData};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpatialMatch {
    pub id: NodeId,
    pub coordinate: Coordinate,
}

/// Rectangle lookup over the node layer.
pub trait SpatialQuery {
    /// All nodes whose coordinate lies inside `window`, bounds inclusive.
    fn query_rect(&self, window: &Rect<f64>) -> Vec<SpatialMatch>;
}

/// Square window of half-width `tolerance` centred on `center`.
pub fn tolerance_window(center: Coordinate, tolerance: f64) -> Rect<f64> {
    Rect::new(
        coord! { x: center.x - tolerance, y: center.y - tolerance },
        coord! { x: center.x + tolerance, y: center.y + tolerance },
    )
}

/// R-tree over every node of the layer, interior nodes included, so a
/// boundary node can be paired with a partner that never declared adjacency.
pub struct NodeIndex {
    tree: RTree<GeomWithData<[f64; 2], NodeId>>,
}

impl NodeIndex {
    pub fn from_nodes<'a, I>(nodes: I) -> Self
    where
        I: IntoIterator<Item = &'a NodeRecord>,
    {
        let points = nodes
            .into_iter()
            .map(|node| GeomWithData::new([node.coordinate.x, node.coordinate.y], node.id))
            .collect::<Vec<_>>();

        Self {
            tree: RTree::bulk_load(points),
        }
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl SpatialQuery for NodeIndex {
    fn query_rect(&self, window: &Rect<f64>) -> Vec<SpatialMatch> {
        let envelope = AABB::from_corners(
            [window.min().x, window.min().y],
            [window.max().x, window.max().y],
        );

        let mut matches = self
            .tree
            .locate_in_envelope(&envelope)
            .map(|point| SpatialMatch {
                id: point.data,
                coordinate: coord! { x: point.geom()[0], y: point.geom()[1] },
            })
            .collect::<Vec<_>>();

        // rstar hands back tree order; keep results stable between runs
        matches.sort_by_key(|m| m.id);
        matches
    }
}
