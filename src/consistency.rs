use crate::coordinate_store::CoordinateStore;
use crate::node_id::NodeId;
use crate::pair_graph::PairGraph;
use crate::records::Coordinate;
use serde::Serialize;
use tracing::{info, warn};

/// A surviving pair whose two locations still differ after rewriting.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PairMismatch {
    pub node_a: NodeId,
    pub node_b: NodeId,
    pub coordinate_a: Option<[f64; 2]>,
    pub coordinate_b: Option<[f64; 2]>,
}

fn as_pair(coordinate: Option<Coordinate>) -> Option<[f64; 2]> {
    coordinate.map(|c| [c.x, c.y])
}

/// Lists every pair entry whose two stored locations are not identical.
/// Diagnostic only.
///
/// A symmetric pair is two entries, so a gap between its nodes is reported
/// once from each side.
pub fn find_mismatches(pairs: &PairGraph, coordinates: &CoordinateStore) -> Vec<PairMismatch> {
    info!("checking for mismatched node locations");

    let mut mismatches = Vec::new();

    for (&a, &b) in pairs.iter() {
        let coordinate_a = coordinates.get(&a);
        let coordinate_b = coordinates.get(&b);

        if coordinate_a.is_some() && coordinate_a == coordinate_b {
            continue;
        }

        warn!(
            node_a = %a,
            node_b = %b,
            a = ?coordinate_a,
            b = ?coordinate_b,
            "mismatched pair"
        );

        mismatches.push(PairMismatch {
            node_a: a,
            node_b: b,
            coordinate_a: as_pair(coordinate_a),
            coordinate_b: as_pair(coordinate_b),
        });
    }

    mismatches.sort_by_key(|m| (m.node_a, m.node_b));

    info!("{} mismatched", mismatches.len());
    mismatches
}
