//! Repairs boundary nodes whose partner reference is missing or one-sided.
//!
//! Each orphan is looked up by location. A true seam crossing has exactly two
//! nodes at the same spot, one per tile: the orphan and its partner. Anything
//! else cannot be paired safely and the orphan is dropped from the graph.

use crate::coordinate_store::CoordinateStore;
use crate::node_id::NodeId;
use crate::node_index::{SpatialMatch, SpatialQuery, tolerance_window};
use crate::pair_graph::PairGraph;
use crate::records::Coordinate;
use serde::Serialize;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub enum OrphanResolution {
    /// The window held the orphan and one other node.
    Fixed(SpatialMatch),
    /// Zero, one or three-plus nodes in the window.
    Ambiguous { match_count: usize },
    /// Two nodes in the window and neither is the orphan. Points at a broken
    /// index or a bad tolerance rather than bad data.
    Anomalous { matches: [NodeId; 2] },
    /// The orphan has no stored location to search around. Cannot happen for
    /// graphs from `build_boundary_nodes`.
    Unlocated,
}

/// Decides the fate of one orphan without touching any state.
pub fn classify_orphan<S: SpatialQuery>(
    orphan: NodeId,
    location: Coordinate,
    index: &S,
    tolerance: f64,
) -> OrphanResolution {
    let matches = index.query_rect(&tolerance_window(location, tolerance));

    match matches.as_slice() {
        [first, second] if first.id == orphan => OrphanResolution::Fixed(*second),
        [first, second] if second.id == orphan => OrphanResolution::Fixed(*first),
        [first, second] => OrphanResolution::Anomalous {
            matches: [first.id, second.id],
        },
        other => OrphanResolution::Ambiguous {
            match_count: other.len(),
        },
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AnomalousOrphan {
    pub orphan: NodeId,
    pub matches: [NodeId; 2],
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ResolutionReport {
    pub orphans: usize,
    pub fixed: usize,
    pub deleted: usize,
    pub anomalies: Vec<AnomalousOrphan>,
}

/// Finds every orphan first, then repairs or drops each one.
pub fn resolve_orphans<S: SpatialQuery>(
    pairs: &mut PairGraph,
    coordinates: &mut CoordinateStore,
    index: &S,
    tolerance: f64,
) -> ResolutionReport {
    info!("finding broken pairs");
    let orphans = pairs.find_orphans();

    let mut report = ResolutionReport {
        orphans: orphans.len(),
        ..Default::default()
    };

    info!(orphans = orphans.len(), "cleaning up broken pairs");

    for orphan in orphans {
        let resolution = match coordinates.get(&orphan) {
            Some(location) => classify_orphan(orphan, location, index, tolerance),
            None => OrphanResolution::Unlocated,
        };

        match resolution {
            OrphanResolution::Fixed(partner) => {
                pairs.set_partner(orphan, partner.id);
                coordinates.insert_if_absent(partner.id, partner.coordinate);
                report.fixed += 1;
                debug!(tile = orphan.tile_id, node = orphan.node_sequence, partner = %partner.id, "pair fixed");
            }
            OrphanResolution::Anomalous { matches } => {
                pairs.remove(&orphan);
                report.deleted += 1;
                warn!(
                    tile = orphan.tile_id,
                    node = orphan.node_sequence,
                    first = %matches[0],
                    second = %matches[1],
                    "node was not in pair!"
                );
                report.anomalies.push(AnomalousOrphan { orphan, matches });
            }
            OrphanResolution::Ambiguous { match_count } => {
                pairs.remove(&orphan);
                report.deleted += 1;
                debug!(tile = orphan.tile_id, node = orphan.node_sequence, matches = match_count, "pair deleted");
            }
            OrphanResolution::Unlocated => {
                pairs.remove(&orphan);
                report.deleted += 1;
                warn!(tile = orphan.tile_id, node = orphan.node_sequence, "orphan has no coordinate");
            }
        }
    }

    info!("{} pairs fixed", report.fixed);
    info!("{} pairs deleted", report.deleted);

    report
}
