use crate::coordinate_store::CoordinateStore;
use crate::errors::{LayerError, StitchError};
use crate::node_id::{LinkId, NodeId};
use crate::pair_graph::PairGraph;
use crate::records::{Coordinate, LinkRecord};
use geo::LineString;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Transactional geometry updates on the links layer.
///
/// A failed begin or commit means nothing from this run is persisted. A
/// failed write only loses that one link.
pub trait LinkEditor {
    fn begin_edit_session(&mut self) -> Result<(), LayerError>;
    fn write_link_geometry(
        &mut self,
        link: LinkId,
        polyline: &LineString<f64>,
    ) -> Result<(), LayerError>;
    fn commit_edit_session(&mut self) -> Result<(), LayerError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Endpoint {
    Start,
    End,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct RewriteReport {
    /// Endpoints that belong to a surviving pair.
    pub rewritten_endpoints: usize,
    /// Links whose geometry changed and was accepted by the editor.
    pub changed_links: usize,
    /// Links whose write was rejected.
    pub skipped_writes: usize,
    /// Links with no vertices.
    pub empty_links: usize,
}

/// Snaps the terminal vertex of one endpoint onto its partner's location.
///
/// Returns `None` when the endpoint is not part of a live pair. On success
/// the endpoint's own stored location is moved along with the vertex.
fn snap_endpoint(
    link: &mut LinkRecord,
    endpoint: Endpoint,
    pairs: &PairGraph,
    coordinates: &mut CoordinateStore,
) -> Option<Coordinate> {
    let node = endpoint_node(link, endpoint);

    if !pairs.is_live_pair(&node) {
        return None;
    }

    let partner = pairs.partner(&node)?;
    let target = coordinates.get(&partner)?;

    let vertex = match endpoint {
        Endpoint::Start => link.polyline.0.first_mut(),
        Endpoint::End => link.polyline.0.last_mut(),
    }?;

    *vertex = target;
    coordinates.set(node, target);
    Some(target)
}

fn endpoint_node(link: &LinkRecord, endpoint: Endpoint) -> NodeId {
    match endpoint {
        Endpoint::Start => link.start_node(),
        Endpoint::End => link.end_node(),
    }
}

/// Moves every link endpoint that belongs to a surviving pair onto the
/// partner's location, then commits the changed geometries in one session.
pub fn rewrite_links<E: LinkEditor>(
    links: &mut [LinkRecord],
    pairs: &PairGraph,
    coordinates: &mut CoordinateStore,
    editor: &mut E,
) -> Result<RewriteReport, StitchError> {
    editor
        .begin_edit_session()
        .map_err(StitchError::SessionBegin)?;
    info!("start editing links layer");

    let mut report = RewriteReport::default();

    for link in links.iter_mut() {
        if link.polyline.0.is_empty() {
            if pairs.is_live_pair(&link.start_node()) || pairs.is_live_pair(&link.end_node()) {
                warn!(link = %link.id, "link has no vertices, leaving it untouched");
            }
            report.empty_links += 1;
            continue;
        }

        let before = link.polyline.clone();
        let mut moved: Vec<(NodeId, Option<Coordinate>)> = Vec::with_capacity(2);

        for endpoint in [Endpoint::Start, Endpoint::End] {
            let node = endpoint_node(link, endpoint);
            let previous = coordinates.get(&node);
            if let Some(target) = snap_endpoint(link, endpoint, pairs, coordinates) {
                report.rewritten_endpoints += 1;
                moved.push((node, previous));
                debug!(link = %link.id, node = %node, x = target.x, y = target.y, "endpoint snapped");
            }
        }

        if link.polyline == before {
            continue;
        }

        match editor.write_link_geometry(link.id, &link.polyline) {
            Ok(()) => report.changed_links += 1,
            Err(e) => {
                warn!(link = %link.id, error = %e, "skipping geometry update");
                report.skipped_writes += 1;

                // the stored locations must keep describing what is persisted
                link.polyline = before;
                for (node, previous) in moved.into_iter().rev() {
                    match previous {
                        Some(coordinate) => coordinates.set(node, coordinate),
                        None => coordinates.remove(&node),
                    }
                }
            }
        }
    }

    editor
        .commit_edit_session()
        .map_err(StitchError::SessionCommit)?;
    info!("committing changes to {} links", report.changed_links);

    Ok(report)
}
