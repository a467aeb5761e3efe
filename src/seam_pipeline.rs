//! Runs the four phases in order: build, repair, rewrite, check.
//!
//! Every phase finishes before the next starts. Repair has to see the whole
//! graph and rewriting has to see the repaired one.

use crate::config::StitchConfig;
use crate::consistency::{PairMismatch, find_mismatches};
use crate::coordinate_store::CoordinateStore;
use crate::errors::StitchError;
use crate::link_rewriter::{LinkEditor, RewriteReport, rewrite_links};
use crate::node_index::{NodeIndex, SpatialQuery};
use crate::pair_graph::{PairGraph, build_boundary_nodes};
use crate::pair_resolver::{ResolutionReport, resolve_orphans};
use crate::records::{LinkRecord, NodeRecord};
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SeamReport {
    pub generated_at: String,
    pub tolerance: f64,
    pub edge_nodes: usize,
    pub tiles: usize,
    pub resolution: ResolutionReport,
    pub rewrite: RewriteReport,
    pub mismatches: Vec<PairMismatch>,
}

impl fmt::Display for SeamReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} edge nodes found across {} tiles", self.edge_nodes, self.tiles)?;
        writeln!(f, "{} broken pairs", self.resolution.orphans)?;
        writeln!(f, "{} pairs fixed", self.resolution.fixed)?;
        writeln!(
            f,
            "{} pairs deleted ({} anomalous)",
            self.resolution.deleted,
            self.resolution.anomalies.len()
        )?;
        writeln!(
            f,
            "committed changes to {} links ({} endpoints, {} skipped writes)",
            self.rewrite.changed_links,
            self.rewrite.rewritten_endpoints,
            self.rewrite.skipped_writes
        )?;
        for mismatch in &self.mismatches {
            writeln!(
                f,
                "  {} {:?} != {} {:?}",
                mismatch.node_a, mismatch.coordinate_a, mismatch.node_b, mismatch.coordinate_b
            )?;
        }
        write!(f, "{} mismatched", self.mismatches.len())
    }
}

/// The repaired pair graph and node locations, between phases.
pub struct SeamState {
    pub pairs: PairGraph,
    pub coordinates: CoordinateStore,
    pub tiles: usize,
    pub edge_nodes: usize,
    pub resolution: ResolutionReport,
}

/// Builds the pair graph from `nodes` and repairs it against `index`.
pub fn repair_pairs<S: SpatialQuery>(
    nodes: &[NodeRecord],
    index: &S,
    tolerance: f64,
) -> SeamState {
    let mut boundary = build_boundary_nodes(nodes);
    let edge_nodes = boundary.pairs.len();

    let resolution = resolve_orphans(
        &mut boundary.pairs,
        &mut boundary.coordinates,
        index,
        tolerance,
    );

    SeamState {
        pairs: boundary.pairs,
        coordinates: boundary.coordinates,
        tiles: boundary.tiles.len(),
        edge_nodes,
        resolution,
    }
}

impl SeamState {
    /// Snaps link endpoints onto their partners and reports what still differs.
    pub fn stitch_links<E: LinkEditor>(
        &mut self,
        links: &mut [LinkRecord],
        editor: &mut E,
    ) -> Result<(RewriteReport, Vec<PairMismatch>), StitchError> {
        let rewrite = rewrite_links(links, &self.pairs, &mut self.coordinates, editor)?;
        let mismatches = find_mismatches(&self.pairs, &self.coordinates);
        Ok((rewrite, mismatches))
    }
}

/// Whole run over in-memory layers. Only edit-session failures are errors.
pub fn stitch_seams<E: LinkEditor>(
    nodes: &[NodeRecord],
    links: &mut [LinkRecord],
    editor: &mut E,
    config: &StitchConfig,
) -> Result<SeamReport, StitchError> {
    let index = NodeIndex::from_nodes(nodes);
    let mut state = repair_pairs(nodes, &index, config.tolerance);
    let (rewrite, mismatches) = state.stitch_links(links, editor)?;

    Ok(SeamReport {
        generated_at: chrono::Utc::now().to_rfc3339(),
        tolerance: config.tolerance,
        edge_nodes: state.edge_nodes,
        tiles: state.tiles,
        resolution: state.resolution,
        rewrite,
        mismatches,
    })
}
