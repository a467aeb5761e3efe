// Copyright: Kyler Chin <kyler@catenarymaps.org>
// Catenary Transit Initiatives
// Removal of the attribution is not allowed, as covered under the AGPL license

#![deny(
    clippy::mutable_key_type,
    clippy::map_entry,
    clippy::boxed_local,
    clippy::let_unit_value,
    clippy::redundant_allocation,
    clippy::bool_comparison,
    clippy::bind_instead_of_map,
    clippy::vec_box,
    clippy::while_let_loop,
    clippy::useless_asref,
    clippy::repeat_once,
    clippy::deref_addrof,
    clippy::suspicious_map,
    clippy::arc_with_non_send_sync,
    clippy::single_char_pattern,
    clippy::for_kv_map,
    clippy::let_and_return,
    clippy::iter_nth,
    clippy::iter_cloned_collect,
    clippy::bytes_nth,
    clippy::match_result_ok,
    clippy::cmp_owned,
    clippy::cmp_null,
    clippy::op_ref
)]

//! Reconnects a pedestrian network that was digitized tile by tile.
//!
//! Boundary nodes carry a reference to their partner in the neighbouring
//! tile. Those references are repaired where they are missing or one-sided,
//! then every link ending at a surviving pair is snapped so both sides of
//! the seam share one exact coordinate.

pub mod config;
pub mod consistency;
pub mod coordinate_store;
pub mod errors;
pub mod layers;
pub mod link_rewriter;
pub mod node_id;
pub mod node_index;
pub mod pair_graph;
pub mod pair_resolver;
pub mod records;
pub mod seam_pipeline;

#[cfg(test)]
mod test_seam_pipeline;

pub use node_id::{LinkId, NodeId};
pub use records::{Coordinate, LinkRecord, NodeRecord};
pub use seam_pipeline::{SeamReport, stitch_seams};
