use crate::config::StitchConfig;
use crate::errors::StitchError;
use crate::layers::{LinkLayer, read_node_layer};
use crate::link_rewriter::LinkEditor;
use crate::node_id::{LinkId, NodeId};
use crate::node_index::NodeIndex;
use crate::records::{LinkRecord, NodeRecord};
use crate::seam_pipeline::{repair_pairs, stitch_seams};
use crate::test_support::{RecordingEditor, TempLayer};
use geo::{LineString, coord, line_string};

fn node(tile: i64, seq: i64, adj_tile: i64, adj_seq: i64, x: f64, y: f64) -> NodeRecord {
    NodeRecord::new(
        NodeId::new(tile, seq),
        NodeId::new(adj_tile, adj_seq),
        coord! { x: x, y: y },
    )
}

fn link(id: usize, tile: i64, start: i64, end: i64, polyline: LineString<f64>) -> LinkRecord {
    LinkRecord {
        id: LinkId(id),
        tile_id: tile,
        start_node_sequence: start,
        end_node_sequence: end,
        polyline,
    }
}

#[test]
fn test_symmetric_seam_is_snapped() {
    let nodes = vec![
        node(1, 5, 2, 9, 10.0, 20.0),
        node(2, 9, 1, 5, 10.00002, 20.00001),
        node(1, 4, 0, 0, 9.0, 19.0),
    ];
    let mut links = vec![link(
        0,
        1,
        4,
        5,
        line_string![(x: 9.0, y: 19.0), (x: 10.0, y: 20.0)],
    )];
    let mut editor = RecordingEditor::default();

    let report = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default()).unwrap();

    assert_eq!(report.edge_nodes, 2);
    assert_eq!(report.tiles, 2);
    assert_eq!(report.resolution.orphans, 0);
    assert_eq!(report.resolution.fixed, 0);
    assert_eq!(report.resolution.deleted, 0);
    assert_eq!(report.rewrite.changed_links, 1);
    assert_eq!(
        links[0].polyline.0.last(),
        Some(&coord! { x: 10.00002, y: 20.00001 })
    );
    // nothing links to 2/9, and 1/5 moved onto it
    assert!(report.mismatches.is_empty());
}

#[test]
fn test_one_sided_reference_is_repaired_and_snapped() {
    // 3/1 points at a node that does not exist, 4/2 points back at 3/1.
    let nodes = vec![
        node(3, 1, 9, 999, 5.0, 5.0),
        node(4, 2, 3, 1, 5.000003, 5.000002),
        node(3, 7, 0, 0, 4.0, 4.0),
        node(4, 8, 0, 0, 6.0, 6.0),
    ];
    let mut links = vec![
        link(0, 3, 7, 1, line_string![(x: 4.0, y: 4.0), (x: 5.0, y: 5.0)]),
        link(1, 4, 2, 8, line_string![(x: 5.000003, y: 5.000002), (x: 6.0, y: 6.0)]),
    ];
    let mut editor = RecordingEditor::default();

    let report = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default()).unwrap();

    assert_eq!(report.resolution.orphans, 2);
    assert_eq!(report.resolution.fixed, 2);
    assert_eq!(report.resolution.deleted, 0);
    assert_eq!(links[0].polyline.0.last(), links[1].polyline.0.first());
    assert!(report.mismatches.is_empty());
}

#[test]
fn test_fixed_orphan_with_unlisted_partner() {
    // 4/2 never declared adjacency, so the pair survives repair but its
    // endpoints are not live and the difference is reported.
    let nodes = vec![node(3, 1, 9, 999, 5.0, 5.0), node(4, 2, 0, 0, 5.000001, 5.0)];
    let index = NodeIndex::from_nodes(&nodes);

    let mut state = repair_pairs(&nodes, &index, StitchConfig::default().tolerance);

    assert_eq!(state.pairs.partner(&NodeId::new(3, 1)), Some(NodeId::new(4, 2)));
    assert_eq!(state.resolution.fixed, 1);
    assert_eq!(
        state.coordinates.get(&NodeId::new(4, 2)),
        Some(coord! { x: 5.000001, y: 5.0 })
    );

    let original = line_string![(x: 4.0, y: 4.0), (x: 5.0, y: 5.0)];
    let mut links = vec![link(0, 3, 7, 1, original.clone())];
    let mut editor = RecordingEditor::default();
    let (rewrite, mismatches) = state.stitch_links(&mut links, &mut editor).unwrap();

    assert_eq!(rewrite.rewritten_endpoints, 0);
    assert_eq!(links[0].polyline, original);
    assert_eq!(mismatches.len(), 1);
    assert_eq!(mismatches[0].node_a, NodeId::new(3, 1));
    assert_eq!(mismatches[0].node_b, NodeId::new(4, 2));
}

#[test]
fn test_isolated_orphan_is_dropped() {
    let nodes = vec![node(3, 1, 9, 999, 5.0, 5.0), node(4, 2, 0, 0, 7.0, 7.0)];
    let original = line_string![(x: 4.0, y: 4.0), (x: 5.0, y: 5.0)];
    let mut links = vec![link(0, 3, 7, 1, original.clone())];
    let mut editor = RecordingEditor::default();

    let report = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default()).unwrap();

    assert_eq!(report.resolution.deleted, 1);
    assert!(report.resolution.anomalies.is_empty());
    assert_eq!(links[0].polyline, original);
    assert!(report.mismatches.is_empty());
}

#[test]
fn test_crowded_location_is_dropped() {
    // three tiles meet at one point
    let nodes = vec![
        node(1, 1, 9, 9, 0.0, 0.0),
        node(2, 1, 0, 0, 0.0, 0.0),
        node(3, 1, 0, 0, 0.000001, 0.0),
    ];
    let index = NodeIndex::from_nodes(&nodes);

    let state = repair_pairs(&nodes, &index, StitchConfig::default().tolerance);

    assert!(state.pairs.is_empty());
    assert_eq!(state.resolution.deleted, 1);
}

#[test]
fn test_unlinked_pair_mismatch_reported_per_direction() {
    let nodes = vec![node(1, 5, 2, 9, 10.0, 20.0), node(2, 9, 1, 5, 10.00002, 20.00001)];
    let mut links: Vec<LinkRecord> = Vec::new();
    let mut editor = RecordingEditor::default();

    let report = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default()).unwrap();

    assert_eq!(report.mismatches.len(), 2);
    assert_eq!(report.mismatches[0].node_a, NodeId::new(1, 5));
    assert_eq!(report.mismatches[0].coordinate_a, Some([10.0, 20.0]));
    assert_eq!(report.mismatches[0].coordinate_b, Some([10.00002, 20.00001]));
    assert_eq!(report.mismatches[1].node_a, NodeId::new(2, 9));
    assert!(report.to_string().ends_with("2 mismatched"));
}

#[test]
fn test_rejected_write_leaves_the_gap_visible() {
    let nodes = vec![node(1, 5, 2, 9, 10.0, 20.0), node(2, 9, 1, 5, 10.00002, 20.00001)];
    let original = line_string![(x: 9.0, y: 19.0), (x: 10.0, y: 20.0)];
    let mut links = vec![link(0, 1, 4, 5, original.clone())];
    let mut editor = RecordingEditor {
        reject: vec![LinkId(0)],
        ..Default::default()
    };

    let report = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default()).unwrap();

    assert_eq!(report.rewrite.skipped_writes, 1);
    assert!(editor.writes.is_empty());
    assert_eq!(links[0].polyline, original);
    assert_eq!(report.mismatches.len(), 2);
    assert_eq!(report.mismatches[0].coordinate_a, Some([10.0, 20.0]));
}

#[test]
fn test_second_rewrite_is_a_no_op() {
    let nodes = vec![
        node(1, 5, 2, 9, 10.0, 20.0),
        node(2, 9, 1, 5, 10.00002, 20.00001),
        node(3, 1, 9, 999, 5.0, 5.0),
        node(4, 2, 3, 1, 5.000003, 5.000002),
    ];
    let index = NodeIndex::from_nodes(&nodes);
    let mut state = repair_pairs(&nodes, &index, StitchConfig::default().tolerance);
    let mut links = vec![
        link(0, 1, 4, 5, line_string![(x: 9.0, y: 19.0), (x: 10.0, y: 20.0)]),
        link(1, 2, 9, 8, line_string![(x: 10.00002, y: 20.00001), (x: 11.0, y: 21.0)]),
        link(2, 3, 1, 7, line_string![(x: 5.0, y: 5.0), (x: 4.0, y: 4.0)]),
        link(3, 4, 6, 2, line_string![(x: 6.0, y: 6.0), (x: 5.000003, y: 5.000002)]),
    ];

    let mut first = RecordingEditor::default();
    let (rewrite, mismatches) = state.stitch_links(&mut links, &mut first).unwrap();
    assert_eq!(rewrite.changed_links, 2);
    assert!(mismatches.is_empty());
    let after_first = links.clone();

    let mut second = RecordingEditor::default();
    let (rewrite, mismatches) = state.stitch_links(&mut links, &mut second).unwrap();

    assert_eq!(rewrite.changed_links, 0);
    assert!(second.writes.is_empty());
    assert!(mismatches.is_empty());
    assert_eq!(links, after_first);
}

#[test]
fn test_commit_failure_fails_the_run() {
    let nodes = vec![node(1, 5, 2, 9, 10.0, 20.0), node(2, 9, 1, 5, 10.00002, 20.00001)];
    let mut links = vec![link(0, 1, 4, 5, line_string![(x: 9.0, y: 19.0), (x: 10.0, y: 20.0)])];
    let mut editor = RecordingEditor {
        fail_commit: true,
        ..Default::default()
    };

    let result = stitch_seams(&nodes, &mut links, &mut editor, &StitchConfig::default());

    assert!(matches!(result, Err(StitchError::SessionCommit(_))));
}

#[test]
fn test_layers_end_to_end() {
    let nodes = TempLayer::write(
        r#"{ "type": "FeatureCollection", "features": [
            { "type": "Feature",
              "properties": { "MESH_ID": 1, "NODE_ID": 5, "ADJMAP_ID": 2, "ADJND_ID": 9 },
              "geometry": { "type": "Point", "coordinates": [10.0, 20.0] } },
            { "type": "Feature",
              "properties": { "MESH_ID": 2, "NODE_ID": 9, "ADJMAP_ID": 1, "ADJND_ID": 5 },
              "geometry": { "type": "Point", "coordinates": [10.00002, 20.00001] } },
            { "type": "Feature",
              "properties": { "MESH_ID": 1, "NODE_ID": 4, "ADJMAP_ID": 0, "ADJND_ID": 0 },
              "geometry": { "type": "Point", "coordinates": [9.0, 19.0] } }
        ] }"#,
    );
    let links_file = TempLayer::write(
        r#"{ "type": "FeatureCollection", "features": [
            { "type": "Feature",
              "properties": { "MESH_ID": 1, "S_NODE_ID": 4, "E_NODE_ID": 5 },
              "geometry": { "type": "MultiLineString",
                            "coordinates": [[[9.0, 19.0], [10.0, 20.0]]] } },
            { "type": "Feature",
              "properties": { "MESH_ID": 2, "S_NODE_ID": 9, "E_NODE_ID": 8 },
              "geometry": { "type": "LineString",
                            "coordinates": [[10.00002, 20.00001], [11.0, 21.0]] } }
        ] }"#,
    );
    let config = StitchConfig::default();

    let node_records = read_node_layer(nodes.path(), &config.fields).unwrap();
    let mut layer = LinkLayer::open(links_file.path(), links_file.path()).unwrap();
    let mut links = layer.links(&config.fields).unwrap();

    let report = stitch_seams(&node_records, &mut links, &mut layer, &config).unwrap();
    assert_eq!(report.rewrite.changed_links, 1);
    assert!(report.mismatches.is_empty());

    let reloaded = LinkLayer::open(links_file.path(), links_file.path()).unwrap();
    let written = reloaded.links(&config.fields).unwrap();
    assert_eq!(written[0].polyline.0.last(), written[1].polyline.0.first());

    // a second run over the rewritten file commits nothing new
    let mut layer = reloaded;
    let mut links = written;
    let report = stitch_seams(&node_records, &mut links, &mut layer, &config).unwrap();
    assert_eq!(report.rewrite.changed_links, 0);
    assert!(report.mismatches.is_empty());

    // the editor is closed after each run
    assert!(layer.begin_edit_session().is_ok());
}
