use super::{geometry_kind, integer_field, read_feature_collection, required_integer_field};
use crate::config::FieldNames;
use crate::errors::LayerError;
use crate::node_id::NodeId;
use crate::records::NodeRecord;
use geo::coord;
use geojson::{Feature, Value};
use std::path::Path;
use tracing::info;

/// Reads every node of the merged node layer, interior nodes included.
pub fn read_node_layer(path: &Path, fields: &FieldNames) -> Result<Vec<NodeRecord>, LayerError> {
    info!(path = %path.display(), "loading nodes layer");
    let collection = read_feature_collection(path)?;

    let nodes = collection
        .features
        .iter()
        .enumerate()
        .map(|(index, feature)| node_from_feature(index, feature, fields))
        .collect::<Result<Vec<_>, _>>()?;

    info!("iterated through {} nodes", nodes.len());
    Ok(nodes)
}

fn node_from_feature(
    index: usize,
    feature: &Feature,
    fields: &FieldNames,
) -> Result<NodeRecord, LayerError> {
    let properties = feature.properties.as_ref();

    let id = NodeId::new(
        required_integer_field(properties, index, &fields.tile)?,
        required_integer_field(properties, index, &fields.node)?,
    );
    let adjacent = NodeId::new(
        integer_field(properties, index, &fields.adjacent_tile)?.unwrap_or(0),
        integer_field(properties, index, &fields.adjacent_node)?.unwrap_or(0),
    );

    let position = match feature.geometry.as_ref().map(|g| &g.value) {
        Some(Value::Point(position)) => position,
        Some(Value::MultiPoint(points)) if points.len() == 1 => &points[0],
        Some(other) => {
            return Err(LayerError::UnsupportedGeometry {
                feature: index,
                kind: geometry_kind(other).to_string(),
            });
        }
        None => {
            return Err(LayerError::UnsupportedGeometry {
                feature: index,
                kind: "null".to_string(),
            });
        }
    };

    if position.len() < 2 {
        return Err(LayerError::UnsupportedGeometry {
            feature: index,
            kind: "Point with fewer than two ordinates".to_string(),
        });
    }

    Ok(NodeRecord::new(
        id,
        adjacent,
        coord! { x: position[0], y: position[1] },
    ))
}
