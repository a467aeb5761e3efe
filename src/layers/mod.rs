//! GeoJSON node and link layers.
//!
//! Both layers are FeatureCollections produced by merging the per-tile
//! exports. Attribute values may arrive as numbers or as numeric strings,
//! depending on which tool did the merge.

mod links;
mod nodes;

pub use links::LinkLayer;
pub use nodes::read_node_layer;

use crate::errors::{LayerError, io_err};
use geojson::{FeatureCollection, GeoJson, JsonObject, JsonValue, Value};
use std::path::Path;

pub(crate) fn read_feature_collection(path: &Path) -> Result<FeatureCollection, LayerError> {
    let text = std::fs::read_to_string(path).map_err(|e| io_err!(path, e))?;

    let geojson = text
        .parse::<GeoJson>()
        .map_err(|e| LayerError::GeoJson {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

    match geojson {
        GeoJson::FeatureCollection(collection) => Ok(collection),
        _ => Err(LayerError::NotFeatureCollection(path.to_path_buf())),
    }
}

pub(crate) fn geometry_kind(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}

/// Reads an integer attribute. `None` when the field is absent or null.
pub(crate) fn integer_field(
    properties: Option<&JsonObject>,
    feature: usize,
    field: &str,
) -> Result<Option<i64>, LayerError> {
    let Some(value) = properties.and_then(|p| p.get(field)) else {
        return Ok(None);
    };

    let invalid = || LayerError::InvalidField {
        feature,
        field: field.to_string(),
        value: value.to_string(),
    };

    match value {
        JsonValue::Null => Ok(None),
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Ok(Some(i)),
            None => match n.as_f64() {
                Some(f) if f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(&f) => {
                    Ok(Some(f as i64))
                }
                _ => Err(invalid()),
            },
        },
        JsonValue::String(s) => s.trim().parse::<i64>().map(Some).map_err(|_| invalid()),
        _ => Err(invalid()),
    }
}

pub(crate) fn required_integer_field(
    properties: Option<&JsonObject>,
    feature: usize,
    field: &str,
) -> Result<i64, LayerError> {
    integer_field(properties, feature, field)?.ok_or_else(|| LayerError::MissingField {
        feature,
        field: field.to_string(),
    })
}
