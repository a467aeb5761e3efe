use super::{geometry_kind, read_feature_collection, required_integer_field};
use crate::config::FieldNames;
use crate::errors::{LayerError, io_err};
use crate::link_rewriter::LinkEditor;
use crate::node_id::LinkId;
use crate::records::LinkRecord;
use ahash::AHashMap;
use geo::{Coord, LineString};
use geojson::{FeatureCollection, Geometry, Value};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// How a link's line was stored, so a rewrite goes back the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineKind {
    LineString,
    MultiLineString,
}

/// The merged links layer, loaded in memory and committed as a whole.
pub struct LinkLayer {
    destination: PathBuf,
    collection: FeatureCollection,
    kinds: Vec<LineKind>,
    pending: Option<AHashMap<LinkId, LineString<f64>>>,
}

impl LinkLayer {
    /// Loads `source`. Commits are written to `destination`, which may be
    /// the same file.
    pub fn open(source: &Path, destination: &Path) -> Result<Self, LayerError> {
        info!(path = %source.display(), "loading links layer");
        let collection = read_feature_collection(source)?;

        let kinds = collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| match feature.geometry.as_ref().map(|g| &g.value) {
                Some(Value::LineString(_)) => Ok(LineKind::LineString),
                Some(Value::MultiLineString(parts)) if parts.len() == 1 => {
                    Ok(LineKind::MultiLineString)
                }
                Some(other) => Err(LayerError::UnsupportedGeometry {
                    feature: index,
                    kind: geometry_kind(other).to_string(),
                }),
                None => Err(LayerError::UnsupportedGeometry {
                    feature: index,
                    kind: "null".to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            destination: destination.to_path_buf(),
            collection,
            kinds,
            pending: None,
        })
    }

    pub fn len(&self) -> usize {
        self.collection.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.features.is_empty()
    }

    pub fn links(&self, fields: &FieldNames) -> Result<Vec<LinkRecord>, LayerError> {
        self.collection
            .features
            .iter()
            .enumerate()
            .map(|(index, feature)| -> Result<LinkRecord, LayerError> {
                let properties = feature.properties.as_ref();
                Ok(LinkRecord {
                    id: LinkId(index),
                    tile_id: required_integer_field(properties, index, &fields.tile)?,
                    start_node_sequence: required_integer_field(
                        properties,
                        index,
                        &fields.start_node,
                    )?,
                    end_node_sequence: required_integer_field(properties, index, &fields.end_node)?,
                    polyline: self.polyline(index)?,
                })
            })
            .collect()
    }

    fn polyline(&self, index: usize) -> Result<LineString<f64>, LayerError> {
        let positions = match self.collection.features[index]
            .geometry
            .as_ref()
            .map(|g| &g.value)
        {
            Some(Value::LineString(positions)) => positions,
            Some(Value::MultiLineString(parts)) if parts.len() == 1 => &parts[0],
            _ => {
                return Err(LayerError::UnsupportedGeometry {
                    feature: index,
                    kind: "not a single line".to_string(),
                });
            }
        };

        positions
            .iter()
            .map(|position| match position.as_slice() {
                [x, y, ..] => Ok(Coord { x: *x, y: *y }),
                _ => Err(LayerError::UnsupportedGeometry {
                    feature: index,
                    kind: "position with fewer than two ordinates".to_string(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(LineString::new)
    }

    fn write_collection(&self) -> Result<(), LayerError> {
        let file_name = self
            .destination
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "links".to_string());
        let staging = self
            .destination
            .with_file_name(format!(".{}.{}.tmp", file_name, std::process::id()));

        let staged = self
            .stage_collection(&staging)
            .and_then(|()| {
                std::fs::rename(&staging, &self.destination)
                    .map_err(|e| io_err!(&self.destination, e))
            });

        if staged.is_err() {
            let _ = std::fs::remove_file(&staging);
        }
        staged
    }

    fn stage_collection(&self, staging: &Path) -> Result<(), LayerError> {
        let file = File::create(staging).map_err(|e| io_err!(staging, e))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, &self.collection)?;
        writer.flush().map_err(|e| io_err!(staging, e))
    }
}

fn line_value(kind: LineKind, polyline: &LineString<f64>) -> Value {
    let positions = polyline
        .0
        .iter()
        .map(|c| vec![c.x, c.y])
        .collect::<Vec<_>>();

    match kind {
        LineKind::LineString => Value::LineString(positions),
        LineKind::MultiLineString => Value::MultiLineString(vec![positions]),
    }
}

impl LinkEditor for LinkLayer {
    fn begin_edit_session(&mut self) -> Result<(), LayerError> {
        if self.pending.is_some() {
            return Err(LayerError::AlreadyEditing);
        }
        self.pending = Some(AHashMap::new());
        Ok(())
    }

    fn write_link_geometry(
        &mut self,
        link: LinkId,
        polyline: &LineString<f64>,
    ) -> Result<(), LayerError> {
        if link.0 >= self.collection.features.len() {
            return Err(LayerError::UnknownLink(link));
        }
        let pending = self.pending.as_mut().ok_or(LayerError::NotEditing)?;
        pending.insert(link, polyline.clone());
        Ok(())
    }

    fn commit_edit_session(&mut self) -> Result<(), LayerError> {
        let pending = self.pending.take().ok_or(LayerError::NotEditing)?;
        let original = self.collection.clone();

        for (link, polyline) in &pending {
            let feature = &mut self.collection.features[link.0];
            let value = line_value(self.kinds[link.0], polyline);
            match feature.geometry.as_mut() {
                Some(geometry) => geometry.value = value,
                None => feature.geometry = Some(Geometry::new(value)),
            }
        }

        if let Err(e) = self.write_collection() {
            self.collection = original;
            return Err(e);
        }

        info!(
            path = %self.destination.display(),
            edits = pending.len(),
            "links layer written"
        );
        Ok(())
    }
}
