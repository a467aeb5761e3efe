use crate::node_id::LinkId;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LayerError {
    #[error("I/O error accessing path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Invalid GeoJSON in '{path}': {source}")]
    GeoJson {
        path: PathBuf,
        #[source]
        source: Box<geojson::Error>,
    },
    #[error("Failed to serialize layer: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("'{0}' is not a GeoJSON FeatureCollection")]
    NotFeatureCollection(PathBuf),
    #[error("Feature {feature} is missing field '{field}'")]
    MissingField { feature: usize, field: String },
    #[error("Feature {feature} has non-integer value in field '{field}': {value}")]
    InvalidField {
        feature: usize,
        field: String,
        value: String,
    },
    #[error("Feature {feature} has unsupported geometry: {kind}")]
    UnsupportedGeometry { feature: usize, kind: String },
    #[error("No edit session is open")]
    NotEditing,
    #[error("An edit session is already open")]
    AlreadyEditing,
    #[error("Unknown {0}")]
    UnknownLink(LinkId),
}

/// Failures that stop the rewrite phase. Everything else is counted, not raised.
#[derive(Error, Debug)]
pub enum StitchError {
    #[error("Could not start editing the links layer")]
    SessionBegin(#[source] LayerError),
    #[error("Could not commit edits to the links layer")]
    SessionCommit(#[source] LayerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error(transparent)]
    Layer(#[from] LayerError),
    #[error("Invalid config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Tolerance must be a positive finite number, got {0}")]
    InvalidTolerance(f64),
}

macro_rules! io_err {
    ($path:expr, $err:expr) => {
        $crate::errors::LayerError::Io {
            path: $path.to_path_buf(),
            source: $err,
        }
    };
}

pub(crate) use io_err;
