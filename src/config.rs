use crate::errors::{ConfigError, io_err};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Matches independently digitized copies of the same point, in layer units.
pub const DEFAULT_TOLERANCE: f64 = 0.00001;

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct StitchConfig {
    /// Half-width of the square searched around an orphan.
    pub tolerance: f64,
    pub fields: FieldNames,
}

impl Default for StitchConfig {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_TOLERANCE,
            fields: FieldNames::default(),
        }
    }
}

/// Attribute names in the node and link layers.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(default)]
pub struct FieldNames {
    pub tile: String,
    pub node: String,
    pub adjacent_tile: String,
    pub adjacent_node: String,
    pub start_node: String,
    pub end_node: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self {
            tile: "MESH_ID".to_string(),
            node: "NODE_ID".to_string(),
            adjacent_tile: "ADJMAP_ID".to_string(),
            adjacent_node: "ADJND_ID".to_string(),
            start_node: "S_NODE_ID".to_string(),
            end_node: "E_NODE_ID".to_string(),
        }
    }
}

impl StitchConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: StitchConfig = serde_json::from_str(text)?;
        config.validate()
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|e| io_err!(path, e))?;
        Self::from_json_str(&text)
    }

    pub fn with_tolerance(mut self, tolerance: Option<f64>) -> Result<Self, ConfigError> {
        if let Some(tolerance) = tolerance {
            self.tolerance = tolerance;
        }
        self.validate()
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if !self.tolerance.is_finite() || self.tolerance <= 0.0 {
            return Err(ConfigError::InvalidTolerance(self.tolerance));
        }
        Ok(self)
    }
}
