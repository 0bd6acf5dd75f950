//! Matrix configuration
//!
//! The integrator names the metadata columns explicitly; every other column is
//! inferred to be a capability column. Defaults match the Solution Search
//! export.

use crate::color::ColorScale;
use crate::error::MatrixError;
use serde::{Deserialize, Serialize};

/// Default project-level columns of the Solution Search export
pub const DEFAULT_METADATA_COLUMNS: [&str; 4] = [
    "solution_id",
    "solution_short_name",
    "solution_short_desc",
    "submission_languages",
];

/// Configuration for classifying and building the matrix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatrixConfig {
    /// Columns excluded from capability inference
    pub metadata_columns: Vec<String>,
    /// Column holding the project identifier
    pub id_column: String,
    /// Column holding the project display name
    pub name_column: String,
    /// Column holding the project description
    pub description_column: String,
    /// Cell shading scale
    pub color_scale: ColorScale,
}

impl Default for MatrixConfig {
    fn default() -> Self {
        Self {
            metadata_columns: DEFAULT_METADATA_COLUMNS
                .iter()
                .map(|c| c.to_string())
                .collect(),
            id_column: "solution_id".to_string(),
            name_column: "solution_short_name".to_string(),
            description_column: "solution_short_desc".to_string(),
            color_scale: ColorScale::default(),
        }
    }
}

impl MatrixConfig {
    /// Load configuration from JSON; missing fields take their defaults
    pub fn from_json(json: &str) -> Result<Self, MatrixError> {
        let config: MatrixConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to pretty JSON
    pub fn to_json(&self) -> Result<String, MatrixError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_metadata_column(&self, column: &str) -> bool {
        self.metadata_columns.iter().any(|c| c == column)
    }

    /// Check that the role columns are metadata columns and the color scale is in range
    pub fn validate(&self) -> Result<(), MatrixError> {
        for (role, column) in [
            ("id_column", &self.id_column),
            ("name_column", &self.name_column),
            ("description_column", &self.description_column),
        ] {
            if column.trim().is_empty() {
                return Err(MatrixError::InvalidConfig(format!("{role} must not be empty")));
            }
            if !self.is_metadata_column(column) {
                return Err(MatrixError::InvalidConfig(format!(
                    "{role} '{column}' is not listed in metadata_columns"
                )));
            }
        }

        self.color_scale.validate()
    }
}
