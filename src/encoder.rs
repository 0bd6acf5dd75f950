//! Render model encoding
//!
//! This module turns a built matrix into the per-cell render model: raw and
//! normalized scores, cell colors, and whether a cell reacts to interaction.

use crate::color::{ColorScale, NEUTRAL_COLOR};
use crate::error::MatrixError;
use crate::normalizer::ScoreRange;
use crate::types::{Capability, MatrixData};
use crate::{MATRIX_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Render model producer metadata
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// One shaded cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedCell {
    pub capability_id: String,
    /// Raw score, `None` when missing
    pub score: Option<f64>,
    /// Score rescaled to [0, 1], `None` when missing
    pub normalized: Option<f64>,
    /// CSS color for the cell background
    pub color: String,
    /// Only scored cells open a tooltip
    pub interactive: bool,
}

/// One project row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub project_id: String,
    pub project_name: String,
    pub cells: Vec<RenderedCell>,
}

/// Complete render model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedMatrix {
    pub producer: RenderProducer,
    pub computed_at_utc: String,
    pub range: ScoreRange,
    pub neutral_color: String,
    pub capabilities: Vec<Capability>,
    pub rows: Vec<RenderedRow>,
}

/// Encoder for the render model
pub struct RenderEncoder {
    instance_id: String,
    scale: ColorScale,
}

impl Default for RenderEncoder {
    fn default() -> Self {
        Self::new(ColorScale::default())
    }
}

impl RenderEncoder {
    /// Create an encoder with a unique instance ID
    pub fn new(scale: ColorScale) -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            scale,
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String, scale: ColorScale) -> Self {
        Self { instance_id, scale }
    }

    /// Shade every cell of the matrix
    pub fn encode(&self, matrix: &MatrixData) -> RenderedMatrix {
        let range = ScoreRange::from_grid(matrix.values());

        let rows = matrix
            .projects()
            .iter()
            .enumerate()
            .map(|(p, project)| RenderedRow {
                project_id: project.id.clone(),
                project_name: project.name.clone(),
                cells: matrix
                    .capabilities()
                    .iter()
                    .enumerate()
                    .map(|(c, capability)| self.encode_cell(matrix.score(p, c), capability, &range))
                    .collect(),
            })
            .collect();

        RenderedMatrix {
            producer: RenderProducer {
                name: PRODUCER_NAME.to_string(),
                version: MATRIX_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            range,
            neutral_color: NEUTRAL_COLOR.to_string(),
            capabilities: matrix.capabilities().to_vec(),
            rows,
        }
    }

    /// Encode to a pretty JSON string
    pub fn encode_to_json(&self, matrix: &MatrixData) -> Result<String, MatrixError> {
        let rendered = self.encode(matrix);
        serde_json::to_string_pretty(&rendered).map_err(|e| MatrixError::EncodingError(e.to_string()))
    }

    fn encode_cell(
        &self,
        score: Option<f64>,
        capability: &Capability,
        range: &ScoreRange,
    ) -> RenderedCell {
        match score {
            Some(score) => {
                let normalized = range.normalize(score);
                RenderedCell {
                    capability_id: capability.id.clone(),
                    score: Some(score),
                    normalized: Some(normalized),
                    color: self.scale.color_for(normalized).to_css(),
                    interactive: true,
                }
            }
            None => RenderedCell {
                capability_id: capability.id.clone(),
                score: None,
                normalized: None,
                color: NEUTRAL_COLOR.to_string(),
                interactive: false,
            },
        }
    }
}
