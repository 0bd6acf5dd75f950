//! Pipeline orchestration
//!
//! One-shot entry points from parsed rows (or raw CSV/JSON text) to the matrix
//! output model and the render model. Use [`crate::store::MatrixStore`] when
//! reloads and tooltip state have to be tracked over time.

use crate::builder::MatrixBuilder;
use crate::classifier::RowClassifier;
use crate::config::MatrixConfig;
use crate::encoder::RenderEncoder;
use crate::error::MatrixError;
use crate::sources::{CsvRowSource, JsonRowSource, RowSource};
use crate::types::{MatrixData, MatrixView, RawRow};
use std::sync::Arc;

/// Classify rows and build the matrix. All-or-nothing: any failure yields no matrix.
///
/// Pipeline stages:
/// 1. RowClassifier - Split label row, data rows, and capability columns
/// 2. MatrixBuilder - Build projects, capabilities, and the score grid
pub fn build_matrix(rows: &[RawRow], config: &MatrixConfig) -> Result<MatrixData, MatrixError> {
    let classified = RowClassifier::classify(rows, config)?;
    Ok(MatrixBuilder::build(&classified, config))
}

/// Fetch rows from a source, then build the matrix
pub fn build_from_source(
    source: &dyn RowSource,
    config: &MatrixConfig,
) -> Result<MatrixData, MatrixError> {
    let rows = source.fetch()?;
    build_matrix(&rows, config)
}

/// Convert CSV text to the matrix output model as JSON.
///
/// # Example
/// ```ignore
/// let json = csv_to_matrix_json(csv_text, &MatrixConfig::default())?;
/// ```
pub fn csv_to_matrix_json(csv: String, config: &MatrixConfig) -> Result<String, MatrixError> {
    let matrix = build_from_source(&CsvRowSource::from_text(csv), config)?;
    view_to_json(matrix)
}

/// Convert a JSON array of rows to the matrix output model as JSON
pub fn rows_json_to_matrix_json(
    rows_json: String,
    config: &MatrixConfig,
) -> Result<String, MatrixError> {
    let matrix = build_from_source(&JsonRowSource::new(rows_json), config)?;
    view_to_json(matrix)
}

/// Convert a JSON array of rows to the render model as JSON
pub fn rows_json_to_render_json(
    rows_json: String,
    config: &MatrixConfig,
) -> Result<String, MatrixError> {
    let matrix = build_from_source(&JsonRowSource::new(rows_json), config)?;
    RenderEncoder::new(config.color_scale).encode_to_json(&matrix)
}

fn view_to_json(matrix: MatrixData) -> Result<String, MatrixError> {
    let view = MatrixView {
        matrix: Arc::new(matrix),
        is_loading: false,
        error: None,
    };
    serde_json::to_string_pretty(&view).map_err(|e| MatrixError::EncodingError(e.to_string()))
}
