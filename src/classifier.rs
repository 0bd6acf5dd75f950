//! Row classification
//!
//! Splits parsed rows into the label row and qualifying data rows, and splits
//! columns into metadata columns and capability columns.

use crate::config::MatrixConfig;
use crate::error::MatrixError;
use crate::types::RawRow;
use tracing::{debug, warn};

/// Output of the row classifier
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedRows<'a> {
    /// First row; carries capability labels, never a project
    pub label_row: &'a RawRow,
    /// Rows with a usable identifier, in source order
    pub data_rows: Vec<&'a RawRow>,
    /// Non-metadata columns in source column order
    pub capability_columns: Vec<String>,
    /// Rows after the label row that were dropped for lacking an identifier
    pub dropped_rows: usize,
}

/// Classifier for raw parsed rows
pub struct RowClassifier;

impl RowClassifier {
    /// Classify rows. The column set is taken from the first row's keys.
    pub fn classify<'a>(
        rows: &'a [RawRow],
        config: &MatrixConfig,
    ) -> Result<ClassifiedRows<'a>, MatrixError> {
        let (label_row, rest) = rows.split_first().ok_or(MatrixError::EmptyDataset)?;

        let capability_columns: Vec<String> = label_row
            .keys()
            .filter(|col| !config.is_metadata_column(col))
            .map(str::to_string)
            .collect();

        debug!(
            columns = label_row.len(),
            capabilities = capability_columns.len(),
            "classified columns"
        );

        let data_rows: Vec<&RawRow> = rest
            .iter()
            .filter(|row| has_identifier(row, &config.id_column))
            .collect();

        let dropped_rows = rest.len() - data_rows.len();
        if dropped_rows > 0 {
            warn!(
                dropped = dropped_rows,
                id_column = %config.id_column,
                "dropped rows without a project identifier"
            );
        }

        if data_rows.is_empty() {
            return Err(MatrixError::NoDataRows);
        }

        debug!(data_rows = data_rows.len(), "classified rows");

        Ok(ClassifiedRows {
            label_row,
            data_rows,
            capability_columns,
            dropped_rows,
        })
    }
}

/// A row qualifies when its identifier is present, non-null, and non-blank
fn has_identifier(row: &RawRow, id_column: &str) -> bool {
    row.get(id_column).is_some_and(|v| !v.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::RawValue;

    fn label_row() -> RawRow {
        RawRow::new()
            .with("solution_id", RawValue::Null)
            .with("solution_short_name", RawValue::Null)
            .with("drones", "Drones for anti-poaching")
            .with("acoustic", "Acoustic monitoring")
    }

    fn data_row(id: impl Into<RawValue>) -> RawRow {
        RawRow::new()
            .with("solution_id", id)
            .with("solution_short_name", "Name")
            .with("drones", "0.5")
            .with("acoustic", 0.2)
    }

    #[test]
    fn test_empty_dataset() {
        let result = RowClassifier::classify(&[], &MatrixConfig::default());
        assert!(matches!(result, Err(MatrixError::EmptyDataset)));
    }

    #[test]
    fn test_label_row_only() {
        let rows = vec![label_row()];
        let result = RowClassifier::classify(&rows, &MatrixConfig::default());
        assert!(matches!(result, Err(MatrixError::NoDataRows)));
    }

    #[test]
    fn test_label_row_is_never_a_project() {
        // The label row has an identifier but is still excluded.
        let rows = vec![data_row("L0"), data_row("P1")];
        let classified = RowClassifier::classify(&rows, &MatrixConfig::default()).unwrap();
        assert_eq!(classified.label_row.get("solution_id"), Some(&RawValue::from("L0")));
        assert_eq!(classified.data_rows.len(), 1);
        assert_eq!(
            classified.data_rows[0].get("solution_id"),
            Some(&RawValue::from("P1"))
        );
    }

    #[test]
    fn test_capability_columns_keep_source_order() {
        let rows = vec![label_row(), data_row("P1")];
        let classified = RowClassifier::classify(&rows, &MatrixConfig::default()).unwrap();
        assert_eq!(classified.capability_columns, vec!["drones", "acoustic"]);
    }

    #[test]
    fn test_blank_identifiers_are_dropped() {
        let mut missing = data_row("x");
        missing = missing
            .iter()
            .filter(|(k, _)| *k != "solution_id")
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();

        let rows = vec![
            label_row(),
            data_row("P1"),
            data_row(""),
            data_row("   "),
            data_row(RawValue::Null),
            missing,
            data_row(7.0),
        ];
        let classified = RowClassifier::classify(&rows, &MatrixConfig::default()).unwrap();
        assert_eq!(classified.data_rows.len(), 2);
        assert_eq!(classified.dropped_rows, 4);
    }

    #[test]
    fn test_all_blank_identifiers_fail() {
        let rows = vec![label_row(), data_row(""), data_row(" \t"), data_row(RawValue::Null)];
        let result = RowClassifier::classify(&rows, &MatrixConfig::default());
        assert!(matches!(result, Err(MatrixError::NoDataRows)));
    }
}
