//! CSV row source
//!
//! Reads a header-row CSV export. Field values are typed dynamically: empty
//! fields become null, `true`/`false` become booleans, numeric text becomes a
//! number, everything else stays text.

use crate::error::MatrixError;
use crate::types::{RawRow, RawValue};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use super::RowSource;

enum CsvInput {
    Text(String),
    Path(PathBuf),
}

/// CSV source reading from memory or a file
pub struct CsvRowSource {
    input: CsvInput,
    delimiter: u8,
}

impl CsvRowSource {
    /// Parse CSV held in memory
    pub fn from_text(content: impl Into<String>) -> Self {
        Self {
            input: CsvInput::Text(content.into()),
            delimiter: b',',
        }
    }

    /// Parse the CSV file at `path` on each fetch
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self {
            input: CsvInput::Path(path.into()),
            delimiter: b',',
        }
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    fn parse(&self, content: &str) -> Result<Vec<RawRow>, MatrixError> {
        // Excel exports often start with a byte-order mark.
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut reader = ::csv::ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(content.as_bytes());

        let headers = reader.headers()?.clone();
        let mut seen = HashSet::new();
        for header in headers.iter() {
            if !seen.insert(header) {
                warn!(column = header, "duplicate csv header; the later column's values win");
            }
        }

        let mut rows = Vec::new();
        let mut long_records = 0usize;

        for result in reader.records() {
            let record = result?;
            if record.iter().all(str::is_empty) {
                continue;
            }

            if record.len() > headers.len() {
                long_records += 1;
            }

            // Short records leave trailing columns absent rather than null.
            let row: RawRow = headers
                .iter()
                .zip(record.iter())
                .map(|(key, field)| (key, dynamic_value(field)))
                .collect();
            rows.push(row);
        }

        if long_records > 0 {
            warn!(
                records = long_records,
                columns = headers.len(),
                "ignored fields beyond the header width"
            );
        }

        debug!(columns = headers.len(), rows = rows.len(), "parsed csv");
        Ok(rows)
    }
}

impl RowSource for CsvRowSource {
    fn fetch(&self) -> Result<Vec<RawRow>, MatrixError> {
        match &self.input {
            CsvInput::Text(content) => self.parse(content),
            CsvInput::Path(path) => {
                let content = fs::read_to_string(path).map_err(|e| {
                    MatrixError::LoadFailure(format!("{}: {}", path.display(), e))
                })?;
                self.parse(&content)
            }
        }
    }
}

/// Type a field the way spreadsheet exports are usually meant
fn dynamic_value(field: &str) -> RawValue {
    if field.is_empty() {
        return RawValue::Null;
    }

    match field {
        "true" | "TRUE" | "True" => return RawValue::Boolean(true),
        "false" | "FALSE" | "False" => return RawValue::Boolean(false),
        _ => {}
    }

    if looks_numeric(field) {
        if let Ok(n) = field.trim().parse::<f64>() {
            if n.is_finite() {
                return RawValue::Number(n);
            }
        }
    }

    RawValue::Text(field.to_string())
}

/// Plain decimal or exponent notation; rejects `inf`, `NaN`, and the like
fn looks_numeric(field: &str) -> bool {
    let trimmed = field.trim();
    !trimmed.is_empty()
        && trimmed.chars().any(|c| c.is_ascii_digit())
        && trimmed
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}solution_id,solution_short_name,drones,acoustic\n\
        ,,Drones for anti-poaching,\n\
        P1,Rangers+,0.82,\n\
        \n\
        P2,Reefs,n/a,0.4\n";

    #[test]
    fn test_parse_sample_export() {
        let rows = CsvRowSource::from_text(SAMPLE).fetch().unwrap();
        assert_eq!(rows.len(), 3);

        let keys: Vec<&str> = rows[0].keys().collect();
        assert_eq!(keys, vec!["solution_id", "solution_short_name", "drones", "acoustic"]);
        assert_eq!(rows[0].get("solution_id"), Some(&RawValue::Null));
        assert_eq!(
            rows[0].get("drones"),
            Some(&RawValue::from("Drones for anti-poaching"))
        );

        assert_eq!(rows[1].get("drones"), Some(&RawValue::Number(0.82)));
        assert_eq!(rows[1].get("acoustic"), Some(&RawValue::Null));
        assert_eq!(rows[2].get("drones"), Some(&RawValue::from("n/a")));
    }

    #[test]
    fn test_dynamic_typing() {
        assert_eq!(dynamic_value(""), RawValue::Null);
        assert_eq!(dynamic_value("TRUE"), RawValue::Boolean(true));
        assert_eq!(dynamic_value("12"), RawValue::Number(12.0));
        assert_eq!(dynamic_value("-1.5e2"), RawValue::Number(-150.0));
        assert_eq!(dynamic_value(" 0.5 "), RawValue::Number(0.5));
        assert_eq!(dynamic_value("inf"), RawValue::from("inf"));
        assert_eq!(dynamic_value("NaN"), RawValue::from("NaN"));
        assert_eq!(dynamic_value("2024-01-15"), RawValue::from("2024-01-15"));
        assert_eq!(dynamic_value("   "), RawValue::from("   "));
    }

    #[test]
    fn test_short_records_leave_columns_absent() {
        let rows = CsvRowSource::from_text("a,b,c\n1,2\n").fetch().unwrap();
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("c"), None);
    }

    #[test]
    fn test_duplicate_headers_collapse_to_one_column() {
        let rows = CsvRowSource::from_text("id,score,score\nP1,0.1,0.9\n")
            .fetch()
            .unwrap();
        let keys: Vec<&str> = rows[0].keys().collect();
        assert_eq!(keys, vec!["id", "score"]);
        assert_eq!(rows[0].get("score"), Some(&RawValue::Number(0.9)));
    }

    #[test]
    fn test_long_records_ignore_extra_fields() {
        let rows = CsvRowSource::from_text("a,b\n1,2,3,4\n5,6\n").fetch().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[0].get("b"), Some(&RawValue::Number(2.0)));
    }

    #[test]
    fn test_semicolon_delimiter() {
        let rows = CsvRowSource::from_text("a;b\nx;1\n")
            .with_delimiter(b';')
            .fetch()
            .unwrap();
        assert_eq!(rows[0].get("b"), Some(&RawValue::Number(1.0)));
    }

    #[test]
    fn test_missing_file_is_load_failure() {
        let result = CsvRowSource::from_path("/nonexistent/matrix.csv").fetch();
        assert!(matches!(result, Err(MatrixError::LoadFailure(_))));
    }
}
