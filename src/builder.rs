//! Matrix construction
//!
//! Turns classified rows into the aligned project list, capability list, and
//! score grid. Construction is pure given its inputs.

use crate::classifier::ClassifiedRows;
use crate::config::MatrixConfig;
use crate::types::{Capability, MatrixData, Project, RawRow, RawValue, ScoreGrid, MISSING};
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// Builder for the matrix model
pub struct MatrixBuilder;

impl MatrixBuilder {
    /// Build projects, capabilities, and the score grid from classified rows
    pub fn build(classified: &ClassifiedRows<'_>, config: &MatrixConfig) -> MatrixData {
        let capabilities = build_capabilities(classified);

        let projects: Vec<Project> = classified
            .data_rows
            .iter()
            .enumerate()
            .map(|(index, row)| build_project(row, index, config))
            .collect();
        let projects = disambiguate_ids(projects);

        let values = build_grid(classified);

        debug!(
            projects = projects.len(),
            capabilities = capabilities.len(),
            missing_cells = values.missing_count(),
            "built matrix"
        );

        MatrixData::new(projects, capabilities, values)
    }
}

/// Resolve capability labels from the label row, falling back to the column key
fn build_capabilities(classified: &ClassifiedRows<'_>) -> Vec<Capability> {
    classified
        .capability_columns
        .iter()
        .map(|col| {
            let label = classified
                .label_row
                .get(col)
                .and_then(RawValue::as_trimmed_str)
                .filter(|s| !s.is_empty())
                .unwrap_or(col.as_str())
                .to_string();

            Capability {
                id: col.clone(),
                label,
            }
        })
        .collect()
}

fn build_project(row: &RawRow, index: usize, config: &MatrixConfig) -> Project {
    let text = |column: &str| row.get(column).and_then(RawValue::to_text);

    let id = text(config.id_column.as_str()).unwrap_or_else(|| format!("row_{index}"));
    let name = text(config.name_column.as_str())
        .or_else(|| text(config.id_column.as_str()))
        .unwrap_or_else(|| format!("Project {}", index + 1));
    let description = text(config.description_column.as_str());

    let meta: HashMap<String, RawValue> = config
        .metadata_columns
        .iter()
        .filter_map(|col| row.get(col).map(|v| (col.clone(), v.clone())))
        .collect();

    Project {
        id,
        name,
        description,
        meta,
    }
}

/// Suffix repeated identifiers (`P1`, `P1#2`, `P1#3`) so every cell address is unique
fn disambiguate_ids(mut projects: Vec<Project>) -> Vec<Project> {
    let mut seen: HashSet<String> = HashSet::with_capacity(projects.len());

    for project in &mut projects {
        if seen.insert(project.id.clone()) {
            continue;
        }

        let mut n = 2;
        let mut candidate = format!("{}#{}", project.id, n);
        while seen.contains(&candidate) {
            n += 1;
            candidate = format!("{}#{}", project.id, n);
        }

        warn!(id = %project.id, renamed = %candidate, "duplicate project identifier");
        seen.insert(candidate.clone());
        project.id = candidate;
    }

    projects
}

fn build_grid(classified: &ClassifiedRows<'_>) -> ScoreGrid {
    let rows = classified
        .data_rows
        .iter()
        .map(|row| {
            classified
                .capability_columns
                .iter()
                .map(|col| row.get(col).map_or(MISSING, RawValue::to_score))
                .collect()
        })
        .collect();

    ScoreGrid::from_rows(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::RowClassifier;
    use pretty_assertions::assert_eq;

    fn build(rows: &[RawRow]) -> MatrixData {
        let config = MatrixConfig::default();
        let classified = RowClassifier::classify(rows, &config).unwrap();
        MatrixBuilder::build(&classified, &config)
    }

    #[test]
    fn test_single_project_scenario() {
        let rows = vec![
            RawRow::new().with("scoreCol", "Drones for anti-poaching"),
            RawRow::new()
                .with("solution_id", "P1")
                .with("solution_short_name", "Rangers+")
                .with("scoreCol", "0.82"),
        ];
        let matrix = build(&rows);

        assert_eq!(matrix.projects().len(), 1);
        assert_eq!(matrix.projects()[0].id, "P1");
        assert_eq!(matrix.projects()[0].name, "Rangers+");
        assert_eq!(
            matrix.capabilities(),
            &[Capability {
                id: "scoreCol".to_string(),
                label: "Drones for anti-poaching".to_string(),
            }]
        );
        assert_eq!(matrix.values().rows(), &[vec![0.82]]);
    }

    #[test]
    fn test_label_fallback_to_column_key() {
        let rows = vec![
            RawRow::new()
                .with("solution_id", RawValue::Null)
                .with("a", "  Alpha  ")
                .with("b", "   ")
                .with("c", 3.0)
                .with("d", RawValue::Null),
            RawRow::new()
                .with("solution_id", "P1")
                .with("a", 1.0)
                .with("b", 1.0)
                .with("c", 1.0)
                .with("d", 1.0),
        ];
        let matrix = build(&rows);
        let labels: Vec<&str> = matrix.capabilities().iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["Alpha", "b", "c", "d"]);
    }

    #[test]
    fn test_project_name_and_description_fallbacks() {
        let rows = vec![
            RawRow::new().with("solution_id", RawValue::Null).with("x", "X"),
            RawRow::new()
                .with("solution_id", 42.0)
                .with("solution_short_name", RawValue::Null)
                .with("x", 0.1),
            RawRow::new()
                .with("solution_id", "P2")
                .with("solution_short_name", "Reefs")
                .with("solution_short_desc", "Coral restoration")
                .with("submission_languages", "en, es")
                .with("x", 0.2),
        ];
        let matrix = build(&rows);
        let first = &matrix.projects()[0];
        assert_eq!(first.id, "42");
        assert_eq!(first.name, "42");
        assert_eq!(first.description, None);
        assert_eq!(first.meta.len(), 2);
        assert_eq!(first.meta.get("solution_short_name"), Some(&RawValue::Null));

        let second = &matrix.projects()[1];
        assert_eq!(second.description.as_deref(), Some("Coral restoration"));
        assert_eq!(
            second.meta.get("submission_languages"),
            Some(&RawValue::from("en, es"))
        );
        assert_eq!(second.meta.len(), 4);
    }

    #[test]
    fn test_missing_and_invalid_scores() {
        let rows = vec![
            RawRow::new()
                .with("solution_id", RawValue::Null)
                .with("a", "A")
                .with("b", "B")
                .with("c", "C")
                .with("d", "D"),
            RawRow::new()
                .with("solution_id", "P1")
                .with("a", "")
                .with("b", "n/a")
                .with("c", RawValue::Null)
                .with("d", " 0.25 "),
        ];
        let matrix = build(&rows);
        let row = &matrix.values().rows()[0];
        assert!(row[0].is_nan());
        assert!(row[1].is_nan());
        assert!(row[2].is_nan());
        assert_eq!(row[3], 0.25);
        assert_eq!(matrix.score(0, 0), None);
        assert_eq!(matrix.score(0, 3), Some(0.25));
    }

    #[test]
    fn test_absent_capability_cell_is_missing() {
        let rows = vec![
            RawRow::new().with("solution_id", RawValue::Null).with("a", "A").with("b", "B"),
            RawRow::new().with("solution_id", "P1").with("a", 0.4),
        ];
        let matrix = build(&rows);
        assert_eq!(matrix.values().rows()[0].len(), 2);
        assert!(matrix.values().get(0, 1).is_nan());
    }

    #[test]
    fn test_duplicate_ids_are_disambiguated() {
        let rows = vec![
            RawRow::new().with("x", "X"),
            RawRow::new()
                .with("solution_id", "P1")
                .with("solution_short_name", "First")
                .with("x", 0.1),
            RawRow::new()
                .with("solution_id", "P1")
                .with("solution_short_name", "Second")
                .with("x", 0.9),
            RawRow::new().with("solution_id", "P1#2").with("x", 0.5),
            RawRow::new().with("solution_id", "P1").with("x", 0.3),
        ];
        let matrix = build(&rows);

        let ids: Vec<&str> = matrix.projects().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["P1", "P1#2", "P1#2#2", "P1#3"]);
        assert_eq!(matrix.projects()[1].name, "Second");
        assert_eq!(matrix.project_index("P1#2"), Some(1));
        assert_eq!(matrix.score(1, 0), Some(0.9));
    }

    #[test]
    fn test_grid_shape_matches_entities() {
        let mut rows = vec![RawRow::new()
            .with("solution_id", RawValue::Null)
            .with("solution_short_name", RawValue::Null)
            .with("a", "A")
            .with("b", "B")
            .with("c", "C")];
        for i in 0..5 {
            rows.push(
                RawRow::new()
                    .with("solution_id", format!("P{i}"))
                    .with("solution_short_name", format!("Project {i}"))
                    .with("a", i as f64)
                    .with("b", "")
                    .with("c", "1.5"),
            );
        }
        rows.push(RawRow::new().with("solution_id", ""));

        let matrix = build(&rows);
        assert_eq!(matrix.projects().len(), 5);
        assert_eq!(matrix.capabilities().len(), 3);
        assert_eq!(matrix.values().row_count(), matrix.projects().len());
        assert!(matrix
            .values()
            .rows()
            .iter()
            .all(|r| r.len() == matrix.capabilities().len()));
    }
}
