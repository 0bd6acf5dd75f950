//! Core types for the solutions matrix
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw parsed rows, the project/capability entities, the score grid,
//! and the view exposed to rendering.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Marker stored in the score grid when a cell has no usable score
pub const MISSING: f64 = f64::NAN;

/// A raw cell value as produced by the tabular parser
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl From<f64> for RawValue {
    fn from(v: f64) -> Self {
        RawValue::Number(v)
    }
}

impl From<bool> for RawValue {
    fn from(v: bool) -> Self {
        RawValue::Boolean(v)
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl RawValue {
    pub fn is_null(&self) -> bool {
        matches!(self, RawValue::Null)
    }

    /// Render the value as text, or `None` for null
    pub fn to_text(&self) -> Option<String> {
        match self {
            RawValue::Null => None,
            RawValue::Boolean(b) => Some(b.to_string()),
            RawValue::Number(n) => Some(n.to_string()),
            RawValue::Text(s) => Some(s.clone()),
        }
    }

    /// Text content trimmed, only for textual values
    pub fn as_trimmed_str(&self) -> Option<&str> {
        match self {
            RawValue::Text(s) => Some(s.trim()),
            _ => None,
        }
    }

    /// True when the value is null or renders to whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Null => true,
            RawValue::Text(s) => s.trim().is_empty(),
            RawValue::Boolean(_) | RawValue::Number(_) => false,
        }
    }

    /// Coerce to a score, returning [`MISSING`] when no finite number can be read
    pub fn to_score(&self) -> f64 {
        let parsed = match self {
            RawValue::Number(n) => *n,
            RawValue::Text(s) => s.trim().parse::<f64>().unwrap_or(MISSING),
            RawValue::Null | RawValue::Boolean(_) => MISSING,
        };

        if parsed.is_finite() {
            parsed
        } else {
            MISSING
        }
    }
}

/// One parsed row: an ordered mapping from column key to raw value.
///
/// Key order is the source column order; it is preserved when deserializing
/// a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    cells: Vec<(String, RawValue)>,
}

impl RawRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value, replacing any existing value for the key in place
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        let key = key.into();
        let value = value.into();
        match self.cells.iter_mut().find(|(k, _)| *k == key) {
            Some(cell) => cell.1 = value,
            None => self.cells.push((key, value)),
        }
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.cells.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Column keys in source order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.cells.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.cells.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Into<String>, V: Into<RawValue>> FromIterator<(K, V)> for RawRow {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = RawRow::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl Serialize for RawRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.cells.len()))?;
        for (k, v) in &self.cells {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for RawRow {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RawRowVisitor;

        impl<'de> Visitor<'de> for RawRowVisitor {
            type Value = RawRow;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object mapping column keys to values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RawRow, A::Error> {
                let mut row = RawRow::new();
                while let Some((key, value)) = access.next_entry::<String, RawValue>()? {
                    row.insert(key, value);
                }
                Ok(row)
            }
        }

        deserializer.deserialize_map(RawRowVisitor)
    }
}

/// A conservation project (one qualifying data row)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Metadata-column values present on the source row
    pub meta: HashMap<String, RawValue>,
}

/// An AI capability (one non-metadata column)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capability {
    /// Original column key
    pub id: String,
    /// Human-friendly label from the label row
    pub label: String,
}

/// Dense score grid indexed `[project][capability]`; NaN marks a missing score.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreGrid {
    rows: Vec<Vec<f64>>,
}

impl ScoreGrid {
    pub(crate) fn from_rows(rows: Vec<Vec<f64>>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Raw cell value; out-of-range lookups read as missing
    pub fn get(&self, project: usize, capability: usize) -> f64 {
        self.rows
            .get(project)
            .and_then(|row| row.get(capability))
            .copied()
            .unwrap_or(MISSING)
    }

    /// All finite cell values
    pub fn finite_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.rows
            .iter()
            .flat_map(|row| row.iter().copied())
            .filter(|v| v.is_finite())
    }

    pub fn missing_count(&self) -> usize {
        self.rows
            .iter()
            .flat_map(|row| row.iter())
            .filter(|v| !v.is_finite())
            .count()
    }
}

// JSON has no NaN; missing cells serialize as null.
impl Serialize for ScoreGrid {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let rows: Vec<Vec<Option<f64>>> = self
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|v| if v.is_finite() { Some(*v) } else { None })
                    .collect()
            })
            .collect();
        rows.serialize(serializer)
    }
}

/// Projects, capabilities, and the score grid, built together.
///
/// Only the matrix builder produces non-empty instances, which guarantees the
/// grid has one row per project and one column per capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatrixData {
    projects: Vec<Project>,
    capabilities: Vec<Capability>,
    values: ScoreGrid,
}

impl MatrixData {
    pub(crate) fn new(
        projects: Vec<Project>,
        capabilities: Vec<Capability>,
        values: ScoreGrid,
    ) -> Self {
        debug_assert_eq!(values.row_count(), projects.len());
        debug_assert!(values.rows().iter().all(|r| r.len() == capabilities.len()));
        Self {
            projects,
            capabilities,
            values,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn capabilities(&self) -> &[Capability] {
        &self.capabilities
    }

    pub fn values(&self) -> &ScoreGrid {
        &self.values
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() || self.capabilities.is_empty()
    }

    pub fn project_index(&self, id: &str) -> Option<usize> {
        self.projects.iter().position(|p| p.id == id)
    }

    pub fn capability_index(&self, id: &str) -> Option<usize> {
        self.capabilities.iter().position(|c| c.id == id)
    }

    /// Finite score for a cell, `None` when missing
    pub fn score(&self, project: usize, capability: usize) -> Option<f64> {
        let v = self.values.get(project, capability);
        v.is_finite().then_some(v)
    }
}

/// Output model exposed to rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixView {
    #[serde(flatten)]
    pub matrix: Arc<MatrixData>,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl MatrixView {
    pub fn projects(&self) -> &[Project] {
        self.matrix.projects()
    }

    pub fn capabilities(&self) -> &[Capability] {
        self.matrix.capabilities()
    }

    pub fn values(&self) -> &ScoreGrid {
        self.matrix.values()
    }
}
