//! JSON row source
//!
//! Accepts a top-level array of objects, the shape a header-mode tabular
//! parser produces. Object key order is kept as column order.

use crate::error::MatrixError;
use crate::types::RawRow;

use super::RowSource;

/// JSON array-of-objects source
pub struct JsonRowSource {
    content: String,
}

impl JsonRowSource {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

impl RowSource for JsonRowSource {
    fn fetch(&self) -> Result<Vec<RawRow>, MatrixError> {
        let rows: Vec<RawRow> = serde_json::from_str(&self.content)?;
        Ok(rows)
    }
}
