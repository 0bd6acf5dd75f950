//! Row sources
//!
//! A row source stands in for the external tabular parser: it yields parsed
//! rows (column key to raw value) with the first row reserved as the label
//! row. The core never calls a source directly; the store and the CLI do.

mod csv;
mod json;

pub use self::csv::CsvRowSource;
pub use self::json::JsonRowSource;

use crate::error::MatrixError;
use crate::types::RawRow;

/// Trait for tabular row sources
pub trait RowSource {
    /// Fetch and parse all rows, header-keyed, in source order
    fn fetch(&self) -> Result<Vec<RawRow>, MatrixError>;
}
