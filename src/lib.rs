//! Solutions Matrix - core of the AI opportunity map
//!
//! Turns a loosely structured tabular export (metadata columns, score columns,
//! and a label row embedded as data) into a typed projects × capabilities
//! matrix through a deterministic pipeline: row classification → matrix
//! building → score normalization → color mapping. A small state machine
//! resolves cell events into a single tooltip.
//!
//! ## Modules
//!
//! - **Pipeline**: `classifier`, `builder`, `normalizer`, `color`, `encoder`
//! - **State**: `store` (load generations, snapshots) and `interaction` (tooltip)
//! - **Sources**: CSV and JSON row sources standing in for the tabular parser

pub mod builder;
pub mod classifier;
pub mod color;
pub mod config;
pub mod encoder;
pub mod error;
pub mod interaction;
pub mod normalizer;
pub mod pipeline;
pub mod sources;
pub mod store;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use color::{ColorScale, Hsl, NEUTRAL_COLOR};
pub use config::MatrixConfig;
pub use error::MatrixError;
pub use interaction::{CellEvent, DeviceMode, InteractionResolver, TooltipPayload, TooltipState};
pub use normalizer::ScoreRange;
pub use pipeline::{build_matrix, csv_to_matrix_json, rows_json_to_render_json};
pub use store::{LoadOutcome, LoadState, MatrixStore};
pub use types::{Capability, MatrixData, MatrixView, Project, RawRow, RawValue};

/// Crate version embedded in render models
pub const MATRIX_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for render models
pub const PRODUCER_NAME: &str = "solutions-matrix";
