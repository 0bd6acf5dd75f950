//! Matrix load state
//!
//! Owns the current matrix snapshot, the load generation used to discard
//! superseded loads, and the tooltip resolver bound to the snapshot.
//!
//! A load is split in two: [`MatrixStore::begin_load`] hands out a ticket and
//! enters `Loading`; [`MatrixStore::complete`] applies the fetched rows only if
//! the ticket is still current. The snapshot is replaced in one assignment,
//! so a reader never sees a grid that disagrees with its project and
//! capability lists.

use crate::config::MatrixConfig;
use crate::error::MatrixError;
use crate::interaction::{CellEvent, DeviceMode, InteractionResolver, Transition};
use crate::pipeline::build_matrix;
use crate::sources::RowSource;
use crate::types::{MatrixData, MatrixView, RawRow};
use std::sync::Arc;
use tracing::{info, warn};

/// Lifecycle of the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadState {
    Loading,
    Ready,
    Failed(String),
}

/// Proof that a load was started; carries its generation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    /// Rebuild a ticket handed across the C boundary as a bare generation
    pub(crate) fn from_generation(generation: u64) -> Self {
        Self { generation }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a completed load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The result replaced the current state
    Applied,
    /// A newer load was started; the result was discarded
    Superseded,
}

/// Stateful holder of the matrix and its tooltip
pub struct MatrixStore {
    config: MatrixConfig,
    generation: u64,
    state: LoadState,
    matrix: Arc<MatrixData>,
    resolver: InteractionResolver,
}

impl MatrixStore {
    /// Create a store; device mode is fixed for its lifetime
    pub fn new(config: MatrixConfig, mode: DeviceMode) -> Self {
        Self {
            config,
            generation: 0,
            state: LoadState::Loading,
            matrix: Arc::new(MatrixData::empty()),
            resolver: InteractionResolver::new(mode),
        }
    }

    pub fn config(&self) -> &MatrixConfig {
        &self.config
    }

    pub fn state(&self) -> &LoadState {
        &self.state
    }

    pub fn is_loading(&self) -> bool {
        self.state == LoadState::Loading
    }

    /// Current matrix snapshot
    pub fn snapshot(&self) -> Arc<MatrixData> {
        Arc::clone(&self.matrix)
    }

    pub fn resolver(&self) -> &InteractionResolver {
        &self.resolver
    }

    /// Output model for rendering
    pub fn view(&self) -> MatrixView {
        MatrixView {
            matrix: self.snapshot(),
            is_loading: self.is_loading(),
            error: match &self.state {
                LoadState::Failed(message) => Some(message.clone()),
                _ => None,
            },
        }
    }

    /// Start a load, invalidating any load still outstanding
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        self.state = LoadState::Loading;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// Apply the result of a load if its ticket is still current
    pub fn complete(
        &mut self,
        ticket: LoadTicket,
        result: Result<Vec<RawRow>, MatrixError>,
    ) -> LoadOutcome {
        if ticket.generation != self.generation {
            warn!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded load"
            );
            return LoadOutcome::Superseded;
        }

        match result.and_then(|rows| build_matrix(&rows, &self.config)) {
            Ok(matrix) => {
                info!(
                    projects = matrix.projects().len(),
                    capabilities = matrix.capabilities().len(),
                    "matrix loaded"
                );
                self.matrix = Arc::new(matrix);
                self.state = LoadState::Ready;
            }
            Err(e) => {
                warn!(error = %e, "matrix load failed");
                self.matrix = Arc::new(MatrixData::empty());
                self.state = LoadState::Failed(e.to_string());
            }
        }

        // Tooltips reference entities of the replaced snapshot.
        self.resolver.reset();
        LoadOutcome::Applied
    }

    /// Fetch from a row source and apply the result
    pub fn load_from(&mut self, source: &dyn RowSource) -> LoadOutcome {
        let ticket = self.begin_load();
        let rows = source.fetch();
        self.complete(ticket, rows)
    }

    /// Route a rendering event to the tooltip resolver
    pub fn handle_event(&mut self, event: &CellEvent) -> Transition {
        self.resolver.handle(event, &self.matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interaction::{CellBounds, CellRef};
    use crate::sources::JsonRowSource;

    fn rows(ids: &[&str]) -> Vec<RawRow> {
        let mut rows = vec![RawRow::new().with("solution_id", "").with("x", "Drones")];
        for id in ids {
            rows.push(RawRow::new().with("solution_id", *id).with("x", 0.5));
        }
        rows
    }

    #[test]
    fn test_initial_state_is_loading() {
        let store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let view = store.view();
        assert!(view.is_loading);
        assert!(view.error.is_none());
        assert!(view.projects().is_empty());
    }

    #[test]
    fn test_successful_load() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let ticket = store.begin_load();
        assert_eq!(store.complete(ticket, Ok(rows(&["P1", "P2"]))), LoadOutcome::Applied);

        let view = store.view();
        assert!(!view.is_loading);
        assert_eq!(view.projects().len(), 2);
        assert_eq!(view.values().row_count(), 2);
        assert_eq!(store.state(), &LoadState::Ready);
    }

    #[test]
    fn test_superseded_load_is_ignored() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let first = store.begin_load();
        let second = store.begin_load();

        assert_eq!(store.complete(second, Ok(rows(&["NEW"]))), LoadOutcome::Applied);
        assert_eq!(store.complete(first, Ok(rows(&["OLD1", "OLD2"]))), LoadOutcome::Superseded);

        let snapshot = store.snapshot();
        assert_eq!(snapshot.projects().len(), 1);
        assert_eq!(snapshot.projects()[0].id, "NEW");
    }

    #[test]
    fn test_stale_completion_while_pending_keeps_loading() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let first = store.begin_load();
        let _second = store.begin_load();

        assert_eq!(store.complete(first, Ok(rows(&["OLD"]))), LoadOutcome::Superseded);
        assert!(store.is_loading());
        assert!(store.snapshot().is_empty());
    }

    #[test]
    fn test_failure_clears_previous_matrix() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let ticket = store.begin_load();
        store.complete(ticket, Ok(rows(&["P1"])));

        let ticket = store.begin_load();
        store.complete(
            ticket,
            Err(MatrixError::LoadFailure("connection reset".to_string())),
        );

        let view = store.view();
        assert!(!view.is_loading);
        assert!(view.projects().is_empty());
        assert!(view.capabilities().is_empty());
        assert_eq!(
            view.error.as_deref(),
            Some("Failed to load dataset: connection reset")
        );
    }

    #[test]
    fn test_build_errors_surface_distinct_messages() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);

        let ticket = store.begin_load();
        store.complete(ticket, Ok(Vec::new()));
        let empty = store.view().error.unwrap();

        let ticket = store.begin_load();
        store.complete(ticket, Ok(rows(&[])));
        let no_rows = store.view().error.unwrap();

        assert_ne!(empty, no_rows);
        assert_eq!(store.state(), &LoadState::Failed(no_rows));
    }

    #[test]
    fn test_reload_dismisses_tooltip() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Touch);
        let ticket = store.begin_load();
        store.complete(ticket, Ok(rows(&["P1"])));

        let tap = CellEvent::CellTap {
            cell: CellRef::new("P1", "x"),
            bounds: CellBounds {
                left: 0.0,
                top: 200.0,
                width: 10.0,
                height: 10.0,
            },
        };
        assert_eq!(store.handle_event(&tap), Transition::Shown);

        let ticket = store.begin_load();
        store.complete(ticket, Ok(rows(&["P1"])));
        assert!(store.resolver().active().is_none());
    }

    #[test]
    fn test_load_from_source() {
        let source = JsonRowSource::new(
            r#"[{"solution_id": null, "x": "Drones"}, {"solution_id": "P1", "x": "0.3"}]"#,
        );
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        assert_eq!(store.load_from(&source), LoadOutcome::Applied);
        assert_eq!(store.snapshot().capabilities()[0].label, "Drones");
    }

    #[test]
    fn test_view_serializes_output_model() {
        let mut store = MatrixStore::new(MatrixConfig::default(), DeviceMode::Pointer);
        let ticket = store.begin_load();
        store.complete(ticket, Ok(rows(&["P1"])));

        let json = serde_json::to_value(store.view()).unwrap();
        assert_eq!(json["isLoading"], false);
        assert!(json["error"].is_null());
        assert_eq!(json["projects"][0]["id"], "P1");
        assert_eq!(json["capabilities"][0]["label"], "Drones");
        assert_eq!(json["values"][0][0], 0.5);
    }
}
