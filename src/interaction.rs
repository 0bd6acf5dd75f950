//! Tooltip interaction state machine
//!
//! Resolves cell events from the rendering layer into at most one active
//! tooltip. Hover-capable devices show on enter and dismiss on leave; touch
//! devices show on tap and only dismiss explicitly.

use crate::types::{Capability, MatrixData, Project};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Tooltips anchored closer than this to the viewport top are placed below the cell
pub const PLACEMENT_THRESHOLD_PX: f64 = 150.0;

/// Input capability of the device, read once at startup
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceMode {
    Touch,
    Pointer,
}

impl DeviceMode {
    /// Touch-capable when the environment exposes touch events or touch points
    pub fn detect(has_touch_events: bool, max_touch_points: u32) -> Self {
        if has_touch_events || max_touch_points > 0 {
            DeviceMode::Touch
        } else {
            DeviceMode::Pointer
        }
    }
}

/// A matrix cell addressed by project and capability identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellRef {
    pub project_id: String,
    pub capability_id: String,
}

impl CellRef {
    pub fn new(project_id: impl Into<String>, capability_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            capability_id: capability_id.into(),
        }
    }
}

/// On-screen rectangle of a cell at interaction time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellBounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl CellBounds {
    /// Horizontal center of the top edge
    pub fn anchor(&self) -> Anchor {
        Anchor {
            x: self.left + self.width / 2.0,
            y: self.top,
        }
    }
}

/// Screen coordinates the tooltip points at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub x: f64,
    pub y: f64,
}

/// Events emitted by the rendering layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CellEvent {
    CellEnter { cell: CellRef, bounds: CellBounds },
    CellLeave { cell: CellRef },
    CellTap { cell: CellRef, bounds: CellBounds },
    TooltipClose,
    /// Pointer or touch down outside the tooltip's bounds
    OutsideInteraction,
}

/// Which side of the anchor the tooltip is drawn on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TooltipPlacement {
    Above,
    Below,
}

/// Content of the active tooltip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipPayload {
    pub project: Project,
    pub capability: Capability,
    /// Raw (not normalized) score
    pub score: f64,
    pub anchor: Anchor,
}

impl TooltipPayload {
    /// Relevance as a percentage with one decimal, e.g. `82.0`
    pub fn formatted_score(&self) -> String {
        format!("{:.1}", self.score * 100.0)
    }

    pub fn placement(&self) -> TooltipPlacement {
        if self.anchor.y < PLACEMENT_THRESHOLD_PX {
            TooltipPlacement::Below
        } else {
            TooltipPlacement::Above
        }
    }

    fn is_for(&self, cell: &CellRef) -> bool {
        self.project.id == cell.project_id && self.capability.id == cell.capability_id
    }
}

/// Tooltip state: idle or showing exactly one payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", content = "payload", rename_all = "snake_case")]
pub enum TooltipState {
    #[default]
    Idle,
    Showing(TooltipPayload),
}

/// Effect of an event on the tooltip state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    /// Idle → Showing
    Shown,
    /// Showing → Showing with a different payload
    Moved,
    /// Showing → Idle
    Hidden,
    Unchanged,
}

/// Single writer of the tooltip state
#[derive(Debug, Clone)]
pub struct InteractionResolver {
    mode: DeviceMode,
    state: TooltipState,
}

impl InteractionResolver {
    pub fn new(mode: DeviceMode) -> Self {
        Self {
            mode,
            state: TooltipState::Idle,
        }
    }

    pub fn mode(&self) -> DeviceMode {
        self.mode
    }

    pub fn state(&self) -> &TooltipState {
        &self.state
    }

    /// Active payload, if any
    pub fn active(&self) -> Option<&TooltipPayload> {
        match &self.state {
            TooltipState::Idle => None,
            TooltipState::Showing(payload) => Some(payload),
        }
    }

    /// Drop any tooltip, e.g. after the matrix is reloaded
    pub fn reset(&mut self) -> Transition {
        self.hide()
    }

    /// Apply one event against the current matrix snapshot
    pub fn handle(&mut self, event: &CellEvent, matrix: &MatrixData) -> Transition {
        let transition = match event {
            CellEvent::CellEnter { cell, bounds } => match self.mode {
                DeviceMode::Pointer => self.show_cell(cell, bounds, matrix),
                DeviceMode::Touch => Transition::Unchanged,
            },
            CellEvent::CellLeave { cell } => match self.mode {
                DeviceMode::Pointer if resolve_score(cell, matrix).is_some() => self.hide(),
                _ => Transition::Unchanged,
            },
            CellEvent::CellTap { cell, bounds } => self.show_cell(cell, bounds, matrix),
            CellEvent::TooltipClose | CellEvent::OutsideInteraction => self.hide(),
        };

        if transition != Transition::Unchanged {
            debug!(?transition, mode = ?self.mode, "tooltip state changed");
        }
        transition
    }

    fn show_cell(&mut self, cell: &CellRef, bounds: &CellBounds, matrix: &MatrixData) -> Transition {
        let Some((project, capability, score)) = resolve_score(cell, matrix) else {
            return Transition::Unchanged;
        };

        let payload = TooltipPayload {
            project: project.clone(),
            capability: capability.clone(),
            score,
            anchor: bounds.anchor(),
        };

        let transition = match &self.state {
            TooltipState::Idle => Transition::Shown,
            TooltipState::Showing(current) if current.is_for(cell) && current.anchor == payload.anchor => {
                return Transition::Unchanged;
            }
            TooltipState::Showing(_) => Transition::Moved,
        };

        self.state = TooltipState::Showing(payload);
        transition
    }

    fn hide(&mut self) -> Transition {
        match std::mem::take(&mut self.state) {
            TooltipState::Idle => Transition::Unchanged,
            TooltipState::Showing(_) => Transition::Hidden,
        }
    }
}

/// Look up a cell; `None` when it is unknown or its score is missing
fn resolve_score<'m>(
    cell: &CellRef,
    matrix: &'m MatrixData,
) -> Option<(&'m Project, &'m Capability, f64)> {
    let p = matrix.project_index(&cell.project_id)?;
    let c = matrix.capability_index(&cell.capability_id)?;
    let score = matrix.score(p, c)?;
    Some((&matrix.projects()[p], &matrix.capabilities()[c], score))
}
