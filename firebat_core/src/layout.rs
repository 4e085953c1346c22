//! # Panel Layout
//!
//! The panel registry and the assignment of panels to ordered containers.
//!
//! ```text
//! Layout
//! ├── top:    [section-panel, asm-panel]
//! └── bottom: [ir-panel, ast-panel]
//! ```
//!
//! Moves are computed by [`apply_move`], a pure function over
//! `(Layout, MoveRequest) -> Layout`, so pointer/drag plumbing in the front
//! end never edits rows directly.
//!
//! ## Example
//!
//! ```rust
//! use firebat_core::layout::{apply_move, ContainerId, DropTarget, Layout, MoveRequest, PanelId};
//!
//! let layout = Layout::default();
//! let moved = apply_move(&layout, &MoveRequest {
//!     active: PanelId::Sections,
//!     over: DropTarget::Container(ContainerId::bottom()),
//! });
//! assert_eq!(moved.panels_in(&ContainerId::bottom()).unwrap().last(), Some(&PanelId::Sections));
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{FirebatError, FirebatResult};

/// The four content slots of the window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PanelId {
    #[serde(rename = "section-panel")]
    Sections,
    #[serde(rename = "asm-panel")]
    Assembly,
    #[serde(rename = "ir-panel")]
    Ir,
    #[serde(rename = "ast-panel")]
    Ast,
}

impl PanelId {
    /// The static panel registry, in default placement order
    pub const ALL: &'static [PanelId] = &[
        PanelId::Sections,
        PanelId::Assembly,
        PanelId::Ir,
        PanelId::Ast,
    ];

    /// Stable identifier used in settings files
    pub fn id(&self) -> &'static str {
        match self {
            PanelId::Sections => "section-panel",
            PanelId::Assembly => "asm-panel",
            PanelId::Ir => "ir-panel",
            PanelId::Ast => "ast-panel",
        }
    }

    /// Panel heading shown in the UI
    pub fn title(&self) -> &'static str {
        match self {
            PanelId::Sections => "Section Panel",
            PanelId::Assembly => "Assembly Panel",
            PanelId::Ir => "IR Panel",
            PanelId::Ast => "AST Panel",
        }
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Name of an ordered panel container (a row in the default window).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerId(pub String);

impl ContainerId {
    pub fn new(id: impl Into<String>) -> Self {
        ContainerId(id.into())
    }

    pub fn top() -> Self {
        ContainerId::new("top")
    }

    pub fn bottom() -> Self {
        ContainerId::new("bottom")
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One container and the panels it holds, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Row {
    pub id: ContainerId,
    pub panels: Vec<PanelId>,
}

/// Where a dragged panel was released.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropTarget {
    /// The container itself (its empty area)
    Container(ContainerId),
    /// A specific panel inside some container
    Panel(PanelId),
}

/// A single drag-and-drop move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    pub active: PanelId,
    pub over: DropTarget,
}

/// Current placement of every registered panel.
///
/// Invariant: every panel of [`PanelId::ALL`] appears in exactly one row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Row>", into = "Vec<Row>")]
pub struct Layout {
    rows: Vec<Row>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            rows: vec![
                Row {
                    id: ContainerId::top(),
                    panels: vec![PanelId::Sections, PanelId::Assembly],
                },
                Row {
                    id: ContainerId::bottom(),
                    panels: vec![PanelId::Ir, PanelId::Ast],
                },
            ],
        }
    }
}

impl TryFrom<Vec<Row>> for Layout {
    type Error = FirebatError;

    fn try_from(rows: Vec<Row>) -> FirebatResult<Self> {
        Layout::new(rows)
    }
}

impl From<Layout> for Vec<Row> {
    fn from(layout: Layout) -> Self {
        layout.rows
    }
}

impl Layout {
    /// Build a layout from rows, checking the placement invariant.
    pub fn new(rows: Vec<Row>) -> FirebatResult<Self> {
        let mut containers = HashSet::new();
        let mut placed = HashSet::new();

        for row in &rows {
            if !containers.insert(row.id.clone()) {
                return Err(FirebatError::invalid_layout(format!(
                    "container '{}' declared twice",
                    row.id
                )));
            }
            for panel in &row.panels {
                if !placed.insert(*panel) {
                    return Err(FirebatError::invalid_layout(format!(
                        "panel '{}' placed twice",
                        panel
                    )));
                }
            }
        }

        if let Some(missing) = PanelId::ALL.iter().find(|p| !placed.contains(*p)) {
            return Err(FirebatError::invalid_layout(format!(
                "panel '{}' is not placed in any container",
                missing
            )));
        }

        Ok(Layout { rows })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn panels_in(&self, container: &ContainerId) -> Option<&[PanelId]> {
        self.rows
            .iter()
            .find(|r| &r.id == container)
            .map(|r| r.panels.as_slice())
    }

    /// Total number of placed panels across all containers
    pub fn panel_count(&self) -> usize {
        self.rows.iter().map(|r| r.panels.len()).sum()
    }

    /// Container currently holding `panel`
    pub fn find_container(&self, panel: PanelId) -> Option<&ContainerId> {
        self.row_index_of(panel).map(|i| &self.rows[i].id)
    }

    /// Container a drop target refers to, if it can be resolved
    pub fn resolve(&self, target: &DropTarget) -> Option<&ContainerId> {
        self.resolve_index(target).map(|i| &self.rows[i].id)
    }

    fn row_index_of(&self, panel: PanelId) -> Option<usize> {
        self.rows.iter().position(|r| r.panels.contains(&panel))
    }

    fn resolve_index(&self, target: &DropTarget) -> Option<usize> {
        match target {
            DropTarget::Container(id) => self.rows.iter().position(|r| &r.id == id),
            DropTarget::Panel(panel) => self.row_index_of(*panel),
        }
    }
}

/// Compute the layout that results from dropping `request.active` on
/// `request.over`.
///
/// - Unresolvable source or target: layout unchanged.
/// - Same container: the panel is removed and reinserted at the target's
///   index, or at the end when dropped on the row itself. Dropping onto
///   itself is a no-op.
/// - Different container: the panel leaves its row and is inserted at the
///   target panel's index, or at the end when dropped on the row itself.
pub fn apply_move(layout: &Layout, request: &MoveRequest) -> Layout {
    let mut next = layout.clone();

    let Some(from) = layout.row_index_of(request.active) else {
        return next;
    };
    let Some(to) = layout.resolve_index(&request.over) else {
        return next;
    };

    if from == to {
        let panels = &mut next.rows[from].panels;
        let Some(old_index) = panels.iter().position(|p| *p == request.active) else {
            return next;
        };
        let new_index = match request.over {
            DropTarget::Panel(over) if over == request.active => return next,
            DropTarget::Panel(over) => match panels.iter().position(|p| *p == over) {
                Some(index) => index,
                None => return next,
            },
            DropTarget::Container(_) => panels.len() - 1,
        };
        let moving = panels.remove(old_index);
        panels.insert(new_index, moving);
    } else {
        let source = &mut next.rows[from].panels;
        let Some(old_index) = source.iter().position(|p| *p == request.active) else {
            return next;
        };
        let moving = source.remove(old_index);

        let dest = &mut next.rows[to].panels;
        let insert_at = match request.over {
            DropTarget::Container(_) => dest.len(),
            DropTarget::Panel(over) => dest.iter().position(|p| *p == over).unwrap_or(0),
        };
        dest.insert(insert_at, moving);
    }

    next
}
