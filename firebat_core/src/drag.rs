//! Drag coordinator
//!
//! Tracks the in-flight drag and turns a drop into a new [`Layout`].
//! The coordinator never owns the layout; callers pass it in and store
//! whatever `drag_end` returns.

use crate::layout::{apply_move, ContainerId, DropTarget, Layout, MoveRequest, PanelId};

/// Drag state. Transient, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum DragState {
    #[default]
    Idle,
    Dragging {
        active: PanelId,
        source: ContainerId,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DragCoordinator {
    state: DragState,
}

impl DragCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    /// Panel being dragged, if any
    pub fn active(&self) -> Option<PanelId> {
        match self.state {
            DragState::Dragging { active, .. } => Some(active),
            DragState::Idle => None,
        }
    }

    pub fn is_dragging(&self) -> bool {
        self.active().is_some()
    }

    /// Begin dragging `panel`. Returns `false` (and stays idle) when the
    /// panel is not placed in `layout`.
    pub fn drag_start(&mut self, layout: &Layout, panel: PanelId) -> bool {
        match layout.find_container(panel) {
            Some(source) => {
                self.state = DragState::Dragging {
                    active: panel,
                    source: source.clone(),
                };
                true
            }
            None => {
                self.state = DragState::Idle;
                false
            }
        }
    }

    /// Finish the drag. Always returns to idle; the returned layout equals
    /// `layout` when there was no drag, no target, or an unresolvable target.
    pub fn drag_end(&mut self, layout: &Layout, over: Option<DropTarget>) -> Layout {
        let state = std::mem::take(&mut self.state);

        let (DragState::Dragging { active, .. }, Some(over)) = (state, over) else {
            return layout.clone();
        };

        if layout.resolve(&over).is_none() {
            tracing::debug!(panel = %active, "drop target not resolvable");
            return layout.clone();
        }

        apply_move(layout, &MoveRequest { active, over })
    }

    /// Abandon the drag, layout unchanged.
    pub fn drag_cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_records_source_container() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        assert!(drag.drag_start(&layout, PanelId::Ir));
        assert_eq!(
            drag.state(),
            &DragState::Dragging { active: PanelId::Ir, source: ContainerId::bottom() }
        );
    }

    #[test]
    fn test_end_without_target_keeps_layout() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        drag.drag_start(&layout, PanelId::Assembly);
        let next = drag.drag_end(&layout, None);
        assert_eq!(next, layout);
        assert_eq!(drag.state(), &DragState::Idle);
    }

    #[test]
    fn test_end_with_unknown_container_keeps_layout() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        drag.drag_start(&layout, PanelId::Assembly);
        let next = drag.drag_end(&layout, Some(DropTarget::Container(ContainerId::new("left"))));
        assert_eq!(next, layout);
        assert!(!drag.is_dragging());
    }

    #[test]
    fn test_end_moves_across_rows() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        drag.drag_start(&layout, PanelId::Assembly);
        let next = drag.drag_end(&layout, Some(DropTarget::Panel(PanelId::Ir)));
        assert_eq!(next.panels_in(&ContainerId::top()).unwrap(), &[PanelId::Sections]);
        assert_eq!(
            next.panels_in(&ContainerId::bottom()).unwrap(),
            &[PanelId::Assembly, PanelId::Ir, PanelId::Ast]
        );
        assert_eq!(drag.active(), None);
    }

    #[test]
    fn test_drop_onto_self_is_noop() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        drag.drag_start(&layout, PanelId::Ast);
        assert_eq!(drag.drag_end(&layout, Some(DropTarget::Panel(PanelId::Ast))), layout);
    }

    #[test]
    fn test_end_while_idle_is_noop() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        let next = drag.drag_end(&layout, Some(DropTarget::Container(ContainerId::top())));
        assert_eq!(next, layout);
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let layout = Layout::default();
        let mut drag = DragCoordinator::new();
        drag.drag_start(&layout, PanelId::Sections);
        drag.drag_cancel();
        assert_eq!(drag.state(), &DragState::Idle);
    }
}
