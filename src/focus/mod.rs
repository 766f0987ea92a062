//! Per-pane focus memory and the fallback chain that always yields a target.

pub mod tree;

pub use tree::{Element, ElementId, VisualTree};

use std::collections::BTreeMap;
use std::fmt;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::pane::PaneId;

/// Cursor and scroll position a pane wants back when it regains focus.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewState {
    pub cursor: usize,
    pub scroll: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRecord {
    pub element: ElementId,
    pub view: ViewState,
    pub recorded_at: Instant,
}

/// Which step of the fallback chain produced a [`FocusTarget`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusSource {
    Recorded,
    Descendant,
    Container,
    TopLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTarget {
    pub element: ElementId,
    pub source: FocusSource,
    /// Present only when the recorded element itself was restored.
    pub view: Option<ViewState>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FallbackReason {
    NoRecord,
    DeadReference,
    Detached,
    Foreign,
    NoFocusableDescendant,
    ContainerNotFocusable,
}

impl fmt::Display for FallbackReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FallbackReason::NoRecord => "no record",
            FallbackReason::DeadReference => "dead reference",
            FallbackReason::Detached => "detached",
            FallbackReason::Foreign => "element belongs to another pane",
            FallbackReason::NoFocusableDescendant => "no focusable descendant",
            FallbackReason::ContainerNotFocusable => "container not focusable",
        };
        f.write_str(s)
    }
}

/// Remembers the last focused element of every pane.
///
/// Records hold generation-checked keys only, so a destroyed element is
/// detected in O(1) and never kept alive.
#[derive(Debug, Default)]
pub struct FocusHistoryManager {
    records: BTreeMap<PaneId, FocusRecord>,
}

impl FocusHistoryManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_focus(&mut self, pane: PaneId, element: ElementId, view: ViewState) {
        trace!(pane_id = %pane, ?element, "recording focus");
        self.records.insert(
            pane,
            FocusRecord {
                element,
                view,
                recorded_at: Instant::now(),
            },
        );
    }

    pub fn record(&self, pane: PaneId) -> Option<&FocusRecord> {
        self.records.get(&pane)
    }

    /// Resolve the element that should take input focus for `pane`.
    ///
    /// Tries the recorded element, then the first focusable descendant of
    /// `container`, then the container, then the window. Never fails.
    pub fn restore(&self, pane: PaneId, container: ElementId, tree: &VisualTree) -> FocusTarget {
        match self.recorded_target(pane, container, tree) {
            Ok(record) => {
                return FocusTarget {
                    element: record.element,
                    source: FocusSource::Recorded,
                    view: Some(record.view),
                };
            }
            Err(reason) => debug!(pane_id = %pane, %reason, "recorded focus unusable"),
        }

        if tree.is_attached(container) {
            if let Some(element) = tree.first_focusable_descendant(container) {
                return FocusTarget {
                    element,
                    source: FocusSource::Descendant,
                    view: None,
                };
            }
            debug!(pane_id = %pane, reason = %FallbackReason::NoFocusableDescendant, "falling back to container");
            if tree.is_focusable(container) {
                return FocusTarget {
                    element: container,
                    source: FocusSource::Container,
                    view: None,
                };
            }
            debug!(pane_id = %pane, reason = %FallbackReason::ContainerNotFocusable, "falling back to window");
        } else {
            debug!(pane_id = %pane, reason = %FallbackReason::Detached, "container unusable, falling back to window");
        }

        FocusTarget {
            element: tree.window(),
            source: FocusSource::TopLevel,
            view: None,
        }
    }

    fn recorded_target(
        &self,
        pane: PaneId,
        container: ElementId,
        tree: &VisualTree,
    ) -> Result<FocusRecord, FallbackReason> {
        let record = self.records.get(&pane).ok_or(FallbackReason::NoRecord)?;
        if !tree.contains(record.element) {
            return Err(FallbackReason::DeadReference);
        }
        if !tree.is_attached(record.element) {
            return Err(FallbackReason::Detached);
        }
        if !tree.is_descendant_of(record.element, container) {
            return Err(FallbackReason::Foreign);
        }
        Ok(*record)
    }

    pub fn forget(&mut self, pane: PaneId) {
        self.records.remove(&pane);
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Fixture {
        tree: VisualTree,
        container: ElementId,
        editor: ElementId,
        history: FocusHistoryManager,
    }

    fn fixture() -> Fixture {
        let mut tree = VisualTree::new();
        let container = tree.insert(tree.window(), "pane", true).unwrap();
        let header = tree.insert(container, "header", false).unwrap();
        let editor = tree.insert(header, "editor", true).unwrap();
        Fixture {
            tree,
            container,
            editor,
            history: FocusHistoryManager::new(),
        }
    }

    const PANE: PaneId = PaneId::new(1);

    #[test]
    fn live_record_is_restored_with_view() {
        let mut f = fixture();
        let view = ViewState { cursor: 7, scroll: 2 };
        f.history.record_focus(PANE, f.editor, view);
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.element, f.editor);
        assert_eq!(target.source, FocusSource::Recorded);
        assert_eq!(target.view, Some(view));
    }

    #[test]
    fn destroyed_element_falls_back_to_descendant() {
        let mut f = fixture();
        let field = f.tree.insert(f.container, "field", true).unwrap();
        f.history.record_focus(PANE, field, ViewState::default());
        f.tree.remove(field);
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.source, FocusSource::Descendant);
        assert_eq!(target.element, f.editor);
    }

    #[test]
    fn foreign_element_is_rejected() {
        let mut f = fixture();
        let other = f.tree.insert(f.tree.window(), "other-pane", true).unwrap();
        f.history.record_focus(PANE, other, ViewState::default());
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.source, FocusSource::Descendant);
    }

    #[test]
    fn unloaded_record_and_no_descendant_yields_container() {
        let mut f = fixture();
        f.history.record_focus(PANE, f.editor, ViewState::default());
        f.tree.set_focusable(f.editor, false);
        let header = f.tree.parent(f.editor).unwrap();
        f.tree.set_loaded(header, false);
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.source, FocusSource::Container);
        assert_eq!(target.element, f.container);
    }

    #[test]
    fn dead_container_yields_window() {
        let mut f = fixture();
        f.tree.remove(f.container);
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.source, FocusSource::TopLevel);
        assert_eq!(target.element, f.tree.window());
    }

    #[test]
    fn unfocusable_container_yields_window() {
        let mut f = fixture();
        f.tree.set_focusable(f.editor, false);
        f.tree.set_focusable(f.container, false);
        let target = f.history.restore(PANE, f.container, &f.tree);
        assert_eq!(target.source, FocusSource::TopLevel);
    }

    #[test]
    fn forget_purges_record() {
        let mut f = fixture();
        f.history.record_focus(PANE, f.editor, ViewState::default());
        assert_eq!(f.history.len(), 1);
        f.history.forget(PANE);
        assert!(f.history.record(PANE).is_none());
    }
}
