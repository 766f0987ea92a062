//! Boundary feedback: what happens when navigation runs off the layout edge.

use crate::layout::NavDirection;
use crate::pane::PaneId;

/// Notified once per navigation or move that finds no neighbour.
pub trait BoundaryFeedback {
    fn on_boundary(&mut self, pane: PaneId, direction: NavDirection);
}

/// Feedback sink that ignores every boundary hit.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl BoundaryFeedback for NoFeedback {
    fn on_boundary(&mut self, _pane: PaneId, _direction: NavDirection) {}
}

impl<F> BoundaryFeedback for F
where
    F: FnMut(PaneId, NavDirection),
{
    fn on_boundary(&mut self, pane: PaneId, direction: NavDirection) {
        self(pane, direction)
    }
}
