mod pane_manager;

pub use pane_manager::{InputFocus, ManagerConfig, PaneManager, RestoreReport};

/// Cyclic focus order over a list of ids.
#[derive(Debug, Clone)]
pub struct FocusRing<T: Copy + Eq> {
    order: Vec<T>,
    current: Option<T>,
}

impl<T: Copy + Eq> FocusRing<T> {
    pub fn new(current: Option<T>) -> Self {
        Self {
            order: Vec::new(),
            current,
        }
    }

    pub fn set_order(&mut self, order: Vec<T>) {
        self.order = order;
    }

    pub fn current(&self) -> Option<T> {
        self.current
    }

    /// Step to the next (or previous) id. Without a current id the ring
    /// starts at the first (or last) entry.
    pub fn advance(&mut self, forward: bool) {
        if self.order.is_empty() {
            return;
        }
        let len = self.order.len() as isize;
        let position = self
            .current
            .and_then(|current| self.order.iter().position(|item| *item == current));
        let next = match position {
            Some(idx) => {
                let step = if forward { 1isize } else { -1isize };
                (idx as isize + step).rem_euclid(len) as usize
            }
            None if forward => 0,
            None => self.order.len() - 1,
        };
        self.current = Some(self.order[next]);
    }
}
