//! Deadline timers polled from the idle tick.
//!
//! Every timer belongs to a pane so closing the pane can cancel all of them
//! before the pane is disposed.

use std::time::Instant;

use crate::pane::PaneId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerAction {
    ClearBoundaryFlash,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timer {
    pub id: TimerId,
    pub pane: PaneId,
    pub deadline: Instant,
    pub action: TimerAction,
}

#[derive(Debug, Default)]
pub struct TimerQueue {
    next_id: u64,
    timers: Vec<Timer>,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, pane: PaneId, deadline: Instant, action: TimerAction) -> TimerId {
        self.next_id += 1;
        let id = TimerId(self.next_id);
        self.timers.push(Timer {
            id,
            pane,
            deadline,
            action,
        });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.id != id);
        self.timers.len() != before
    }

    pub fn cancel_for_pane(&mut self, pane: PaneId) -> usize {
        let before = self.timers.len();
        self.timers.retain(|timer| timer.pane != pane);
        before - self.timers.len()
    }

    /// Remove and return every timer whose deadline is at or before `now`,
    /// earliest first.
    pub fn take_due(&mut self, now: Instant) -> Vec<Timer> {
        let (mut due, pending): (Vec<_>, Vec<_>) =
            self.timers.drain(..).partition(|timer| timer.deadline <= now);
        self.timers = pending;
        due.sort_by_key(|timer| (timer.deadline, timer.id));
        due
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.timers.iter().map(|timer| timer.deadline).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}
