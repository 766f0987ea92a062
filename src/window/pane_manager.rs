use std::time::{Duration, Instant};

use ratatui::prelude::Rect;
use serde_json::Value;

use super::FocusRing;
use crate::constants::{BOUNDARY_FLASH_MS, DEFAULT_MASTER_RATIO, MIN_PANE_SIZE};
use crate::error::PaneError;
use crate::feedback::BoundaryFeedback;
use crate::focus::{ElementId, FocusHistoryManager, FocusSource, VisualTree};
use crate::layout::{
    LayoutMode, NavDirection, RegionMap, TilingLayoutEngine, doubled_center, find_neighbor,
    find_wrapped,
};
use crate::pane::{Lifecycle, Pane, PaneDescriptor, PaneFactory, PaneId, PaneKind};
use crate::timers::{TimerAction, TimerQueue};
use crate::workspace::Workspace;

/// Knobs the pane manager is constructed with.
#[derive(Debug, Clone, PartialEq)]
pub struct ManagerConfig {
    pub layout_mode: LayoutMode,
    pub master_ratio: f32,
    pub min_pane_size: u16,
    pub flash_duration: Duration,
    pub wraparound: bool,
    pub canvas: Rect,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            layout_mode: LayoutMode::Auto,
            master_ratio: DEFAULT_MASTER_RATIO,
            min_pane_size: MIN_PANE_SIZE,
            flash_duration: Duration::from_millis(BOUNDARY_FLASH_MS),
            wraparound: false,
            canvas: Rect::new(0, 0, 120, 40),
        }
    }
}

/// The element that currently owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputFocus {
    /// `None` when input sits on the top-level window.
    pub pane: Option<PaneId>,
    pub element: ElementId,
    pub source: FocusSource,
}

/// Outcome of rehydrating a workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreReport {
    pub opened: Vec<PaneId>,
    /// Kinds whose descriptors could not be turned back into panes.
    pub skipped: Vec<PaneKind>,
    pub focused: Option<PaneId>,
}

/// Owns the live panes of the visible workspace.
///
/// Every mutation runs on the loop thread. Focus changes update the pane
/// flags immediately, but the input element is only resolved on the next
/// [`on_idle`](PaneManager::on_idle) call, once the pane's visual exists.
pub struct PaneManager {
    panes: Vec<Pane>,
    engine: TilingLayoutEngine<PaneId>,
    mode: LayoutMode,
    canvas: Rect,
    regions: RegionMap<PaneId>,
    focused: Option<PaneId>,
    // Some(saved) while a modal surface owns focus
    modal: Option<Option<PaneId>>,
    pending_focus: Option<PaneId>,
    input_focus: Option<InputFocus>,
    history: FocusHistoryManager,
    tree: VisualTree,
    timers: TimerQueue,
    factory: Box<dyn PaneFactory>,
    feedback: Box<dyn BoundaryFeedback>,
    config: ManagerConfig,
    context_filter: Option<String>,
    next_pane_seq: u64,
}

impl PaneManager {
    pub fn new(
        factory: Box<dyn PaneFactory>,
        feedback: Box<dyn BoundaryFeedback>,
        config: ManagerConfig,
    ) -> Self {
        Self {
            panes: Vec::new(),
            engine: TilingLayoutEngine::new(config.master_ratio, config.min_pane_size),
            mode: config.layout_mode,
            canvas: config.canvas,
            regions: RegionMap::default(),
            focused: None,
            modal: None,
            pending_focus: None,
            input_focus: None,
            history: FocusHistoryManager::new(),
            tree: VisualTree::new(),
            timers: TimerQueue::new(),
            factory,
            feedback,
            config,
            context_filter: None,
            next_pane_seq: 1,
        }
    }

    fn allocate_id(&mut self) -> PaneId {
        let seq = self.next_pane_seq;
        self.next_pane_seq = seq.saturating_add(1);
        PaneId::new(seq)
    }

    /// Create a pane from `descriptor`, tile it and focus it.
    pub fn open_pane(&mut self, descriptor: &PaneDescriptor) -> Result<PaneId, PaneError> {
        let id = self.open_unfocused(descriptor)?;
        self.relayout();
        self.focus_pane(id);
        Ok(id)
    }

    fn open_unfocused(&mut self, descriptor: &PaneDescriptor) -> Result<PaneId, PaneError> {
        let kind = descriptor.kind.clone();
        let mut content = self.factory.create(&kind)?;
        let restored = if descriptor.state.is_null() {
            Ok(())
        } else {
            content.restore_state(&descriptor.state)
        };
        if let Err(err) = restored.and_then(|()| content.initialize()) {
            content.dispose();
            return Err(err);
        }

        let window = self.tree.window();
        let Some(container) =
            self.tree
                .insert(window, format!("{kind} container"), content.container_focusable())
        else {
            content.dispose();
            return Err(PaneError::Construction {
                kind,
                reason: "window element is gone".to_string(),
            });
        };
        let id = self.allocate_id();
        content.build_visual(&mut self.tree, container);
        content.on_context_changed(self.context_filter.as_deref());

        let mut pane = Pane::new(id, kind, container, content);
        pane.lifecycle = Lifecycle::Active;
        if let Some(weights) = descriptor.weights {
            self.engine.set_weights(id, weights);
        }
        tracing::info!(pane_id = %id, kind = %pane.kind, "opened pane");
        self.panes.push(pane);
        Ok(id)
    }

    /// Dispose `id` and tile the remaining panes. Returns false for an
    /// unknown id.
    pub fn close_pane(&mut self, id: PaneId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let was_focused = self.focused == Some(id);
        let was_modal_saved = self.modal == Some(Some(id));
        let closed_rect = self.regions.get(id);
        let previous_regions = self.regions.clone();

        let pane = self.panes.remove(index);
        self.teardown(pane);
        if self.pending_focus == Some(id) {
            self.pending_focus = None;
        }
        self.relayout();

        if was_focused || was_modal_saved {
            self.focused = None;
            match self.successor(closed_rect, &previous_regions, index) {
                Some(next) => {
                    tracing::debug!(closed = %id, next = %next, "reassigning focus after close");
                    if let Some(saved) = self.modal.as_mut() {
                        *saved = None;
                    }
                    self.focus_pane(next);
                }
                None => {
                    self.input_focus = Some(InputFocus {
                        pane: None,
                        element: self.tree.window(),
                        source: FocusSource::TopLevel,
                    });
                }
            }
        }
        true
    }

    fn teardown(&mut self, mut pane: Pane) {
        pane.lifecycle = Lifecycle::Disposing;
        self.timers.cancel_for_pane(pane.id);
        self.history.forget(pane.id);
        self.engine.forget(pane.id);
        pane.content.dispose();
        self.tree.remove(pane.container);
        if self.input_focus.is_some_and(|focus| focus.pane == Some(pane.id)) {
            self.input_focus = None;
        }
        tracing::info!(pane_id = %pane.id, kind = %pane.kind, "disposed pane");
    }

    /// Remaining pane whose old centre is nearest the closed pane's centre.
    /// Without geometry, the pane now occupying the closed slot (or the
    /// last one) wins.
    fn successor(
        &self,
        closed: Option<Rect>,
        previous: &RegionMap<PaneId>,
        index: usize,
    ) -> Option<PaneId> {
        let by_geometry = closed.and_then(|closed| {
            let (cx, cy) = doubled_center(closed);
            self.panes
                .iter()
                .filter_map(|pane| {
                    let rect = previous.get(pane.id)?;
                    let (x, y) = doubled_center(rect);
                    let dist = (x - cx).pow(2) + (y - cy).pow(2);
                    Some((dist, pane.id))
                })
                .min()
                .map(|(_, id)| id)
        });
        by_geometry.or_else(|| {
            self.panes
                .get(index)
                .or_else(|| self.panes.last())
                .map(|pane| pane.id)
        })
    }

    /// Swap `id` with its neighbour in `direction`.
    pub fn move_pane(&mut self, id: PaneId, direction: NavDirection) -> bool {
        let Some(from) = self.index_of(id) else {
            return false;
        };
        let Some(target) = self.neighbor(id, direction) else {
            self.signal_boundary(id, direction);
            return false;
        };
        let Some(to) = self.index_of(target) else {
            return false;
        };
        self.panes.swap(from, to);
        tracing::debug!(pane_id = %id, with = %target, %direction, "moved pane");
        self.relayout();
        true
    }

    /// Move focus to the neighbour in `direction`. At the layout edge the
    /// boundary feedback fires instead and focus stays put.
    pub fn navigate_focus(&mut self, direction: NavDirection) -> Option<PaneId> {
        let current = self.focused?;
        match self.neighbor(current, direction) {
            Some(target) => {
                self.focus_pane(target);
                Some(target)
            }
            None => {
                self.signal_boundary(current, direction);
                None
            }
        }
    }

    fn neighbor(&self, id: PaneId, direction: NavDirection) -> Option<PaneId> {
        find_neighbor(&self.regions, id, direction).or_else(|| {
            if self.config.wraparound {
                find_wrapped(&self.regions, id, direction)
            } else {
                None
            }
        })
    }

    fn signal_boundary(&mut self, id: PaneId, direction: NavDirection) {
        tracing::debug!(pane_id = %id, %direction, "no neighbour");
        self.feedback.on_boundary(id, direction);
        let deadline = Instant::now() + self.config.flash_duration;
        let Some(pane) = self.panes.iter_mut().find(|pane| pane.id == id) else {
            return;
        };
        if let Some(timer) = pane.flash_timer.take() {
            self.timers.cancel(timer);
        }
        pane.boundary_flash = Some(direction);
        pane.flash_timer =
            Some(self.timers.schedule(id, deadline, TimerAction::ClearBoundaryFlash));
    }

    /// Make `id` the focused pane. Input focus follows on the next idle tick.
    pub fn focus_pane(&mut self, id: PaneId) -> bool {
        if self.index_of(id).is_none() {
            return false;
        }
        if let Some(saved) = self.modal.as_mut() {
            *saved = Some(id);
            return true;
        }
        if self.focused != Some(id) {
            if let Some(previous) = self.focused.take() {
                self.blur(previous);
            }
            if let Some(pane) = self.panes.iter_mut().find(|pane| pane.id == id) {
                pane.focused = true;
                pane.active_visual = true;
                pane.content.on_gained_focus();
            }
            self.focused = Some(id);
            tracing::debug!(pane_id = %id, "focused pane");
        }
        self.pending_focus = Some(id);
        true
    }

    fn blur(&mut self, id: PaneId) {
        self.record_input(id);
        if let Some(pane) = self.panes.iter_mut().find(|pane| pane.id == id) {
            pane.focused = false;
            pane.active_visual = false;
            pane.content.on_lost_focus();
        }
    }

    /// Store the current input element of `id`, if input is inside it.
    fn record_input(&mut self, id: PaneId) {
        let Some(focus) = self.input_focus else {
            return;
        };
        if focus.pane != Some(id) {
            return;
        }
        if let Some(pane) = self.panes.iter().find(|pane| pane.id == id)
            && self.tree.is_descendant_of(focus.element, pane.container)
        {
            self.history
                .record_focus(id, focus.element, pane.content.view_state());
        }
    }

    /// Idle-tick work: resolve deferred focus and fire due timers. Returns
    /// true when anything visible changed.
    pub fn on_idle(&mut self, now: Instant) -> bool {
        let mut changed = false;
        if self.modal.is_none()
            && let Some(id) = self.pending_focus.take()
            && let Some(pane) = self.panes.iter_mut().find(|pane| pane.id == id)
        {
            let target = self.history.restore(id, pane.container, &self.tree);
            if let Some(view) = target.view {
                pane.content.restore_view_state(view);
            }
            let pane = (target.source != FocusSource::TopLevel).then_some(id);
            self.input_focus = Some(InputFocus {
                pane,
                element: target.element,
                source: target.source,
            });
            changed = true;
        }
        for timer in self.timers.take_due(now) {
            match timer.action {
                TimerAction::ClearBoundaryFlash => {
                    if let Some(pane) = self.panes.iter_mut().find(|pane| pane.id == timer.pane)
                        && pane.flash_timer == Some(timer.id)
                    {
                        pane.boundary_flash = None;
                        pane.flash_timer = None;
                        changed = true;
                    }
                }
            }
        }
        changed
    }

    /// Host notification that `element` took input focus.
    pub fn set_input_focus(&mut self, element: ElementId) -> Option<PaneId> {
        if !self.tree.contains(element) {
            return None;
        }
        let owner = self
            .panes
            .iter()
            .find(|pane| self.tree.is_descendant_of(element, pane.container))
            .map(|pane| pane.id);
        if let Some(id) = owner {
            self.focus_pane(id);
            self.pending_focus = None;
        }
        self.input_focus = Some(InputFocus {
            pane: owner,
            element,
            source: FocusSource::Recorded,
        });
        if let Some(id) = owner {
            self.record_input(id);
        }
        owner
    }

    /// Record the current input element of the focused pane.
    pub fn record_focus(&mut self) {
        if let Some(id) = self.focused {
            self.record_input(id);
        }
    }

    pub fn cycle_focus(&mut self, forward: bool) -> Option<PaneId> {
        let mut ring = FocusRing::new(self.focused);
        ring.set_order(self.pane_ids());
        ring.advance(forward);
        let next = ring.current()?;
        self.focus_pane(next);
        Some(next)
    }

    pub fn set_layout_mode(&mut self, mode: LayoutMode) {
        if self.mode != mode {
            tracing::info!(from = %self.mode, to = %mode, "layout mode changed");
            self.mode = mode;
            self.relayout();
        }
    }

    pub fn cycle_layout_mode(&mut self) -> LayoutMode {
        self.set_layout_mode(self.mode.next());
        self.mode
    }

    pub fn set_canvas(&mut self, canvas: Rect) {
        if self.canvas != canvas {
            self.canvas = canvas;
            self.relayout();
        }
    }

    /// Drag the boundary on `edge` of `id` by `delta` cells.
    pub fn resize_pane(&mut self, id: PaneId, edge: NavDirection, delta: i16) -> bool {
        let ids = self.pane_ids();
        if !self
            .engine
            .resize(&ids, self.mode, self.canvas, id, edge, delta)
        {
            return false;
        }
        self.relayout();
        true
    }

    pub fn set_context_filter(&mut self, filter: Option<String>) {
        self.context_filter = filter;
        for pane in &mut self.panes {
            pane.content
                .on_context_changed(self.context_filter.as_deref());
        }
    }

    /// Hand focus to a modal surface. No pane is focused until
    /// [`end_modal`](Self::end_modal).
    pub fn begin_modal(&mut self) {
        if self.modal.is_some() {
            return;
        }
        let saved = self.focused.take();
        if let Some(id) = saved {
            self.blur(id);
        }
        self.pending_focus = None;
        self.input_focus = None;
        self.modal = Some(saved);
    }

    pub fn end_modal(&mut self) {
        let Some(saved) = self.modal.take() else {
            return;
        };
        let target = saved
            .filter(|id| self.index_of(*id).is_some())
            .or_else(|| self.panes.first().map(|pane| pane.id));
        if let Some(id) = target {
            self.focus_pane(id);
        }
    }

    /// Describe the live panes so they can be recreated later.
    pub fn snapshot(&self) -> Workspace {
        let panes = self
            .panes
            .iter()
            .map(|pane| {
                let state = pane.content.save_state().unwrap_or_else(|err| {
                    tracing::warn!(pane_id = %pane.id, error = %err, "failed to save pane state");
                    Value::Null
                });
                let weights = self.engine.weights_of(pane.id);
                PaneDescriptor {
                    kind: pane.kind.clone(),
                    state,
                    weights: (!weights.is_default()).then_some(weights),
                }
            })
            .collect();
        let focused = self.focused.or(self.modal.flatten());
        Workspace {
            layout_mode: Some(self.mode),
            focused_pane_index: focused.and_then(|id| self.index_of(id)),
            panes,
            context_filter: self.context_filter.clone(),
            master_ratio: Some(self.engine.master_ratio()),
        }
    }

    /// Dispose every live pane. Input focus falls back to the window.
    pub fn dispose_all(&mut self) {
        if let Some(id) = self.focused.take() {
            self.blur(id);
        }
        for pane in std::mem::take(&mut self.panes) {
            self.teardown(pane);
        }
        self.engine.reset();
        self.regions.clear();
        self.pending_focus = None;
        if let Some(saved) = self.modal.as_mut() {
            *saved = None;
        }
        self.input_focus = Some(InputFocus {
            pane: None,
            element: self.tree.window(),
            source: FocusSource::TopLevel,
        });
    }

    /// Rebuild the panes of `workspace`. Panes already open are disposed
    /// first. Descriptors the factory rejects are skipped.
    pub fn restore(&mut self, workspace: &Workspace) -> RestoreReport {
        if !self.panes.is_empty() {
            self.dispose_all();
        }
        self.mode = workspace.layout_mode.unwrap_or(self.config.layout_mode);
        self.engine
            .set_master_ratio(workspace.master_ratio.unwrap_or(self.config.master_ratio));
        self.context_filter = workspace.context_filter.clone();

        let mut report = RestoreReport::default();
        let mut by_index = Vec::with_capacity(workspace.panes.len());
        for descriptor in &workspace.panes {
            match self.open_unfocused(descriptor) {
                Ok(id) => {
                    report.opened.push(id);
                    by_index.push(Some(id));
                }
                Err(err) => {
                    tracing::warn!(kind = %descriptor.kind, error = %err, "skipping pane on restore");
                    report.skipped.push(descriptor.kind.clone());
                    by_index.push(None);
                }
            }
        }
        self.relayout();

        let focus = workspace
            .focused_pane_index
            .and_then(|index| by_index.get(index).copied().flatten())
            .or_else(|| report.opened.first().copied());
        if let Some(id) = focus {
            self.focus_pane(id);
        }
        report.focused = focus;
        report
    }

    fn relayout(&mut self) {
        let ids = self.pane_ids();
        self.regions = self.engine.relayout(&ids, self.mode, self.canvas);
        tracing::trace!(panes = ids.len(), mode = %self.mode, "relayout");
    }

    fn index_of(&self, id: PaneId) -> Option<usize> {
        self.panes.iter().position(|pane| pane.id == id)
    }

    pub fn pane_ids(&self) -> Vec<PaneId> {
        self.panes.iter().map(|pane| pane.id).collect()
    }

    pub fn panes(&self) -> &[Pane] {
        &self.panes
    }

    pub fn pane(&self, id: PaneId) -> Option<&Pane> {
        self.panes.iter().find(|pane| pane.id == id)
    }

    pub fn len(&self) -> usize {
        self.panes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn focused(&self) -> Option<PaneId> {
        self.focused
    }

    pub fn pending_focus(&self) -> Option<PaneId> {
        self.pending_focus
    }

    pub fn input_focus(&self) -> Option<InputFocus> {
        self.input_focus
    }

    pub fn regions(&self) -> &RegionMap<PaneId> {
        &self.regions
    }

    pub fn region(&self, id: PaneId) -> Option<Rect> {
        self.regions.get(id)
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.mode
    }

    /// The mode actually used for the current pane count.
    pub fn effective_mode(&self) -> LayoutMode {
        TilingLayoutEngine::<PaneId>::resolve_mode(self.mode, self.panes.len(), self.canvas)
    }

    pub fn canvas(&self) -> Rect {
        self.canvas
    }

    pub fn engine(&self) -> &TilingLayoutEngine<PaneId> {
        &self.engine
    }

    pub fn tree(&self) -> &VisualTree {
        &self.tree
    }

    /// Mutable access for hosts that add or drop elements inside panes.
    pub fn tree_mut(&mut self) -> &mut VisualTree {
        &mut self.tree
    }

    pub fn history(&self) -> &FocusHistoryManager {
        &self.history
    }

    pub fn context_filter(&self) -> Option<&str> {
        self.context_filter.as_deref()
    }

    pub fn is_modal(&self) -> bool {
        self.modal.is_some()
    }

    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }
}

impl Drop for PaneManager {
    fn drop(&mut self) {
        for pane in &mut self.panes {
            if pane.lifecycle != Lifecycle::Disposing {
                pane.lifecycle = Lifecycle::Disposing;
                pane.content.dispose();
            }
        }
    }
}
