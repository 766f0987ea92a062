//! Numbered workspaces: snapshots of the pane set that can be switched
//! between and persisted.

pub mod persistence;

pub use persistence::{
    BackgroundSaver, JsonDirPersistence, MemoryPersistence, SaveOutcome, WorkspacePersistence,
};

use std::collections::BTreeMap;
use std::io;
use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{PersistenceError, WorkspaceError};
use crate::layout::LayoutMode;
use crate::pane::PaneDescriptor;
use crate::window::{PaneManager, RestoreReport};

/// Persisted description of one workspace slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// `None` when the record has no mode or one this build does not know.
    /// Restoring then uses the configured mode.
    #[serde(default, deserialize_with = "known_mode")]
    pub layout_mode: Option<LayoutMode>,
    /// Index into `panes` of the focused pane. Negative values written by
    /// other tools read as "no focus".
    #[serde(default, deserialize_with = "index_or_none")]
    pub focused_pane_index: Option<usize>,
    #[serde(default)]
    pub panes: Vec<PaneDescriptor>,
    #[serde(default)]
    pub context_filter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub master_ratio: Option<f32>,
}

impl Workspace {
    pub fn empty(layout_mode: LayoutMode) -> Self {
        Self {
            layout_mode: Some(layout_mode),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.panes.is_empty()
    }

    pub fn kinds(&self) -> Vec<&str> {
        self.panes.iter().map(|pane| pane.kind.as_str()).collect()
    }
}

fn known_mode<'de, D>(deserializer: D) -> Result<Option<LayoutMode>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.and_then(|name| match name.parse() {
        Ok(mode) => Some(mode),
        Err(reason) => {
            tracing::warn!(%reason, "ignoring saved layout mode");
            None
        }
    }))
}

fn index_or_none<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<i64>::deserialize(deserializer)?;
    Ok(raw.and_then(|value| usize::try_from(value).ok()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchReport {
    pub from: usize,
    pub to: usize,
    /// `None` when the target was already active.
    pub restore: Option<RestoreReport>,
}

/// Owns the pane manager and the workspace slots `1..=slot_count`.
pub struct WorkspaceStore {
    manager: PaneManager,
    slots: BTreeMap<usize, Workspace>,
    active: usize,
    slot_count: usize,
    persistence: Arc<dyn WorkspacePersistence>,
    saver: Option<BackgroundSaver>,
}

impl WorkspaceStore {
    pub fn new(
        manager: PaneManager,
        persistence: Arc<dyn WorkspacePersistence>,
        slot_count: usize,
    ) -> Self {
        Self {
            manager,
            slots: BTreeMap::new(),
            active: 1,
            slot_count: slot_count.max(1),
            persistence,
            saver: None,
        }
    }

    /// Route saves made during switches through a worker thread.
    pub fn enable_background_save(&mut self) -> io::Result<()> {
        if self.saver.is_none() {
            self.saver = Some(BackgroundSaver::spawn(self.persistence.clone())?);
        }
        Ok(())
    }

    /// Hydrate the active slot at start-up.
    pub fn load_initial(&mut self) -> RestoreReport {
        let workspace = self.load_slot(self.active);
        let report = self.manager.restore(&workspace);
        self.slots.insert(self.active, workspace);
        tracing::info!(
            slot = self.active,
            panes = report.opened.len(),
            skipped = report.skipped.len(),
            "loaded initial workspace"
        );
        report
    }

    /// Save the active workspace and bring `slot` up in its place.
    pub fn switch_to(&mut self, slot: usize) -> Result<SwitchReport, WorkspaceError> {
        if slot == 0 || slot > self.slot_count {
            return Err(WorkspaceError::SlotOutOfRange {
                slot,
                max: self.slot_count,
            });
        }
        let from = self.active;
        if slot == from {
            return Ok(SwitchReport {
                from,
                to: slot,
                restore: None,
            });
        }

        let snapshot = self.manager.snapshot();
        self.persist(from, &snapshot);
        self.slots.insert(from, snapshot);
        self.manager.dispose_all();

        let target = match self.slots.get(&slot) {
            Some(cached) => cached.clone(),
            None => self.load_slot(slot),
        };
        self.active = slot;
        let report = self.manager.restore(&target);
        self.slots.insert(slot, target);
        tracing::info!(
            from,
            to = slot,
            panes = report.opened.len(),
            skipped = report.skipped.len(),
            "switched workspace"
        );
        Ok(SwitchReport {
            from,
            to: slot,
            restore: Some(report),
        })
    }

    /// Snapshot the active workspace and write it synchronously.
    pub fn save_active(&mut self) -> Result<(), PersistenceError> {
        let snapshot = self.manager.snapshot();
        let result = self.persistence.save(self.active, &snapshot);
        self.slots.insert(self.active, snapshot);
        result
    }

    /// Drain finished background saves. Returns how many completed.
    pub fn poll_persistence(&mut self) -> usize {
        let Some(saver) = self.saver.as_ref() else {
            return 0;
        };
        let outcomes = saver.drain();
        log_outcomes(&outcomes);
        outcomes.len()
    }

    /// Wait for queued saves, then save the active workspace.
    pub fn shutdown(&mut self) -> Result<(), PersistenceError> {
        if let Some(mut saver) = self.saver.take() {
            log_outcomes(&saver.finish());
        }
        self.save_active()
    }

    fn persist(&self, slot: usize, workspace: &Workspace) {
        if let Some(saver) = &self.saver {
            match saver.submit(slot, workspace.clone()) {
                Ok(()) => return,
                Err(err) => tracing::warn!(slot, error = %err, "background save unavailable"),
            }
        }
        if let Err(err) = self.persistence.save(slot, workspace) {
            tracing::warn!(slot, error = %err, "failed to save workspace");
        }
    }

    /// Read `slot` from storage. Missing or malformed records are empty
    /// workspaces.
    fn load_slot(&self, slot: usize) -> Workspace {
        match self.persistence.load(slot) {
            Ok(Some(workspace)) => workspace,
            Ok(None) => {
                tracing::debug!(slot, "no saved workspace, starting empty");
                Workspace::empty(self.manager.config().layout_mode)
            }
            Err(err) => {
                tracing::warn!(slot, error = %err, "unreadable workspace, starting empty");
                Workspace::empty(self.manager.config().layout_mode)
            }
        }
    }

    pub fn manager(&self) -> &PaneManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut PaneManager {
        &mut self.manager
    }

    pub fn active_slot(&self) -> usize {
        self.active
    }

    pub fn slot_count(&self) -> usize {
        self.slot_count
    }

    /// Last snapshot taken of `slot`, if it was visited this session.
    pub fn cached(&self, slot: usize) -> Option<&Workspace> {
        self.slots.get(&slot)
    }

    pub fn persistence(&self) -> &Arc<dyn WorkspacePersistence> {
        &self.persistence
    }
}

fn log_outcomes(outcomes: &[SaveOutcome]) {
    for outcome in outcomes {
        match &outcome.result {
            Ok(()) => tracing::debug!(slot = outcome.slot, "background save finished"),
            Err(err) => tracing::warn!(slot = outcome.slot, error = %err, "background save failed"),
        }
    }
}
