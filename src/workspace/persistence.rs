//! Durable storage for workspace records and the background save worker.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, RwLock};
use std::thread::{self, JoinHandle};

use super::Workspace;
use crate::error::PersistenceError;

/// Where workspace records live.
///
/// Implementations are shared with the save worker, hence `Send + Sync`.
/// `load` returns `Ok(None)` for a slot that was never saved.
pub trait WorkspacePersistence: Send + Sync {
    fn name(&self) -> &str;

    fn load(&self, slot: usize) -> Result<Option<Workspace>, PersistenceError>;

    fn save(&self, slot: usize, workspace: &Workspace) -> Result<(), PersistenceError>;
}

/// One `workspace-<slot>.json` file per slot inside a directory.
///
/// Writes go to `<file>.tmp` first and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonDirPersistence {
    dir: PathBuf,
}

impl JsonDirPersistence {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, slot: usize) -> PathBuf {
        self.dir.join(format!("workspace-{slot}.json"))
    }

    fn temp_path(&self, slot: usize) -> PathBuf {
        let mut tmp = self.path_for(slot);
        tmp.set_extension("json.tmp");
        tmp
    }
}

impl WorkspacePersistence for JsonDirPersistence {
    fn name(&self) -> &str {
        "json-dir"
    }

    fn load(&self, slot: usize) -> Result<Option<Workspace>, PersistenceError> {
        let path = self.path_for(slot);
        let text = match fs::read_to_string(&path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => return Err(PersistenceError::Io { path, source }),
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistenceError::Json { slot, source })
    }

    fn save(&self, slot: usize, workspace: &Workspace) -> Result<(), PersistenceError> {
        fs::create_dir_all(&self.dir).map_err(io_error(&self.dir))?;
        let text = serde_json::to_string_pretty(workspace)
            .map_err(|source| PersistenceError::Json { slot, source })?;
        let tmp = self.temp_path(slot);
        fs::write(&tmp, text).map_err(io_error(&tmp))?;
        let path = self.path_for(slot);
        fs::rename(&tmp, &path).map_err(io_error(&path))?;
        tracing::debug!(slot, path = %path.display(), "saved workspace");
        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> PersistenceError + use<> {
    let path = path.to_path_buf();
    move |source| PersistenceError::Io { path, source }
}

/// In-process storage. Records are kept as JSON text so loading exercises
/// the same parsing as the file backend.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    records: RwLock<BTreeMap<usize, String>>,
}

impl MemoryPersistence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text for `slot`, valid JSON or not.
    pub fn insert_raw(&self, slot: usize, text: impl Into<String>) {
        let mut records = self.records.write().unwrap_or_else(|e| e.into_inner());
        records.insert(slot, text.into());
    }

    pub fn raw(&self, slot: usize) -> Option<String> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.get(&slot).cloned()
    }

    pub fn slots(&self) -> Vec<usize> {
        let records = self.records.read().unwrap_or_else(|e| e.into_inner());
        records.keys().copied().collect()
    }
}

impl WorkspacePersistence for MemoryPersistence {
    fn name(&self) -> &str {
        "memory"
    }

    fn load(&self, slot: usize) -> Result<Option<Workspace>, PersistenceError> {
        let Some(text) = self.raw(slot) else {
            return Ok(None);
        };
        serde_json::from_str(&text)
            .map(Some)
            .map_err(|source| PersistenceError::Json { slot, source })
    }

    fn save(&self, slot: usize, workspace: &Workspace) -> Result<(), PersistenceError> {
        let text = serde_json::to_string(workspace)
            .map_err(|source| PersistenceError::Json { slot, source })?;
        self.insert_raw(slot, text);
        Ok(())
    }
}

struct SaveJob {
    slot: usize,
    workspace: Workspace,
}

/// Completion of one background save, delivered back on the loop thread.
#[derive(Debug)]
pub struct SaveOutcome {
    pub slot: usize,
    pub result: Result<(), PersistenceError>,
}

/// Worker thread that writes workspace records off the loop thread.
///
/// The worker only sees owned snapshots. Outcomes queue up until
/// [`drain`](Self::drain) is called from the loop.
pub struct BackgroundSaver {
    jobs: Option<Sender<SaveJob>>,
    outcomes: Receiver<SaveOutcome>,
    worker: Option<JoinHandle<()>>,
}

impl BackgroundSaver {
    pub fn spawn(persistence: Arc<dyn WorkspacePersistence>) -> io::Result<Self> {
        let (job_tx, job_rx) = mpsc::channel::<SaveJob>();
        let (outcome_tx, outcome_rx) = mpsc::channel();
        let worker = thread::Builder::new()
            .name("workspace-saver".to_string())
            .spawn(move || {
                for job in job_rx {
                    let result = persistence.save(job.slot, &job.workspace);
                    let outcome = SaveOutcome {
                        slot: job.slot,
                        result,
                    };
                    if outcome_tx.send(outcome).is_err() {
                        break;
                    }
                }
            })?;
        Ok(Self {
            jobs: Some(job_tx),
            outcomes: outcome_rx,
            worker: Some(worker),
        })
    }

    pub fn submit(&self, slot: usize, workspace: Workspace) -> Result<(), PersistenceError> {
        let jobs = self.jobs.as_ref().ok_or(PersistenceError::WorkerGone)?;
        jobs.send(SaveJob { slot, workspace })
            .map_err(|_| PersistenceError::WorkerGone)
    }

    /// Outcomes that have arrived so far, without blocking.
    pub fn drain(&self) -> Vec<SaveOutcome> {
        self.outcomes.try_iter().collect()
    }

    /// Stop accepting jobs, wait for queued ones, and return their outcomes.
    pub fn finish(&mut self) -> Vec<SaveOutcome> {
        self.jobs.take();
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            tracing::error!("workspace saver thread panicked");
        }
        self.drain()
    }
}

impl fmt::Debug for BackgroundSaver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackgroundSaver")
            .field("running", &self.worker.is_some())
            .finish()
    }
}

impl Drop for BackgroundSaver {
    fn drop(&mut self) {
        self.jobs.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutMode;
    use crate::pane::PaneDescriptor;

    fn sample() -> Workspace {
        Workspace {
            layout_mode: Some(LayoutMode::Grid),
            focused_pane_index: Some(1),
            panes: vec![PaneDescriptor::new("notes"), PaneDescriptor::new("tasks")],
            ..Workspace::default()
        }
    }

    #[test]
    fn json_dir_round_trip_and_missing_slot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirPersistence::new(dir.path().join("workspaces"));
        assert!(store.load(3).unwrap().is_none());
        store.save(3, &sample()).unwrap();
        assert!(store.path_for(3).exists());
        assert!(!store.temp_path(3).exists());
        assert_eq!(store.load(3).unwrap(), Some(sample()));
    }

    #[test]
    fn json_dir_reports_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonDirPersistence::new(dir.path());
        fs::write(store.path_for(2), "{ not json").unwrap();
        let err = store.load(2).unwrap_err();
        assert!(matches!(err, PersistenceError::Json { slot: 2, .. }));
    }

    #[test]
    fn memory_store_keeps_json_text() {
        let store = MemoryPersistence::new();
        store.save(1, &sample()).unwrap();
        let raw = store.raw(1).unwrap();
        assert!(raw.contains("\"layoutMode\":\"grid\""));
        assert_eq!(store.slots(), vec![1]);
    }

    #[test]
    fn background_saver_reports_outcomes() {
        let store = Arc::new(MemoryPersistence::new());
        let mut saver = BackgroundSaver::spawn(store.clone()).unwrap();
        saver.submit(4, sample()).unwrap();
        saver.submit(5, Workspace::default()).unwrap();
        let outcomes = saver.finish();
        let slots: Vec<_> = outcomes.iter().map(|o| o.slot).collect();
        assert_eq!(slots, vec![4, 5]);
        assert!(outcomes.iter().all(|o| o.result.is_ok()));
        assert_eq!(store.load(4).unwrap(), Some(sample()));
        assert!(matches!(
            saver.submit(6, Workspace::default()),
            Err(PersistenceError::WorkerGone)
        ));
    }
}
