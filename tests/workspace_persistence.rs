mod common;

use std::fs;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use tilefocus::layout::LayoutMode;
use tilefocus::pane::PaneDescriptor;
use tilefocus::workspace::{
    JsonDirPersistence, MemoryPersistence, Workspace, WorkspacePersistence, WorkspaceStore,
};

use common::{FakeFactory, config, manager_with};

fn new_store(persistence: Arc<dyn WorkspacePersistence>, factory: FakeFactory) -> WorkspaceStore {
    let (manager, _) = manager_with(factory, config(LayoutMode::Auto));
    WorkspaceStore::new(manager, persistence, 9)
}

fn focused_index(store: &WorkspaceStore) -> Option<usize> {
    let manager = store.manager();
    let focused = manager.focused()?;
    manager.pane_ids().iter().position(|id| *id == focused)
}

fn populate(store: &mut WorkspaceStore) {
    let manager = store.manager_mut();
    for kind in ["notes", "tasks", "calendar"] {
        manager.open_pane(&PaneDescriptor::new(kind)).unwrap();
    }
    manager.set_layout_mode(LayoutMode::Grid);
    let tasks = manager.pane_ids()[1];
    manager.focus_pane(tasks);
}

fn kinds(store: &WorkspaceStore) -> Vec<String> {
    store
        .manager()
        .panes()
        .iter()
        .map(|pane| pane.kind().to_string())
        .collect()
}

#[test]
fn switching_away_and_back_restores_the_workspace() {
    let memory = Arc::new(MemoryPersistence::new());
    let mut store = new_store(memory.clone(), FakeFactory::new());
    store.load_initial();
    populate(&mut store);
    let before = store.manager().snapshot();

    let report = store.switch_to(2).unwrap();
    assert_eq!(report.restore.map(|r| r.opened.len()), Some(0));
    assert!(store.manager().is_empty());
    store
        .manager_mut()
        .open_pane(&PaneDescriptor::new("scratch"))
        .unwrap();

    store.switch_to(1).unwrap();
    assert_eq!(kinds(&store), vec!["notes", "tasks", "calendar"]);
    assert_eq!(store.manager().layout_mode(), LayoutMode::Grid);
    assert_eq!(focused_index(&store), Some(1));
    assert_eq!(store.manager().snapshot(), before);

    assert_eq!(memory.slots(), vec![1, 2]);
    store.switch_to(2).unwrap();
    assert_eq!(kinds(&store), vec!["scratch"]);
}

#[test]
fn workspaces_survive_a_restart_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = new_store(Arc::new(JsonDirPersistence::new(dir.path())), FakeFactory::new());
        store.enable_background_save().unwrap();
        store.load_initial();
        populate(&mut store);
        store.switch_to(3).unwrap();
        store.shutdown().unwrap();
    }
    let text = fs::read_to_string(dir.path().join("workspace-1.json")).unwrap();
    let saved: Workspace = serde_json::from_str(&text).unwrap();
    assert_eq!(saved.kinds(), vec!["notes", "tasks", "calendar"]);
    assert_eq!(saved.focused_pane_index, Some(1));
    assert!(dir.path().join("workspace-3.json").exists());

    let mut store = new_store(Arc::new(JsonDirPersistence::new(dir.path())), FakeFactory::new());
    let report = store.load_initial();
    assert_eq!(report.opened.len(), 3);
    assert_eq!(kinds(&store), vec!["notes", "tasks", "calendar"]);
    assert_eq!(focused_index(&store), Some(1));
}

#[test]
fn malformed_record_loads_as_empty_workspace() {
    let memory = Arc::new(MemoryPersistence::new());
    memory.insert_raw(1, "{ not json");
    memory.insert_raw(2, r#"{ "layoutMode": "grid", "panes": 7 }"#);
    let mut store = new_store(memory, FakeFactory::new());
    let report = store.load_initial();
    assert!(report.opened.is_empty());
    assert!(store.manager().is_empty());
    let report = store.switch_to(2).unwrap().restore.unwrap();
    assert!(report.opened.is_empty());
    assert_eq!(store.manager().focused(), None);
}

#[test]
fn layout_mode_names_never_cost_the_panes() {
    let memory = Arc::new(MemoryPersistence::new());
    memory.insert_raw(
        1,
        r#"{ "layoutMode": "Grid", "panes": [ { "kind": "notes" }, { "kind": "tasks" } ] }"#,
    );
    memory.insert_raw(
        2,
        r#"{ "layoutMode": "spiral", "panes": [ { "kind": "calendar" } ] }"#,
    );
    let (manager, _) = manager_with(FakeFactory::new(), config(LayoutMode::Tall));
    let mut store = WorkspaceStore::new(manager, memory.clone(), 9);

    let report = store.load_initial();
    assert_eq!(report.opened.len(), 2);
    assert_eq!(store.manager().layout_mode(), LayoutMode::Grid);

    store.switch_to(2).unwrap();
    assert_eq!(kinds(&store), vec!["calendar"]);
    assert_eq!(store.manager().layout_mode(), LayoutMode::Tall);

    // the switch saved slot 1 back with its panes intact
    let saved: Workspace = serde_json::from_str(&memory.raw(1).unwrap()).unwrap();
    assert_eq!(saved.kinds(), vec!["notes", "tasks"]);
    assert_eq!(saved.layout_mode, Some(LayoutMode::Grid));
}

#[test]
fn panes_the_factory_rejects_are_skipped() {
    let memory = Arc::new(MemoryPersistence::new());
    memory.insert_raw(
        1,
        r#"{ "layoutMode": "wide", "focusedPaneIndex": 2,
             "panes": [ { "kind": "notes" }, { "kind": "legacy" }, { "kind": "tasks" } ],
             "contextFilter": "work" }"#,
    );
    let mut store = new_store(memory, FakeFactory::new().with_broken("legacy"));
    let report = store.load_initial();
    assert_eq!(report.opened.len(), 2);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].as_str(), "legacy");
    assert_eq!(kinds(&store), vec!["notes", "tasks"]);
    assert_eq!(report.focused, Some(report.opened[1]));
    assert_eq!(store.manager().context_filter(), Some("work"));
}

#[test]
fn out_of_range_slots_are_rejected() {
    let mut store = new_store(Arc::new(MemoryPersistence::new()), FakeFactory::new());
    assert!(store.switch_to(0).is_err());
    assert!(store.switch_to(10).is_err());
    assert_eq!(store.active_slot(), 1);
}
