#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use ratatui::layout::Rect;
use serde_json::{Value, json};
use tilefocus::error::PaneError;
use tilefocus::feedback::BoundaryFeedback;
use tilefocus::focus::{ElementId, VisualTree};
use tilefocus::layout::{LayoutMode, NavDirection};
use tilefocus::pane::{PaneContent, PaneFactory, PaneId, PaneKind};
use tilefocus::window::{ManagerConfig, PaneManager};

pub const CANVAS: Rect = Rect {
    x: 0,
    y: 0,
    width: 100,
    height: 40,
};

/// Placeholder content with a fixed number of focusable fields.
pub struct FieldsPane {
    fields: usize,
    note: String,
}

impl PaneContent for FieldsPane {
    fn build_visual(&mut self, tree: &mut VisualTree, container: ElementId) {
        let Some(body) = tree.insert(container, "body", false) else {
            return;
        };
        for n in 0..self.fields {
            tree.insert(body, format!("field {n}"), true);
        }
    }

    fn save_state(&self) -> Result<Value, PaneError> {
        Ok(json!({ "note": self.note }))
    }

    fn restore_state(&mut self, state: &Value) -> Result<(), PaneError> {
        if let Some(note) = state.get("note").and_then(Value::as_str) {
            self.note = note.to_string();
        }
        Ok(())
    }
}

/// Builds `FieldsPane`s for any kind except the ones marked broken.
#[derive(Default)]
pub struct FakeFactory {
    pub broken: BTreeSet<String>,
    pub fields: usize,
}

impl FakeFactory {
    pub fn new() -> Self {
        Self {
            broken: BTreeSet::new(),
            fields: 2,
        }
    }

    pub fn with_broken(mut self, kind: &str) -> Self {
        self.broken.insert(kind.to_string());
        self
    }
}

impl PaneFactory for FakeFactory {
    fn create(&mut self, kind: &PaneKind) -> Result<Box<dyn PaneContent>, PaneError> {
        if self.broken.contains(kind.as_str()) {
            return Err(PaneError::UnknownKind(kind.clone()));
        }
        Ok(Box::new(FieldsPane {
            fields: self.fields,
            note: String::new(),
        }))
    }
}

pub type Hits = Rc<RefCell<Vec<(PaneId, NavDirection)>>>;

/// Boundary feedback that records every call.
pub struct RecordingFeedback(pub Hits);

impl BoundaryFeedback for RecordingFeedback {
    fn on_boundary(&mut self, pane: PaneId, direction: NavDirection) {
        self.0.borrow_mut().push((pane, direction));
    }
}

pub fn config(mode: LayoutMode) -> ManagerConfig {
    ManagerConfig {
        layout_mode: mode,
        canvas: CANVAS,
        ..ManagerConfig::default()
    }
}

pub fn manager_with(factory: FakeFactory, config: ManagerConfig) -> (PaneManager, Hits) {
    let hits = Hits::default();
    let manager = PaneManager::new(
        Box::new(factory),
        Box::new(RecordingFeedback(hits.clone())),
        config,
    );
    (manager, hits)
}

pub fn manager(mode: LayoutMode) -> (PaneManager, Hits) {
    manager_with(FakeFactory::new(), config(mode))
}
