//! Pane handles and the collaborator traits that supply their content.
//!
//! The core owns only the wrapper around a pane: its id, lifecycle, focus and
//! visual flags, and its container element. Everything inside the container
//! belongs to the [`PaneContent`] implementation.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PaneError;
use crate::focus::{ElementId, ViewState, VisualTree};
use crate::layout::{NavDirection, PaneWeights};
use crate::timers::TimerId;

/// Process-unique pane identifier. Ordering follows creation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaneId(u64);

impl PaneId {
    /// Wrap a raw id. Live panes get theirs from the
    /// [`PaneManager`](crate::window::PaneManager).
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PaneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pane-{}", self.0)
    }
}

/// Discriminator naming which content a pane hosts (`"notes"`, `"tasks"`, ...).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PaneKind(String);

impl PaneKind {
    pub fn new(kind: impl Into<String>) -> Self {
        Self(kind.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PaneKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PaneKind {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    Initializing,
    Active,
    Disposing,
}

/// Everything needed to (re)create a pane: its kind plus the opaque state
/// blob produced by [`PaneContent::save_state`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaneDescriptor {
    pub kind: PaneKind,
    #[serde(default)]
    pub state: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weights: Option<PaneWeights>,
}

impl PaneDescriptor {
    pub fn new(kind: impl Into<PaneKind>) -> Self {
        Self {
            kind: kind.into(),
            state: Value::Null,
            weights: None,
        }
    }

    pub fn with_state(mut self, state: Value) -> Self {
        self.state = state;
        self
    }
}

/// Contract implemented by every concrete pane view.
///
/// The pane manager calls these at fixed lifecycle points:
/// `restore_state` and `initialize` before the pane gets an id,
/// `build_visual` once its container exists, the focus hooks on every focus
/// change, and `dispose` exactly once when the pane goes away.
pub trait PaneContent {
    fn initialize(&mut self) -> Result<(), PaneError> {
        Ok(())
    }

    /// Populate the pane's element subtree under `container`.
    fn build_visual(&mut self, tree: &mut VisualTree, container: ElementId);

    fn on_gained_focus(&mut self) {}

    fn on_lost_focus(&mut self) {}

    fn on_context_changed(&mut self, _filter: Option<&str>) {}

    fn save_state(&self) -> Result<Value, PaneError> {
        Ok(Value::Null)
    }

    fn restore_state(&mut self, _state: &Value) -> Result<(), PaneError> {
        Ok(())
    }

    /// Release subscriptions, timers and anything else the content holds.
    fn dispose(&mut self) {}

    /// Cursor/scroll position captured alongside the focus record.
    fn view_state(&self) -> ViewState {
        ViewState::default()
    }

    fn restore_view_state(&mut self, _view: ViewState) {}

    /// Whether the pane container itself may take input focus.
    fn container_focusable(&self) -> bool {
        true
    }

    fn title(&self) -> Option<String> {
        None
    }
}

/// Builds pane content for a kind.
pub trait PaneFactory {
    fn create(&mut self, kind: &PaneKind) -> Result<Box<dyn PaneContent>, PaneError>;
}

type Constructor = Box<dyn FnMut() -> Result<Box<dyn PaneContent>, PaneError>>;

/// [`PaneFactory`] backed by a table of per-kind constructors.
#[derive(Default)]
pub struct KindRegistry {
    constructors: BTreeMap<PaneKind, Constructor>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, kind: impl Into<PaneKind>, constructor: F) -> &mut Self
    where
        F: FnMut() -> Result<Box<dyn PaneContent>, PaneError> + 'static,
    {
        self.constructors.insert(kind.into(), Box::new(constructor));
        self
    }

    pub fn kinds(&self) -> Vec<PaneKind> {
        self.constructors.keys().cloned().collect()
    }
}

impl PaneFactory for KindRegistry {
    fn create(&mut self, kind: &PaneKind) -> Result<Box<dyn PaneContent>, PaneError> {
        let constructor = self
            .constructors
            .get_mut(kind)
            .ok_or_else(|| PaneError::UnknownKind(kind.clone()))?;
        constructor()
    }
}

/// A live pane: the core-owned wrapper around one content instance.
pub struct Pane {
    pub(crate) id: PaneId,
    pub(crate) kind: PaneKind,
    pub(crate) lifecycle: Lifecycle,
    pub(crate) focused: bool,
    pub(crate) active_visual: bool,
    pub(crate) boundary_flash: Option<NavDirection>,
    pub(crate) flash_timer: Option<TimerId>,
    pub(crate) container: ElementId,
    pub(crate) content: Box<dyn PaneContent>,
}

impl Pane {
    pub(crate) fn new(
        id: PaneId,
        kind: PaneKind,
        container: ElementId,
        content: Box<dyn PaneContent>,
    ) -> Self {
        Self {
            id,
            kind,
            lifecycle: Lifecycle::Initializing,
            focused: false,
            active_visual: false,
            boundary_flash: None,
            flash_timer: None,
            container,
            content,
        }
    }

    pub fn id(&self) -> PaneId {
        self.id
    }

    pub fn kind(&self) -> &PaneKind {
        &self.kind
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// Whether the pane currently shows its active (highlighted) chrome.
    pub fn is_active_visual(&self) -> bool {
        self.active_visual
    }

    pub fn boundary_flash(&self) -> Option<NavDirection> {
        self.boundary_flash
    }

    pub fn container(&self) -> ElementId {
        self.container
    }

    pub fn content(&self) -> &dyn PaneContent {
        self.content.as_ref()
    }

    pub fn title(&self) -> String {
        self.content
            .title()
            .unwrap_or_else(|| format!("{} {}", self.kind, self.id.raw()))
    }
}

impl fmt::Debug for Pane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pane")
            .field("id", &self.id)
            .field("kind", &self.kind)
            .field("lifecycle", &self.lifecycle)
            .field("focused", &self.focused)
            .field("boundary_flash", &self.boundary_flash)
            .finish_non_exhaustive()
    }
}
