//! Shortcut surface: turns key chords into pane and workspace operations.

use std::time::Instant;

use crossterm::event::KeyEvent;

use crate::actions::Action;
use crate::error::PersistenceError;
use crate::event_loop::ControlFlow;
use crate::keybindings::KeyBindings;
use crate::pane::{PaneDescriptor, PaneKind};
use crate::window::PaneManager;
use crate::workspace::WorkspaceStore;

pub struct Session {
    store: WorkspaceStore,
    bindings: KeyBindings,
    move_mode: bool,
    new_pane_kinds: Vec<PaneKind>,
    next_kind: usize,
}

impl Session {
    /// `new_pane_kinds` are opened in rotation by [`Action::NewPane`].
    pub fn new(store: WorkspaceStore, bindings: KeyBindings, new_pane_kinds: Vec<PaneKind>) -> Self {
        Self {
            store,
            bindings,
            move_mode: false,
            new_pane_kinds,
            next_kind: 0,
        }
    }

    /// Dispatch a key press. Returns `None` when the key is not a shortcut
    /// and belongs to the focused pane's content.
    ///
    /// While `text_input_active` is set only [`Action::Quit`] is honoured so
    /// typing is never hijacked.
    pub fn handle_key(&mut self, key: &KeyEvent, text_input_active: bool) -> Option<ControlFlow> {
        let action = self.bindings.action_for_key(key)?;
        if text_input_active && action != Action::Quit {
            return None;
        }
        Some(self.apply(action))
    }

    pub fn apply(&mut self, action: Action) -> ControlFlow {
        tracing::debug!(%action, move_mode = self.move_mode, "applying action");
        let focused = self.store.manager().focused();
        match action {
            Action::SwitchWorkspace(slot) => {
                if let Err(err) = self.store.switch_to(usize::from(slot)) {
                    tracing::warn!(error = %err, "workspace switch rejected");
                }
            }
            Action::Navigate(direction) if self.move_mode => {
                if let Some(id) = focused {
                    self.manager_mut().move_pane(id, direction);
                }
            }
            Action::Navigate(direction) => {
                self.manager_mut().navigate_focus(direction);
            }
            Action::MovePane(direction) => {
                if let Some(id) = focused {
                    self.manager_mut().move_pane(id, direction);
                }
            }
            Action::CloseFocused => {
                if let Some(id) = focused {
                    self.manager_mut().close_pane(id);
                }
            }
            Action::ToggleMoveMode => {
                self.move_mode = !self.move_mode;
                tracing::info!(enabled = self.move_mode, "move mode toggled");
            }
            Action::FocusNext => {
                self.manager_mut().cycle_focus(true);
            }
            Action::FocusPrev => {
                self.manager_mut().cycle_focus(false);
            }
            Action::CycleLayout => {
                self.manager_mut().cycle_layout_mode();
            }
            Action::NewPane => self.open_next_kind(),
            Action::Quit => return ControlFlow::Quit,
        }
        ControlFlow::Continue
    }

    fn open_next_kind(&mut self) {
        if self.new_pane_kinds.is_empty() {
            return;
        }
        let kind = self.new_pane_kinds[self.next_kind % self.new_pane_kinds.len()].clone();
        self.next_kind = self.next_kind.wrapping_add(1);
        if let Err(err) = self.manager_mut().open_pane(&PaneDescriptor::new(kind)) {
            tracing::warn!(error = %err, "could not open pane");
        }
    }

    /// Idle-tick work for the whole session. Returns true when a redraw is
    /// due.
    pub fn on_idle(&mut self, now: Instant) -> bool {
        let changed = self.manager_mut().on_idle(now);
        let saved = self.store.poll_persistence();
        changed || saved > 0
    }

    pub fn shutdown(&mut self) -> Result<(), PersistenceError> {
        self.store.shutdown()
    }

    pub fn move_mode(&self) -> bool {
        self.move_mode
    }

    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut WorkspaceStore {
        &mut self.store
    }

    pub fn manager(&self) -> &PaneManager {
        self.store.manager()
    }

    pub fn manager_mut(&mut self) -> &mut PaneManager {
        self.store.manager_mut()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;
    use crate::feedback::NoFeedback;
    use crate::focus::{ElementId, VisualTree};
    use crate::layout::NavDirection;
    use crate::pane::{KindRegistry, PaneContent};
    use crate::window::ManagerConfig;
    use crate::workspace::MemoryPersistence;

    struct Blank;

    impl PaneContent for Blank {
        fn build_visual(&mut self, tree: &mut VisualTree, container: ElementId) {
            tree.insert(container, "blank", true);
        }
    }

    fn session() -> Session {
        let mut registry = KindRegistry::new();
        registry.register("blank", || Ok(Box::new(Blank) as Box<dyn PaneContent>));
        let manager = PaneManager::new(
            Box::new(registry),
            Box::new(NoFeedback),
            ManagerConfig::default(),
        );
        let store = WorkspaceStore::new(manager, Arc::new(MemoryPersistence::new()), 9);
        Session::new(store, KeyBindings::default(), vec![PaneKind::new("blank")])
    }

    fn alt(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::ALT)
    }

    #[test]
    fn typing_does_not_trigger_shortcuts() {
        let mut s = session();
        let plain = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
        assert_eq!(s.handle_key(&plain, false), None);
        let new_pane = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(s.handle_key(&new_pane, true), None);
        assert!(s.manager().is_empty());
        assert_eq!(s.handle_key(&new_pane, false), Some(ControlFlow::Continue));
        assert_eq!(s.manager().len(), 1);
        let quit = KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert_eq!(s.handle_key(&quit, true), Some(ControlFlow::Quit));
    }

    #[test]
    fn move_mode_turns_navigation_into_moves() {
        let mut s = session();
        s.apply(Action::NewPane);
        s.apply(Action::NewPane);
        let ids = s.manager().pane_ids();
        let first = ids[0];
        s.manager_mut().focus_pane(first);
        s.handle_key(&alt('m'), false);
        assert!(s.move_mode());
        s.handle_key(&alt('l'), false);
        assert_eq!(s.manager().pane_ids(), vec![ids[1], ids[0]]);
        assert_eq!(s.manager().focused(), Some(first));
        s.apply(Action::ToggleMoveMode);
        s.apply(Action::Navigate(NavDirection::Left));
        assert_eq!(s.manager().focused(), Some(ids[1]));
    }

    #[test]
    fn out_of_range_switch_is_ignored() {
        let mut s = session();
        s.store_mut().switch_to(1).unwrap();
        assert_eq!(s.apply(Action::SwitchWorkspace(0)), ControlFlow::Continue);
        assert_eq!(s.store().active_slot(), 1);
    }
}
