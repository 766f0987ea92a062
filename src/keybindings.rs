use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::actions::Action;
use crate::layout::NavDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    pub fn alt(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT)
    }

    pub fn alt_shift(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::ALT | KeyModifiers::SHIFT)
    }

    pub fn matches(&self, key: &KeyEvent) -> bool {
        key.code == self.code && key.modifiers == self.mods
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        let code = match self.code {
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Left => "Left".to_string(),
            KeyCode::Right => "Right".to_string(),
            KeyCode::Up => "Up".to_string(),
            KeyCode::Down => "Down".to_string(),
            _ => format!("{:?}", self.code),
        };
        parts.push(code);
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}

#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<Action, Vec<KeyCombo>>,
}

impl Default for KeyBindings {
    /// Alt-based chords so plain typing inside panes is never captured.
    fn default() -> Self {
        use Action::*;
        let mut kb = Self::new();
        kb.add(Quit, KeyCombo::new(KeyCode::Char('q'), KeyModifiers::CONTROL));
        for n in 1..=9u8 {
            let digit = char::from(b'0' + n);
            kb.add(SwitchWorkspace(n), KeyCombo::alt(KeyCode::Char(digit)));
        }
        let vim = [
            (NavDirection::Left, 'h', KeyCode::Left),
            (NavDirection::Down, 'j', KeyCode::Down),
            (NavDirection::Up, 'k', KeyCode::Up),
            (NavDirection::Right, 'l', KeyCode::Right),
        ];
        for (dir, ch, arrow) in vim {
            kb.add(Navigate(dir), KeyCombo::alt(KeyCode::Char(ch)));
            kb.add(Navigate(dir), KeyCombo::alt(arrow));
            kb.add(
                MovePane(dir),
                KeyCombo::alt_shift(KeyCode::Char(ch.to_ascii_uppercase())),
            );
            kb.add(MovePane(dir), KeyCombo::alt_shift(arrow));
        }
        kb.add(CloseFocused, KeyCombo::alt(KeyCode::Char('w')));
        kb.add(ToggleMoveMode, KeyCombo::alt(KeyCode::Char('m')));
        kb.add(FocusNext, KeyCombo::alt(KeyCode::Char('.')));
        kb.add(FocusPrev, KeyCombo::alt(KeyCode::Char(',')));
        kb.add(CycleLayout, KeyCombo::alt(KeyCode::Char(' ')));
        kb.add(NewPane, KeyCombo::alt(KeyCode::Enter));
        kb
    }
}

impl KeyBindings {
    pub fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    pub fn add(&mut self, action: Action, combo: KeyCombo) {
        self.map.entry(action).or_default().push(combo);
    }

    pub fn matches(&self, action: Action, key: &KeyEvent) -> bool {
        self.map
            .get(&action)
            .is_some_and(|list| list.iter().any(|c| c.matches(key)))
    }

    pub fn action_for_key(&self, key: &KeyEvent) -> Option<Action> {
        self.map
            .iter()
            .find(|(_, list)| list.iter().any(|c| c.matches(key)))
            .map(|(action, _)| *action)
    }

    /// Every binding as `(action, combos)`, sorted by the first combo's label.
    pub fn help_entries(&self) -> Vec<(Action, Vec<String>)> {
        let mut entries: Vec<_> = self
            .map
            .iter()
            .map(|(action, list)| (*action, list.iter().map(|c| c.display()).collect::<Vec<_>>()))
            .collect();
        entries.sort_by(|a, b| a.1.cmp(&b.1));
        entries
    }

    pub fn combos_for(&self, action: Action) -> Vec<String> {
        self.map
            .get(&action)
            .map(|list| list.iter().map(|c| c.display()).collect())
            .unwrap_or_default()
    }

    pub fn first_combo(&self, action: Action) -> Option<KeyCombo> {
        self.map.get(&action).and_then(|list| list.first().copied())
    }
}
