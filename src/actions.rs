use std::fmt;

use crate::layout::NavDirection;

/// Everything the shortcut surface can ask the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    /// Switch to workspace slot `n` (1-based).
    SwitchWorkspace(u8),
    Navigate(NavDirection),
    MovePane(NavDirection),
    CloseFocused,
    /// While on, navigation keys move the focused pane instead of focus.
    ToggleMoveMode,
    FocusNext,
    FocusPrev,
    CycleLayout,
    NewPane,
    Quit,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::SwitchWorkspace(n) => write!(f, "Switch to workspace {n}"),
            Action::Navigate(dir) => write!(f, "Focus pane {dir}"),
            Action::MovePane(dir) => write!(f, "Move pane {dir}"),
            Action::CloseFocused => f.write_str("Close focused pane"),
            Action::ToggleMoveMode => f.write_str("Toggle move mode"),
            Action::FocusNext => f.write_str("Focus next pane"),
            Action::FocusPrev => f.write_str("Focus previous pane"),
            Action::CycleLayout => f.write_str("Cycle layout mode"),
            Action::NewPane => f.write_str("Open new pane"),
            Action::Quit => f.write_str("Quit"),
        }
    }
}
