//! Rendering of the pane set onto a ratatui buffer.
//!
//! Every draw goes through [`UiFrame`], which clips rectangles to the
//! visible area. Panes are drawn from the manager's region map, so the
//! host only needs to keep the canvas in sync with the terminal size.
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Widget};

use crate::actions::Action;
use crate::focus::{ElementId, VisualTree};
use crate::layout::NavDirection;
use crate::pane::Pane;
use crate::session::Session;

/// Wrapper around `ratatui::Frame` that clamps drawing to the visible area.
pub struct UiFrame<'a> {
    area: Rect,
    buffer: &'a mut Buffer,
}

impl<'a> UiFrame<'a> {
    pub fn new(frame: &'a mut Frame<'_>) -> Self {
        let area = frame.area();
        let buffer = frame.buffer_mut();
        Self { area, buffer }
    }

    /// Draw straight into `buffer`, e.g. for headless rendering.
    pub fn from_parts(area: Rect, buffer: &'a mut Buffer) -> Self {
        Self { area, buffer }
    }

    pub fn area(&self) -> Rect {
        self.area
    }

    pub fn buffer_mut(&mut self) -> &mut Buffer {
        self.buffer
    }

    fn clip_rect(&self, rect: Rect) -> Option<Rect> {
        let clipped = rect.intersection(self.area);
        if clipped.width == 0 || clipped.height == 0 {
            None
        } else {
            Some(clipped)
        }
    }

    pub fn render_widget<W>(&mut self, widget: W, area: Rect)
    where
        W: Widget,
    {
        if let Some(clipped) = self.clip_rect(area) {
            widget.render(clipped, self.buffer);
        }
    }
}

fn focused_title_style() -> Style {
    Style::default()
        .bg(Color::Blue)
        .fg(Color::White)
        .add_modifier(Modifier::BOLD)
}

fn normal_title_style() -> Style {
    Style::default().bg(Color::DarkGray).fg(Color::White)
}

fn border_style(pane: &Pane) -> Style {
    if pane.boundary_flash().is_some() {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else if pane.is_active_visual() {
        Style::default().fg(Color::Blue)
    } else {
        Style::default().fg(Color::DarkGray)
    }
}

/// Split the terminal area into the pane canvas and a one-row status line.
pub fn split_status(area: Rect) -> (Rect, Rect) {
    if area.height < 2 {
        return (area, Rect::new(area.x, area.y, area.width, 0));
    }
    let canvas = Rect::new(area.x, area.y, area.width, area.height - 1);
    let status = Rect::new(area.x, area.y + area.height - 1, area.width, 1);
    (canvas, status)
}

/// One-row bar with text pinned to both ends.
#[derive(Debug, Clone, Default)]
pub struct StatusLine {
    left: String,
    right: String,
    style: Style,
}

impl StatusLine {
    pub fn new() -> Self {
        Self {
            style: Style::default().bg(Color::DarkGray).fg(Color::White),
            ..Self::default()
        }
    }

    pub fn set_left<T: Into<String>>(&mut self, value: T) {
        self.left = value.into();
    }

    pub fn set_right<T: Into<String>>(&mut self, value: T) {
        self.right = value.into();
    }

    pub fn render(&self, frame: &mut UiFrame<'_>, area: Rect) {
        let Some(bounds) = frame.clip_rect(area) else {
            return;
        };
        let width = bounds.width as usize;
        let buffer = frame.buffer_mut();
        buffer.set_style(bounds, self.style);
        safe_set_string(buffer, bounds, bounds.x, bounds.y, &self.left, self.style);
        let right_width = self.right.chars().count();
        if right_width > 0 && right_width + self.left.chars().count() < width {
            let start_x = bounds.x.saturating_add((width - right_width) as u16);
            safe_set_string(buffer, bounds, start_x, bounds.y, &self.right, self.style);
        }
    }
}

/// Draw every pane of the active workspace plus the status line.
pub fn render_session(frame: &mut UiFrame<'_>, session: &Session) {
    let (canvas, status) = split_status(frame.area());
    let manager = session.manager();
    if manager.is_empty() {
        let hint = session
            .bindings()
            .first_combo(Action::NewPane)
            .map(|combo| format!(", press {combo} to open a pane"))
            .unwrap_or_default();
        let message = format!(
            "workspace {} is empty{hint}",
            session.store().active_slot()
        );
        let y = canvas.y + canvas.height / 2;
        frame.render_widget(
            Paragraph::new(message).alignment(Alignment::Center),
            Rect::new(canvas.x, y, canvas.width, 1),
        );
    }
    let input = manager.input_focus().map(|focus| focus.element);
    for pane in manager.panes() {
        if let Some(rect) = manager.region(pane.id()) {
            render_pane(frame, manager.tree(), pane, rect, input);
        }
    }
    status_line(session).render(frame, status);
}

fn render_pane(
    frame: &mut UiFrame<'_>,
    tree: &VisualTree,
    pane: &Pane,
    rect: Rect,
    input: Option<ElementId>,
) {
    let title_style = if pane.is_focused() {
        focused_title_style()
    } else {
        normal_title_style()
    };
    let mut title = format!(" {} ", pane.title());
    if let Some(direction) = pane.boundary_flash() {
        title.push_str(edge_marker(direction));
        title.push(' ');
    }
    let block = Block::bordered()
        .title(Span::styled(title, title_style))
        .border_style(border_style(pane));
    let inner = block.inner(rect);
    frame.render_widget(block, rect);

    let mut lines = Vec::new();
    outline(tree, pane.container(), 0, input, &mut lines);
    frame.render_widget(Paragraph::new(lines), inner);
}

fn edge_marker(direction: NavDirection) -> &'static str {
    match direction {
        NavDirection::Left => "|<",
        NavDirection::Right => ">|",
        NavDirection::Up => "^^",
        NavDirection::Down => "vv",
    }
}

/// Element labels below `parent`, indented by depth. The element holding
/// input is marked.
fn outline(
    tree: &VisualTree,
    parent: ElementId,
    depth: usize,
    input: Option<ElementId>,
    lines: &mut Vec<Line<'static>>,
) {
    for &child in tree.children(parent) {
        let Some(label) = tree.label(child) else {
            continue;
        };
        let marker = if input == Some(child) { "> " } else { "  " };
        let style = if input == Some(child) {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        lines.push(Line::from(Span::styled(
            format!("{}{marker}{label}", "  ".repeat(depth)),
            style,
        )));
        outline(tree, child, depth + 1, input, lines);
    }
}

fn status_line(session: &Session) -> StatusLine {
    let manager = session.manager();
    let store = session.store();
    let mut mode = manager.layout_mode().to_string();
    if manager.len() > 1 && manager.effective_mode() != manager.layout_mode() {
        mode = format!("{mode}:{}", manager.effective_mode());
    }
    let mut left = format!(
        " ws {}/{}  {mode}  panes {}",
        store.active_slot(),
        store.slot_count(),
        manager.len()
    );
    if session.move_mode() {
        left.push_str("  [move]");
    }
    let hints = [Action::NewPane, Action::CloseFocused, Action::Quit]
        .into_iter()
        .filter_map(|action| {
            session
                .bindings()
                .first_combo(action)
                .map(|combo| format!("{combo} {}", short_label(action)))
        })
        .collect::<Vec<_>>()
        .join("  ");
    let mut line = StatusLine::new();
    line.set_left(left);
    line.set_right(format!("{hints} "));
    line
}

fn short_label(action: Action) -> &'static str {
    match action {
        Action::NewPane => "new",
        Action::CloseFocused => "close",
        Action::Quit => "quit",
        _ => "",
    }
}

pub(crate) fn safe_set_string(
    buffer: &mut Buffer,
    bounds: Rect,
    x: u16,
    y: u16,
    text: &str,
    style: Style,
) {
    if bounds.width == 0 || bounds.height == 0 {
        return;
    }
    let max_x = bounds.x.saturating_add(bounds.width);
    let max_y = bounds.y.saturating_add(bounds.height);
    if x < bounds.x || x >= max_x || y < bounds.y || y >= max_y {
        return;
    }
    let available = max_x.saturating_sub(x);
    let text = truncate_to_width(text, available as usize);
    buffer.set_string(x, y, text, style);
}

pub(crate) fn truncate_to_width(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    value.chars().take(width).collect()
}
