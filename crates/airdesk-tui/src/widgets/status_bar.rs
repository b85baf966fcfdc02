//! Bottom rows: last log line and the key hints for the current view.

use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::action::Workspace;
use crate::theme::{C_ACCENT, C_FILTER_FG, C_MUTED, C_OK, C_SECONDARY, C_SEPARATOR};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

/// Last log line, prefixed with a dot showing whether the back end answered
/// the latest request.
pub fn draw_log_bar(frame: &mut Frame, area: Rect, last_log: Option<&str>, reachable: bool) {
    let dot = if reachable {
        Span::styled("●", Style::default().fg(C_OK))
    } else {
        Span::styled("○", Style::default().fg(C_ACCENT))
    };
    let line = Line::from(vec![
        dot,
        Span::raw(" "),
        Span::styled(last_log.unwrap_or(""), Style::default().fg(C_SECONDARY)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

pub fn draw_separator(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(Span::styled(
            "─".repeat(area.width as usize),
            Style::default().fg(C_SEPARATOR),
        ))),
        area,
    );
}

pub fn keys_for(mode: InputMode, workspace: Workspace) -> &'static str {
    match (mode, workspace) {
        (InputMode::Editing, _) => " type to edit  Tab/S-Tab field  Enter search  Esc clear/leave",
        (InputMode::Normal, Workspace::Search) => {
            " / edit filters  Enter search  ↑↓/jk select  y copy homepage  Y copy email  1-3 views  L logs  K keys  q quit"
        }
        (InputMode::Normal, Workspace::Refresh) => {
            " r start refresh  m mode  ↑↓/jk scroll  1-3 views  L logs  K keys  q quit"
        }
        (InputMode::Normal, Workspace::Dashboard) => {
            " Tab pane  s start  x stop  c collapse  R tracks  1-3 views  L logs  K keys  q quit"
        }
    }
}

pub fn draw_keys_bar(frame: &mut Frame, area: Rect, mode: InputMode, workspace: Workspace) {
    let (label, color) = match mode {
        InputMode::Editing => ("EDIT".to_string(), C_FILTER_FG),
        InputMode::Normal => (workspace.label().to_uppercase(), C_OK),
    };
    let line = Line::from(vec![
        Span::styled(
            format!(" {} ", label),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ),
        Span::styled(keys_for(mode, workspace), Style::default().fg(C_MUTED)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
