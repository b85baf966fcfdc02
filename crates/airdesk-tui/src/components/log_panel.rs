//! LogPanel: recent application events, toggled with `L`.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::{AppState, LineTone},
    component::Component,
    theme::{C_ERROR, C_MUTED, C_OK, C_SECONDARY},
    widgets::pane_chrome::pane_chrome,
};

pub struct LogPanel {
    scroll_back: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self { scroll_back: 0 }
    }
}

impl Default for LogPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for LogPanel {
    fn id(&self) -> ComponentId {
        ComponentId::LogPanel
    }

    fn title(&self) -> &str {
        "Log"
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_back = (self.scroll_back + 1).min(state.logs.len());
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
            }
            KeyCode::Esc => return vec![Action::ToggleLogs],
            _ => {}
        }
        vec![]
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::ToggleLogs = action {
            self.scroll_back = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        frame.render_widget(Clear, area);
        let block = pane_chrome("Log", None, focused, None);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let height = inner.height as usize;
        let end = state.logs.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        let lines: Vec<Line> = state
            .logs
            .range(start..end)
            .map(|l| {
                let color = match l.tone {
                    LineTone::Info => C_SECONDARY,
                    LineTone::Success => C_OK,
                    LineTone::Error => C_ERROR,
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", l.stamp()), Style::default().fg(C_MUTED)),
                    Span::styled(l.text.clone(), Style::default().fg(color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }
}
