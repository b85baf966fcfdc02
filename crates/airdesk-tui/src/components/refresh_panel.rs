//! RefreshPanel: the catalogue refresh trigger, its progress bar and log.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
    Frame,
};

use crate::{
    action::{Action, ComponentId, RefreshChoice},
    app_state::{AppState, LineTone},
    component::Component,
    theme::{style_control, style_secondary, C_ERROR, C_MUTED, C_OK, C_PRIMARY, C_RUNNING},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_progress,
    },
};

pub struct RefreshPanel {
    choice: RefreshChoice,
    /// Lines scrolled up from the bottom of the log.
    scroll_back: usize,
}

impl RefreshPanel {
    pub fn new() -> Self {
        Self {
            choice: RefreshChoice::Batches,
            scroll_back: 0,
        }
    }
}

impl Default for RefreshPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for RefreshPanel {
    fn id(&self) -> ComponentId {
        ComponentId::RefreshPanel
    }

    fn title(&self) -> &str {
        "Refresh"
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let idle = state.trigger.is_enabled();
        match key.code {
            KeyCode::Char('r') | KeyCode::Enter if idle => vec![Action::StartRefresh(self.choice)],
            KeyCode::Char('m') if idle => {
                self.choice = self.choice.next();
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.scroll_back = (self.scroll_back + 1).min(state.refresh_log.len());
                vec![]
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.scroll_back = self.scroll_back.saturating_sub(1);
                vec![]
            }
            KeyCode::End | KeyCode::Char('G') => {
                self.scroll_back = 0;
                vec![]
            }
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::StartRefresh(_) = action {
            self.scroll_back = 0;
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let idle = state.trigger.is_enabled();
        let (badge, color) = if idle {
            ("idle", C_MUTED)
        } else {
            ("refreshing…", C_RUNNING)
        };
        let block = pane_chrome("Refresh", Some('2'), focused, Some(Badge { text: badge, color }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        let mut controls = vec![
            Span::styled(" [r] Refresh stations ", style_control(idle)),
            Span::styled(" [m] ", style_control(idle)),
            Span::styled(self.choice.label(), Style::default().fg(C_PRIMARY)),
        ];
        if self.choice != RefreshChoice::Batches {
            let countries = if state.refresh_countries.is_empty() {
                "no countries configured".to_string()
            } else {
                state.refresh_countries.join(", ")
            };
            controls.push(Span::styled(format!("  ({})", countries), style_secondary()));
        }
        frame.render_widget(Paragraph::new(Line::from(controls)), rows[0]);

        if let Some(p) = &state.refresh_progress {
            let label = format!("{}/{} ({}%)", p.processed, p.total, p.percent);
            draw_progress(
                frame,
                rows[2],
                p.percent as f64 / 100.0,
                p.current_country.as_deref(),
                &label,
                if idle { C_OK } else { C_RUNNING },
            );
        } else if let Some(mode) = state.refresh_mode {
            frame.render_widget(
                Paragraph::new(Span::styled(format!(" starting ({})…", mode), style_secondary())),
                rows[2],
            );
        }

        let height = rows[3].height as usize;
        let end = state.refresh_log.len().saturating_sub(self.scroll_back);
        let start = end.saturating_sub(height);
        let lines: Vec<Line> = state.refresh_log[start..end]
            .iter()
            .map(|l| {
                let color = match l.tone {
                    LineTone::Info => C_PRIMARY,
                    LineTone::Success => C_OK,
                    LineTone::Error => C_ERROR,
                };
                Line::from(vec![
                    Span::styled(format!(" {} ", l.stamp()), Style::default().fg(C_MUTED)),
                    Span::styled(l.text.clone(), Style::default().fg(color)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: false }), rows[3]);
    }

    fn min_height(&self) -> u16 {
        6
    }

    fn collapse_summary(&self, state: &AppState) -> Option<String> {
        state
            .refresh_progress
            .as_ref()
            .map(|p| format!("{}%", p.percent))
    }
}
