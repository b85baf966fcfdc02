//! TracksPanel: Spotify link status and the configured artist's tracks.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_secondary, style_selected_focused, C_ERROR, C_MUTED, C_OK, C_PRIMARY},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        toast::Severity,
    },
};

pub struct TracksPanel {
    list: ListState,
}

impl TracksPanel {
    pub fn new() -> Self {
        Self {
            list: ListState::default(),
        }
    }
}

impl Default for TracksPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for TracksPanel {
    fn id(&self) -> ComponentId {
        ComponentId::TracksPanel
    }

    fn title(&self) -> &str {
        "Spotify"
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let len = state.tracks.len();
        match key.code {
            KeyCode::Char('R') => {
                if state.artist_id.is_some() {
                    vec![Action::LoadTracks]
                } else {
                    vec![Action::Toast(
                        Severity::Warning,
                        "No artist configured (dashboard.artist_id)".into(),
                    )]
                }
            }
            KeyCode::Down | KeyCode::Char('j') if len > 0 => {
                let next = self.list.selected().map_or(0, |i| (i + 1).min(len - 1));
                self.list.select(Some(next));
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') if len > 0 => {
                let next = self.list.selected().map_or(0, |i| i.saturating_sub(1));
                self.list.select(Some(next));
                vec![]
            }
            KeyCode::Char('y') => match self.list.selected().and_then(|i| state.tracks.get(i)) {
                Some(track) => vec![Action::Copy {
                    what: "track id",
                    text: track.id.clone(),
                }],
                None => vec![],
            },
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, _state: &AppState) -> Vec<Action> {
        if let Action::LoadTracks = action {
            self.list.select(None);
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let (badge, color) = match (&state.spotify, &state.spotify_error) {
            (_, Some(_)) => ("unreachable", C_ERROR),
            (Some(s), None) if s.ok => ("connected", C_OK),
            (Some(_), None) => ("not connected", C_ERROR),
            (None, None) => ("…", C_MUTED),
        };
        let block = pane_chrome("Spotify", None, focused, Some(Badge { text: badge, color }));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(1), Constraint::Min(1)])
            .split(inner);

        let status = match (&state.spotify, &state.spotify_error) {
            (_, Some(err)) => Span::styled(format!(" {}", err), Style::default().fg(C_ERROR)),
            (Some(s), None) if !s.message.is_empty() => {
                Span::styled(format!(" {}", s.message), style_secondary())
            }
            _ => Span::raw(""),
        };
        frame.render_widget(Paragraph::new(Line::from(status)), rows[0]);

        if state.artist_id.is_none() {
            frame.render_widget(
                Paragraph::new(Span::styled(
                    " set dashboard.artist_id to list an artist's tracks",
                    Style::default().fg(C_MUTED),
                )),
                rows[1],
            );
            return;
        }
        if state.tracks_loading {
            frame.render_widget(Paragraph::new(Span::styled(" loading…", style_secondary())), rows[1]);
            return;
        }

        let items: Vec<ListItem> = state
            .tracks
            .iter()
            .map(|t| {
                let name = if t.name.is_empty() { "(untitled)" } else { t.name.as_str() };
                ListItem::new(Line::from(vec![
                    Span::styled(format!(" {}", name), Style::default().fg(C_PRIMARY)),
                    Span::styled(format!("  {}", t.id), Style::default().fg(C_MUTED)),
                ]))
            })
            .collect();
        let list = List::new(items).highlight_style(if focused {
            style_selected_focused()
        } else {
            Style::default()
        });
        frame.render_stateful_widget(list, rows[1], &mut self.list);
    }

    fn min_height(&self) -> u16 {
        4
    }

    fn collapse_summary(&self, state: &AppState) -> Option<String> {
        let link = match &state.spotify {
            Some(s) if s.ok => "connected",
            Some(_) => "not connected",
            None => "unknown",
        };
        Some(format!("{} · {} tracks", link, state.tracks.len()))
    }
}
