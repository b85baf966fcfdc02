//! SearchPanel: filter fields over a table of matching stations.
//!
//! Fields take comma-separated values ("France, Belgium"). Enter submits the
//! whole form; `y` / `Y` copy the selected station's homepage / email.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
    Frame,
};

use airdesk_proto::search::SearchQuery;

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_secondary, style_selected_focused, C_LINK, C_LOCATION, C_MUTED, C_PRIMARY, C_TAG},
    widgets::{
        filter_input::{FieldAction, FilterInput},
        pane_chrome::{pane_chrome, Badge},
        toast::Severity,
    },
};

const FIELD_COUNT: usize = 3;

pub struct SearchPanel {
    fields: [FilterInput; FIELD_COUNT],
    editing: Option<usize>,
    table: TableState,
}

impl SearchPanel {
    pub fn new() -> Self {
        Self {
            fields: [
                FilterInput::new("Country", "any country"),
                FilterInput::new("Region", "any region"),
                FilterInput::new("Style", "any style"),
            ],
            editing: None,
            table: TableState::default(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing.is_some()
    }

    pub fn query(&self) -> SearchQuery {
        SearchQuery::from_fields(
            self.fields[0].text(),
            self.fields[1].text(),
            self.fields[2].text(),
        )
    }

    /// Pre-fill the fields, e.g. from command-line filters.
    pub fn set_query(&mut self, query: &SearchQuery) {
        self.fields[0].set_value(&query.countries.join(", "));
        self.fields[1].set_value(&query.states.join(", "));
        self.fields[2].set_value(&query.tags.join(", "));
    }

    fn selected(&self, state: &AppState) -> Option<usize> {
        self.table
            .selected()
            .filter(|&i| i < state.stations.len())
    }

    fn move_selection(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.table.select(None);
            return;
        }
        let cur = self.table.selected().unwrap_or(0) as isize;
        let next = (cur + delta).clamp(0, len as isize - 1) as usize;
        self.table.select(Some(next));
    }

    fn copy_selected(&self, state: &AppState, email: bool) -> Vec<Action> {
        let Some(station) = self.selected(state).map(|i| &state.stations[i]) else {
            return vec![];
        };
        let (what, text) = if email {
            ("email", station.emails.trim())
        } else {
            ("homepage", station.homepage.trim())
        };
        if text.is_empty() {
            return vec![Action::Toast(
                Severity::Warning,
                format!("{} has no {}", station.name, what),
            )];
        }
        vec![Action::Copy {
            what,
            text: text.to_string(),
        }]
    }

    fn handle_editing(&mut self, idx: usize, key: KeyEvent) -> Vec<Action> {
        match self.fields[idx].handle_key(key) {
            FieldAction::Submit => {
                self.editing = None;
                vec![Action::RunSearch(self.query())]
            }
            FieldAction::Next => {
                self.editing = Some((idx + 1) % FIELD_COUNT);
                vec![]
            }
            FieldAction::Prev => {
                self.editing = Some((idx + FIELD_COUNT - 1) % FIELD_COUNT);
                vec![]
            }
            FieldAction::Cancelled => {
                self.editing = None;
                vec![]
            }
            FieldAction::Edited | FieldAction::None => vec![],
        }
    }
}

impl Default for SearchPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl Component for SearchPanel {
    fn id(&self) -> ComponentId {
        ComponentId::SearchPanel
    }

    fn title(&self) -> &str {
        "Stations"
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        if let Some(idx) = self.editing {
            return self.handle_editing(idx, key);
        }
        let len = state.stations.len();
        match key.code {
            KeyCode::Char('/') | KeyCode::Char('e') => {
                self.editing = Some(0);
                vec![]
            }
            KeyCode::Enter => vec![Action::RunSearch(self.query())],
            KeyCode::Down | KeyCode::Char('j') => {
                self.move_selection(1, len);
                vec![]
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.move_selection(-1, len);
                vec![]
            }
            KeyCode::PageDown => {
                self.move_selection(10, len);
                vec![]
            }
            KeyCode::PageUp => {
                self.move_selection(-10, len);
                vec![]
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.move_selection(isize::MIN / 2, len);
                vec![]
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.move_selection(isize::MAX / 2, len);
                vec![]
            }
            KeyCode::Char('y') => self.copy_selected(state, false),
            KeyCode::Char('Y') => self.copy_selected(state, true),
            _ => vec![],
        }
    }

    fn on_action(&mut self, action: &Action, state: &AppState) -> Vec<Action> {
        if let Action::RunSearch(_) = action {
            self.table.select(None);
        }
        if self.table.selected().is_none() && !state.stations.is_empty() {
            self.table.select(Some(0));
        }
        vec![]
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let count = if state.searching {
            "searching…".to_string()
        } else {
            format!("{} stations", state.stations.len())
        };
        let block = pane_chrome(
            "Stations",
            Some('1'),
            focused,
            Some(Badge {
                text: &count,
                color: C_MUTED,
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(FIELD_COUNT as u16),
                Constraint::Length(1),
                Constraint::Min(1),
            ])
            .split(inner);

        for (i, field) in self.fields.iter().enumerate() {
            let row = Rect {
                y: rows[0].y + i as u16,
                height: 1,
                ..rows[0]
            };
            field.draw(frame, row, focused && self.editing == Some(i));
        }

        let hint = match &state.last_query {
            Some(q) if !state.searching => format!(
                " {} · {} countries · {} regions · {} styles",
                q.describe(),
                state.facets.countries.len(),
                state.facets.states.len(),
                state.facets.tags.len()
            ),
            Some(_) => String::new(),
            None => " press / to edit the filters, Enter to search".to_string(),
        };
        frame.render_widget(Paragraph::new(Span::styled(hint, style_secondary())), rows[1]);

        if state.stations.is_empty() {
            if state.last_query.is_some() && !state.searching {
                frame.render_widget(
                    Paragraph::new(Line::from(Span::styled(
                        " No stations match these filters.",
                        Style::default().fg(C_MUTED),
                    ))),
                    rows[2],
                );
            }
            return;
        }

        if self.selected(state).is_none() {
            self.table.select(Some(0));
        }
        let body: Vec<Row> = state
            .stations
            .iter()
            .map(|s| {
                Row::new(vec![
                    Cell::from(Span::styled(s.name.clone(), Style::default().fg(C_PRIMARY))),
                    Cell::from(Span::styled(s.country.clone(), Style::default().fg(C_LOCATION))),
                    Cell::from(Span::styled(s.state.clone(), Style::default().fg(C_LOCATION))),
                    Cell::from(Span::styled(
                        s.tag_list().collect::<Vec<_>>().join(", "),
                        Style::default().fg(C_TAG),
                    )),
                    Cell::from(Span::styled(s.homepage.clone(), Style::default().fg(C_LINK))),
                ])
            })
            .collect();
        let table = Table::new(
            body,
            [
                Constraint::Percentage(24),
                Constraint::Percentage(12),
                Constraint::Percentage(14),
                Constraint::Percentage(22),
                Constraint::Percentage(28),
            ],
        )
        .header(Row::new(vec!["Name", "Country", "Region", "Style", "Homepage"]).style(style_secondary()))
        .row_highlight_style(if focused {
            style_selected_focused()
        } else {
            Style::default()
        });
        frame.render_stateful_widget(table, rows[2], &mut self.table);
    }

    fn min_height(&self) -> u16 {
        8
    }

    fn collapse_summary(&self, state: &AppState) -> Option<String> {
        Some(format!("{} stations", state.stations.len()))
    }
}
