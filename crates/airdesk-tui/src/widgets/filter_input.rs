//! Labelled text field backed by tui-input, used for the search filters.

use ratatui::crossterm::event::{Event, KeyCode, KeyEvent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tui_input::{backend::crossterm::EventHandler, Input};

use crate::theme::{C_FILTER_BG, C_FILTER_FG, C_MUTED, C_SECONDARY};

#[derive(Debug, PartialEq, Eq)]
pub enum FieldAction {
    Edited,
    /// Enter: submit the form.
    Submit,
    /// Tab / Shift-Tab: move to the neighbouring field.
    Next,
    Prev,
    /// Esc on an empty field: leave editing.
    Cancelled,
    None,
}

pub struct FilterInput {
    input: Input,
    label: &'static str,
    placeholder: &'static str,
}

impl FilterInput {
    pub fn new(label: &'static str, placeholder: &'static str) -> Self {
        Self {
            input: Input::default(),
            label,
            placeholder,
        }
    }

    pub fn text(&self) -> &str {
        self.input.value()
    }

    pub fn set_value(&mut self, value: &str) {
        self.input = Input::new(value.to_string());
    }

    /// Esc clears a non-empty field first and cancels on the second press.
    pub fn handle_key(&mut self, key: KeyEvent) -> FieldAction {
        match key.code {
            KeyCode::Esc if !self.input.value().is_empty() => {
                self.input = Input::default();
                FieldAction::Edited
            }
            KeyCode::Esc => FieldAction::Cancelled,
            KeyCode::Enter => FieldAction::Submit,
            KeyCode::Tab => FieldAction::Next,
            KeyCode::BackTab => FieldAction::Prev,
            _ => match self.input.handle_event(&Event::Key(key)) {
                Some(change) if change.value => FieldAction::Edited,
                _ => FieldAction::None,
            },
        }
    }

    pub fn draw(&self, frame: &mut Frame, area: Rect, editing: bool) {
        let prefix = format!("{:>8}: ", self.label);
        let prefix_w = prefix.chars().count() as u16;
        let room = area.width.saturating_sub(prefix_w + 1) as usize;
        let scroll = self.input.visual_scroll(room);
        let value = self.input.value();

        let label_style = if editing {
            Style::default().fg(C_FILTER_FG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(C_SECONDARY)
        };
        let body = if value.is_empty() {
            Span::styled(self.placeholder, Style::default().fg(C_MUTED))
        } else {
            let visible: String = value.chars().skip(scroll).collect();
            Span::styled(visible, Style::default().fg(C_FILTER_FG))
        };

        frame.render_widget(
            Paragraph::new(Line::from(vec![Span::styled(prefix, label_style), body]))
                .style(Style::default().bg(C_FILTER_BG)),
            area,
        );

        if editing {
            let x = area.x + prefix_w + (self.input.visual_cursor() - scroll) as u16;
            frame.set_cursor_position((x.min(area.x + area.width.saturating_sub(1)), area.y));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::crossterm::event::KeyModifiers;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn typing_and_double_escape() {
        let mut f = FilterInput::new("Country", "any");
        assert_eq!(f.handle_key(key(KeyCode::Char('F'))), FieldAction::Edited);
        assert_eq!(f.handle_key(key(KeyCode::Char('R'))), FieldAction::Edited);
        assert_eq!(f.text(), "FR");
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FieldAction::Edited);
        assert_eq!(f.text(), "");
        assert_eq!(f.handle_key(key(KeyCode::Esc)), FieldAction::Cancelled);
    }

    #[test]
    fn navigation_keys() {
        let mut f = FilterInput::new("Tag", "any");
        assert_eq!(f.handle_key(key(KeyCode::Tab)), FieldAction::Next);
        assert_eq!(f.handle_key(key(KeyCode::BackTab)), FieldAction::Prev);
        assert_eq!(f.handle_key(key(KeyCode::Enter)), FieldAction::Submit);
    }
}
