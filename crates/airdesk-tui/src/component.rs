//! Component trait: the interface every panel implements.
//!
//! Components own their local UI state (cursor, scroll, field contents), read
//! shared data from `AppState` and return `Vec<Action>` instead of mutating
//! anything themselves.

use ratatui::crossterm::event::KeyEvent;
use ratatui::{layout::Rect, Frame};

use crate::action::{Action, ComponentId};
use crate::app_state::AppState;

pub trait Component {
    fn id(&self) -> ComponentId;

    fn title(&self) -> &str;

    /// Only called while this component has focus.
    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action>;

    /// Every action the App dispatches is broadcast here, focused or not.
    fn on_action(&mut self, _action: &Action, _state: &AppState) -> Vec<Action> {
        Vec::new()
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState);

    fn min_height(&self) -> u16 {
        3
    }

    /// Shown next to the title when the pane is collapsed.
    fn collapse_summary(&self, _state: &AppState) -> Option<String> {
        None
    }
}
