//! JobPanel: badge, counters and start/stop controls for one background job.

use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use airdesk_proto::tracker::{JobKind, Tone};

use crate::{
    action::{Action, ComponentId},
    app_state::AppState,
    component::Component,
    theme::{style_control, style_secondary, tone_color, C_ERROR, C_PRIMARY, C_RUNNING},
    widgets::{
        pane_chrome::{pane_chrome, Badge},
        progress_bar::draw_progress,
    },
};

pub struct JobPanel {
    kind: JobKind,
}

impl JobPanel {
    pub fn new(kind: JobKind) -> Self {
        Self { kind }
    }
}

impl Component for JobPanel {
    fn id(&self) -> ComponentId {
        ComponentId::JobPanel(self.kind)
    }

    fn title(&self) -> &str {
        self.kind.label()
    }

    fn handle_key(&mut self, key: KeyEvent, state: &AppState) -> Vec<Action> {
        if key.kind == KeyEventKind::Release {
            return vec![];
        }
        let badge = state.tracker(self.kind).badge();
        match key.code {
            KeyCode::Char('s') if badge.start_enabled => vec![Action::StartJob(self.kind)],
            KeyCode::Char('x') if badge.stop_enabled => vec![Action::StopJob(self.kind)],
            _ => vec![],
        }
    }

    fn draw(&mut self, frame: &mut Frame, area: Rect, focused: bool, state: &AppState) {
        let tracker = state.tracker(self.kind);
        let badge = tracker.badge();
        let block = pane_chrome(
            self.kind.label(),
            None,
            focused,
            Some(Badge {
                text: &badge.label,
                color: tone_color(badge.tone),
            }),
        );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let mut lines = Vec::new();
        if let Some(err) = state.job_errors.get(&self.kind) {
            lines.push(Line::from(Span::styled(
                format!(" status unavailable: {}", err),
                Style::default().fg(C_ERROR),
            )));
        }
        if let Some(last) = tracker.last() {
            let c = last.extra_json;
            if !last.extra_info.is_empty() {
                lines.push(Line::from(Span::styled(
                    format!(" {}", last.extra_info),
                    Style::default().fg(C_PRIMARY),
                )));
            }
            lines.push(Line::from(Span::styled(
                format!(
                    " created {} · updated {} · explored {}",
                    c.created, c.updated, c.explored
                ),
                style_secondary(),
            )));
        }
        if state.controls_expanded {
            lines.push(Line::from(vec![
                Span::raw(" "),
                Span::styled("[s] Start", style_control(badge.start_enabled)),
                Span::raw("  "),
                Span::styled("[x] Stop", style_control(badge.stop_enabled)),
            ]));
        }

        let text_rows = (lines.len() as u16).min(inner.height);
        frame.render_widget(
            Paragraph::new(lines),
            Rect {
                height: text_rows,
                ..inner
            },
        );

        let ratio = tracker.last().and_then(|s| s.extra_json.ratio());
        if let (Some(ratio), Some(last)) = (ratio, tracker.last()) {
            if inner.height > text_rows {
                let row = Rect {
                    y: inner.y + text_rows,
                    height: 1,
                    ..inner
                };
                let c = last.extra_json;
                let label = format!("{}/{}", c.processed, c.total);
                let color = match badge.tone {
                    Tone::Neutral => C_RUNNING,
                    tone => tone_color(tone),
                };
                draw_progress(frame, row, ratio, None, &label, color);
            }
        }
    }

    fn min_height(&self) -> u16 {
        6
    }

    fn collapse_summary(&self, state: &AppState) -> Option<String> {
        Some(state.tracker(self.kind).badge().label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airdesk_proto::protocol::{JobState, JobStatus};
    use ratatui::crossterm::event::KeyModifiers;

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn controls_follow_badge() {
        let mut state = AppState::new("http://localhost".into(), vec![], None);
        let mut panel = JobPanel::new(JobKind::Scan);

        assert!(matches!(panel.handle_key(key('s'), &state)[..], [Action::StartJob(JobKind::Scan)]));
        assert!(panel.handle_key(key('x'), &state).is_empty());

        state.scan.observe(&JobStatus {
            status: JobState::Running,
            ..JobStatus::default()
        });
        assert!(panel.handle_key(key('s'), &state).is_empty());
        assert!(matches!(panel.handle_key(key('x'), &state)[..], [Action::StopJob(JobKind::Scan)]));
    }
}
