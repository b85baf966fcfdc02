//! Smooth Unicode progress bar with a percentage label.

use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

use crate::theme::{C_MUTED, C_SECONDARY};

const BLOCKS: [char; 9] = [' ', '▏', '▎', '▍', '▌', '▋', '▊', '▉', '█'];

/// Render `ratio` (0.0..=1.0) as a bar of `width` cells, in eighths.
pub fn bar_string(ratio: f64, width: usize) -> String {
    let eighths = (ratio.clamp(0.0, 1.0) * width as f64 * 8.0).round() as usize;
    let full = (eighths / 8).min(width);
    let mut bar = "█".repeat(full);
    if full < width {
        bar.push(BLOCKS[eighths % 8]);
        bar.push_str(&" ".repeat(width - full - 1));
    }
    bar
}

/// Draw `ratio` with a leading caption and a trailing label, e.g.
/// `France  ████▌      42%`.
pub fn draw_progress(
    frame: &mut Frame,
    area: Rect,
    ratio: f64,
    caption: Option<&str>,
    label: &str,
    color: Color,
) {
    if area.width < 6 || area.height == 0 {
        return;
    }
    let caption = caption.unwrap_or_default();
    let used = caption.chars().count() + label.chars().count() + 2;
    let bar_w = (area.width as usize).saturating_sub(used).max(4);

    let mut spans = Vec::new();
    if !caption.is_empty() {
        spans.push(Span::styled(format!("{} ", caption), Style::default().fg(C_SECONDARY)));
    }
    spans.push(Span::styled(bar_string(ratio, bar_w), Style::default().fg(color)));
    spans.push(Span::styled(format!(" {}", label), Style::default().fg(C_MUTED)));
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_has_requested_width() {
        for ratio in [0.0, 0.33, 0.5, 1.0, 1.7] {
            assert_eq!(bar_string(ratio, 10).chars().count(), 10, "{}", ratio);
        }
        assert_eq!(bar_string(1.0, 4), "████");
        assert_eq!(bar_string(0.5, 4), "██  ");
    }
}
