use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Paragraph},
};
use unicode_width::UnicodeWidthStr;

use super::{helpers::truncate_string, spinner::spinner, theme};
use crate::constants::INPUT_PLACEHOLDER;
use crate::state::{State, StreamState, StreamStatus};

const KEY_HINTS: &str = "Enter ask · Esc stop · ^N new chat · ^Q quit ";

pub fn render_input(frame: &mut Frame, state: &State, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER_FOCUS))
        .style(Style::default().bg(theme::BG_INPUT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    if state.input.is_empty() {
        let placeholder = Paragraph::new(Span::styled(INPUT_PLACEHOLDER, Style::default().fg(theme::TEXT_MUTED)));
        frame.render_widget(placeholder, inner);
        frame.set_cursor_position((inner.x, inner.y));
        return;
    }

    // Single line: scroll horizontally so the cursor stays visible
    let cursor_col = state.input[..state.input_cursor].width() as u16;
    let visible = inner.width.saturating_sub(1);
    let offset = cursor_col.saturating_sub(visible);

    let paragraph =
        Paragraph::new(Span::styled(state.input.as_str(), Style::default().fg(theme::TEXT))).scroll((0, offset));
    frame.render_widget(paragraph, inner);
    frame.set_cursor_position((inner.x + cursor_col - offset, inner.y));
}

pub fn render_status_bar(frame: &mut Frame, state: &State, stream: &StreamState, area: Rect) {
    let base_style = Style::default().bg(theme::BG_BASE).fg(theme::TEXT_MUTED);
    let badge = |bg: Color| Style::default().fg(theme::BG_BASE).bg(bg).bold();

    let mut spans = vec![Span::styled(" ", base_style)];

    match &stream.status {
        StreamStatus::Streaming => {
            spans.push(Span::styled(
                format!(" {} PROCESSING ", spinner(state.spinner_frame)),
                badge(theme::SUCCESS),
            ));
        }
        StreamStatus::Idle => spans.push(Span::styled(" READY ", badge(theme::TEXT_MUTED))),
        StreamStatus::Done => spans.push(Span::styled(" DONE ", badge(theme::ACCENT_DIM))),
        StreamStatus::Stopped => spans.push(Span::styled(" STOPPED ", badge(theme::WARNING))),
        StreamStatus::Failed(message) => {
            spans.push(Span::styled(" ERROR ", badge(theme::ERROR)));
            spans.push(Span::styled(" ", base_style));
            spans.push(Span::styled(truncate_string(message, 60), Style::default().fg(theme::ERROR).bg(theme::BG_BASE)));
        }
    }
    spans.push(Span::styled(" ", base_style));

    if stream.checkpoint.is_some() {
        spans.push(Span::styled(" ⟳ RESUMABLE ", Style::default().fg(theme::TEXT).bg(theme::BG_ELEVATED)));
        spans.push(Span::styled(" ", base_style));
    }

    let left_width: usize = spans.iter().map(|s| s.content.width()).sum();
    let padding = (area.width as usize).saturating_sub(left_width + KEY_HINTS.width());
    spans.push(Span::styled(" ".repeat(padding), base_style));
    spans.push(Span::styled(KEY_HINTS, base_style));

    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}
