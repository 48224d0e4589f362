//! Stage panel: shows whichever of searching / reading / writing is current.
//!
//! [`stage_display`] is the pure part; [`render_stage`] paints its result.

use ratatui::{
    prelude::*,
    widgets::{Block, Borders, Padding, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
};

use super::{helpers::wrap_text, theme};
use crate::state::{Stage, State, StreamState};

/// One source as shown in the reading panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source<'a> {
    pub label: &'a str,
    pub url: &'a str,
}

/// What the stage area should show. At most one panel at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StageDisplay<'a> {
    /// Idle and nothing streaming
    Hidden,
    /// Streaming but no stage reached yet
    Waiting,
    Searching { query: &'a str },
    Reading { sources: Vec<Source<'a>> },
    Writing { answer: &'a str },
}

pub fn stage_display(stream: &StreamState) -> StageDisplay<'_> {
    match stream.stage {
        Stage::None if stream.in_progress() => StageDisplay::Waiting,
        Stage::None => StageDisplay::Hidden,
        Stage::Searching => StageDisplay::Searching { query: &stream.search_query },
        Stage::Reading if stream.sources.is_empty() => StageDisplay::Waiting,
        Stage::Reading => StageDisplay::Reading {
            sources: stream.sources.iter().map(|url| Source { label: source_label(url), url }).collect(),
        },
        Stage::Writing => StageDisplay::Writing { answer: &stream.answer },
    }
}

/// Host part of a source URL: scheme dropped, cut at the first `/`.
pub fn source_label(url: &str) -> &str {
    let rest = url.strip_prefix("https://").or_else(|| url.strip_prefix("http://")).unwrap_or(url);
    rest.split('/').next().unwrap_or(rest)
}

pub fn render_stage(frame: &mut Frame, state: &mut State, stream: &StreamState, area: Rect) {
    let display = stage_display(stream);

    let (title, tint) = match &display {
        StageDisplay::Hidden => return,
        StageDisplay::Waiting => (String::new(), theme::BG_SURFACE),
        StageDisplay::Searching { .. } => (" 🔍 Searching the web ".to_string(), theme::STAGE_SEARCHING),
        StageDisplay::Reading { .. } => (" 📚 Reading ".to_string(), theme::STAGE_READING),
        StageDisplay::Writing { .. } => (" ✍ Writing answer ".to_string(), theme::STAGE_WRITING),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme::BORDER))
        .style(Style::default().bg(tint))
        .padding(Padding::horizontal(1))
        .title(Span::styled(title, Style::default().fg(theme::TEXT).bold()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    match display {
        StageDisplay::Hidden | StageDisplay::Waiting => {}
        StageDisplay::Searching { query } => {
            let line = Line::from(vec![
                Span::styled("Query: ", Style::default().fg(theme::TEXT_SECONDARY).bold()),
                Span::styled(query, Style::default().fg(theme::TEXT)),
            ]);
            frame.render_widget(Paragraph::new(line).wrap(Wrap { trim: false }), inner);
        }
        StageDisplay::Reading { sources } => {
            let mut lines = vec![Line::from(Span::styled(
                "Sources:",
                Style::default().fg(theme::TEXT_SECONDARY).bold(),
            ))];
            for source in sources {
                lines.push(Line::from(vec![
                    Span::styled("  • ", Style::default().fg(theme::TEXT_MUTED)),
                    Span::styled(source.label, Style::default().fg(theme::LINK).underlined()),
                ]));
            }
            frame.render_widget(Paragraph::new(lines), inner);
        }
        StageDisplay::Writing { answer } => render_answer(frame, state, answer, inner),
    }
}

fn render_answer(frame: &mut Frame, state: &mut State, answer: &str, area: Rect) {
    // Pre-wrap so the scroll range matches the rows actually drawn.
    // One column is left for the scrollbar.
    let wrap_width = area.width.saturating_sub(1) as usize;
    let lines: Vec<Line> = answer
        .split('\n')
        .flat_map(|line| wrap_text(line, wrap_width))
        .map(|row| Line::from(Span::styled(row, Style::default().fg(theme::TEXT))))
        .collect();

    let viewport_height = area.height as usize;
    let content_height = lines.len();
    let max_scroll = content_height.saturating_sub(viewport_height).min(u16::MAX as usize) as u16;
    state.max_scroll = max_scroll;

    // Follow the tail unless the user scrolled up
    if state.user_scrolled && state.scroll_offset >= max_scroll {
        state.user_scrolled = false;
    }
    if !state.user_scrolled {
        state.scroll_offset = max_scroll;
    }
    state.scroll_offset = state.scroll_offset.min(max_scroll);

    let paragraph = Paragraph::new(lines).scroll((state.scroll_offset, 0));
    frame.render_widget(paragraph, area);

    if content_height > viewport_height {
        let scrollbar = Scrollbar::default()
            .orientation(ScrollbarOrientation::VerticalRight)
            .style(Style::default().fg(theme::BG_ELEVATED))
            .thumb_style(Style::default().fg(theme::ACCENT_DIM));
        let mut scrollbar_state = ScrollbarState::new(max_scroll as usize).position(state.scroll_offset as usize);
        frame.render_stateful_widget(scrollbar, area, &mut scrollbar_state);
    }
}
