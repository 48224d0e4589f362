mod helpers;
mod input;
mod spinner;
pub mod stage;
mod theme;

use ratatui::{
    prelude::*,
    widgets::{Block, Paragraph},
};

use crate::app::ChatShell;
use crate::state::State;

pub fn render(frame: &mut Frame, state: &mut State, shell: &ChatShell, title: &str) {
    let area = frame.area();

    // Fill base background
    frame.render_widget(Block::default().style(Style::default().bg(theme::BG_BASE)), area);

    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(1),    // Stage panel
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    render_header(frame, shell, title, main_layout[0]);
    stage::render_stage(frame, state, shell.stream(), main_layout[1]);
    input::render_input(frame, state, main_layout[2]);
    input::render_status_bar(frame, state, shell.stream(), main_layout[3]);
}

fn render_header(frame: &mut Frame, shell: &ChatShell, title: &str, area: Rect) {
    let session = shell.session();
    let line = Line::from(vec![
        Span::styled(format!(" {} ", title), Style::default().fg(theme::ACCENT).bold()),
        Span::styled("│ ", Style::default().fg(theme::BORDER)),
        Span::styled(session.short_id().to_string(), Style::default().fg(theme::TEXT_SECONDARY)),
        Span::styled(
            format!("  since {}", session.started_at().format("%H:%M")),
            Style::default().fg(theme::TEXT_MUTED),
        ),
    ]);
    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme::BG_BASE)), area);
}
