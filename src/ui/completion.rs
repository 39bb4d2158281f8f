//! Course complete screen

use ratatui::{
    Frame,
    layout::Alignment,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};

use super::layout::centered_rect;
use crate::app::state::AppState;
use crate::theme::Theme;

pub fn draw(frame: &mut Frame, state: &AppState, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(Paragraph::new("").style(Style::default().bg(theme.bg_primary)), area);

    let panel = centered_rect(60, 60, area);
    let block = Block::default()
        .title(format!(" {} ", state.course_title))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.success))
        .style(Style::default().bg(theme.bg_secondary));
    let inner = block.inner(panel);
    frame.render_widget(block, panel);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Course complete!",
            Style::default().fg(theme.success).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    lines.extend(
        summary(state)
            .into_iter()
            .map(|text| Line::from(Span::styled(text, Style::default().fg(theme.fg_secondary)))),
    );
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Review lessons    [q] Quit",
        Style::default().fg(theme.fg_muted),
    )));

    frame.render_widget(
        Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true }),
        inner,
    );
}

/// Lesson count and quiz scores
fn summary(state: &AppState) -> Vec<String> {
    let mut lines = vec![format!("{} lessons · {:.0}% complete", state.lessons.len(), state.completion)];
    lines.extend(
        state
            .lessons
            .iter()
            .filter_map(|row| row.quiz_score.map(|score| format!("{}: {:.0}%", row.title, score))),
    );
    lines
}
