//! Layout utilities and common components

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Wrap},
};

use crate::theme::Theme;

/// Draw a full-screen notice with a title and optional detail
pub fn draw_notice(frame: &mut Frame, title: &str, detail: &str, theme: &Theme) {
    let area = frame.area();
    frame.render_widget(
        Paragraph::new("").style(Style::default().bg(theme.bg_primary)),
        area,
    );

    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default().fg(theme.accent_primary).add_modifier(Modifier::BOLD),
    ))];
    if !detail.is_empty() {
        lines.push(Line::from(""));
        lines.extend(detail.lines().map(|line| {
            Line::from(Span::styled(line.to_string(), Style::default().fg(theme.fg_muted)))
        }));
    }

    let notice = Paragraph::new(lines).alignment(Alignment::Center).wrap(Wrap { trim: true });
    frame.render_widget(notice, centered_rect(70, 40, area));
}

/// Create a centered rectangle with the given percentage of width and height
pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(r);

    Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(popup_layout[1])[1]
}
