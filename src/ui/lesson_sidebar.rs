//! Lesson list with lock and completion indicators

use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::app::state::{AppState, LessonRow};
use crate::progress::LessonState;
use crate::theme::Theme;

const ICON_LOCKED: &str = "⊘";
const ICON_AVAILABLE: &str = "○";
const ICON_ACTIVE: &str = "●";
const ICON_COMPLETED: &str = "✓";

/// Draw the lesson sidebar
pub fn draw(frame: &mut Frame, area: Rect, state: &mut AppState, theme: &Theme, focused: bool) {
    let border_color = if focused { theme.border_focused } else { theme.border };

    let block = Block::default()
        .title(format!(" Lessons {:.0}% ", state.completion))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .style(Style::default().bg(theme.bg_primary));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    state.sidebar.visible_height = inner.height as usize;
    state.sidebar.ensure_selection_visible();

    let lines: Vec<Line> = state
        .lessons
        .iter()
        .enumerate()
        .skip(state.sidebar.scroll_offset)
        .take(inner.height as usize)
        .map(|(index, row)| {
            let active = state.active_order == Some(row.order);
            let selected = focused && index == state.sidebar.selected_index;
            Line::from(Span::styled(row_text(row, active), row_style(row, active, selected, theme)))
        })
        .collect();

    frame.render_widget(Paragraph::new(lines), inner);
}

/// Icon for a lesson row
fn status_icon(row: &LessonRow, active: bool) -> &'static str {
    match row.state {
        LessonState::Locked => ICON_LOCKED,
        LessonState::Completed => ICON_COMPLETED,
        LessonState::Available if active => ICON_ACTIVE,
        LessonState::Available => ICON_AVAILABLE,
    }
}

/// Text of a lesson row: icon, order, title and last quiz score
fn row_text(row: &LessonRow, active: bool) -> String {
    let mut text = format!("{} {}. {}", status_icon(row, active), row.order, row.title);
    match row.quiz_score {
        Some(score) => text.push_str(&format!(" ({score:.0}%)")),
        None if row.has_quiz => text.push_str(" ?"),
        None => {}
    }
    text
}

fn row_style(row: &LessonRow, active: bool, selected: bool, theme: &Theme) -> Style {
    if selected {
        return Style::default()
            .fg(theme.bg_primary)
            .bg(theme.accent_primary)
            .add_modifier(Modifier::BOLD);
    }
    let color = match row.state {
        LessonState::Locked => theme.lesson_locked,
        LessonState::Completed => theme.lesson_completed,
        LessonState::Available => theme.lesson_available,
    };
    let style = Style::default().fg(color);
    if active { style.add_modifier(Modifier::BOLD) } else { style }
}
