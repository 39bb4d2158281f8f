//! Main study screen: lesson sidebar, lesson content and status line

use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

use super::{content, lesson_sidebar, status_line};
use crate::app::state::{AppState, Panel};
use crate::theme::Theme;

/// Minimum width for the lesson sidebar
const SIDEBAR_MIN_WIDTH: u16 = 24;

/// Draw the main study screen
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    let area = frame.area();

    let vertical_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1)])
        .split(area);

    let chunks = create_layout(vertical_chunks[0]);
    let focused = state.focused_panel;

    lesson_sidebar::draw(frame, chunks[0], state, theme, focused == Panel::Lessons);
    content::draw(frame, chunks[1], state, theme, focused == Panel::Content);
    status_line::draw(frame, vertical_chunks[1], state, theme);
}

/// Sidebar (a quarter of the width, at least `SIDEBAR_MIN_WIDTH`) and content
fn create_layout(area: Rect) -> Vec<Rect> {
    let sidebar_width = (area.width / 4).max(SIDEBAR_MIN_WIDTH).min(area.width);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(sidebar_width), Constraint::Min(0)])
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_splits_sidebar_and_content() {
        let chunks = create_layout(Rect::new(0, 0, 120, 40));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].width, 30);
        assert_eq!(chunks[1].width, 90);
    }

    #[test]
    fn narrow_terminal_keeps_minimum_sidebar() {
        let chunks = create_layout(Rect::new(0, 0, 60, 20));
        assert_eq!(chunks[0].width, SIDEBAR_MIN_WIDTH);
    }
}
