//! Status line at the bottom of the main screen

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::Paragraph,
};

use crate::app::state::AppState;
use crate::progress::{LessonState, WriteState};
use crate::theme::Theme;

/// Draw the status line
pub fn draw(frame: &mut Frame, area: Rect, state: &AppState, theme: &Theme) {
    let progress = progress_text(state);
    let [left, right] =
        Layout::horizontal([Constraint::Min(0), Constraint::Length(progress.chars().count() as u16 + 1)])
            .areas(area);

    let (text, style) = match &state.status.message {
        Some(message) if state.status.is_error => (message.clone(), Style::default().fg(theme.error)),
        Some(message) => (message.clone(), Style::default().fg(theme.fg_secondary)),
        None => (hint(state).to_string(), Style::default().fg(theme.fg_muted)),
    };
    frame.render_widget(Paragraph::new(Line::from(Span::styled(text, style))), left);

    let progress_style = match state.write_state {
        WriteState::Pending => Style::default().fg(theme.warning),
        WriteState::Failed(_) if state.unsaved => Style::default().fg(theme.error),
        _ => Style::default().fg(theme.info),
    };
    frame.render_widget(
        Paragraph::new(Span::styled(progress, progress_style)).alignment(Alignment::Right),
        right,
    );
}

/// Key hint for the current lesson
fn hint(state: &AppState) -> &'static str {
    if state.unsaved {
        return "Progress not saved: [r] retry    [q] quit";
    }
    let active = state.active_order.and_then(|order| state.lessons.iter().find(|row| row.order == order));
    match active {
        Some(row) if row.has_quiz => "[t] take quiz    [h/l] panels    [j/k] move    [q] quit",
        Some(row) if row.state != LessonState::Completed => {
            "[m] mark complete    [h/l] panels    [j/k] move    [q] quit"
        }
        _ => "[h/l] panels    [j/k] move    [Enter] open    [q] quit",
    }
}

/// Lesson position and stored completion
fn progress_text(state: &AppState) -> String {
    let total = state.lessons.len();
    let position = state
        .active_order
        .and_then(|order| state.lessons.iter().position(|row| row.order == order))
        .map_or(0, |index| index + 1);
    let saving = if state.write_state.is_pending() { "saving… " } else { "" };
    format!("{}lesson {}/{} · {:.0}% complete", saving, position, total, state.completion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::LessonRow;

    fn state() -> AppState {
        let row = |order, has_quiz, lesson_state| LessonRow {
            order,
            title: format!("L{order}"),
            state: lesson_state,
            has_quiz,
            quiz_score: None,
        };
        AppState {
            lessons: vec![
                row(1, true, LessonState::Completed),
                row(2, false, LessonState::Available),
                row(3, false, LessonState::Locked),
            ],
            active_order: Some(2),
            completion: 100.0 / 3.0,
            ..Default::default()
        }
    }

    #[test]
    fn progress_shows_position_and_rounded_percentage() {
        assert_eq!(progress_text(&state()), "lesson 2/3 · 33% complete");
    }

    #[test]
    fn pending_write_is_shown() {
        let mut state = state();
        state.write_state = WriteState::Pending;
        assert!(progress_text(&state).starts_with("saving… "));
    }

    #[test]
    fn hint_follows_lesson_kind() {
        let mut state = state();
        assert!(hint(&state).contains("mark complete"));
        state.active_order = Some(1);
        assert!(hint(&state).contains("take quiz"));
        state.unsaved = true;
        assert!(hint(&state).contains("retry"));
    }
}
