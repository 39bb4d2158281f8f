//! UI rendering components

pub mod completion;
pub mod content;
pub mod layout;
pub mod lesson_sidebar;
pub mod main_screen;
pub mod quiz_panel;
pub mod status_line;

use ratatui::Frame;

use crate::app::state::{AppState, Screen};
use crate::theme::Theme;

/// Main draw function
pub fn draw(frame: &mut Frame, state: &mut AppState, theme: &Theme) {
    match state.screen {
        Screen::Main => main_screen::draw(frame, state, theme),
        Screen::Complete => completion::draw(frame, state, theme),
        _ => {
            let (title, detail) = notice_for(&state.screen);
            layout::draw_notice(frame, title, &detail, theme);
        }
    }

    if state.quiz.is_some() {
        let area = frame.area();
        quiz_panel::draw(frame, area, state, theme);
    }
}

/// Title and detail text for the full-screen notices
fn notice_for(screen: &Screen) -> (&'static str, String) {
    match screen {
        Screen::Loading => ("Loading course…", String::new()),
        Screen::NotEnrolled => (
            "You are not enrolled in this course",
            "Enroll or purchase the course to start learning.\n\n[q] Quit".to_string(),
        ),
        Screen::Empty => ("This course has no lessons yet", "[q] Quit".to_string()),
        Screen::Fatal(message) => ("Could not open the course", format!("{message}\n\n[q] Quit")),
        Screen::Main | Screen::Complete => ("", String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fatal_notice_includes_reason() {
        let (title, detail) = notice_for(&Screen::Fatal("Course c9 not found".into()));
        assert_eq!(title, "Could not open the course");
        assert!(detail.contains("Course c9 not found"));
    }

    #[test]
    fn not_enrolled_notice_points_to_enrollment() {
        let (_, detail) = notice_for(&Screen::NotEnrolled);
        assert!(detail.contains("Enroll"));
    }
}
