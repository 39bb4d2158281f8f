//! Plain-text progress report for the command line

use std::fmt::Write;

use super::{Enrollment, LessonState, gate};
use crate::course::Course;

/// Lesson list with lock state, quiz results and completion
pub fn progress_report(course: &Course, enrollment: Option<&Enrollment>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({})", course.title, course.id);

    let Some(enrollment) = enrollment else {
        let _ = writeln!(out, "Not enrolled. {} lessons.", course.total_lessons());
        return out;
    };

    for (lesson, state) in gate::lesson_states(course, enrollment) {
        let icon = match state {
            LessonState::Completed => "✓",
            LessonState::Available => "○",
            LessonState::Locked => "⊘",
        };
        let _ = write!(out, "  {} {:>2}. {}", icon, lesson.order, lesson.title);

        match enrollment.lesson(lesson.order) {
            Some(entry) => {
                if let Some(score) = entry.quiz_score {
                    let verdict = if entry.passed_quiz() { "passed" } else { "not passed" };
                    let _ = write!(out, "  quiz {score:.0}% {verdict}");
                }
                let _ = write!(out, "  ({})", entry.completed_date.format("%Y-%m-%d"));
            }
            None if lesson.has_quiz() => {
                let _ = write!(out, "  quiz pending");
            }
            None => {}
        }
        out.push('\n');
    }

    let _ = writeln!(
        out,
        "{} of {} lessons completed · {:.0}%",
        enrollment.completed_count(),
        course.total_lessons(),
        enrollment.completion_percentage
    );
    out
}
