//! Action dispatch for the terminal viewer
//!
//! Turns key actions into viewer operations. Progress writes are returned as
//! [`Flow::Save`] so the caller can draw the saving state before awaiting.

use crate::api::Backend;
use crate::progress::WriteState;
use crate::quiz::{QuizOutcome, QuizPhase};
use crate::viewer::{Advance, CourseViewerController, ViewerError};

use super::input::Action;
use super::state::{AppState, Panel, Screen};

/// What the event loop should do next
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Flow {
    Continue,
    Quit,
    /// Persist a result, then keep going
    Save(SaveOp),
}

/// A progress write requested by the user
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SaveOp {
    Quiz(QuizOutcome),
    MarkComplete,
    Retry,
}

/// Apply one action to the viewer and UI state
pub fn handle_action<B: Backend + ?Sized>(
    viewer: &mut CourseViewerController<B>,
    state: &mut AppState,
    action: Action,
) -> Flow {
    if action == Action::Quit {
        return Flow::Quit;
    }
    if state.quiz.is_some() {
        return handle_quiz_action(viewer, state, action);
    }

    match state.screen {
        Screen::Main => handle_main_action(viewer, state, action),
        Screen::Complete => {
            if action == Action::Select {
                // Reopen the first lesson for review
                if let Some(order) = state.lessons.first().map(|row| row.order) {
                    if let Err(e) = viewer.select_lesson(order) {
                        state.status.set_error(e.to_string());
                    }
                    state.sync(viewer);
                }
            }
            Flow::Continue
        }
        _ => match action {
            Action::Select | Action::Back => Flow::Quit,
            _ => Flow::Continue,
        },
    }
}

fn handle_main_action<B: Backend + ?Sized>(
    viewer: &mut CourseViewerController<B>,
    state: &mut AppState,
    action: Action,
) -> Flow {
    let page = state.content.visible_height.max(2) as isize;
    let rows = state.lessons.len();

    match (action, state.focused_panel) {
        (Action::Up, Panel::Lessons) => state.sidebar.move_selection(-1, rows),
        (Action::Down, Panel::Lessons) => state.sidebar.move_selection(1, rows),
        (Action::Top, Panel::Lessons) => state.sidebar.move_selection(-(rows as isize), rows),
        (Action::Bottom, Panel::Lessons) => state.sidebar.move_selection(rows as isize, rows),
        (Action::Up, Panel::Content) => state.content.scroll_by(-1),
        (Action::Down, Panel::Content) => state.content.scroll_by(1),
        (Action::Top, Panel::Content) => state.content.scroll_offset = 0,
        (Action::Bottom, Panel::Content) => state.content.scroll_by(isize::MAX),
        (Action::PageUp, _) => state.content.scroll_by(-page),
        (Action::PageDown, _) => state.content.scroll_by(page),
        (Action::HalfPageUp, _) => state.content.scroll_by(-page / 2),
        (Action::HalfPageDown, _) => state.content.scroll_by(page / 2),
        (Action::FocusLessons | Action::Back, _) => state.focused_panel = Panel::Lessons,
        (Action::FocusContent, _) => state.focused_panel = Panel::Content,
        (Action::Select, Panel::Lessons) => {
            if let Some(order) = state.selected_lesson().map(|row| row.order) {
                match viewer.select_lesson(order) {
                    Ok(_) => {
                        state.status.clear();
                        state.focused_panel = Panel::Content;
                    }
                    Err(e) => state.status.set_error(e.to_string()),
                }
                state.sync(viewer);
            }
        }
        (Action::TakeQuiz, _) => open_quiz(viewer, state),
        (Action::MarkComplete, _) => match viewer.active_lesson() {
            Some(lesson) if lesson.has_quiz() => {
                state.status.set_error(ViewerError::QuizRequired(lesson.order).to_string());
            }
            Some(_) => return Flow::Save(SaveOp::MarkComplete),
            None => state.status.set_error(ViewerError::NoActiveLesson.to_string()),
        },
        (Action::RetrySave, _) => return retry(viewer, state),
        _ => {}
    }
    Flow::Continue
}

fn handle_quiz_action<B: Backend + ?Sized>(
    viewer: &mut CourseViewerController<B>,
    state: &mut AppState,
    action: Action,
) -> Flow {
    let Some(session) = state.quiz.as_mut() else {
        return Flow::Continue;
    };

    match (session.phase(), action) {
        (QuizPhase::Answering, Action::Up | Action::Down) => {
            let options = session.current_question().options.len();
            let next = match (session.selected_option(), action) {
                (None, _) => 0,
                (Some(i), Action::Up) => i.saturating_sub(1),
                (Some(i), _) => (i + 1).min(options.saturating_sub(1)),
            };
            session.select_option(next);
        }
        (QuizPhase::Answering, Action::Choose(index)) => {
            session.select_option(index);
        }
        (QuizPhase::Answering, Action::Select) => {
            if session.submit_answer().is_none() {
                state.status.set_message("Pick an option first");
            }
        }
        (QuizPhase::Feedback, Action::Select) => {
            if let Some(outcome) = session.next() {
                return Flow::Save(SaveOp::Quiz(outcome));
            }
        }
        (QuizPhase::Finished, Action::Select | Action::Back) => {
            state.quiz = None;
        }
        (QuizPhase::Finished, Action::TakeQuiz) => {
            state.quiz = None;
            open_quiz(viewer, state);
        }
        (QuizPhase::Finished, Action::RetrySave) => return retry(viewer, state),
        (_, Action::Back) => {
            state.quiz = None;
            state.status.set_message("Quiz abandoned. Nothing was saved");
        }
        _ => {}
    }
    Flow::Continue
}

fn open_quiz<B: Backend + ?Sized>(viewer: &CourseViewerController<B>, state: &mut AppState) {
    match viewer.start_quiz() {
        Ok(session) => {
            state.status.clear();
            state.quiz = Some(session);
        }
        Err(e) => state.status.set_error(e.to_string()),
    }
}

fn retry<B: Backend + ?Sized>(viewer: &CourseViewerController<B>, state: &mut AppState) -> Flow {
    if viewer.has_unsaved_result() {
        Flow::Save(SaveOp::Retry)
    } else {
        state.status.set_message(ViewerError::NothingToRetry.to_string());
        Flow::Continue
    }
}

/// Show the saving state before the write is awaited
pub fn mark_saving(state: &mut AppState) {
    state.write_state = WriteState::Pending;
    state.status.set_message("Saving…");
}

/// Persist a result and report the outcome on the status line
pub async fn save<B: Backend + ?Sized>(
    viewer: &mut CourseViewerController<B>,
    state: &mut AppState,
    op: SaveOp,
) {
    let result = match op {
        SaveOp::Quiz(outcome) => viewer.complete_quiz(&outcome).await,
        SaveOp::MarkComplete => viewer.mark_complete().await,
        SaveOp::Retry => viewer.retry_save().await,
    };

    match result {
        Ok(Advance::Stay) => {
            state.status.set_message("Saved. Score is below the passing mark; press t to retake")
        }
        Ok(Advance::MovedTo(order)) => {
            state.status.set_message(format!("Saved. Lesson {order} unlocked"))
        }
        Ok(Advance::CourseComplete) => state.status.set_message("Saved. Course complete"),
        Err(e @ ViewerError::Persistence(_)) => {
            state.status.set_error(format!("{e}. Press r to retry"))
        }
        Err(e) => state.status.set_error(e.to_string()),
    }
    state.sync(viewer);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryBackend;
    use crate::course::{Course, Lesson, Question, Quiz};
    use crate::progress::{Enrollment, LessonState};
    use std::sync::Arc;

    fn setup() -> (Arc<InMemoryBackend>, CourseViewerController<InMemoryBackend>, AppState) {
        let mut course = Course::new("c1", "Course");
        let quiz = Quiz::new("Check", vec![Question::new("?", vec!["right".into(), "wrong".into()], 0)]);
        course.lessons.push(Lesson::with_quiz(1, "One", "body", quiz));
        course.lessons.push(Lesson::plain(2, "Two", "body"));
        let enrollment = Enrollment::new("e1", "s@example.com", "c1");
        let backend =
            Arc::new(InMemoryBackend::new().with_course(course.clone()).with_enrollment(enrollment.clone()));
        let viewer = CourseViewerController::new(backend.clone(), course, Some(enrollment));
        let mut state = AppState::default();
        state.sync(&viewer);
        (backend, viewer, state)
    }

    async fn run(
        viewer: &mut CourseViewerController<InMemoryBackend>,
        state: &mut AppState,
        actions: &[Action],
    ) {
        for &action in actions {
            if let Flow::Save(op) = handle_action(viewer, state, action) {
                mark_saving(state);
                save(viewer, state, op).await;
            }
        }
    }

    #[tokio::test]
    async fn passing_quiz_unlocks_next_lesson() {
        let (_backend, mut viewer, mut state) = setup();
        run(&mut viewer, &mut state, &[Action::TakeQuiz, Action::Choose(0), Action::Select, Action::Select])
            .await;

        assert_eq!(state.write_state, WriteState::Committed);
        assert_eq!(state.active_order, Some(2));
        assert_eq!(state.lessons[1].state, LessonState::Available);
        assert_eq!(state.lessons[0].quiz_score, Some(100.0));

        // Close results, then mark the plain lesson complete
        run(&mut viewer, &mut state, &[Action::Select, Action::MarkComplete]).await;
        assert!(state.quiz.is_none());
        assert_eq!(state.screen, Screen::Complete);
        assert_eq!(state.completion, 100.0);
    }

    #[tokio::test]
    async fn failed_save_offers_retry() {
        let (backend, mut viewer, mut state) = setup();
        backend.set_fail_updates(true);
        run(&mut viewer, &mut state, &[Action::TakeQuiz, Action::Choose(0), Action::Select, Action::Select])
            .await;

        assert!(matches!(state.write_state, WriteState::Failed(_)));
        assert!(state.unsaved);
        assert!(state.status.is_error);
        assert_eq!(state.active_order, Some(1));

        backend.set_fail_updates(false);
        run(&mut viewer, &mut state, &[Action::RetrySave]).await;
        assert_eq!(state.write_state, WriteState::Committed);
        assert_eq!(state.active_order, Some(2));
    }

    #[tokio::test]
    async fn locked_lesson_cannot_be_opened() {
        let (_backend, mut viewer, mut state) = setup();
        state.focused_panel = Panel::Lessons;
        run(&mut viewer, &mut state, &[Action::Down, Action::Select]).await;

        assert!(state.status.is_error);
        assert_eq!(state.active_order, Some(1));
    }

    #[tokio::test]
    async fn quiz_lesson_cannot_be_marked_complete() {
        let (backend, mut viewer, mut state) = setup();
        let flow = handle_action(&mut viewer, &mut state, Action::MarkComplete);
        assert_eq!(flow, Flow::Continue);
        assert!(state.status.is_error);
        assert_eq!(backend.update_calls(), 0);
    }

    #[test]
    fn abandoning_a_quiz_saves_nothing() {
        let (_backend, mut viewer, mut state) = setup();
        handle_action(&mut viewer, &mut state, Action::TakeQuiz);
        assert!(state.quiz_open());
        assert_eq!(handle_action(&mut viewer, &mut state, Action::Back), Flow::Continue);
        assert!(!state.quiz_open());
        assert_eq!(state.write_state, WriteState::Idle);
    }

    #[test]
    fn retry_without_unsaved_result_is_a_message() {
        let (_backend, mut viewer, mut state) = setup();
        assert_eq!(handle_action(&mut viewer, &mut state, Action::RetrySave), Flow::Continue);
        assert!(!state.status.is_error);
    }

    #[test]
    fn quit_always_quits() {
        let (_backend, mut viewer, mut state) = setup();
        handle_action(&mut viewer, &mut state, Action::TakeQuiz);
        assert_eq!(handle_action(&mut viewer, &mut state, Action::Quit), Flow::Quit);
    }
}
