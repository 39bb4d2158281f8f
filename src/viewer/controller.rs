//! Course viewer orchestration
//!
//! Loads a course and the student's enrollment, tracks the active lesson,
//! and applies finished quizzes and "mark complete" actions back into the
//! enrollment. The active lesson only moves after the backend has confirmed
//! the write.

use std::sync::Arc;

use thiserror::Error;

use crate::api::{ApiError, Backend};
use crate::course::{Course, Lesson, LessonKind};
use crate::progress::{
    Enrollment, EnrollmentProgressStore, LessonResult, LessonState, WriteState, gate,
};
use crate::quiz::{QuizOutcome, QuizSession};

/// Errors surfaced by the viewer
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The course does not exist; the view cannot be shown
    #[error("Course {0} not found")]
    CourseNotFound(String),

    /// Loading the course or enrollment failed
    #[error("Failed to load course: {0}")]
    Load(#[source] ApiError),

    /// The student has no enrollment for this course
    #[error("Not enrolled in this course")]
    NotEnrolled,

    #[error("Lesson {0} does not exist")]
    UnknownLesson(u32),

    #[error("Lesson {0} is locked. Pass the previous quiz first")]
    LessonLocked(u32),

    #[error("Lesson {0} has no quiz")]
    NoQuiz(u32),

    #[error("Lesson {0} is completed by passing its quiz")]
    QuizRequired(u32),

    #[error("No lesson is open")]
    NoActiveLesson,

    #[error("There is no unsaved result to retry")]
    NothingToRetry,

    /// Another lesson's result was rejected and has not been retried
    #[error("Progress for lesson {0} is not saved yet. Retry it first")]
    UnsavedResult(u32),

    /// The progress write was rejected; the result is kept for retry
    #[error("Progress not saved: {0}")]
    Persistence(#[source] ApiError),
}

impl ViewerError {
    /// Load-time errors abort the view
    pub fn is_fatal(&self) -> bool {
        matches!(self, ViewerError::CourseNotFound(_) | ViewerError::Load(_))
    }
}

/// What the viewer is showing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewerPhase {
    /// No enrollment: route to the purchase flow
    NotEnrolled,
    /// Enrolled, but the course has no lessons
    Empty,
    /// Studying the lesson with this order
    Learning { active_order: u32 },
    /// Course finished
    Complete,
}

/// What happened after a lesson result was saved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    /// Stay on the same lesson (quiz failed; it may be retaken)
    Stay,
    /// Moved to the lesson with this order
    MovedTo(u32),
    /// No next lesson: the course is complete
    CourseComplete,
}

/// A result waiting to be (re)written
#[derive(Debug, Clone, Copy)]
struct PendingWrite {
    lesson_order: u32,
    result: LessonResult,
}

/// Orchestrates loading, gating, and progress writes for one course
pub struct CourseViewerController<B: Backend + ?Sized> {
    store: EnrollmentProgressStore<B>,
    course: Course,
    enrollment: Option<Enrollment>,
    phase: ViewerPhase,
    unsaved: Option<PendingWrite>,
}

impl<B: Backend + ?Sized> CourseViewerController<B> {
    /// Fetch the course and the student's enrollment
    pub async fn load(
        backend: Arc<B>,
        course_id: &str,
        student_email: &str,
    ) -> Result<Self, ViewerError> {
        let course = backend.get_course(course_id).await.map_err(|e| {
            if e.is_not_found() {
                ViewerError::CourseNotFound(course_id.to_string())
            } else {
                ViewerError::Load(e)
            }
        })?;

        for issue in course.validate() {
            tracing::warn!(course_id, "Course structure problem: {}", issue);
        }

        let mut enrollments =
            backend.find_enrollments(student_email, course_id).await.map_err(ViewerError::Load)?;
        if enrollments.len() > 1 {
            tracing::warn!(course_id, count = enrollments.len(), "Multiple enrollments; using the first");
        }
        let enrollment = if enrollments.is_empty() { None } else { Some(enrollments.swap_remove(0)) };

        tracing::info!(
            course_id,
            backend = backend.backend_tag(),
            enrolled = enrollment.is_some(),
            "course loaded"
        );
        Ok(Self::new(backend, course, enrollment))
    }

    /// Build a controller from already loaded records
    pub fn new(backend: Arc<B>, course: Course, enrollment: Option<Enrollment>) -> Self {
        let phase = initial_phase(&course, enrollment.as_ref());
        Self { store: EnrollmentProgressStore::new(backend), course, enrollment, phase, unsaved: None }
    }

    pub fn course(&self) -> &Course {
        &self.course
    }

    pub fn enrollment(&self) -> Option<&Enrollment> {
        self.enrollment.as_ref()
    }

    pub fn phase(&self) -> ViewerPhase {
        self.phase
    }

    /// State of the most recent progress write
    pub fn write_state(&self) -> &WriteState {
        self.store.state()
    }

    /// Whether a rejected result is waiting for `retry_save`
    pub fn has_unsaved_result(&self) -> bool {
        self.unsaved.is_some()
    }

    /// Stored completion percentage (0 when not enrolled)
    pub fn completion_percentage(&self) -> f64 {
        self.enrollment.as_ref().map_or(0.0, |e| e.completion_percentage)
    }

    /// The lesson being studied
    pub fn active_lesson(&self) -> Option<&Lesson> {
        match self.phase {
            ViewerPhase::Learning { active_order } => self.course.lesson_by_order(active_order),
            _ => None,
        }
    }

    /// Whether a lesson is locked for this student
    pub fn is_locked(&self, lesson: &Lesson) -> bool {
        match &self.enrollment {
            Some(enrollment) => gate::is_locked(lesson, &self.course, enrollment),
            None => true,
        }
    }

    /// Lock/completion state of every lesson, sorted by order
    pub fn lesson_states(&self) -> Vec<(&Lesson, LessonState)> {
        match &self.enrollment {
            Some(enrollment) => gate::lesson_states(&self.course, enrollment),
            None => self
                .course
                .lessons_in_order()
                .into_iter()
                .map(|lesson| (lesson, LessonState::Locked))
                .collect(),
        }
    }

    /// Open a lesson if the gate allows it
    pub fn select_lesson(&mut self, order: u32) -> Result<&Lesson, ViewerError> {
        if self.enrollment.is_none() {
            return Err(ViewerError::NotEnrolled);
        }
        let lesson = self.course.lesson_by_order(order).ok_or(ViewerError::UnknownLesson(order))?;
        if self.is_locked(lesson) {
            return Err(ViewerError::LessonLocked(order));
        }

        tracing::debug!(order, "lesson opened");
        self.phase = ViewerPhase::Learning { active_order: order };
        Ok(lesson)
    }

    /// Begin an attempt at the active lesson's quiz
    pub fn start_quiz(&self) -> Result<QuizSession, ViewerError> {
        let lesson = self.active_lesson().ok_or(ViewerError::NoActiveLesson)?;
        match &lesson.kind {
            LessonKind::QuizGated(quiz) => {
                QuizSession::new(quiz.clone()).ok_or(ViewerError::NoQuiz(lesson.order))
            }
            LessonKind::Plain => Err(ViewerError::NoQuiz(lesson.order)),
        }
    }

    /// Apply a finished quiz to the active lesson
    pub async fn complete_quiz(&mut self, outcome: &QuizOutcome) -> Result<Advance, ViewerError> {
        let lesson = self.active_lesson().ok_or(ViewerError::NoActiveLesson)?;
        if !lesson.has_quiz() {
            return Err(ViewerError::NoQuiz(lesson.order));
        }
        let order = lesson.order;
        self.commit(order, LessonResult::quiz(outcome.score, outcome.passed)).await
    }

    /// Mark the active lesson done; only for lessons without a quiz
    pub async fn mark_complete(&mut self) -> Result<Advance, ViewerError> {
        let lesson = self.active_lesson().ok_or(ViewerError::NoActiveLesson)?;
        if lesson.has_quiz() {
            return Err(ViewerError::QuizRequired(lesson.order));
        }
        let order = lesson.order;
        self.commit(order, LessonResult::marked_complete()).await
    }

    /// Resend the last rejected result
    pub async fn retry_save(&mut self) -> Result<Advance, ViewerError> {
        let pending = self.unsaved.ok_or(ViewerError::NothingToRetry)?;
        self.commit(pending.lesson_order, pending.result).await
    }

    async fn commit(&mut self, lesson_order: u32, result: LessonResult) -> Result<Advance, ViewerError> {
        let enrollment = self.enrollment.as_ref().ok_or(ViewerError::NotEnrolled)?;
        // A newer result for the same lesson replaces the unsaved one
        if let Some(pending) = self.unsaved {
            if pending.lesson_order != lesson_order {
                return Err(ViewerError::UnsavedResult(pending.lesson_order));
            }
        }
        self.unsaved = Some(PendingWrite { lesson_order, result });

        let saved = self
            .store
            .record_lesson_result(enrollment, &self.course, lesson_order, result)
            .await
            .map_err(ViewerError::Persistence)?;

        self.enrollment = Some(saved);
        self.unsaved = None;
        Ok(self.advance_after(lesson_order, result.completed))
    }

    fn advance_after(&mut self, lesson_order: u32, completed: bool) -> Advance {
        if !completed {
            return Advance::Stay;
        }

        match self.course.next_lesson(lesson_order) {
            Some(next) => {
                let next_order = next.order;
                self.phase = ViewerPhase::Learning { active_order: next_order };
                tracing::info!(from = lesson_order, to = next_order, "advanced to next lesson");
                Advance::MovedTo(next_order)
            }
            None => {
                self.phase = ViewerPhase::Complete;
                tracing::info!(course_id = %self.course.id, "course complete");
                Advance::CourseComplete
            }
        }
    }
}

/// Phase to show when the viewer opens
pub fn initial_phase(course: &Course, enrollment: Option<&Enrollment>) -> ViewerPhase {
    let Some(enrollment) = enrollment else {
        return ViewerPhase::NotEnrolled;
    };
    if enrollment.is_course_complete() {
        return ViewerPhase::Complete;
    }
    match initial_active_lesson(course, enrollment) {
        Some(active_order) => ViewerPhase::Learning { active_order },
        None => ViewerPhase::Empty,
    }
}

/// Lesson to open first
///
/// The lesson after the highest completed one; the lowest order when
/// nothing is completed; the first lesson as stored when the computed
/// next lesson does not exist.
pub fn initial_active_lesson(course: &Course, enrollment: &Enrollment) -> Option<u32> {
    let lesson = match enrollment.highest_completed_order() {
        None => course.first_lesson(),
        Some(highest) => {
            course.next_lesson(highest).or_else(|| course.first_stored_lesson())
        }
    };
    lesson.map(|lesson| lesson.order)
}
