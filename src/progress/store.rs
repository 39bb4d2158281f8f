//! Merge-and-persist step for lesson results

use std::sync::Arc;

use chrono::Utc;

use super::{Enrollment, LessonResult};
use crate::api::{ApiError, EnrollmentApi, EnrollmentUpdate};
use crate::course::Course;

/// State of the most recent progress write
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum WriteState {
    /// Nothing written yet
    #[default]
    Idle,
    /// A write has been sent and not yet acknowledged
    Pending,
    /// The backend acknowledged the last write
    Committed,
    /// The last write failed; the enrollment it carried is not durable
    Failed(String),
}

impl WriteState {
    /// Whether a write is in flight
    pub fn is_pending(&self) -> bool {
        matches!(self, WriteState::Pending)
    }
}

/// Owns the authoritative write of lesson results into an enrollment
pub struct EnrollmentProgressStore<A: EnrollmentApi + ?Sized> {
    api: Arc<A>,
    state: WriteState,
}

impl<A: EnrollmentApi + ?Sized> EnrollmentProgressStore<A> {
    /// Create a store writing through `api`
    pub fn new(api: Arc<A>) -> Self {
        Self { api, state: WriteState::Idle }
    }

    /// State of the most recent write
    pub fn state(&self) -> &WriteState {
        &self.state
    }

    /// Merge a lesson result and persist the whole enrollment
    ///
    /// The existing entry for `lesson_order` is replaced outright, the
    /// completion percentage is recomputed against the course's lesson
    /// count, and the result is sent to the backend. The caller's
    /// `enrollment` is left untouched; the returned record is the one the
    /// backend acknowledged.
    pub async fn record_lesson_result(
        &mut self,
        enrollment: &Enrollment,
        course: &Course,
        lesson_order: u32,
        result: LessonResult,
    ) -> Result<Enrollment, ApiError> {
        let mut updated = enrollment.clone();
        updated.apply(result.into_progress(lesson_order, Utc::now()), course.total_lessons());

        tracing::info!(
            enrollment_id = %updated.id,
            lesson_order,
            completed = result.completed,
            completion = updated.completion_percentage,
            "saving lesson result"
        );

        self.state = WriteState::Pending;
        match self.api.update_enrollment(&updated.id, &EnrollmentUpdate::from(&updated)).await {
            Ok(saved) => {
                self.state = WriteState::Committed;
                Ok(saved)
            }
            Err(e) => {
                tracing::error!(enrollment_id = %updated.id, lesson_order, "Failed to save progress: {}", e);
                self.state = WriteState::Failed(e.to_string());
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::InMemoryBackend;
    use crate::course::Lesson;
    use pretty_assertions::assert_eq;

    fn setup(lessons: u32) -> (Arc<InMemoryBackend>, Course, Enrollment) {
        let mut course = Course::new("c1", "Course");
        for order in 1..=lessons {
            course.lessons.push(Lesson::plain(order, format!("L{order}"), ""));
        }
        let enrollment = Enrollment::new("e1", "s@example.com", "c1");
        let backend = Arc::new(
            InMemoryBackend::new().with_course(course.clone()).with_enrollment(enrollment.clone()),
        );
        (backend, course, enrollment)
    }

    #[tokio::test]
    async fn second_write_for_same_lesson_overwrites() {
        let (backend, course, enrollment) = setup(2);
        let mut store = EnrollmentProgressStore::new(backend.clone());

        let first =
            store.record_lesson_result(&enrollment, &course, 1, LessonResult::quiz(50.0, false)).await.unwrap();
        let second =
            store.record_lesson_result(&first, &course, 1, LessonResult::quiz(100.0, true)).await.unwrap();

        assert_eq!(second.progress.len(), 1);
        let entry = second.lesson(1).unwrap();
        assert_eq!(entry.quiz_score, Some(100.0));
        assert_eq!(entry.quiz_passed, Some(true));
        assert!(entry.completed);
        assert_eq!(second.completion_percentage, 50.0);
        assert_eq!(store.state(), &WriteState::Committed);

        let stored = backend.enrollment("e1").await.unwrap();
        assert_eq!(stored, second);
    }

    #[tokio::test]
    async fn overwrite_carries_nothing_forward() {
        let (backend, course, enrollment) = setup(1);
        let mut store = EnrollmentProgressStore::new(backend);

        let passed =
            store.record_lesson_result(&enrollment, &course, 1, LessonResult::quiz(90.0, true)).await.unwrap();
        let failed =
            store.record_lesson_result(&passed, &course, 1, LessonResult::quiz(20.0, false)).await.unwrap();

        let entry = failed.lesson(1).unwrap();
        assert!(!entry.completed);
        assert_eq!(entry.quiz_score, Some(20.0));
        assert_eq!(failed.completion_percentage, 0.0);
    }

    #[tokio::test]
    async fn empty_course_yields_zero_percent() {
        let (backend, course, enrollment) = setup(0);
        let mut store = EnrollmentProgressStore::new(backend);

        let saved = store
            .record_lesson_result(&enrollment, &course, 1, LessonResult::marked_complete())
            .await
            .unwrap();
        assert_eq!(saved.completion_percentage, 0.0);
    }

    #[tokio::test]
    async fn failed_write_reports_failure_and_keeps_input() {
        let (backend, course, enrollment) = setup(2);
        backend.set_fail_updates(true);
        let mut store = EnrollmentProgressStore::new(backend.clone());

        let err = store
            .record_lesson_result(&enrollment, &course, 1, LessonResult::marked_complete())
            .await
            .unwrap_err();

        assert!(err.is_recoverable());
        assert!(matches!(store.state(), WriteState::Failed(_)));
        assert!(enrollment.progress.is_empty());
        assert!(backend.enrollment("e1").await.unwrap().progress.is_empty());
    }
}
