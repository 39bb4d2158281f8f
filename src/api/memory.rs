//! In-memory backend
//!
//! Holds courses and enrollments in process. Used for offline viewing of a
//! course file and as the backend in controller tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::error::ApiError;
use super::{CourseApi, EnrollmentApi, EnrollmentUpdate};
use crate::course::Course;
use crate::progress::Enrollment;

/// Backend keeping all records in memory
#[derive(Default)]
pub struct InMemoryBackend {
    courses: Mutex<HashMap<String, Course>>,
    enrollments: Mutex<Vec<Enrollment>>,
    fail_updates: AtomicBool,
    update_calls: AtomicU64,
}

impl InMemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a course
    pub fn with_course(mut self, course: Course) -> Self {
        self.courses.get_mut().insert(course.id.clone(), course);
        self
    }

    /// Seed an enrollment
    pub fn with_enrollment(mut self, enrollment: Enrollment) -> Self {
        self.enrollments.get_mut().push(enrollment);
        self
    }

    /// Make subsequent enrollment updates fail (or succeed again)
    pub fn set_fail_updates(&self, fail: bool) {
        self.fail_updates.store(fail, Ordering::SeqCst);
    }

    /// Number of enrollment update calls received, including failed ones
    pub fn update_calls(&self) -> u64 {
        self.update_calls.load(Ordering::SeqCst)
    }

    /// Snapshot of a stored enrollment
    pub async fn enrollment(&self, enrollment_id: &str) -> Option<Enrollment> {
        self.enrollments.lock().await.iter().find(|e| e.id == enrollment_id).cloned()
    }
}

#[async_trait]
impl CourseApi for InMemoryBackend {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError> {
        self.courses
            .lock()
            .await
            .get(course_id)
            .cloned()
            .ok_or_else(|| ApiError::NotFound { resource: format!("course {course_id}") })
    }
}

#[async_trait]
impl EnrollmentApi for InMemoryBackend {
    async fn find_enrollments(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Result<Vec<Enrollment>, ApiError> {
        Ok(self
            .enrollments
            .lock()
            .await
            .iter()
            .filter(|e| e.student_email == student_email && e.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn update_enrollment(
        &self,
        enrollment_id: &str,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates.load(Ordering::SeqCst) {
            return Err(ApiError::Unavailable("update rejected".to_string()));
        }

        let mut enrollments = self.enrollments.lock().await;
        let enrollment = enrollments
            .iter_mut()
            .find(|e| e.id == enrollment_id)
            .ok_or_else(|| ApiError::NotFound { resource: format!("enrollment {enrollment_id}") })?;

        enrollment.progress = update.progress.clone();
        enrollment.completion_percentage = update.completion_percentage;
        Ok(enrollment.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::course::Lesson;

    fn backend() -> InMemoryBackend {
        let mut course = Course::new("c1", "Course");
        course.lessons.push(Lesson::plain(1, "Intro", ""));
        InMemoryBackend::new()
            .with_course(course)
            .with_enrollment(Enrollment::new("e1", "s@example.com", "c1"))
    }

    #[tokio::test]
    async fn get_course_returns_seeded_course() {
        let backend = backend();
        assert_eq!(backend.get_course("c1").await.unwrap().title, "Course");
        assert!(backend.get_course("missing").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn find_enrollments_filters_by_student_and_course() {
        let backend = backend();
        assert_eq!(backend.find_enrollments("s@example.com", "c1").await.unwrap().len(), 1);
        assert!(backend.find_enrollments("other@example.com", "c1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_replaces_fields() {
        let backend = backend();
        let update = EnrollmentUpdate { progress: Vec::new(), completion_percentage: 100.0 };
        let saved = backend.update_enrollment("e1", &update).await.unwrap();
        assert_eq!(saved.completion_percentage, 100.0);
        assert_eq!(backend.enrollment("e1").await.unwrap().completion_percentage, 100.0);
    }

    #[tokio::test]
    async fn injected_failure_leaves_record_untouched() {
        let backend = backend();
        backend.set_fail_updates(true);
        let update = EnrollmentUpdate { progress: Vec::new(), completion_percentage: 100.0 };
        assert!(backend.update_enrollment("e1", &update).await.is_err());
        assert_eq!(backend.enrollment("e1").await.unwrap().completion_percentage, 0.0);
        assert_eq!(backend.update_calls(), 1);
    }
}
