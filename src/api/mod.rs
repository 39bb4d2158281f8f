//! Course and enrollment backend
//!
//! The progression core only consumes these collaborators. Concrete
//! backends are the REST client, an in-memory store (tests and offline
//! viewing) and a write-through local cache wrapper.

pub mod cache;
pub mod client;
pub mod error;
pub mod memory;

pub use cache::{CachedBackend, CachedCopy, LocalCache};
pub use client::RestClient;
pub use error::ApiError;
pub use memory::InMemoryBackend;

use async_trait::async_trait;
use serde::Serialize;

use crate::course::Course;
use crate::progress::{Enrollment, LessonProgress};

/// Body of an enrollment update: both fields are replaced wholesale
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnrollmentUpdate {
    pub progress: Vec<LessonProgress>,
    pub completion_percentage: f64,
}

impl From<&Enrollment> for EnrollmentUpdate {
    fn from(enrollment: &Enrollment) -> Self {
        Self {
            progress: enrollment.progress.clone(),
            completion_percentage: enrollment.completion_percentage,
        }
    }
}

/// Read access to courses
#[async_trait]
pub trait CourseApi: Send + Sync {
    fn backend_tag(&self) -> &'static str {
        "unknown"
    }

    async fn get_course(&self, course_id: &str) -> Result<Course, ApiError>;
}

/// Access to enrollment records
#[async_trait]
pub trait EnrollmentApi: Send + Sync {
    /// Enrollments matching a student and course (zero or one in practice)
    async fn find_enrollments(
        &self,
        student_email: &str,
        course_id: &str,
    ) -> Result<Vec<Enrollment>, ApiError>;

    /// Replace progress and completion percentage of an enrollment
    async fn update_enrollment(
        &self,
        enrollment_id: &str,
        update: &EnrollmentUpdate,
    ) -> Result<Enrollment, ApiError>;
}

/// A backend serving both courses and enrollments
pub trait Backend: CourseApi + EnrollmentApi {}

impl<T: CourseApi + EnrollmentApi + ?Sized> Backend for T {}
