//! Enrollment progress tracking
//!
//! An [`Enrollment`] links one student to one course and holds at most one
//! [`LessonProgress`] entry per lesson order. The completion percentage is a
//! derived value that is recomputed from the entries on every write.

pub mod gate;
pub mod report;
pub mod store;

pub use gate::{LessonState, is_locked, lesson_states};
pub use report::progress_report;
pub use store::{EnrollmentProgressStore, WriteState};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Progress record for a single lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LessonProgress {
    /// Links to `Lesson::order`
    pub lesson_order: u32,

    /// Lesson done: marked complete (no quiz) or quiz passed
    pub completed: bool,

    /// Time of the last completion or attempt write
    pub completed_date: DateTime<Utc>,

    /// Quiz score (0-100), present only if a quiz was taken
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_score: Option<f64>,

    /// Whether the quiz score met the passing score
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiz_passed: Option<bool>,
}

impl LessonProgress {
    /// Whether this entry records a passed quiz
    pub fn passed_quiz(&self) -> bool {
        self.quiz_passed == Some(true)
    }
}

/// The outcome of a lesson to be merged into an enrollment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LessonResult {
    pub completed: bool,
    pub quiz_score: Option<f64>,
    pub quiz_passed: Option<bool>,
}

impl LessonResult {
    /// A lesson without a quiz explicitly marked done
    pub fn marked_complete() -> Self {
        Self { completed: true, quiz_score: None, quiz_passed: None }
    }

    /// A finished quiz attempt; the lesson completes only when passed
    pub fn quiz(score: f64, passed: bool) -> Self {
        Self { completed: passed, quiz_score: Some(score), quiz_passed: Some(passed) }
    }

    /// Build the stored entry for a lesson
    pub fn into_progress(self, lesson_order: u32, at: DateTime<Utc>) -> LessonProgress {
        LessonProgress {
            lesson_order,
            completed: self.completed,
            completed_date: at,
            quiz_score: self.quiz_score,
            quiz_passed: self.quiz_passed,
        }
    }
}

/// The record linking one student to one course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Enrollment {
    pub id: String,
    pub student_email: String,
    pub course_id: String,
    #[serde(default)]
    pub progress: Vec<LessonProgress>,
    #[serde(default)]
    pub completion_percentage: f64,
}

impl Enrollment {
    /// Create an enrollment with no progress
    pub fn new(
        id: impl Into<String>,
        student_email: impl Into<String>,
        course_id: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            student_email: student_email.into(),
            course_id: course_id.into(),
            progress: Vec::new(),
            completion_percentage: 0.0,
        }
    }

    /// Progress entry for a lesson order
    pub fn lesson(&self, lesson_order: u32) -> Option<&LessonProgress> {
        self.progress.iter().find(|entry| entry.lesson_order == lesson_order)
    }

    /// Number of entries marked completed
    pub fn completed_count(&self) -> usize {
        self.progress.iter().filter(|entry| entry.completed).count()
    }

    /// Highest lesson order among completed entries
    pub fn highest_completed_order(&self) -> Option<u32> {
        self.progress.iter().filter(|entry| entry.completed).map(|entry| entry.lesson_order).max()
    }

    /// Whether the stored percentage marks the course as finished
    pub fn is_course_complete(&self) -> bool {
        self.completion_percentage >= 100.0
    }

    /// Replace (or append) the entry for `lesson_order` and recompute the
    /// completion percentage against `total_lessons`
    pub fn apply(&mut self, entry: LessonProgress, total_lessons: usize) {
        match self.progress.iter_mut().find(|existing| existing.lesson_order == entry.lesson_order)
        {
            Some(existing) => *existing = entry,
            None => self.progress.push(entry),
        }
        self.completion_percentage = completion_percentage(self.completed_count(), total_lessons);
    }
}

/// `completed / total * 100`, or 0 for a course without lessons
pub fn completion_percentage(completed: usize, total_lessons: usize) -> f64 {
    if total_lessons == 0 {
        return 0.0;
    }
    completed as f64 / total_lessons as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn at() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[test]
    fn quiz_result_completes_only_when_passed() {
        assert!(LessonResult::quiz(80.0, true).completed);
        assert!(!LessonResult::quiz(50.0, false).completed);
        assert_eq!(LessonResult::marked_complete().quiz_score, None);
    }

    #[test]
    fn apply_overwrites_existing_entry() {
        let mut enrollment = Enrollment::new("e1", "a@b.c", "c1");
        enrollment.apply(LessonResult::quiz(50.0, false).into_progress(1, at()), 2);
        enrollment.apply(LessonResult::quiz(100.0, true).into_progress(1, at()), 2);

        assert_eq!(enrollment.progress.len(), 1);
        assert_eq!(enrollment.lesson(1).unwrap().quiz_score, Some(100.0));
        assert_eq!(enrollment.completion_percentage, 50.0);
    }

    #[test]
    fn completion_percentage_guards_empty_course() {
        assert_eq!(completion_percentage(0, 0), 0.0);
        assert_eq!(completion_percentage(3, 0), 0.0);
        assert_eq!(completion_percentage(1, 4), 25.0);
    }

    #[test]
    fn highest_completed_order_ignores_failed_attempts() {
        let mut enrollment = Enrollment::new("e1", "a@b.c", "c1");
        enrollment.apply(LessonResult::marked_complete().into_progress(1, at()), 3);
        enrollment.apply(LessonResult::quiz(10.0, false).into_progress(2, at()), 3);
        assert_eq!(enrollment.highest_completed_order(), Some(1));
    }

    #[test]
    fn enrollment_round_trips_through_json() {
        let json = r#"{
            "id": "e1",
            "student_email": "s@example.com",
            "course_id": "c1",
            "progress": [
                {"lesson_order": 1, "completed": true, "completed_date": "2024-05-01T10:00:00Z",
                 "quiz_score": 100.0, "quiz_passed": true}
            ],
            "completion_percentage": 50.0
        }"#;
        let enrollment: Enrollment = serde_json::from_str(json).unwrap();
        assert!(enrollment.lesson(1).unwrap().passed_quiz());
        assert!(!enrollment.is_course_complete());
    }

    proptest! {
        #[test]
        fn completion_matches_completed_entries(
            writes in prop::collection::vec((1u32..8, any::<bool>()), 0..40),
            total in 0usize..10,
        ) {
            let mut enrollment = Enrollment::new("e", "s", "c");
            for (order, completed) in writes {
                let result = if completed {
                    LessonResult::marked_complete()
                } else {
                    LessonResult::quiz(0.0, false)
                };
                enrollment.apply(result.into_progress(order, at()), total);

                let expected = if total == 0 {
                    0.0
                } else {
                    enrollment.progress.iter().filter(|p| p.completed).count() as f64
                        / total as f64 * 100.0
                };
                prop_assert_eq!(enrollment.completion_percentage, expected);
            }

            let mut orders: Vec<u32> = enrollment.progress.iter().map(|p| p.lesson_order).collect();
            let before = orders.len();
            orders.sort_unstable();
            orders.dedup();
            prop_assert_eq!(orders.len(), before);
        }
    }
}
