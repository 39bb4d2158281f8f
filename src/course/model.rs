//! Course model
//!
//! A course is an ordered set of lessons. The lesson `order` field is the
//! canonical sequence key; array position is only the storage order returned
//! by the backend.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Passing score applied when a quiz does not specify one
pub const DEFAULT_PASSING_SCORE: u32 = 70;

fn default_passing_score() -> u32 {
    DEFAULT_PASSING_SCORE
}

/// A complete course as served by the backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    /// Opaque identifier
    pub id: String,
    /// Display title
    #[serde(default)]
    pub title: String,
    /// Short description shown in listings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Lessons in storage order
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Course {
    /// Create an empty course
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), description: None, lessons: Vec::new() }
    }

    /// Total number of lessons
    pub fn total_lessons(&self) -> usize {
        self.lessons.len()
    }

    /// Find a lesson by its order value
    pub fn lesson_by_order(&self, order: u32) -> Option<&Lesson> {
        self.lessons.iter().find(|lesson| lesson.order == order)
    }

    /// The lesson with the smallest order value
    pub fn first_lesson(&self) -> Option<&Lesson> {
        self.lessons.iter().min_by_key(|lesson| lesson.order)
    }

    /// The first lesson as stored, regardless of order
    pub fn first_stored_lesson(&self) -> Option<&Lesson> {
        self.lessons.first()
    }

    /// Lessons sorted by order (for display)
    pub fn lessons_in_order(&self) -> Vec<&Lesson> {
        let mut lessons: Vec<&Lesson> = self.lessons.iter().collect();
        lessons.sort_by_key(|lesson| lesson.order);
        lessons
    }

    /// The lesson immediately after `order` in the sequence, if any
    pub fn next_lesson(&self, order: u32) -> Option<&Lesson> {
        order.checked_add(1).and_then(|next| self.lesson_by_order(next))
    }

    /// Check structural invariants, returning every problem found
    pub fn validate(&self) -> Vec<CourseIssue> {
        let mut issues = Vec::new();
        let mut seen = HashSet::new();

        for lesson in &self.lessons {
            if lesson.order == 0 {
                issues.push(CourseIssue::NonPositiveOrder { title: lesson.title.clone() });
            }
            if !seen.insert(lesson.order) {
                issues.push(CourseIssue::DuplicateOrder(lesson.order));
            }
            if let Some(quiz) = lesson.quiz() {
                for (index, question) in quiz.questions.iter().enumerate() {
                    if question.options.len() < 2 {
                        issues.push(CourseIssue::TooFewOptions {
                            lesson_order: lesson.order,
                            question: index,
                        });
                    }
                    if question.correct_option_index >= question.options.len() {
                        issues.push(CourseIssue::DanglingCorrectIndex {
                            lesson_order: lesson.order,
                            question: index,
                        });
                    }
                }
            }
        }

        issues
    }
}

/// A structural problem in a course
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CourseIssue {
    #[error("lesson \"{title}\" has order 0; orders must be positive")]
    NonPositiveOrder { title: String },

    #[error("lesson order {0} is used more than once")]
    DuplicateOrder(u32),

    #[error("lesson {lesson_order}, question {question}: fewer than two options")]
    TooFewOptions { lesson_order: u32, question: usize },

    #[error("lesson {lesson_order}, question {question}: correct option index is out of range")]
    DanglingCorrectIndex { lesson_order: u32, question: usize },
}

/// Whether a lesson is gated behind a quiz
#[derive(Debug, Clone, PartialEq)]
pub enum LessonKind {
    /// No quiz; completing it is an explicit "mark complete"
    Plain,
    /// Must pass the quiz to complete the lesson
    QuizGated(Quiz),
}

/// A single lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "LessonRecord", into = "LessonRecord")]
pub struct Lesson {
    /// Position in the course sequence
    pub order: u32,
    /// Display title
    pub title: String,
    /// Rich text payload (HTML or Markdown)
    pub content: String,
    /// Plain or quiz-gated
    pub kind: LessonKind,
}

impl Lesson {
    /// Create a plain lesson
    pub fn plain(order: u32, title: impl Into<String>, content: impl Into<String>) -> Self {
        Self { order, title: title.into(), content: content.into(), kind: LessonKind::Plain }
    }

    /// Create a lesson gated behind a quiz
    pub fn with_quiz(
        order: u32,
        title: impl Into<String>,
        content: impl Into<String>,
        quiz: Quiz,
    ) -> Self {
        let mut lesson = Self::plain(order, title, content);
        lesson.set_quiz(Some(quiz));
        lesson
    }

    /// The lesson's quiz, if gated
    pub fn quiz(&self) -> Option<&Quiz> {
        match &self.kind {
            LessonKind::Plain => None,
            LessonKind::QuizGated(quiz) => Some(quiz),
        }
    }

    /// Check if this lesson is gated behind a quiz
    pub fn has_quiz(&self) -> bool {
        matches!(self.kind, LessonKind::QuizGated(_))
    }

    /// Replace the quiz; an empty quiz makes the lesson plain
    pub fn set_quiz(&mut self, quiz: Option<Quiz>) {
        self.kind = match quiz {
            Some(quiz) if !quiz.questions.is_empty() => LessonKind::QuizGated(quiz),
            _ => LessonKind::Plain,
        };
    }
}

/// Wire shape of a lesson (optional quiz field)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct LessonRecord {
    order: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    quiz: Option<Quiz>,
}

impl From<LessonRecord> for Lesson {
    fn from(record: LessonRecord) -> Self {
        let mut lesson = Lesson::plain(record.order, record.title, record.content);
        lesson.set_quiz(record.quiz);
        lesson
    }
}

impl From<Lesson> for LessonRecord {
    fn from(lesson: Lesson) -> Self {
        let quiz = match lesson.kind {
            LessonKind::Plain => None,
            LessonKind::QuizGated(quiz) => Some(quiz),
        };
        Self { order: lesson.order, title: lesson.title, content: lesson.content, quiz }
    }
}

/// A quiz attached to a lesson
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quiz {
    #[serde(default)]
    pub title: String,
    /// Percentage a score must meet or exceed to pass
    #[serde(default = "default_passing_score")]
    pub passing_score: u32,
    /// Questions in presentation order
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Quiz {
    /// Create a quiz with the default passing score
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Self { title: title.into(), passing_score: DEFAULT_PASSING_SCORE, questions }
    }

    /// Set the passing score
    pub fn with_passing_score(mut self, passing_score: u32) -> Self {
        self.passing_score = passing_score;
        self
    }

    /// Drop blank options and repair dangling correct indices
    pub fn normalize(&mut self) {
        self.passing_score = self.passing_score.min(100);
        for question in &mut self.questions {
            let mut index = question.options.len();
            while index > 0 {
                index -= 1;
                if question.options[index].trim().is_empty() {
                    // Fails only on the last remaining option, which is then left alone
                    let _ = question.remove_option(index);
                }
            }
            if question.correct_option_index >= question.options.len() {
                question.correct_option_index = 0;
            }
        }
        self.questions
            .retain(|question| question.options.iter().any(|option| !option.trim().is_empty()));
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub question_text: String,
    pub options: Vec<String>,
    /// 0-based index into `options`
    #[serde(default)]
    pub correct_option_index: usize,
}

/// Errors from editing a question
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuizEditError {
    #[error("option index {index} is out of range ({len} options)")]
    OutOfRange { index: usize, len: usize },

    #[error("a question must keep at least one option")]
    LastOption,
}

impl Question {
    /// Create a question
    pub fn new(
        question_text: impl Into<String>,
        options: Vec<String>,
        correct_option_index: usize,
    ) -> Self {
        Self { question_text: question_text.into(), options, correct_option_index }
    }

    /// Check whether an option index is the correct answer
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_option_index
    }

    /// Append an option
    pub fn add_option(&mut self, text: impl Into<String>) {
        self.options.push(text.into());
    }

    /// Remove an option, keeping the correct index pointing at a valid option
    pub fn remove_option(&mut self, index: usize) -> Result<String, QuizEditError> {
        let len = self.options.len();
        if index >= len {
            return Err(QuizEditError::OutOfRange { index, len });
        }
        if len == 1 {
            return Err(QuizEditError::LastOption);
        }

        let removed = self.options.remove(index);
        if index == self.correct_option_index {
            self.correct_option_index = 0;
        } else if index < self.correct_option_index {
            self.correct_option_index -= 1;
        }
        Ok(removed)
    }

    /// Mark an option as the correct answer
    pub fn set_correct_option(&mut self, index: usize) -> Result<(), QuizEditError> {
        if index >= self.options.len() {
            return Err(QuizEditError::OutOfRange { index, len: self.options.len() });
        }
        self.correct_option_index = index;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn question() -> Question {
        Question::new("2 + 2?", vec!["3".into(), "4".into(), "5".into()], 1)
    }

    #[test]
    fn lesson_without_quiz_deserializes_as_plain() {
        let json = r#"{"order":1,"title":"Intro","content":"<p>Hello</p>"}"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert_eq!(lesson.kind, LessonKind::Plain);
    }

    #[test]
    fn lesson_with_quiz_deserializes_as_gated_with_default_passing_score() {
        let json = r#"{
            "order": 2,
            "content": "",
            "quiz": {
                "title": "Check",
                "questions": [
                    {"question_text": "Q", "options": ["a", "b"], "correct_option_index": 1}
                ]
            }
        }"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        let quiz = lesson.quiz().unwrap();
        assert_eq!(quiz.passing_score, DEFAULT_PASSING_SCORE);
        assert_eq!(quiz.questions.len(), 1);
    }

    #[test]
    fn empty_quiz_becomes_plain_lesson() {
        let json = r#"{"order":1,"content":"","quiz":{"title":"Empty","questions":[]}}"#;
        let lesson: Lesson = serde_json::from_str(json).unwrap();
        assert!(!lesson.has_quiz());
    }

    #[test]
    fn lesson_serializes_quiz_field() {
        let lesson = Lesson::with_quiz(1, "L", "", Quiz::new("Q", vec![question()]));
        let json = serde_json::to_value(&lesson).unwrap();
        assert_eq!(json["quiz"]["passing_score"], 70);
        assert_eq!(json["order"], 1);

        let plain = serde_json::to_value(Lesson::plain(2, "P", "")).unwrap();
        assert!(plain.get("quiz").is_none());
    }

    #[test]
    fn lookups_use_order_not_position() {
        let mut course = Course::new("c1", "Course");
        course.lessons.push(Lesson::plain(3, "Third", ""));
        course.lessons.push(Lesson::plain(1, "First", ""));

        assert_eq!(course.lesson_by_order(1).unwrap().title, "First");
        assert_eq!(course.first_lesson().unwrap().title, "First");
        assert_eq!(course.first_stored_lesson().unwrap().title, "Third");
        assert!(course.next_lesson(1).is_none());
        let titles: Vec<&str> = course.lessons_in_order().iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["First", "Third"]);
    }

    #[test]
    fn next_lesson_after_max_order_is_none() {
        let mut course = Course::new("c1", "Course");
        course.lessons.push(Lesson::plain(1, "First", ""));
        course.lessons.push(Lesson::plain(u32::MAX, "Last", ""));

        assert!(course.next_lesson(u32::MAX).is_none());
        assert!(course.next_lesson(u32::MAX - 1).is_some());
    }

    #[test]
    fn remove_option_before_correct_shifts_index() {
        let mut q = question();
        q.remove_option(0).unwrap();
        assert_eq!(q.correct_option_index, 0);
        assert_eq!(q.options[q.correct_option_index], "4");
    }

    #[test]
    fn remove_correct_option_resets_index() {
        let mut q = question();
        q.remove_option(1).unwrap();
        assert_eq!(q.correct_option_index, 0);
    }

    #[test]
    fn remove_option_after_correct_keeps_index() {
        let mut q = question();
        q.remove_option(2).unwrap();
        assert_eq!(q.correct_option_index, 1);
    }

    #[test]
    fn remove_option_rejects_bad_index_and_last_option() {
        let mut q = question();
        assert_eq!(q.remove_option(9), Err(QuizEditError::OutOfRange { index: 9, len: 3 }));

        let mut single = Question::new("?", vec!["only".into()], 0);
        assert_eq!(single.remove_option(0), Err(QuizEditError::LastOption));
    }

    #[test]
    fn added_option_can_become_correct_and_be_removed() {
        let mut q = question();
        q.add_option("6");
        assert_eq!(q.options.len(), 4);
        q.set_correct_option(3).unwrap();

        q.remove_option(0).unwrap();
        assert_eq!(q.correct_option_index, 2);
        assert_eq!(q.options[q.correct_option_index], "6");

        q.remove_option(2).unwrap();
        assert_eq!(q.correct_option_index, 0);
        assert!(q.correct_option_index < q.options.len());
    }

    #[test]
    fn set_correct_option_validates_range() {
        let mut q = question();
        assert!(q.set_correct_option(2).is_ok());
        assert_eq!(q.correct_option_index, 2);
        assert!(q.set_correct_option(3).is_err());
        assert_eq!(q.correct_option_index, 2);
    }

    #[test]
    fn normalize_drops_blank_options_and_repairs_index() {
        let mut quiz = Quiz::new(
            "Q",
            vec![
                Question::new("a", vec!["".into(), "x".into(), " ".into(), "y".into()], 3),
                Question::new("b", vec!["p".into(), "q".into()], 7),
            ],
        )
        .with_passing_score(150);
        quiz.normalize();

        assert_eq!(quiz.passing_score, 100);
        assert_eq!(quiz.questions[0].options, vec!["x".to_string(), "y".to_string()]);
        assert_eq!(quiz.questions[0].correct_option_index, 1);
        assert_eq!(quiz.questions[1].correct_option_index, 0);
    }

    #[test]
    fn validate_reports_structural_problems() {
        let mut course = Course::new("c", "C");
        course.lessons.push(Lesson::plain(0, "Zero", ""));
        course.lessons.push(Lesson::plain(2, "A", ""));
        course.lessons.push(Lesson::with_quiz(
            2,
            "B",
            "",
            Quiz::new("Q", vec![Question::new("?", vec!["one".into()], 4)]),
        ));

        let issues = course.validate();
        assert!(issues.contains(&CourseIssue::NonPositiveOrder { title: "Zero".into() }));
        assert!(issues.contains(&CourseIssue::DuplicateOrder(2)));
        assert!(issues.contains(&CourseIssue::TooFewOptions { lesson_order: 2, question: 0 }));
        assert!(
            issues.contains(&CourseIssue::DanglingCorrectIndex { lesson_order: 2, question: 0 })
        );
    }
}
