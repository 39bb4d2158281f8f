//! Course structure and lesson content

pub mod content;
pub mod model;

pub use content::ContentBlock;
pub use model::{
    Course, CourseIssue, DEFAULT_PASSING_SCORE, Lesson, LessonKind, Question, Quiz, QuizEditError,
};
