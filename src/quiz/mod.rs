//! Quiz attempts

pub mod session;

pub use session::{AnswerRecord, PerformanceLevel, QuizOutcome, QuizPhase, QuizSession, score};
