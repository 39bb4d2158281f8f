//! Quiz attempt state machine
//!
//! One session walks a quiz from the first question to a final score:
//! `Answering(i) -> Feedback(i) -> Answering(i + 1) ... -> Finished`.
//! Out-of-sequence calls are ignored rather than treated as errors.

use serde::{Deserialize, Serialize};

use crate::course::{Question, Quiz};

/// Where the session currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizPhase {
    /// Waiting for an answer to the current question
    Answering,
    /// The answer to the current question is locked and its result shown
    Feedback,
    /// All questions answered and acknowledged
    Finished,
}

/// One submitted answer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub selected_answer: usize,
    pub correct: bool,
}

/// Cosmetic difficulty label derived from the answer streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PerformanceLevel {
    Easy,
    Normal,
    Hard,
}

impl PerformanceLevel {
    /// Label for a streak value
    pub fn from_streak(streak: i32) -> Self {
        if streak <= -2 {
            PerformanceLevel::Easy
        } else if streak >= 3 {
            PerformanceLevel::Hard
        } else {
            PerformanceLevel::Normal
        }
    }

    /// Display name
    pub fn label(&self) -> &'static str {
        match self {
            PerformanceLevel::Easy => "easy",
            PerformanceLevel::Normal => "normal",
            PerformanceLevel::Hard => "hard",
        }
    }
}

/// Result of a finished attempt
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuizOutcome {
    /// Percentage of correct answers (0-100)
    pub score: f64,
    /// `score >= passing_score`
    pub passed: bool,
    /// Informational only
    pub performance_level: PerformanceLevel,
    pub correct: usize,
    pub total: usize,
}

/// `correct / total * 100`
pub fn score(correct: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// An in-progress attempt at one quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    quiz: Quiz,
    current_question_index: usize,
    selected_option: Option<usize>,
    phase: QuizPhase,
    answers: Vec<AnswerRecord>,
    performance_streak: i32,
    outcome: Option<QuizOutcome>,
}

impl QuizSession {
    /// Start an attempt; a quiz without questions cannot be attempted
    pub fn new(quiz: Quiz) -> Option<Self> {
        if quiz.questions.is_empty() {
            return None;
        }
        Some(Self {
            quiz,
            current_question_index: 0,
            selected_option: None,
            phase: QuizPhase::Answering,
            answers: Vec::new(),
            performance_streak: 0,
            outcome: None,
        })
    }

    pub fn quiz(&self) -> &Quiz {
        &self.quiz
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn total_questions(&self) -> usize {
        self.quiz.questions.len()
    }

    pub fn current_question(&self) -> &Question {
        &self.quiz.questions[self.current_question_index]
    }

    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Answer submitted for the current question, while feedback is shown
    pub fn feedback(&self) -> Option<&AnswerRecord> {
        match self.phase {
            QuizPhase::Feedback => self.answers.last(),
            _ => None,
        }
    }

    pub fn performance_streak(&self) -> i32 {
        self.performance_streak
    }

    pub fn performance_level(&self) -> PerformanceLevel {
        PerformanceLevel::from_streak(self.performance_streak)
    }

    /// Final result, once finished
    pub fn outcome(&self) -> Option<&QuizOutcome> {
        self.outcome.as_ref()
    }

    pub fn is_last_question(&self) -> bool {
        self.current_question_index + 1 >= self.quiz.questions.len()
    }

    /// Choose an option for the current question
    ///
    /// Ignored unless answering, or when the index is out of range. Returns
    /// whether the selection was taken.
    pub fn select_option(&mut self, option_index: usize) -> bool {
        if self.phase != QuizPhase::Answering
            || option_index >= self.current_question().options.len()
        {
            return false;
        }
        self.selected_option = Some(option_index);
        true
    }

    /// Lock in the selected option and show feedback
    ///
    /// A no-op without a selection or outside the answering phase.
    pub fn submit_answer(&mut self) -> Option<AnswerRecord> {
        if self.phase != QuizPhase::Answering {
            return None;
        }
        let selected = self.selected_option?;

        let correct = self.current_question().is_correct(selected);
        let record = AnswerRecord {
            question_index: self.current_question_index,
            selected_answer: selected,
            correct,
        };
        self.answers.push(record);
        self.performance_streak = if correct {
            (self.performance_streak + 1).max(0)
        } else {
            (self.performance_streak - 1).min(0)
        };
        self.phase = QuizPhase::Feedback;

        tracing::debug!(
            question = record.question_index,
            correct,
            streak = self.performance_streak,
            "answer submitted"
        );
        Some(record)
    }

    /// Leave feedback: move to the next question, or finish after the last
    ///
    /// Returns the outcome exactly once, on the transition to finished.
    pub fn next(&mut self) -> Option<QuizOutcome> {
        if self.phase != QuizPhase::Feedback {
            return None;
        }

        if !self.is_last_question() {
            self.current_question_index += 1;
            self.selected_option = None;
            self.phase = QuizPhase::Answering;
            return None;
        }

        let correct = self.answers.iter().filter(|answer| answer.correct).count();
        let total = self.quiz.questions.len();
        let score = score(correct, total);
        let outcome = QuizOutcome {
            score,
            passed: score >= f64::from(self.quiz.passing_score),
            performance_level: self.performance_level(),
            correct,
            total,
        };
        self.phase = QuizPhase::Finished;
        self.outcome = Some(outcome);

        tracing::info!(score, passed = outcome.passed, "quiz finished");
        Some(outcome)
    }
}
