//! intake-questions
//!
//! Structured question bank and the single-question-at-a-time engine used by
//! the conversational assessment. Pure data and state, no I/O.

pub mod bank;
pub mod engine;
pub mod error;

use intake_core::models::form::parse_severity;
use intake_core::models::question::{QuestionCategory, StructuredQuestion};

/// A configured set of structured questions, asked in order.
pub trait QuestionBank: Send + Sync {
    /// Unique identifier for this bank (e.g., "child_intake_v1").
    fn id(&self) -> &str;

    fn questions(&self) -> &[StructuredQuestion];

    fn get(&self, question_id: &str) -> Option<&StructuredQuestion> {
        self.questions().iter().find(|q| q.id == question_id)
    }

    /// The question collecting a given category, if the bank has one.
    fn for_category(&self, category: QuestionCategory) -> Option<&StructuredQuestion> {
        self.questions().iter().find(|q| q.question_type == category)
    }
}

/// Numeric value recorded alongside an answer. Only the severity scale is
/// scored; everything else is categorical.
pub fn score_answer(question: &StructuredQuestion, answer: &str) -> Option<f64> {
    match question.question_type {
        QuestionCategory::ConcernSeverity => parse_severity(answer).map(f64::from),
        _ => None,
    }
}

/// Return the built-in question bank.
pub fn default_bank() -> Box<dyn QuestionBank> {
    Box::new(bank::ChildIntakeBank)
}
