use intake_core::models::message::{Message, Sender};
use intake_core::models::response::AssessmentResponse;

/// Decides whether the chat has gathered enough to produce a summary.
pub trait CompletenessPolicy: Send + Sync {
    fn is_complete(&self, responses: &[AssessmentResponse], messages: &[Message]) -> bool;
}

impl<F> CompletenessPolicy for F
where
    F: Fn(&[AssessmentResponse], &[Message]) -> bool + Send + Sync,
{
    fn is_complete(&self, responses: &[AssessmentResponse], messages: &[Message]) -> bool {
        self(responses, messages)
    }
}

/// Complete once the parent has described the concern in their own words
/// and every listed question has an answer.
#[derive(Debug, Clone)]
pub struct RequiredQuestions {
    question_ids: Vec<String>,
}

impl RequiredQuestions {
    pub fn new<I, S>(question_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            question_ids: question_ids.into_iter().map(Into::into).collect(),
        }
    }
}

impl Default for RequiredQuestions {
    fn default() -> Self {
        Self::new(["concern_duration", "concern_severity", "therapy_goals"])
    }
}

impl CompletenessPolicy for RequiredQuestions {
    fn is_complete(&self, responses: &[AssessmentResponse], messages: &[Message]) -> bool {
        let described = messages
            .iter()
            .any(|m| m.sender == Sender::User && m.question_id().is_none());
        described
            && self
                .question_ids
                .iter()
                .all(|id| responses.iter().any(|r| &r.question_id == id))
    }
}
