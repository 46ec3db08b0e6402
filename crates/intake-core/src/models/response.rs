use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// An answer to a structured question. Unique per `question_id`:
/// re-answering replaces the earlier response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AssessmentResponse {
    pub question_id: String,
    pub response_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_value: Option<f64>,
    pub timestamp: jiff::Timestamp,
}

/// Insert or replace the response for its question, keeping order of first
/// insertion for replaced entries.
pub fn upsert_response(responses: &mut Vec<AssessmentResponse>, response: AssessmentResponse) {
    match responses
        .iter_mut()
        .find(|r| r.question_id == response.question_id)
    {
        Some(existing) => *existing = response,
        None => responses.push(response),
    }
}
