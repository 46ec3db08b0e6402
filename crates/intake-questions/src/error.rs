use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuestionError {
    #[error("no question is currently open")]
    NoOpenQuestion,

    #[error("answer is for '{answered}' but the open question is '{open}'")]
    NotCurrentQuestion { open: String, answered: String },

    #[error("'{answer}' is not an option for question '{question_id}'")]
    InvalidOption { question_id: String, answer: String },

    #[error("question '{question_id}' does not accept free text")]
    OtherNotAllowed { question_id: String },

    #[error("free-text answer for '{question_id}' is empty")]
    EmptyAnswer { question_id: String },

    #[error("no answer is waiting to be committed")]
    NothingRecording,

    #[error("no free-text answer is being edited")]
    NoDraft,

    #[error("an answer for '{question_id}' is still being recorded")]
    AdvancePending { question_id: String },
}
