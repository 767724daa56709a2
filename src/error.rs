use thiserror::Error;

use crate::question::QuestionId;

/// Failures of the result store. None of them are fatal to the process.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("failed to save quiz result: {0}")]
    WriteFailed(String),

    #[error("failed to read quiz history: {0}")]
    ReadFailed(String),
}

#[derive(Debug, Error)]
pub enum BankError {
    #[error("failed to read question file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse question file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("embedded question bank not found: {0}")]
    MissingEmbedded(String),

    #[error("question bank contains no questions")]
    Empty,

    #[error("duplicate question id {0}")]
    DuplicateId(QuestionId),

    #[error("question {0} has no options")]
    NoOptions(QuestionId),

    #[error("question {0} has more than 9 options")]
    TooManyOptions(QuestionId),

    #[error("question {0} marks a correct option that does not exist")]
    CorrectOutOfRange(QuestionId),

    #[error("question {0} has min greater than max")]
    InvalidBounds(QuestionId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("not an integer: {0:?}")]
    InvalidDraftInput(String),
}
