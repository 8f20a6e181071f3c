use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid {kind} id {input:?}: expected an integer")]
pub struct ParseIdError {
    pub kind: &'static str,
    pub input: String,
}

impl ParseIdError {
    pub fn new(kind: &'static str, input: impl Into<String>) -> Self {
        Self {
            kind,
            input: input.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid timestamp {input:?}: expected RFC 3339 or YYYY-MM-DDTHH:MM[:SS]")]
pub struct ParseTimestampError {
    pub input: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("start time {start} is after end time {end}")]
    StartAfterEnd { start: String, end: String },
    #[error(transparent)]
    Timestamp(#[from] ParseTimestampError),
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}
