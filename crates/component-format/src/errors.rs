/// Errors while loading a component or simulation document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LoadError {
    #[error("failed to parse document: {0}")]
    ParseError(String),

    #[error("document field '{field}' is missing or has the wrong type")]
    InvalidField { field: &'static str },

    #[error("command {index} is invalid: {reason}")]
    InvalidCommand { index: usize, reason: String },
}

/// Errors while writing a document.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SaveError {
    #[error("failed to serialize document: {0}")]
    SerializeFailed(String),
}
