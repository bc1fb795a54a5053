use crate::validator::ValidationErrors;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid identifier: {0:?}")]
    InvalidId(String),

    #[error("Invalid runtime format: {0:?}")]
    InvalidRuntimeFormat(String),

    #[error("Validation failed for {} field(s)", .0.len())]
    Validation(ValidationErrors),
}
