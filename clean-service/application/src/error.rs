use std::time::Duration;

use clean_domain::DomainError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("No file uploaded")]
    MissingInput,

    #[error("Transformation failed: {details}")]
    TransformFailed { details: String },

    #[error("Transformation timed out after {}ms", .after.as_millis())]
    TransformTimeout { after: Duration },

    #[error("Output unreadable: {reason}")]
    OutputUnreadable { reason: String },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<DomainError> for ApplicationError {
    fn from(error: DomainError) -> Self {
        match error {
            DomainError::MissingInput => ApplicationError::MissingInput,
            DomainError::TransformFailed { details } => {
                ApplicationError::TransformFailed { details }
            }
            DomainError::TransformTimeout { after } => ApplicationError::TransformTimeout { after },
            DomainError::OutputUnreadable { reason } => {
                ApplicationError::OutputUnreadable { reason }
            }
            other @ DomainError::Io { .. } => ApplicationError::Internal(other.to_string()),
            DomainError::Internal(message) => ApplicationError::Internal(message),
        }
    }
}
