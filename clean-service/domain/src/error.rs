use std::{io, time::Duration};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("no file uploaded")]
    MissingInput,

    #[error("transformation failed: {details}")]
    TransformFailed { details: String },

    #[error("transformation timed out after {}ms", .after.as_millis())]
    TransformTimeout { after: Duration },

    #[error("output artifact unreadable: {reason}")]
    OutputUnreadable { reason: String },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn transform_failed(details: impl Into<String>) -> Self {
        Self::TransformFailed {
            details: details.into(),
        }
    }

    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    pub fn internal_error(message: &str) -> Self {
        Self::Internal(message.to_string())
    }
}
