use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use clean_application::ApplicationError;
use serde_json::json;

#[derive(Debug)]
pub enum HttpError {
    MissingInput,
    TransformFailed { details: String },
    TransformTimeout { details: String },
    OutputUnreadable,
    Internal,
}

impl HttpError {
    pub fn status(&self) -> StatusCode {
        match self {
            HttpError::MissingInput => StatusCode::BAD_REQUEST,
            HttpError::TransformTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            HttpError::TransformFailed { .. } | HttpError::OutputUnreadable | HttpError::Internal => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            HttpError::MissingInput => json!({ "error": "No file uploaded" }),
            HttpError::TransformFailed { details } => json!({
                "error": "Failed to process file",
                "details": details,
            }),
            HttpError::TransformTimeout { details } => json!({
                "error": "File processing timed out",
                "details": details,
            }),
            HttpError::OutputUnreadable => json!({ "error": "Failed to read output file" }),
            HttpError::Internal => json!({ "error": "Internal server error" }),
        };

        (status, Json(body)).into_response()
    }
}

pub fn error_mapper(error: ApplicationError) -> HttpError {
    match error {
        ApplicationError::MissingInput => HttpError::MissingInput,
        ApplicationError::TransformFailed { details } => HttpError::TransformFailed { details },
        error @ ApplicationError::TransformTimeout { .. } => HttpError::TransformTimeout {
            details: error.to_string(),
        },
        ApplicationError::OutputUnreadable { .. } => HttpError::OutputUnreadable,
        ApplicationError::Internal(_) => HttpError::Internal,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn maps_application_errors_to_statuses() {
        assert_eq!(
            error_mapper(ApplicationError::MissingInput).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_mapper(ApplicationError::TransformTimeout {
                after: Duration::from_secs(1)
            })
            .status(),
            StatusCode::GATEWAY_TIMEOUT
        );
        assert_eq!(
            error_mapper(ApplicationError::OutputUnreadable {
                reason: "gone".to_string()
            })
            .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            error_mapper(ApplicationError::Internal("disk".to_string())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn transform_failure_keeps_details() {
        match error_mapper(ApplicationError::TransformFailed {
            details: "exit 2".to_string(),
        }) {
            HttpError::TransformFailed { details } => assert_eq!(details, "exit 2"),
            other => panic!("unexpected mapping: {other:?}"),
        }
    }
}
