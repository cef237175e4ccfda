use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use clean_application::CleanFileRequest;
use clean_domain::{RequestStage, UploadedFile, DEFAULT_UPLOAD_NAME};
use uuid::Uuid;

use crate::{error_mapper, AppState, HttpError};

const FILE_FIELD: &str = "file";

pub async fn clean_file(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, HttpError> {
    let request_id = Uuid::new_v4().to_string();

    let multipart = multipart.map_err(|rejection| {
        tracing::error!(request_id = %request_id, error = %rejection, "upload is not a multipart body");
        HttpError::Internal
    })?;
    let file = read_file_field(&request_id, multipart).await?;

    tracing::info!(
        request_id = %request_id,
        file_name = file.as_ref().map(|file| file.file_name.as_str()).unwrap_or("<none>"),
        input_bytes = file.as_ref().map(|file| file.content.len()).unwrap_or(0),
        "received clean request"
    );

    let request = CleanFileRequest::new(file).with_request_id(request_id.clone());
    match state.usecase.clean_file(request).await {
        Ok(result) => {
            tracing::info!(
                request_id = %request_id,
                output_bytes = result.content.len(),
                stage = RequestStage::Responded.as_str(),
                "clean request completed"
            );
            let disposition = format!("attachment; filename=\"{}\"", result.download_name);
            let headers = [
                (header::CONTENT_TYPE, HeaderValue::from_static(result.content_type)),
                (
                    header::CONTENT_DISPOSITION,
                    HeaderValue::from_str(&disposition).map_err(|err| {
                        tracing::error!(request_id = %request_id, error = %err, "invalid download name");
                        HttpError::Internal
                    })?,
                ),
            ];
            Ok((StatusCode::OK, headers, result.content).into_response())
        }
        Err(error) => {
            tracing::error!(request_id = %request_id, error = %error, "clean request failed");
            Err(error_mapper(error))
        }
    }
}

/// Returns the first `file` part. Other parts are ignored.
async fn read_file_field(
    request_id: &str,
    mut multipart: Multipart,
) -> Result<Option<UploadedFile>, HttpError> {
    loop {
        let field = multipart.next_field().await.map_err(|err| {
            tracing::error!(request_id, error = %err, "failed to parse multipart body");
            HttpError::Internal
        })?;
        let Some(field) = field else {
            return Ok(None);
        };
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_UPLOAD_NAME)
            .to_string();
        let content = field.bytes().await.map_err(|err| {
            tracing::error!(request_id, error = %err, "failed to read uploaded file");
            HttpError::Internal
        })?;

        return Ok(Some(UploadedFile {
            file_name,
            content: content.to_vec(),
        }));
    }
}
