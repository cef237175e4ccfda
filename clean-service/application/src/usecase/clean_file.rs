use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use clean_domain::{
    DomainError, RequestStage, ScratchSpace, ScratchSpacePort, TransformPort, UploadedFile,
    CLEANED_FILE_NAME, CSV_CONTENT_TYPE,
};

use crate::{ApplicationError, CleanFileRequest, CleanFileResponse};

#[async_trait]
pub trait CleanFileUseCase: Send + Sync {
    async fn clean_file(
        &self,
        request: CleanFileRequest,
    ) -> Result<CleanFileResponse, ApplicationError>;
}

pub struct CleanFileUseCaseImpl {
    scratch: Arc<dyn ScratchSpacePort>,
    transformer: Arc<dyn TransformPort>,
}

impl CleanFileUseCaseImpl {
    pub fn new(scratch: Arc<dyn ScratchSpacePort>, transformer: Arc<dyn TransformPort>) -> Self {
        Self {
            scratch,
            transformer,
        }
    }

    async fn transform_in(
        &self,
        request_id: &str,
        scratch: &dyn ScratchSpace,
        upload: &UploadedFile,
    ) -> Result<Vec<u8>, DomainError> {
        scratch.write_input(&upload.content).await?;
        log_stage(request_id, RequestStage::InputWritten);

        log_stage(request_id, RequestStage::ProcessRunning);
        match self.transformer.transform(scratch.paths()).await {
            Ok(outcome) => {
                tracing::debug!(
                    request_id,
                    transformer = self.transformer.name(),
                    elapsed_ms = outcome.elapsed.as_millis() as u64,
                    diagnostics = %outcome.diagnostics,
                    "transformation finished"
                );
            }
            Err(err) => {
                let stage = match err {
                    DomainError::TransformTimeout { .. } => RequestStage::ProcessTimedOut,
                    _ => RequestStage::ProcessFailed,
                };
                log_stage(request_id, stage);
                return Err(err);
            }
        }

        match scratch.read_output().await {
            Ok(content) => {
                log_stage(request_id, RequestStage::OutputRead);
                Ok(content)
            }
            Err(err) => {
                log_stage(request_id, RequestStage::OutputReadFailed);
                Err(err)
            }
        }
    }
}

#[async_trait]
impl CleanFileUseCase for CleanFileUseCaseImpl {
    async fn clean_file(
        &self,
        request: CleanFileRequest,
    ) -> Result<CleanFileResponse, ApplicationError> {
        let request_id = request
            .request_id
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let upload = request.file.ok_or(DomainError::MissingInput)?;

        tracing::debug!(
            request_id = %request_id,
            file_name = %upload.file_name,
            input_bytes = upload.content.len(),
            stage = RequestStage::Received.as_str(),
            "clean request received"
        );

        let mut scratch = self.scratch.allocate(&upload.file_name).await?;
        let result = self
            .transform_in(&request_id, scratch.as_ref(), &upload)
            .await;
        scratch.release().await;

        let content = result?;
        tracing::debug!(
            request_id = %request_id,
            output_bytes = content.len(),
            "clean request produced output"
        );

        Ok(CleanFileResponse {
            request_id,
            download_name: CLEANED_FILE_NAME,
            content_type: CSV_CONTENT_TYPE,
            content,
        })
    }
}

fn log_stage(request_id: &str, stage: RequestStage) {
    tracing::debug!(request_id, stage = stage.as_str(), "clean request stage");
}
