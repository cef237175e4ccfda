use clean_domain::UploadedFile;

#[derive(Debug, Clone)]
pub struct CleanFileRequest {
    /// `None` when the multipart body had no `file` field.
    pub file: Option<UploadedFile>,
    pub request_id: Option<String>,
}

impl CleanFileRequest {
    pub fn new(file: Option<UploadedFile>) -> Self {
        Self {
            file,
            request_id: None,
        }
    }

    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct CleanFileResponse {
    pub request_id: String,
    pub download_name: &'static str,
    pub content_type: &'static str,
    pub content: Vec<u8>,
}
