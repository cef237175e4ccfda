use std::{
    path::{Path, PathBuf},
    time::Duration,
};

/// Download name suggested to clients for every cleaned file.
pub const CLEANED_FILE_NAME: &str = "cleaned_data.csv";
pub const CSV_CONTENT_TYPE: &str = "text/csv";
/// Used when the multipart part carries no filename.
pub const DEFAULT_UPLOAD_NAME: &str = "upload";

const MAX_FILE_NAME_BYTES: usize = 160;
const MAX_EXTENSION_BYTES: usize = 16;

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub input: PathBuf,
    pub output: PathBuf,
}

impl ArtifactPaths {
    /// Lays out `input-<timestamp>-<name>` and `output-<timestamp>.csv` under `dir`.
    pub fn in_dir(dir: &Path, file_name: &str, timestamp_ms: u128) -> Self {
        let file_name = sanitize_file_name(file_name);
        Self {
            input: dir.join(format!("input-{timestamp_ms}-{file_name}")),
            output: dir.join(format!("output-{timestamp_ms}.csv")),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub elapsed: Duration,
    pub diagnostics: String,
}

/// Per-request lifecycle, logged as the request moves through the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestStage {
    Received,
    InputWritten,
    ProcessRunning,
    ProcessFailed,
    ProcessTimedOut,
    OutputRead,
    OutputReadFailed,
    Responded,
}

impl RequestStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStage::Received => "received",
            RequestStage::InputWritten => "input_written",
            RequestStage::ProcessRunning => "process_running",
            RequestStage::ProcessFailed => "process_failed",
            RequestStage::ProcessTimedOut => "process_timed_out",
            RequestStage::OutputRead => "output_read",
            RequestStage::OutputReadFailed => "output_read_failed",
            RequestStage::Responded => "responded",
        }
    }

}

/// Reduces a client-supplied filename to a single safe path component while
/// keeping its extension, which the transformation uses to pick a format.
pub fn sanitize_file_name(raw: &str) -> String {
    let base = raw.rsplit(|c: char| c == '/' || c == '\\').next().unwrap_or_default().trim();
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_control() || matches!(c, '<' | '>' | ':' | '"' | '|' | '?' | '*') {
                '_'
            } else {
                c
            }
        })
        .collect();

    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        return DEFAULT_UPLOAD_NAME.to_string();
    }
    if cleaned.len() <= MAX_FILE_NAME_BYTES {
        return cleaned;
    }

    match cleaned.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && ext.len() <= MAX_EXTENSION_BYTES => {
            let budget = MAX_FILE_NAME_BYTES - ext.len() - 1;
            format!("{}.{}", truncate_at_char_boundary(stem, budget), ext)
        }
        _ => truncate_at_char_boundary(&cleaned, MAX_FILE_NAME_BYTES).to_string(),
    }
}

fn truncate_at_char_boundary(value: &str, max_bytes: usize) -> &str {
    if value.len() <= max_bytes {
        return value;
    }
    let mut end = max_bytes;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn artifact_paths_follow_naming_scheme() {
        let paths = ArtifactPaths::in_dir(Path::new("/scratch/clean-abc"), "contacts.csv", 42);
        assert_eq!(
            paths.input,
            PathBuf::from("/scratch/clean-abc/input-42-contacts.csv")
        );
        assert_eq!(paths.output, PathBuf::from("/scratch/clean-abc/output-42.csv"));
    }

    #[test]
    fn sanitize_strips_directories() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\me\\book.xlsx"), "book.xlsx");
    }

    #[test]
    fn sanitize_replaces_reserved_characters() {
        assert_eq!(sanitize_file_name("a:b|c?.csv"), "a_b_c_.csv");
        assert_eq!(sanitize_file_name("tab\there.csv"), "tab_here.csv");
    }

    #[test]
    fn sanitize_falls_back_for_empty_names() {
        assert_eq!(sanitize_file_name(""), DEFAULT_UPLOAD_NAME);
        assert_eq!(sanitize_file_name(".."), DEFAULT_UPLOAD_NAME);
        assert_eq!(sanitize_file_name("dir/"), DEFAULT_UPLOAD_NAME);
    }

    #[test]
    fn sanitize_keeps_extension_when_truncating() {
        let long = format!("{}.csv", "é".repeat(200));
        let sanitized = sanitize_file_name(&long);
        assert!(sanitized.len() <= MAX_FILE_NAME_BYTES);
        assert!(sanitized.ends_with(".csv"));
    }
}
