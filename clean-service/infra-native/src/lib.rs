//! In-process contact-list cleaner.
//!
//! Reads a CSV export, finds the name, phone and email columns by their usual
//! header aliases, normalizes each value and writes a CSV holding only those
//! columns. It follows the same path-in/path-out contract as the external
//! transformation process, so the adapter treats both alike: when no known
//! column exists nothing is written and the caller sees a missing output.

mod columns;
mod decode;
mod error;
mod normalize;

use std::{path::Path, time::Instant};

use async_trait::async_trait;
use clean_domain::{ArtifactPaths, DomainError, TransformOutcome, TransformPort};
use csv::{ReaderBuilder, Terminator, WriterBuilder};

pub use columns::{ColumnMapping, TargetColumn};
pub use decode::{decode_text, sniff_delimiter, TextEncoding};
pub use error::CleanError;
pub use normalize::{clean_email, clean_name, clean_phone};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanReport {
    pub encoding: TextEncoding,
    pub delimiter: u8,
    pub columns: Vec<&'static str>,
    pub rows: usize,
}

impl CleanReport {
    pub fn summary(&self) -> String {
        if self.columns.is_empty() {
            return "could not find any recognizable name, phone, or email columns".to_string();
        }
        format!(
            "cleaned {} rows ({}) read as {} with delimiter {:?}",
            self.rows,
            self.columns.join(", "),
            self.encoding.as_str(),
            char::from(self.delimiter)
        )
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NativeCsvCleaner;

impl NativeCsvCleaner {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl TransformPort for NativeCsvCleaner {
    fn name(&self) -> &'static str {
        "native"
    }

    async fn transform(&self, paths: &ArtifactPaths) -> Result<TransformOutcome, DomainError> {
        let input = paths.input.clone();
        let output = paths.output.clone();
        let started = Instant::now();

        let report = tokio::task::spawn_blocking(move || clean_file(&input, &output))
            .await
            .map_err(|err| DomainError::internal_error(&format!("cleaner task failed: {err}")))?
            .map_err(|err| {
                tracing::error!(error = %err, "native cleaning failed");
                DomainError::transform_failed(err.to_string())
            })?;

        if report.columns.is_empty() {
            tracing::warn!(
                encoding = report.encoding.as_str(),
                "no recognizable columns, output not written"
            );
        } else {
            tracing::debug!(
                rows = report.rows,
                columns = ?report.columns,
                encoding = report.encoding.as_str(),
                "native cleaning completed"
            );
        }

        Ok(TransformOutcome {
            elapsed: started.elapsed(),
            diagnostics: report.summary(),
        })
    }
}

/// Cleans the file at `input` into `output`. The output is left untouched
/// when no recognizable column is present.
pub fn clean_file(input: &Path, output: &Path) -> Result<CleanReport, CleanError> {
    check_extension(input)?;
    let bytes = std::fs::read(input)?;
    let (report, cleaned) = clean_bytes(&bytes)?;
    if let Some(cleaned) = cleaned {
        std::fs::write(output, cleaned)?;
    }
    Ok(report)
}

/// Cleans decoded CSV bytes, returning the report and the output bytes
/// (UTF-8 with BOM), or `None` when no target column was found.
pub fn clean_bytes(bytes: &[u8]) -> Result<(CleanReport, Option<Vec<u8>>), CleanError> {
    let (text, encoding) = decode_text(bytes)?;
    let delimiter = sniff_delimiter(&text);

    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mapping = ColumnMapping::from_headers(reader.headers()?.iter());
    let mut report = CleanReport {
        encoding,
        delimiter,
        columns: mapping.headers(),
        rows: 0,
    };
    if mapping.is_empty() {
        return Ok((report, None));
    }

    let mut writer = WriterBuilder::new()
        .terminator(Terminator::Any(b'\n'))
        .from_writer(UTF8_BOM.to_vec());
    writer.write_record(mapping.headers())?;

    for record in reader.records() {
        let record = record?;
        let cleaned = mapping
            .columns()
            .iter()
            .map(|(target, index)| target.clean(record.get(*index).unwrap_or_default()));
        writer.write_record(cleaned)?;
        report.rows += 1;
    }

    let cleaned = writer
        .into_inner()
        .map_err(|err| CleanError::Io(err.into_error()))?;
    Ok((report, Some(cleaned)))
}

fn check_extension(input: &Path) -> Result<(), CleanError> {
    let extension = input
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if extension == "csv" {
        return Ok(());
    }
    Err(CleanError::UnsupportedFormat {
        extension: if extension.is_empty() {
            display_name(input)
        } else {
            format!(".{extension}")
        },
    })
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default()
}
