use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CleanError {
    #[error("Unsupported file format `{extension}`. Please provide a .csv file")]
    UnsupportedFormat { extension: String },

    #[error("Could not decode the CSV file: {0}")]
    Decode(String),

    #[error("Could not parse the CSV file: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
