mod clean_file;

pub use clean_file::{CleanFileRequest, CleanFileResponse};
