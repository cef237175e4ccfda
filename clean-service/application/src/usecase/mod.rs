mod clean_file;

pub use clean_file::{CleanFileUseCase, CleanFileUseCaseImpl};
