mod clean;
mod health;

pub use clean::clean_file;
pub use health::health_check;
