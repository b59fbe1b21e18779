use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatsortError {
    #[error("{kind} file not found: {}", path.display())]
    MissingInput { kind: &'static str, path: PathBuf },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid term pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("config error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
