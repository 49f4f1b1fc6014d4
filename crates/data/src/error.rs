use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, DataError>;

#[derive(Debug, Error)]
pub enum DataError {
    /// No directory between the start and the filesystem root holds a marker file.
    #[error("could not find a marker file above {}", start.display())]
    MarkerNotFound { start: PathBuf },

    #[error("requested {requested} annotations but only {available} match")]
    NotEnoughAnnotations { requested: usize, available: usize },

    #[error("{url}: {reason}")]
    Download { url: String, reason: String },

    #[error("{}: {source}", path.display())]
    Csv { path: PathBuf, source: csv::Error },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DataError {
    pub fn download(url: impl Into<String>, reason: impl ToString) -> Self {
        Self::Download {
            url: url.into(),
            reason: reason.to_string(),
        }
    }
}
