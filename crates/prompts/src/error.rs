use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PromptError>;

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("no png views in {}", dir.display())]
    NoImages { dir: PathBuf },

    /// The model answered, but not in the `<key>: "<prompt>"` shape.
    #[error("malformed {key} response: {reason}")]
    Format { key: String, reason: &'static str },

    #[error("{endpoint} returned no choices")]
    EmptyResponse { endpoint: String },

    #[error("request to {endpoint} failed: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PromptError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn format(key: &str, reason: &'static str) -> Self {
        Self::Format {
            key: key.to_string(),
            reason,
        }
    }
}
