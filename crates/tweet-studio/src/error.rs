use thiserror::Error;

/// Errors surfaced by the studio library
#[derive(Error, Debug)]
pub enum StudioError {
  #[error("{message} (HTTP {status} from {endpoint}): {body}")]
  Request { endpoint: String, status: u16, message: &'static str, body: String },

  #[error("Request to {endpoint} failed: {source}")]
  Transport {
    endpoint: String,
    #[source]
    source: reqwest::Error,
  },

  #[error("No generation at index {index} (history has {len} entries)")]
  IndexOutOfRange { index: usize, len: usize },

  #[error("Generation {index} would duplicate generation {existing}")]
  DuplicateEntry { index: usize, existing: usize },

  #[error("Generation {index} has already been posted")]
  AlreadyPosted { index: usize },

  #[error("Clipboard unavailable: {message}")]
  Clipboard { message: String },

  #[error("Invalid configuration: {message}")]
  Config { message: String },

  #[error(transparent)]
  Io(#[from] std::io::Error),

  #[error(transparent)]
  Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StudioError>;
