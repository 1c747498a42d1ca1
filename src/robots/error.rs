use std::io;

use hyper::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RobotsError>;

/// Terminal failures of a robots.txt parse or of response classification.
///
/// Broken directive *values* never end up here; they are dropped while parsing.
#[derive(Debug, Error)]
pub enum RobotsError {
    /// A non-empty line without a `key: value` separator.
    #[error("robots: invalid content at line {line}")]
    InvalidContent { line: usize },

    #[error("robots: wrong content type {0:?}")]
    WrongContentType(String),

    #[error("robots: resource temporary unavailable ({0})")]
    Unavailable(StatusCode),

    #[error("robots: failed to read stream: {0}")]
    Io(#[from] io::Error),
}

impl RobotsError {
    pub fn is_invalid_content(&self) -> bool {
        matches!(self, RobotsError::InvalidContent { .. })
    }
}
