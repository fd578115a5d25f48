use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractorError {
    #[error("HTTP error: {0}")]
    HttpStatus(reqwest::StatusCode),

    #[error(transparent)]
    Request(#[from] reqwest::Error),

    #[error("Malformed XML: {0}")]
    MalformedFeed(String),

    #[error("Unsupported URL: {0}")]
    UnsupportedUrl(String),
}

/// Coarse failure class for callers that branch on what went wrong
/// rather than on message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Network,
    MalformedFeed,
    UnsupportedUrl,
}

impl ExtractorError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::HttpStatus(_) | Self::Request(_) => ErrorKind::Network,
            Self::MalformedFeed(_) => ErrorKind::MalformedFeed,
            Self::UnsupportedUrl(_) => ErrorKind::UnsupportedUrl,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedFeed(message.into())
    }
}

pub type ExtractorResult<T> = Result<T, ExtractorError>;
