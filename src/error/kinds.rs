use std::time::Duration;
use thiserror::Error;

/// Failure to turn uploaded bytes into document text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Malformed PDF: {0}")]
    Malformed(String),

    #[error("Encrypted PDFs are not supported")]
    Encrypted,

    #[error("PDF contains no pages")]
    NoPages,

    #[error("Failed to extract text from page {page}: {message}")]
    Page { page: u32, message: String },
}

/// Whether a failed call to the language model is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    Retryable,
    Fatal,
}

/// Failure reported by the external text-generation service.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Language model request timed out")]
    Timeout,

    #[error("Language model rate limit reached")]
    RateLimited { retry_after: Option<Duration> },

    #[error("Language model service unavailable ({status}): {message}")]
    Unavailable { status: u16, message: String },

    #[error("Network error while contacting the language model: {0}")]
    Network(String),

    #[error("Language model rejected the credentials ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("Language model rejected the request ({status}): {message}")]
    InvalidRequest { status: u16, message: String },

    #[error("Unusable response from the language model: {0}")]
    InvalidResponse(String),
}

impl DispatchError {
    pub fn kind(&self) -> DispatchKind {
        match self {
            DispatchError::Timeout
            | DispatchError::RateLimited { .. }
            | DispatchError::Unavailable { .. }
            | DispatchError::Network(_) => DispatchKind::Retryable,
            DispatchError::Unauthorized { .. }
            | DispatchError::InvalidRequest { .. }
            | DispatchError::InvalidResponse(_) => DispatchKind::Fatal,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind() == DispatchKind::Retryable
    }

    pub fn is_rate_limit(&self) -> bool {
        matches!(self, DispatchError::RateLimited { .. })
    }
}

impl From<reqwest::Error> for DispatchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            DispatchError::Timeout
        } else if err.is_decode() {
            DispatchError::InvalidResponse(err.to_string())
        } else {
            DispatchError::Network(err.to_string())
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("No document has been uploaded yet")]
    NoDocument,

    #[error("Question must not be empty")]
    EmptyQuestion,

    #[error("Unknown difficulty level: {0} (expected Easy, Medium or Professional)")]
    UnknownDifficulty(String),

    #[error("Missing required credential: {0}")]
    MissingCredential(&'static str),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),
}
