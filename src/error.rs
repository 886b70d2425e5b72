//! Error types for media repository operations

/// Errors surfaced by the media client
///
/// Transport failures (`Network`, `Matrix`) are propagated unchanged from the
/// HTTP layer; `ResponseFormat` means the server answered successfully but
/// the body was missing a required field or did not match the expected shape.
/// Nothing is retried at this layer.
#[derive(Debug, thiserror::Error)]
pub enum MediaClientError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Matrix error {errcode}: {error} (HTTP {status})")]
    Matrix {
        status: u16,
        errcode: String,
        error: String,
        retry_after_ms: Option<u64>,
    },

    #[error("Malformed response: {0}")]
    ResponseFormat(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid mxc URI: {0}")]
    InvalidMediaId(String),
}

impl MediaClientError {
    /// Whether this error came from the response-validation boundary rather
    /// than the transport.
    pub fn is_response_format(&self) -> bool {
        matches!(self, MediaClientError::ResponseFormat(_))
    }
}
