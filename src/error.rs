//! Error types for typed request operations

use thiserror::Error;

/// Boxed error returned by encode and decode functions
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Main error type for typed request operations
#[derive(Debug, Error)]
pub enum JsoncError {
    /// The payload could not be serialized; no network I/O happened
    #[error("Encode error ({media_type}): {source}")]
    Encode {
        media_type: String,
        #[source]
        source: BoxError,
    },

    /// The response matched a registered decoder but its body failed to parse
    #[error("Decode error ({media_type}): {source}")]
    Decode {
        media_type: String,
        #[source]
        source: BoxError,
    },

    /// Transport-level error (network, connection, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request timeout error
    #[error("Request timeout")]
    Timeout,

    /// The request context was cancelled before the response arrived
    #[error("Request cancelled")]
    Cancelled,

    /// A codec was registered with an unusable media type
    #[error("Invalid media type: {0:?}")]
    InvalidMediaType(String),

    /// The target URL could not be parsed
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl JsoncError {
    /// Build an encode error for the given media type
    pub fn encode(media_type: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Encode {
            media_type: media_type.into(),
            source: source.into(),
        }
    }

    /// Build a decode error for the given media type
    pub fn decode(media_type: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Decode {
            media_type: media_type.into(),
            source: source.into(),
        }
    }

    /// Whether the payload failed to serialize
    pub fn is_encode(&self) -> bool {
        matches!(self, Self::Encode { .. })
    }

    /// Whether a matched decoder rejected the response body
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    /// Whether the failure came from the transport, including timeout and cancellation
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Timeout | Self::Cancelled)
    }
}

/// Result type alias for typed request operations
pub type JsoncResult<T> = Result<T, JsoncError>;

impl From<reqwest::Error> for JsoncError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            JsoncError::Timeout
        } else if err.is_connect() {
            JsoncError::Transport(format!("Connection error: {}", err))
        } else {
            JsoncError::Transport(err.to_string())
        }
    }
}
