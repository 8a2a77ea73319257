//! Shared error type across tally crates.

use thiserror::Error;

/// Stable error codes (used in logs and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Invalid or inconsistent configuration.
    BadConfig,
    /// Unsupported config/protocol version.
    UnsupportedVersion,
    /// Malformed wire record.
    Decode,
    /// Record could not be serialized.
    Encode,
    /// Socket or listener could not be bound.
    Bind,
    /// Internal invariant violated.
    Internal,
}

impl ErrorCode {
    /// String representation used in log fields.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::BadConfig => "BAD_CONFIG",
            ErrorCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ErrorCode::Decode => "DECODE",
            ErrorCode::Encode => "ENCODE",
            ErrorCode::Bind => "BIND",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricsError>;

/// Unified error type used by core and pipeline.
///
/// Only startup paths surface these to callers. Runtime paths (send, merge,
/// per-line decode on the server) log and degrade instead.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("bad config: {0}")]
    BadConfig(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("decode failed: {0}")]
    Decode(String),
    #[error("encode failed: {0}")]
    Encode(String),
    #[error("bind {target} failed: {source}")]
    Bind {
        target: String,
        #[source]
        source: std::io::Error,
    },
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricsError {
    /// Map to a stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricsError::BadConfig(_) => ErrorCode::BadConfig,
            MetricsError::UnsupportedVersion => ErrorCode::UnsupportedVersion,
            MetricsError::Decode(_) => ErrorCode::Decode,
            MetricsError::Encode(_) => ErrorCode::Encode,
            MetricsError::Bind { .. } => ErrorCode::Bind,
            MetricsError::Internal(_) => ErrorCode::Internal,
        }
    }
}
