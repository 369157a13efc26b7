//! Typed failures raised by the lookup core.
//!
//! Every variant carries structured data so callers branch on the kind of
//! failure instead of matching message text.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure of a single lookup, quota check, or history operation.
#[derive(Debug, Error)]
pub enum LookupError {
    /// The supplied address is not a dotted-decimal IPv4 address. No network call was made.
    #[error("invalid IPv4 address: {address:?}")]
    InvalidAddress { address: String },

    /// Quota exhausted, either tracked locally or confirmed by the server (HTTP 429).
    #[error("rate limit exceeded, retry in {wait_seconds:.1}s")]
    RateLimitExceeded { wait_seconds: f64 },

    /// Transport-level failure reaching a remote endpoint.
    #[error("network error reaching {endpoint}: {message}")]
    Network { endpoint: String, message: String },

    /// The lookup endpoint answered with a status other than 200 or 429.
    #[error("remote service returned HTTP {status}")]
    Remote { status: u16 },

    /// The response body could not be decoded.
    #[error("malformed response payload: {0}")]
    Decode(#[from] DecodeError),

    /// The persisted history log exists but cannot be read or parsed.
    #[error("failed to load history from {}: {reason}", path.display())]
    HistoryLoad { path: PathBuf, reason: String },

    /// Rewriting the history log failed; the previous file is left in place.
    #[error("failed to write history to {}", path.display())]
    HistoryWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl LookupError {
    /// Whether waiting and re-invoking the same call can succeed.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, LookupError::RateLimitExceeded { .. })
    }
}

/// Failure while decoding the serialized-map payload. Offsets are byte positions.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    #[error("unexpected end of input at byte {offset}")]
    UnexpectedEnd { offset: usize },

    #[error("unexpected byte {found:?} at byte {offset}, expected {expected}")]
    UnexpectedByte {
        offset: usize,
        found: char,
        expected: &'static str,
    },

    #[error("invalid number {text:?} at byte {offset}")]
    InvalidNumber { offset: usize, text: String },

    #[error("unsupported value tag {tag:?} at byte {offset}")]
    UnsupportedTag { offset: usize, tag: char },

    #[error("invalid map key at byte {offset}")]
    InvalidKey { offset: usize },

    #[error("string at byte {offset} is not valid UTF-8")]
    InvalidUtf8 { offset: usize },

    #[error("maps nested too deeply at byte {offset}")]
    TooDeep { offset: usize },

    #[error("trailing data after byte {offset}")]
    TrailingData { offset: usize },

    #[error("payload root is not a map")]
    NotAMap,

    #[error("payload has no usable status field")]
    MissingStatus,
}
