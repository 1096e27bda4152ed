//! Error Types
//!
//! A single fatal tokenizer error plus the failures of the surrounding
//! plumbing (I/O, configuration, stream lifecycle).

use std::fmt;

use thiserror::Error;

/// Fatal error reported by the tokenizer
///
/// `position` is the absolute byte offset in the document where the
/// tokenizer gave up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    pub message: String,
    pub position: u64,
}

impl TokenizeError {
    pub fn new(message: impl Into<String>, position: u64) -> Self {
        TokenizeError {
            message: message.into(),
            position,
        }
    }
}

impl fmt::Display for TokenizeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (at byte {})", self.message, self.position)
    }
}

impl std::error::Error for TokenizeError {}

/// Errors returned by record parsing
#[derive(Debug, Error)]
pub enum RecordError {
    /// Malformed input; aborts the whole operation
    #[error("xml error: {0}")]
    Tokenize(#[from] TokenizeError),

    /// The byte source failed
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// Rejected configuration
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Input was fed after the stream reached end of input
    #[error("stream already finished")]
    Finished,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_error_display() {
        let err = TokenizeError::new("mismatched close tag", 42);
        assert_eq!(err.to_string(), "mismatched close tag (at byte 42)");

        let wrapped: RecordError = err.into();
        assert!(matches!(wrapped, RecordError::Tokenize(_)));
        assert_eq!(
            wrapped.to_string(),
            "xml error: mismatched close tag (at byte 42)"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "gone");
        let err: RecordError = io.into();
        assert!(matches!(err, RecordError::Io(_)));
        assert!(err.to_string().starts_with("i/o error"));
    }
}
