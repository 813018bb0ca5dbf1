use std::time::Duration;
use thiserror::Error;

/// Coarse classification of a [`MultipartError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A part was not read completely within its window.
    Timeout,
    /// The underlying byte source failed.
    Io,
    /// Malformed headers or framing.
    Protocol,
    /// Invalid caller-supplied settings (boundary tokens, config documents).
    Configuration,
    /// The API was used in a way it does not allow, e.g. reading a
    /// single-use sequence twice.
    Usage,
}

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum MultipartError {
    // Timeout Errors
    #[error("Part {index} was not read completely within {timeout:?} (gave up after {elapsed:?})")]
    PartTimeout {
        index: usize,
        timeout: Duration,
        elapsed: Duration,
    },
    #[error("Entity was not read completely within {timeout:?} (gave up after {elapsed:?})")]
    EntityTimeout { timeout: Duration, elapsed: Duration },

    // IO Errors
    #[error("Byte source failed: {message}")]
    Io {
        kind: std::io::ErrorKind,
        message: String,
    },
    #[error("Reading {path} failed: {message}")]
    FileRead { path: String, message: String },

    // Protocol Errors
    #[error("Malformed Content-Disposition header: {0}")]
    InvalidContentDisposition(String),
    #[error("Malformed Content-Range header: {0}")]
    InvalidContentRange(String),
    #[error("Malformed Content-Type header: {0}")]
    InvalidMediaType(String),
    #[error("Invalid header")]
    InvalidHeader,
    #[error("Multiple Content-Disposition headers")]
    MultipleContentDisposition,
    #[error("Multiple Content-Range headers")]
    MultipleContentRange,
    #[error("form-data part has no Content-Disposition header")]
    MissingContentDisposition,
    #[error("form-data part disposition is {0}, expected form-data")]
    UnexpectedDispositionType(String),
    #[error("form-data part has no name parameter")]
    MissingFormDataName,
    #[error("byteranges part has no Content-Range header")]
    MissingContentRange,
    #[error("Multipart framing error: {0}")]
    Framing(String),

    // Configuration Errors
    #[error("Invalid boundary {boundary:?}: {reason}")]
    InvalidBoundary { boundary: String, reason: String },
    #[error("Media type {0} is not a multipart type")]
    NotMultipart(String),
    #[error("Media type {actual} does not match expected {expected}")]
    MediaTypeMismatch { expected: String, actual: String },
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // Usage Errors
    #[error("Part sequence was already consumed")]
    PartsConsumed,
    #[error("Entity stream was already consumed")]
    EntityConsumed,
}

impl MultipartError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MultipartError::PartTimeout { .. } | MultipartError::EntityTimeout { .. } => {
                ErrorKind::Timeout
            }
            MultipartError::Io { .. } | MultipartError::FileRead { .. } => ErrorKind::Io,
            MultipartError::InvalidContentDisposition(_)
            | MultipartError::InvalidContentRange(_)
            | MultipartError::InvalidMediaType(_)
            | MultipartError::InvalidHeader
            | MultipartError::MultipleContentDisposition
            | MultipartError::MultipleContentRange
            | MultipartError::MissingContentDisposition
            | MultipartError::UnexpectedDispositionType(_)
            | MultipartError::MissingFormDataName
            | MultipartError::MissingContentRange
            | MultipartError::Framing(_) => ErrorKind::Protocol,
            MultipartError::InvalidBoundary { .. }
            | MultipartError::NotMultipart(_)
            | MultipartError::MediaTypeMismatch { .. }
            | MultipartError::InvalidConfig(_) => ErrorKind::Configuration,
            MultipartError::PartsConsumed | MultipartError::EntityConsumed => ErrorKind::Usage,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.kind() == ErrorKind::Timeout
    }

    /// Index of the part that caused the failure, when known.
    pub fn part_index(&self) -> Option<usize> {
        match self {
            MultipartError::PartTimeout { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// Create an IO error from any error type.
    pub fn io(err: impl std::fmt::Display) -> Self {
        MultipartError::Io {
            kind: std::io::ErrorKind::Other,
            message: err.to_string(),
        }
    }

    /// Create an invalid boundary error.
    pub fn invalid_boundary(boundary: impl Into<String>, reason: impl Into<String>) -> Self {
        MultipartError::InvalidBoundary {
            boundary: boundary.into(),
            reason: reason.into(),
        }
    }

    /// Attach the index of the part being materialized to an entity timeout.
    pub(crate) fn at_part(self, index: usize) -> Self {
        match self {
            MultipartError::EntityTimeout { timeout, elapsed } => MultipartError::PartTimeout {
                index,
                timeout,
                elapsed,
            },
            other => other,
        }
    }
}

impl From<std::io::Error> for MultipartError {
    fn from(err: std::io::Error) -> Self {
        MultipartError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<http::header::InvalidHeaderName> for MultipartError {
    fn from(_: http::header::InvalidHeaderName) -> Self {
        MultipartError::InvalidHeader
    }
}

impl From<http::header::InvalidHeaderValue> for MultipartError {
    fn from(_: http::header::InvalidHeaderValue) -> Self {
        MultipartError::InvalidHeader
    }
}
