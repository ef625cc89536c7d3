//! Error types for ASCII grid reading, transformation and writing.

use thiserror::Error;

/// Broad classification of an [`AsciiGridError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller supplied an incomplete or unusable configuration.
    Configuration,
    /// A header line or body value could not be parsed.
    Format,
    /// Parsed data is well-formed but fails a structural check.
    Validation,
    /// Underlying file I/O failed.
    Io,
}

/// Errors that can occur while handling ASCII grids.
#[derive(Error, Debug)]
pub enum AsciiGridError {
    /// Neither a source grid nor a complete header set was supplied,
    /// or a generation request is unusable.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// One of the six header lines is malformed.
    #[error("malformed header on line {line}: {message}")]
    HeaderFormat { line: usize, message: String },

    /// A body line contains a non-numeric value or the wrong column count.
    #[error("malformed grid body on line {line}: {message}")]
    BodyFormat { line: usize, message: String },

    /// The body row count does not match `nrows`.
    #[error("grid body has shape {found:?}, headers declare {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// The header block lacks one or more required keys.
    #[error("grid is missing required headers {missing:?}; found headers: {found:?}")]
    MissingHeaders {
        found: Vec<String>,
        missing: Vec<String>,
    },

    /// A required header holds a value that cannot be used.
    #[error("invalid value for header '{key}': {message}")]
    InvalidHeader { key: String, message: String },

    /// A transform stage returned a matrix of a different shape.
    #[error("transform stage {stage} returned shape {found:?}, expected {expected:?}")]
    TransformShape {
        stage: String,
        expected: (usize, usize),
        found: (usize, usize),
    },

    /// File I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AsciiGridError {
    /// Create a Configuration error.
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create a HeaderFormat error for a 1-indexed header line.
    pub fn header_format(line: usize, msg: impl Into<String>) -> Self {
        Self::HeaderFormat {
            line,
            message: msg.into(),
        }
    }

    /// Create a BodyFormat error for a 1-indexed file line.
    pub fn body_format(line: usize, msg: impl Into<String>) -> Self {
        Self::BodyFormat {
            line,
            message: msg.into(),
        }
    }

    /// Create an InvalidHeader error.
    pub fn invalid_header(key: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::InvalidHeader {
            key: key.into(),
            message: msg.into(),
        }
    }

    /// Classify this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::HeaderFormat { .. } | Self::BodyFormat { .. } | Self::ShapeMismatch { .. } => {
                ErrorKind::Format
            }
            Self::MissingHeaders { .. }
            | Self::InvalidHeader { .. }
            | Self::TransformShape { .. } => ErrorKind::Validation,
            Self::Io(_) => ErrorKind::Io,
        }
    }

    /// The 1-indexed file line this error refers to, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::HeaderFormat { line, .. } | Self::BodyFormat { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type for ASCII grid operations.
pub type Result<T> = std::result::Result<T, AsciiGridError>;
