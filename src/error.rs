//! Error types for dictionary learning
//!
//! Every fallible operation in the crate returns [`Result`], whose error side is
//! [`SparseCodingError`]. Errors are terminal for a training run: nothing in the
//! training loop retries.

use thiserror::Error;

/// Result type alias for sparse coding operations.
pub type Result<T> = std::result::Result<T, SparseCodingError>;

/// Errors that can occur while loading data, configuring or training.
#[derive(Debug, Error)]
pub enum SparseCodingError {
    /// I/O error while reading images/configs or writing output.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid JSON configuration.
    #[error("config parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// PNG encoding failed.
    #[error("image encoding error: {0}")]
    Image(#[from] image::ImageError),

    /// A CSV field could not be parsed as a number (1-based line and column).
    #[error("malformed value '{value}' at line {line}, column {column}")]
    Parse {
        line: usize,
        column: usize,
        value: String,
    },

    /// Matrix or collection shape does not match what was declared.
    #[error("dimension mismatch in {context}: expected {expected}, got {found}")]
    DimensionMismatch {
        context: String,
        expected: String,
        found: String,
    },

    /// An image collection must contain at least one image.
    #[error("image collection is empty")]
    EmptyCollection,

    /// The patch window does not fit inside the images.
    #[error("patch size {patch_size} does not fit in a {rows}x{cols} image")]
    PatchTooLarge {
        patch_size: usize,
        rows: usize,
        cols: usize,
    },

    /// Hyperparameter or configuration value out of range.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A dictionary column had zero or non-finite norm and cannot be normalized.
    #[error("basis function {index} has zero or non-finite norm")]
    DegenerateColumn { index: usize },

    /// NaN or infinity appeared during training.
    #[error("non-finite values detected in {stage}")]
    NonFinite { stage: &'static str },
}

impl SparseCodingError {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }

    pub(crate) fn dimension_mismatch(
        context: impl Into<String>,
        expected: impl ToString,
        found: impl ToString,
    ) -> Self {
        Self::DimensionMismatch {
            context: context.into(),
            expected: expected.to_string(),
            found: found.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SparseCodingError::Parse {
            line: 3,
            column: 2,
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "malformed value 'abc' at line 3, column 2");

        let err = SparseCodingError::DegenerateColumn { index: 7 };
        assert_eq!(err.to_string(), "basis function 7 has zero or non-finite norm");

        let err = SparseCodingError::dimension_mismatch("csv rows", 4, 3);
        assert_eq!(
            err.to_string(),
            "dimension mismatch in csv rows: expected 4, got 3"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: SparseCodingError = io.into();
        assert!(matches!(err, SparseCodingError::Io(_)));
    }
}
