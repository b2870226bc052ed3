// ============================================================
// Error taxonomy
// ============================================================
// Every library layer returns `crate::error::Result`. Components
// fail on the first problem they detect and never retry; the
// binary wraps these errors with anyhow for reporting.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the OCR engine, the classifier and the pipeline.
#[derive(Error, Debug)]
pub enum Error {
    /// The input document does not exist
    #[error("document not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The document extension is neither PDF nor a supported raster image
    #[error("unsupported document format '{extension}' for {}", .path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// A recognition or rasterization capability is not installed
    #[error("{capability} is unavailable: {reason}")]
    ResourceUnavailable {
        capability: &'static str,
        reason: String,
    },

    /// A training or evaluation label is outside the configured label set
    #[error("unknown label '{0}'")]
    LabelLookup(String),

    /// Saved state was produced for a different label set
    #[error("label set mismatch: classifier has {expected:?}, saved state has {found:?}")]
    LabelMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },

    /// I/O or format failure while saving or restoring classifier state
    #[error("persistence failure at {}: {message}", .path.display())]
    Persistence { path: PathBuf, message: String },

    /// A malformed record in a labelled dataset file
    #[error("invalid dataset record {}:{line}: {message}", .path.display())]
    Dataset {
        path: PathBuf,
        line: usize,
        message: String,
    },

    /// Invalid constructor or training arguments
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The recognizer or rasterizer failed while processing a document
    #[error("recognition failed: {0}")]
    Recognition(String),

    /// A raster image could not be decoded or encoded
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// The tokenizer rejected its input or is missing required tokens
    #[error("tokenization failed: {0}")]
    Tokenization(String),
}

impl Error {
    pub(crate) fn persistence(path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Error::Persistence {
            path: path.into(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
