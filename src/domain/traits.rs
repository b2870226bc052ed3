// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The seams between the core and the outside world:
//
//   TextRecognizer     - image → recognized tokens (Tesseract)
//   PageRasterizer     - PDF → page images (PDFium)
//   DocumentClassifier - text → label + score
//
// Optional capabilities are wrapped in `Capability`, which is
// decided once when the engine is built.
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::classification::ClassificationResult;
use crate::error::{Error, Result};

/// Confidence value the recognizer reports for "no detection".
pub const NO_DETECTION_CONFIDENCE: f32 = -1.0;

/// One token as reported by the recognizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedToken {
    pub text: String,
    /// 0-100, or `NO_DETECTION_CONFIDENCE` for structural rows
    pub confidence: f32,
}

impl RecognizedToken {
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

// ─── TextRecognizer ───────────────────────────────────────────────────────────
/// Anything that can read text out of a raster image.
///
/// Implementations:
///   - TesseractRecognizer (feature `tesseract`)
pub trait TextRecognizer {
    fn recognize(&self, image: &DynamicImage, language: &str) -> Result<Vec<RecognizedToken>>;
}

// ─── PageRasterizer ───────────────────────────────────────────────────────────
/// Anything that can turn a PDF into one image per page, in page order.
///
/// Implementations:
///   - PdfiumRasterizer (feature `pdfium`)
pub trait PageRasterizer {
    fn rasterize(&self, path: &Path, dpi: u32) -> Result<Vec<DynamicImage>>;
}

// ─── DocumentClassifier ───────────────────────────────────────────────────────
/// Assigns one label to a block of text.
///
/// Implementations:
///   - TextClassifier → transformer encoder + linear head
pub trait DocumentClassifier {
    fn classify(&self, text: &str) -> Result<ClassificationResult>;
}

impl<T: DocumentClassifier + ?Sized> DocumentClassifier for &T {
    fn classify(&self, text: &str) -> Result<ClassificationResult> {
        (**self).classify(text)
    }
}

// ─── Capability ───────────────────────────────────────────────────────────────
/// An external capability that may or may not be installed.
pub enum Capability<T> {
    Available(T),
    Unavailable { name: &'static str, reason: String },
}

impl<T> Capability<T> {
    pub fn unavailable(name: &'static str, reason: impl Into<String>) -> Self {
        Capability::Unavailable {
            name,
            reason: reason.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Capability::Available(_))
    }

    /// Borrow the capability or report it as `ResourceUnavailable`.
    pub fn require(&self) -> Result<&T> {
        match self {
            Capability::Available(inner) => Ok(inner),
            Capability::Unavailable { name, reason } => Err(Error::ResourceUnavailable {
                capability: *name,
                reason: reason.clone(),
            }),
        }
    }

    /// Take the capability by value or report it as `ResourceUnavailable`.
    pub fn into_inner(self) -> Result<T> {
        match self {
            Capability::Available(inner) => Ok(inner),
            Capability::Unavailable { name, reason } => Err(Error::ResourceUnavailable {
                capability: name,
                reason,
            }),
        }
    }
}

impl<T> std::fmt::Debug for Capability<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Capability::Available(_) => f.write_str("Available"),
            Capability::Unavailable { name, reason } => f
                .debug_struct("Unavailable")
                .field("name", name)
                .field("reason", reason)
                .finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_capability_reports_resource_error() {
        let cap: Capability<u8> = Capability::unavailable("pdf rasterizer", "library missing");
        assert!(!cap.is_available());
        match cap.require() {
            Err(Error::ResourceUnavailable { capability, reason }) => {
                assert_eq!(capability, "pdf rasterizer");
                assert_eq!(reason, "library missing");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_available_capability_is_borrowed() {
        let cap = Capability::Available(7u8);
        assert!(cap.is_available());
        assert_eq!(*cap.require().unwrap(), 7);
        assert_eq!(cap.into_inner().unwrap(), 7);
    }
}
