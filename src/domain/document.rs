// ============================================================
// Layer 3 - Document Domain Types
// ============================================================
// Plain data produced by the OCR engine and the pipeline.
// Nothing here touches files, tensors or the recognizer.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::domain::classification::ClassificationResult;

/// OCR output for a single page of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPageResult {
    /// 1-based page number, contiguous within a document
    pub page_number: usize,

    /// Recognized text lines joined with '\n'
    pub text: String,

    /// Mean token confidence on a 0-100 scale, absent when
    /// the recognizer reported no usable confidence
    pub confidence: Option<f32>,
}

impl OcrPageResult {
    pub fn new(page_number: usize, text: impl Into<String>, confidence: Option<f32>) -> Self {
        Self {
            page_number,
            text: text.into(),
            confidence,
        }
    }
}

/// Everything the pipeline learned about one document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentPrediction {
    /// The file that was processed
    pub path: PathBuf,

    /// Raw per-page OCR output in page order
    pub ocr_pages: Vec<OcrPageResult>,

    /// Page texts joined in page order
    pub aggregated_text: String,

    /// Mean of the page confidences that are present
    pub mean_confidence: Option<f32>,

    /// Classifier output for `aggregated_text`
    pub prediction: ClassificationResult,
}

impl DocumentPrediction {
    pub fn page_count(&self) -> usize {
        self.ocr_pages.len()
    }
}
